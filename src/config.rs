//! Runtime configuration, parsed once at start-up from flags and `STOREFRONT_*`
//! environment variables.

use std::fmt;

use clap::{Args, Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Order, catalog and account stores")]
pub struct AppConfig {
    #[command(flatten)]
    pub system: SystemConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(flatten)]
    pub bootstrap: BootstrapConfig,
}

/// Actor wiring.
#[derive(Debug, Clone, Args)]
pub struct SystemConfig {
    /// Bounded mailbox size of every actor
    #[arg(long, env = "STOREFRONT_CHANNEL_BUFFER", default_value_t = 64)]
    pub channel_buffer: usize,

    /// Upper bound applied to every listing's limit
    #[arg(long, env = "STOREFRONT_MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 64,
            max_page_size: 100,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,
    /// Multi-line, human-readable logs.
    Pretty,
    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is not set
    #[arg(long = "log", env = "STOREFRONT_LOG", default_value = "info")]
    pub log_filter: String,

    #[arg(long, env = "STOREFRONT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Data created when the binary starts.
#[derive(Clone, Args)]
pub struct BootstrapConfig {
    #[arg(long, env = "FIRST_SUPERUSER_USERNAME", default_value = "admin")]
    pub superuser_username: String,

    #[arg(long, env = "FIRST_SUPERUSER_EMAIL", default_value = "admin@example.com")]
    pub superuser_email: String,

    #[arg(long, env = "FIRST_SUPERUSER_PASSWORD", default_value = "admin123", hide_env_values = true)]
    pub superuser_password: String,

    /// Also create a sample catalog and a demo order
    #[arg(long, env = "STOREFRONT_SEED_SAMPLE_DATA", default_value_t = false)]
    pub seed_sample_data: bool,
}

impl fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("superuser_username", &self.superuser_username)
            .field("superuser_email", &self.superuser_email)
            .field("superuser_password", &"<redacted>")
            .field("seed_sample_data", &self.seed_sample_data)
            .finish()
    }
}
