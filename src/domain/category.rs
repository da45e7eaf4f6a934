use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ids::CategoryId;
use super::validation::Checked;

/// Product category for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

impl Checked for NewCategory {}
