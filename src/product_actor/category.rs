use crate::actor_framework::{Entity, UniqueKey};
use crate::domain::{Category, CategoryId, NewCategory};
use super::error::ProductError;

#[derive(Debug, Clone)]
pub enum CategoryFilter {
    All,
    Name(String),
}

impl Entity for Category {
    const KIND: &'static str = "category";
    type Id = CategoryId;
    type CreateParams = NewCategory;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Filter = CategoryFilter;
    type Error = ProductError;

    fn id(&self) -> CategoryId {
        self.id
    }

    fn from_create(id: CategoryId, params: NewCategory) -> Result<Self, ProductError> {
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
        })
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", self.name.clone())]
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), ProductError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), ProductError> {
        Ok(())
    }

    fn matches(&self, filter: &CategoryFilter) -> bool {
        match filter {
            CategoryFilter::All => true,
            CategoryFilter::Name(name) => &self.name == name,
        }
    }
}
