use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::{MissingPolicy, Page, ResourceClient};
use crate::domain::{
    Category, NewCategory, NewProduct, Product, ProductCreate, ProductId, ProductPatch, UserId, Valid,
};
use crate::product_actor::{
    CategoryFilter, ProductAction, ProductActionResult, ProductError, ProductFilter, Reservation,
};
use super::UserClient;

/// Client for the catalog store (products and categories).
#[derive(Clone)]
pub struct ProductClient {
    products: ResourceClient<Product>,
    categories: ResourceClient<Category>,
    users: UserClient,
    max_page_size: usize,
}

impl_client_methods!(ProductClient, products: Product, ProductError, product, ProductError::NotFound);
impl_client_methods!(ProductClient, categories: Category, ProductError, category, ProductError::CategoryNotFound);

fn unexpected(result: ProductActionResult) -> ProductError {
    error!(?result, "Unexpected action result");
    ProductError::ActorCommunicationError(format!("Unexpected result: {result:?}"))
}

impl ProductClient {
    pub fn new(
        products: ResourceClient<Product>,
        categories: ResourceClient<Category>,
        users: UserClient,
        max_page_size: usize,
    ) -> Self {
        Self {
            products,
            categories,
            users,
            max_page_size,
        }
    }

    // --- Categories ---

    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create_category(&self, category: Valid<NewCategory>) -> Result<Category, ProductError> {
        let category = self.categories.create(category.into_inner()).await?;
        info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, ProductError> {
        self.categories.find(CategoryFilter::Name(name.to_owned())).await
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self, page: Page) -> Result<Vec<Category>, ProductError> {
        self.categories
            .list(CategoryFilter::All, page.clamp(self.max_page_size))
            .await
    }

    // --- Products ---

    /// Adds a product owned by `owner_id`, linked to the given categories.
    ///
    /// # Errors
    /// - `OwnerNotFound` / `CategoryNotFound` for dangling references
    /// - `DuplicateSku` when the SKU is already in use
    #[instrument(skip(self, product), fields(name = %product.name, sku = ?product.sku))]
    pub async fn create_product(&self, owner_id: UserId, product: Valid<NewProduct>) -> Result<Product, ProductError> {
        self.users.require_user(owner_id).await?;
        for category_id in &product.category_ids {
            self.require_category(*category_id).await?;
        }

        let product = self
            .products
            .create(ProductCreate {
                owner_id,
                product: product.into_inner(),
            })
            .await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>, ProductError> {
        self.products.find(ProductFilter::Sku(sku.to_owned())).await
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, page: Page) -> Result<Vec<Product>, ProductError> {
        self.products.list(ProductFilter::All, page.clamp(self.max_page_size)).await
    }

    /// Case-insensitive substring search over name and description, ascending id.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str, page: Page) -> Result<Vec<Product>, ProductError> {
        let found = self
            .products
            .list(ProductFilter::Search(query.to_owned()), page.clamp(self.max_page_size))
            .await?;
        debug!(hits = found.len(), "Search finished");
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn list_products_by_owner(&self, owner_id: UserId, page: Page) -> Result<Vec<Product>, ProductError> {
        self.products
            .list(ProductFilter::Owner(owner_id), page.clamp(self.max_page_size))
            .await
    }

    async fn owned_product(&self, actor_id: UserId, product_id: ProductId) -> Result<Product, ProductError> {
        let product = self.require_product(product_id).await?;
        if product.owner_id != actor_id {
            warn!(owner_id = %product.owner_id, "Product belongs to another user");
            return Err(ProductError::Forbidden {
                product_id,
                user_id: actor_id,
            });
        }
        Ok(product)
    }

    /// Edits a product on behalf of its owner.
    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        actor_id: UserId,
        product_id: ProductId,
        patch: Valid<ProductPatch>,
    ) -> Result<Product, ProductError> {
        self.owned_product(actor_id, product_id).await?;
        self.products.update(product_id, patch.into_inner()).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, actor_id: UserId, product_id: ProductId) -> Result<Product, ProductError> {
        self.owned_product(actor_id, product_id).await?;
        let removed = self.products.delete(product_id).await?;
        info!("Product deleted");
        Ok(removed)
    }

    // --- Stock ---

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.products.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Takes every `(product, quantity)` line out of stock, or none of them.
    ///
    /// The returned reservations are in line order and carry the catalog price at
    /// the moment the stock was taken.
    ///
    /// # Errors
    /// - `NotFound` for the first unknown product
    /// - `InsufficientStock` for the first line that exceeds what is left
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn reserve(&self, lines: &[(ProductId, u32)]) -> Result<Vec<Reservation>, ProductError> {
        let actions = lines
            .iter()
            .map(|&(product_id, quantity)| (product_id, ProductAction::Reserve(quantity)))
            .collect();
        let results = self.products.batch(actions, MissingPolicy::Abort).await?;
        results
            .into_iter()
            .map(|result| match result {
                Some(ProductActionResult::Reserved(reservation)) => Ok(reservation),
                Some(other) => Err(unexpected(other)),
                None => Err(ProductError::ActorCommunicationError("Reservation skipped a line".into())),
            })
            .collect()
    }

    /// Puts every line back into stock in one step. Products that no longer exist
    /// are skipped; returns how many lines were restocked.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn restock(&self, lines: &[(ProductId, u32)]) -> Result<usize, ProductError> {
        let actions = lines
            .iter()
            .map(|&(product_id, quantity)| (product_id, ProductAction::Restock(quantity)))
            .collect();
        let results = self.products.batch(actions, MissingPolicy::Skip).await?;
        let restocked = results.iter().filter(|result| result.is_some()).count();
        if restocked < lines.len() {
            warn!(skipped = lines.len() - restocked, "Restock skipped deleted products");
        }
        Ok(restocked)
    }

    pub(crate) async fn shutdown(&self) -> Result<(), ProductError> {
        self.categories.shutdown().await?;
        self.products.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::actor_framework::{sequential_ids, ResourceActor};
    use crate::domain::{Address, CategoryId, NewUser, User};

    async fn start() -> (ProductClient, UserId) {
        let (user_actor, users) = ResourceActor::<User>::new(16, sequential_ids());
        let (address_actor, addresses) = ResourceActor::<Address>::new(16, sequential_ids());
        let (product_actor, products) = ResourceActor::<Product>::new(16, sequential_ids());
        let (category_actor, categories) = ResourceActor::<Category>::new(16, sequential_ids());
        tokio::spawn(user_actor.run());
        tokio::spawn(address_actor.run());
        tokio::spawn(product_actor.run());
        tokio::spawn(category_actor.run());

        let users = UserClient::new(users, addresses, 50);
        let owner = users
            .register(
                Valid::new(NewUser {
                    username: "seller".into(),
                    email: "seller@example.com".into(),
                    password: "password123".into(),
                    is_superuser: false,
                })
                .unwrap(),
            )
            .await
            .unwrap();
        (ProductClient::new(products, categories, users, 50), owner.id)
    }

    fn new_product(name: &str, sku: Option<&str>, inventory: u32) -> Valid<NewProduct> {
        Valid::new(NewProduct {
            name: name.into(),
            description: None,
            price: Decimal::new(500, 2),
            inventory,
            sku: sku.map(Into::into),
            image_url: None,
            category_ids: Vec::new(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_product_checks_references() {
        let (client, owner) = start().await;

        let err = client
            .create_product(UserId(42), new_product("Lamp", None, 1))
            .await
            .unwrap_err();
        assert_eq!(err, ProductError::OwnerNotFound(UserId(42)));

        let mut product = new_product("Lamp", None, 1).into_inner();
        product.category_ids = vec![CategoryId(7)];
        let err = client
            .create_product(owner, Valid::new(product).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, ProductError::CategoryNotFound(CategoryId(7)));

        let category = client
            .create_category(
                Valid::new(NewCategory {
                    name: "Lighting".into(),
                    description: None,
                })
                .unwrap(),
            )
            .await
            .unwrap();
        let mut product = new_product("Lamp", None, 1).into_inner();
        product.category_ids = vec![category.id, category.id];
        let created = client.create_product(owner, Valid::new(product).unwrap()).await.unwrap();
        assert_eq!(created.category_ids.len(), 1);
        assert_eq!(created.owner_id, owner);
    }

    #[tokio::test]
    async fn test_duplicate_sku_and_category_name() {
        let (client, owner) = start().await;
        client
            .create_product(owner, new_product("Lamp", Some("LAMP-1"), 1))
            .await
            .unwrap();
        let err = client
            .create_product(owner, new_product("Other lamp", Some("LAMP-1"), 1))
            .await
            .unwrap_err();
        assert_eq!(err, ProductError::DuplicateSku("LAMP-1".into()));

        let found = client.get_product_by_sku("LAMP-1").await.unwrap().unwrap();
        assert_eq!(found.name, "Lamp");

        let category = || {
            Valid::new(NewCategory {
                name: "Garden".into(),
                description: None,
            })
            .unwrap()
        };
        client.create_category(category()).await.unwrap();
        assert_eq!(
            client.create_category(category()).await.unwrap_err(),
            ProductError::DuplicateCategory("Garden".into())
        );
    }

    #[tokio::test]
    async fn test_only_owner_edits() {
        let (client, owner) = start().await;
        let product = client.create_product(owner, new_product("Lamp", None, 1)).await.unwrap();
        let patch = || {
            Valid::new(ProductPatch {
                price: Some(Decimal::new(750, 2)),
                ..ProductPatch::default()
            })
            .unwrap()
        };

        let err = client.update_product(UserId(99), product.id, patch()).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
        let updated = client.update_product(owner, product.id, patch()).await.unwrap();
        assert_eq!(updated.price, Decimal::new(750, 2));
        assert!(updated.updated_at.is_some());

        assert!(client.delete_product(UserId(99), product.id).await.is_err());
        client.delete_product(owner, product.id).await.unwrap();
        assert!(client.get_product(product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reserve_is_all_or_nothing() {
        let (client, owner) = start().await;
        let a = client.create_product(owner, new_product("A", None, 5)).await.unwrap();
        let b = client.create_product(owner, new_product("B", None, 1)).await.unwrap();

        let err = client.reserve(&[(a.id, 2), (b.id, 3)]).await.unwrap_err();
        assert!(matches!(
            err,
            ProductError::InsufficientStock { requested: 3, available: 1, .. }
        ));
        assert_eq!(client.check_stock(a.id).await.unwrap(), 5);

        let reservations = client.reserve(&[(a.id, 2), (b.id, 1)]).await.unwrap();
        assert_eq!(reservations[0].unit_price, Decimal::new(500, 2));
        assert_eq!(reservations[1].remaining, 0);
        assert_eq!(client.check_stock(a.id).await.unwrap(), 3);

        assert_eq!(
            client.reserve(&[(ProductId(77), 1)]).await.unwrap_err(),
            ProductError::NotFound(ProductId(77))
        );
    }

    #[tokio::test]
    async fn test_restock_skips_deleted_products() {
        let (client, owner) = start().await;
        let a = client.create_product(owner, new_product("A", None, 0)).await.unwrap();
        let restocked = client.restock(&[(a.id, 4), (ProductId(77), 1)]).await.unwrap();
        assert_eq!(restocked, 1);
        assert_eq!(client.check_stock(a.id).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_search_matches_name_or_description() {
        let (client, owner) = start().await;
        let mut lamp = new_product("Desk Lamp", None, 1).into_inner();
        lamp.description = Some("Warm light for late nights".into());
        let lamp = client.create_product(owner, Valid::new(lamp).unwrap()).await.unwrap();
        client.create_product(owner, new_product("Chair", None, 1)).await.unwrap();

        let hits = client.search_products("LATE NIGHT", Page::default()).await.unwrap();
        assert_eq!(hits, vec![lamp.clone()]);
        let hits = client.search_products("lamp", Page::default()).await.unwrap();
        assert_eq!(hits, vec![lamp]);
        assert_eq!(client.list_products(Page::new(1, 10)).await.unwrap().len(), 1);
        assert_eq!(client.list_products_by_owner(owner, Page::default()).await.unwrap().len(), 2);
    }
}
