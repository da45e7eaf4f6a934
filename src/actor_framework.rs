use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{self, AtomicU64};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Actions, Filters)
// =============================================================================

/// Trait that any stored record must implement to be managed by [`ResourceActor`].
///
/// Every hook runs on a working copy; the actor only writes the copy back once
/// the hook (and the uniqueness check) succeeded, so a failed hook never leaves
/// a half-modified record behind.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Human readable kind, used in errors and spans.
    const KIND: &'static str;

    type Id: Ord + Eq + Hash + Copy + Send + Sync + Display + Debug + 'static;
    type CreateParams: Send + Debug + 'static;
    type Patch: Send + Debug + 'static;
    type Action: Send + Debug + 'static;
    type ActionResult: Send + Debug + 'static;
    type Filter: Send + Debug + 'static;
    type Error: std::error::Error + From<FrameworkError<Self::Id>> + Send + 'static;

    fn id(&self) -> Self::Id;

    /// Construct the full record from the assigned id and the creation params.
    fn from_create(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    /// Keys that no two records of this kind may share.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    // --- Lifecycle Hooks ---

    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a domain-specific mutation.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;

    // --- Queries ---

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Order of [`ResourceClient::list`] results. Ascending id by default.
    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.id().cmp(&b.id())
    }
}

/// A `(field, value)` pair that must be unique across one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Failures produced by the framework itself rather than by a domain hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameworkError<Id: Display + Debug> {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Id },
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{0} actor closed")]
    Closed(&'static str),
    #[error("{0} actor dropped the request")]
    Dropped(&'static str),
}

/// Skip/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    pub fn first(limit: usize) -> Self {
        Self { skip: 0, limit }
    }

    /// Caps the limit at `max`.
    pub fn clamp(self, max: usize) -> Self {
        Self {
            skip: self.skip,
            limit: self.limit.min(max),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// What a batch does when one of its targets does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Fail the whole batch with `NotFound`.
    Abort,
    /// Leave the entry out and report `None` for it.
    Skip,
}

/// Id generator handing out 1, 2, 3, ...
pub fn sequential_ids<I: From<u64>>() -> impl Fn() -> I + Send + Sync + 'static {
    let counter = AtomicU64::new(1);
    move || I::from(counter.fetch_add(1, atomic::Ordering::SeqCst))
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Reply<T, R> = oneshot::Sender<Result<R, <T as Entity>::Error>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Reply<T, T>,
    },
    Get {
        id: T::Id,
        respond_to: Reply<T, Option<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Reply<T, T>,
    },
    Delete {
        id: T::Id,
        respond_to: Reply<T, T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Reply<T, T::ActionResult>,
    },
    /// Applies every action or none of them.
    Batch {
        actions: Vec<(T::Id, T::Action)>,
        missing: MissingPolicy,
        respond_to: Reply<T, Vec<Option<T::ActionResult>>>,
    },
    List {
        filter: T::Filter,
        page: Page,
        respond_to: Reply<T, Vec<T>>,
    },
    Shutdown,
    #[cfg(test)]
    Len {
        respond_to: Reply<T, usize>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    /// Id drawn by a rejected create; the next create reuses it.
    spare_id: Option<T::Id>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id_fn: Box::new(next_id_fn),
            spare_id: None,
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = T::KIND))]
    pub async fn run(mut self) {
        info!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
                ResourceRequest::Batch { actions, missing, respond_to } => {
                    let _ = respond_to.send(self.handle_batch(actions, missing));
                }
                ResourceRequest::List { filter, page, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_list(&filter, page)));
                }
                ResourceRequest::Shutdown => {
                    info!("Actor shutting down");
                    break;
                }
                #[cfg(test)]
                ResourceRequest::Len { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.len()));
                }
            }
        }
        info!("Actor stopped");
    }

    fn not_found(id: T::Id) -> T::Error {
        FrameworkError::NotFound { entity: T::KIND, id }.into()
    }

    /// Rejects `candidate` if another record already holds one of its unique keys.
    fn check_unique(&self, candidate: &T) -> Result<(), T::Error> {
        let keys = candidate.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        let candidate_id = candidate.id();
        for other in self.store.values().filter(|other| other.id() != candidate_id) {
            let taken = other.unique_keys();
            if let Some(key) = keys.iter().find(|key| taken.contains(key)) {
                warn!(field = key.field, value = %key.value, "Unique key conflict");
                return Err(FrameworkError::Conflict {
                    entity: T::KIND,
                    field: key.field,
                    value: key.value.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, T::Error> {
        let id = self.spare_id.take().unwrap_or_else(|| (self.next_id_fn)());
        let item = match T::from_create(id, params).and_then(|item| self.check_unique(&item).map(|()| item)) {
            Ok(item) => item,
            Err(e) => {
                self.spare_id = Some(id);
                return Err(e);
            }
        };
        self.store.insert(id, item.clone());
        debug!(id = %id, "Created");
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let mut item = self.store.get(&id).cloned().ok_or_else(|| Self::not_found(id))?;
        item.on_update(patch)?;
        self.check_unique(&item)?;
        self.store.insert(id, item.clone());
        debug!(id = %id, "Updated");
        Ok(item)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<T, T::Error> {
        let item = self.store.get(&id).ok_or_else(|| Self::not_found(id))?;
        item.on_delete()?;
        let removed = self.store.remove(&id).ok_or_else(|| Self::not_found(id))?;
        debug!(id = %id, "Deleted");
        Ok(removed)
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let mut item = self.store.get(&id).cloned().ok_or_else(|| Self::not_found(id))?;
        let result = item.handle_action(action)?;
        self.store.insert(id, item);
        Ok(result)
    }

    /// Runs the actions against working copies and commits them only when all succeed.
    /// Several actions may target the same record; each sees the previous ones' effects.
    fn handle_batch(
        &mut self,
        actions: Vec<(T::Id, T::Action)>,
        missing: MissingPolicy,
    ) -> Result<Vec<Option<T::ActionResult>>, T::Error> {
        let mut working: BTreeMap<T::Id, T> = BTreeMap::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            let item = match working.entry(id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(slot) => match self.store.get(&id) {
                    Some(stored) => slot.insert(stored.clone()),
                    None => match missing {
                        MissingPolicy::Abort => return Err(Self::not_found(id)),
                        MissingPolicy::Skip => {
                            debug!(id = %id, "Skipping missing record in batch");
                            results.push(None);
                            continue;
                        }
                    },
                },
            };
            results.push(Some(item.handle_action(action)?));
        }

        debug!(touched = working.len(), "Batch committed");
        self.store.extend(working);
        Ok(results)
    }

    fn handle_list(&self, filter: &T::Filter, page: Page) -> Vec<T> {
        let mut matching: Vec<&T> = self.store.values().filter(|item| item.matches(filter)).collect();
        matching.sort_by(|a, b| T::list_order(a, b));
        matching
            .into_iter()
            .skip(page.skip)
            .take(page.limit)
            .cloned()
            .collect()
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn send(&self, request: ResourceRequest<T>) -> Result<(), T::Error> {
        self.sender
            .send(request)
            .await
            .map_err(|_| FrameworkError::Closed(T::KIND).into())
    }

    async fn receive<R>(response: oneshot::Receiver<Result<R, T::Error>>) -> Result<R, T::Error> {
        response
            .await
            .map_err(|_| T::Error::from(FrameworkError::Dropped(T::KIND)))?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Create { params, respond_to }).await?;
        Self::receive(response).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Get { id, respond_to }).await?;
        Self::receive(response).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Update { id, patch, respond_to }).await?;
        Self::receive(response).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<T, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Delete { id, respond_to }).await?;
        Self::receive(response).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Action { id, action, respond_to }).await?;
        Self::receive(response).await
    }

    pub async fn batch(
        &self,
        actions: Vec<(T::Id, T::Action)>,
        missing: MissingPolicy,
    ) -> Result<Vec<Option<T::ActionResult>>, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Batch { actions, missing, respond_to }).await?;
        Self::receive(response).await
    }

    pub async fn list(&self, filter: T::Filter, page: Page) -> Result<Vec<T>, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::List { filter, page, respond_to }).await?;
        Self::receive(response).await
    }

    /// First record matching `filter`, in list order.
    pub async fn find(&self, filter: T::Filter) -> Result<Option<T>, T::Error> {
        Ok(self.list(filter, Page::first(1)).await?.into_iter().next())
    }

    pub async fn shutdown(&self) -> Result<(), T::Error> {
        self.send(ResourceRequest::Shutdown).await
    }

    #[cfg(test)]
    pub async fn len(&self) -> Result<usize, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Len { respond_to }).await?;
        Self::receive(response).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Widget {
        id: u64,
        name: String,
        stock: u32,
    }

    #[derive(Debug)]
    struct WidgetCreate {
        name: String,
        stock: u32,
    }

    #[derive(Debug)]
    struct WidgetPatch {
        name: Option<String>,
    }

    #[derive(Debug)]
    enum WidgetAction {
        Take(u32),
        Put(u32),
    }

    #[derive(Debug, Error)]
    enum WidgetError {
        #[error("not enough widgets")]
        Empty,
        #[error("name must not be blank")]
        BlankName,
        #[error(transparent)]
        Framework(#[from] FrameworkError<u64>),
    }

    impl Entity for Widget {
        const KIND: &'static str = "widget";
        type Id = u64;
        type CreateParams = WidgetCreate;
        type Patch = WidgetPatch;
        type Action = WidgetAction;
        type ActionResult = u32;
        type Filter = Option<String>;
        type Error = WidgetError;

        fn id(&self) -> u64 {
            self.id
        }

        fn from_create(id: u64, params: WidgetCreate) -> Result<Self, WidgetError> {
            Ok(Self {
                id,
                name: params.name,
                stock: params.stock,
            })
        }

        fn unique_keys(&self) -> Vec<UniqueKey> {
            vec![UniqueKey::new("name", self.name.clone())]
        }

        fn on_update(&mut self, patch: WidgetPatch) -> Result<(), WidgetError> {
            if let Some(name) = patch.name {
                if name.trim().is_empty() {
                    return Err(WidgetError::BlankName);
                }
                self.name = name;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: WidgetAction) -> Result<u32, WidgetError> {
            match action {
                WidgetAction::Take(n) => {
                    self.stock = self.stock.checked_sub(n).ok_or(WidgetError::Empty)?;
                }
                WidgetAction::Put(n) => self.stock += n,
            }
            Ok(self.stock)
        }

        fn matches(&self, filter: &Option<String>) -> bool {
            filter.as_ref().map_or(true, |needle| self.name.contains(needle.as_str()))
        }
    }

    fn start() -> ResourceClient<Widget> {
        let (actor, client) = ResourceActor::<Widget>::new(10, sequential_ids());
        tokio::spawn(actor.run());
        client
    }

    async fn create(client: &ResourceClient<Widget>, name: &str, stock: u32) -> Widget {
        client
            .create(WidgetCreate { name: name.into(), stock })
            .await
            .unwrap()
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_create_get_and_action() {
        let client = start();

        let widget = create(&client, "bolt", 5).await;
        assert_eq!(widget.id, 1);

        let left = client.perform_action(widget.id, WidgetAction::Take(2)).await.unwrap();
        assert_eq!(left, 3);

        let stored = client.get(widget.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 3);
        assert!(client.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_action_leaves_record_untouched() {
        let client = start();
        let widget = create(&client, "nut", 1).await;

        let err = client.perform_action(widget.id, WidgetAction::Take(2)).await.unwrap_err();
        assert!(matches!(err, WidgetError::Empty));
        assert_eq!(client.get(widget.id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let client = start();
        let a = create(&client, "a", 5).await;
        let b = create(&client, "b", 1).await;

        let err = client
            .batch(
                vec![(a.id, WidgetAction::Take(5)), (b.id, WidgetAction::Take(2))],
                MissingPolicy::Abort,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WidgetError::Empty));
        assert_eq!(client.get(a.id).await.unwrap().unwrap().stock, 5);
        assert_eq!(client.get(b.id).await.unwrap().unwrap().stock, 1);

        // Repeated targets accumulate within one batch
        let results = client
            .batch(
                vec![(a.id, WidgetAction::Take(3)), (a.id, WidgetAction::Take(2))],
                MissingPolicy::Abort,
            )
            .await
            .unwrap();
        assert_eq!(results, vec![Some(2), Some(0)]);
    }

    #[tokio::test]
    async fn test_batch_missing_policies() {
        let client = start();
        let a = create(&client, "a", 0).await;

        let err = client
            .batch(vec![(a.id, WidgetAction::Put(1)), (42, WidgetAction::Put(1))], MissingPolicy::Abort)
            .await
            .unwrap_err();
        assert!(matches!(err, WidgetError::Framework(FrameworkError::NotFound { id: 42, .. })));
        assert_eq!(client.get(a.id).await.unwrap().unwrap().stock, 0);

        let results = client
            .batch(vec![(a.id, WidgetAction::Put(1)), (42, WidgetAction::Put(1))], MissingPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(results, vec![Some(1), None]);
    }

    #[tokio::test]
    async fn test_unique_keys_on_create_and_update() {
        let client = start();
        create(&client, "gear", 1).await;
        let other = create(&client, "cog", 1).await;

        let err = client
            .create(WidgetCreate { name: "gear".into(), stock: 0 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WidgetError::Framework(FrameworkError::Conflict { field: "name", .. })
        ));

        let err = client
            .update(other.id, WidgetPatch { name: Some("gear".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, WidgetError::Framework(FrameworkError::Conflict { .. })));
        assert_eq!(client.get(other.id).await.unwrap().unwrap().name, "cog");

        // Re-saving its own key is not a conflict
        let same = client
            .update(other.id, WidgetPatch { name: Some("cog".into()) })
            .await
            .unwrap();
        assert_eq!(same.name, "cog");
        assert_eq!(client.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rejected_create_leaves_no_id_gap() {
        let client = start();
        assert_eq!(create(&client, "gear", 1).await.id, 1);
        assert!(client
            .create(WidgetCreate { name: "gear".into(), stock: 0 })
            .await
            .is_err());
        assert_eq!(create(&client, "cog", 1).await.id, 2);
        assert_eq!(create(&client, "axle", 1).await.id, 3);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let client = start();
        for name in ["red-1", "blue-1", "red-2", "red-3"] {
            create(&client, name, 0).await;
        }

        let reds = client.list(Some("red".into()), Page::default()).await.unwrap();
        let names: Vec<_> = reds.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["red-1", "red-2", "red-3"]);

        let window = client.list(Some("red".into()), Page::new(1, 1)).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].name, "red-2");

        let first = client.find(Some("blue".into())).await.unwrap().unwrap();
        assert_eq!(first.name, "blue-1");
    }

    #[tokio::test]
    async fn test_delete_and_shutdown() {
        let client = start();
        let widget = create(&client, "spring", 1).await;

        let removed = client.delete(widget.id).await.unwrap();
        assert_eq!(removed, widget);
        assert!(matches!(
            client.delete(widget.id).await.unwrap_err(),
            WidgetError::Framework(FrameworkError::NotFound { .. })
        ));

        client.shutdown().await.unwrap();
        tokio::task::yield_now().await;
        // The actor is gone; requests now fail with a communication error
        let err = loop {
            match client.get(widget.id).await {
                Err(err) => break err,
                Ok(_) => tokio::task::yield_now().await,
            }
        };
        assert!(matches!(
            err,
            WidgetError::Framework(FrameworkError::Closed(_) | FrameworkError::Dropped(_))
        ));
    }

    #[test]
    fn test_page_clamp() {
        assert_eq!(Page::new(5, 500).clamp(100), Page::new(5, 100));
        assert_eq!(Page::default().limit, Page::DEFAULT_LIMIT);
    }
}
