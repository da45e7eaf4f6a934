//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to script the
//! actor's side of the conversation.

use tokio::sync::mpsc;

use crate::actor_framework::{Entity, MissingPolicy, Reply, ResourceClient, ResourceRequest};

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls instead of a running
/// `ResourceActor`, so a test can inspect each request and answer it with
/// whatever success or failure it wants to simulate.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Reply<T, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Reply<T, Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Reply<T, T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Batch request
pub async fn expect_batch<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<(T::Id, T::Action)>, MissingPolicy, Reply<T, Vec<Option<T::ActionResult>>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Batch {
            actions,
            missing,
            respond_to,
        }) => Some((actions, missing, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Category, CategoryId, User, UserCreate, UserId};
    use crate::product_actor::ProductError;
    use crate::user_actor::UserError;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        // Test Create
        let create_task = tokio::spawn(async move {
            let user = UserCreate {
                username: "test".into(),
                email: "test@example.com".into(),
                password_hash: "hash".into(),
                is_superuser: false,
            };
            client.create(user).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.username, "test");
        let now = Utc::now();
        let user = User {
            id: UserId(1),
            username: payload.username,
            email: payload.email,
            password_hash: payload.password_hash,
            is_active: true,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        };
        responder.send(Ok(user.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(user));
    }

    #[tokio::test]
    async fn test_mock_errors_reach_the_caller() {
        let (client, mut receiver) = create_mock_client::<Category>(10);

        let get_task = tokio::spawn(async move { client.get(CategoryId(3)).await });
        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, CategoryId(3));
        responder
            .send(Err(ProductError::ActorCommunicationError("boom".into())))
            .unwrap();

        let err = get_task.await.unwrap().unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn test_dropped_responder_is_a_communication_error() {
        let (client, mut receiver) = create_mock_client::<User>(10);
        let get_task = tokio::spawn(async move { client.get(UserId(1)).await });
        drop(expect_get(&mut receiver).await);
        assert!(matches!(
            get_task.await.unwrap().unwrap_err(),
            UserError::ActorCommunicationError(_)
        ));
    }
}
