/// Generates `get_<entity>` (absent is `Ok(None)`) and `require_<entity>` (absent is
/// the given not-found error) for one resource client field.
macro_rules! impl_client_methods {
    ($client_name:ident, $field:ident: $entity:ty, $error:ty, $entity_name_snake:ident, $not_found:path) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::Entity>::Id,
                ) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.$field.get(id).await
                }

                pub async fn [<require_ $entity_name_snake>](
                    &self,
                    id: <$entity as $crate::actor_framework::Entity>::Id,
                ) -> Result<$entity, $error> {
                    self.[<get_ $entity_name_snake>](id).await?.ok_or($not_found(id))
                }
            }
        }
    };
}
