use crate::domain::OrderTransition;

/// Status changes, the only mutations an order accepts after creation.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// pending -> cancelled.
    Cancel,
    /// cancelled -> pending. Undoes a `Cancel` whose restock could not be applied.
    Reopen,
    /// One fulfilment step forward.
    Advance(OrderTransition),
}
