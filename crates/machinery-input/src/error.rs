/// Errors from starting a component placement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("no component definition for item '{0}'")]
    UnknownItem(String),
    #[error("item '{0}' is not in the inventory")]
    OutOfStock(String),
    #[error("a component placement is already in progress")]
    PlacementInProgress,
}
