use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a component placed on the grid.
    pub struct ComponentId;

    /// Identifies a finalized wire connection.
    pub struct WireId;
}

/// Identifies a component definition in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentDefId(pub u32);
