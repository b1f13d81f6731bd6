//! Finalized wire connections.

use machinery_core::fixed::Fixed64;
use machinery_core::geometry::GridPosition;
use machinery_core::id::ComponentId;
use machinery_spatial::WireType;
use serde::{Deserialize, Serialize};

/// Display colour of a wire, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl WireColor {
    pub const CYAN: WireColor = WireColor::rgb(0, 255, 255);
    pub const RED: WireColor = WireColor::rgb(255, 0, 0);
    pub const BLACK: WireColor = WireColor::rgb(0, 0, 0);
    pub const GREEN: WireColor = WireColor::rgb(0, 255, 0);
    pub const BLUE: WireColor = WireColor::rgb(0, 0, 255);
    pub const PURPLE: WireColor = WireColor::rgb(128, 0, 128);
    pub const ORANGE: WireColor = WireColor::rgb(255, 128, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for WireColor {
    fn default() -> Self {
        WireColor::CYAN
    }
}

/// A routed wire between two component ports.
///
/// `resistance`, `current` and `voltage` are owned by the external
/// simulation; the router only seeds them.
#[derive(Debug, Clone, PartialEq)]
pub struct WireConnection {
    pub wire_type: WireType,
    pub color: WireColor,
    pub start_component: ComponentId,
    pub end_component: ComponentId,
    pub start_cell: GridPosition,
    pub end_cell: GridPosition,
    /// Ordered from `start_cell` to `end_cell`, both inclusive.
    pub path: Vec<GridPosition>,
    pub resistance: Fixed64,
    pub current: Fixed64,
    pub voltage: Fixed64,
    pub damaged: bool,
}

impl WireConnection {
    /// Latch `damaged` when both current and resistance exceed their limits.
    /// Damage never clears.
    pub fn evaluate_damage(&mut self, max_current: Fixed64, max_resistance: Fixed64) -> bool {
        if self.current > max_current && self.resistance > max_resistance {
            self.damaged = true;
        }
        self.damaged
    }

    /// Whether `component` is one of the two endpoints.
    pub fn touches(&self, component: ComponentId) -> bool {
        self.start_component == component || self.end_component == component
    }

    /// Number of cells in the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}
