//! Per-frame input routing for the workbench.
//!
//! The [`InputDispatcher`] is the host loop's single entry point. Each frame
//! the host hands it a [`FrameInput`] (pointer position in world units,
//! button edges, pressed keys) and the dispatcher routes it according to the
//! current [`Mode`](machinery_core::mode::Mode):
//!
//! | Mode               | Left click                   | Right click              |
//! |--------------------|------------------------------|--------------------------|
//! | Selection          | select / cycle targets       | clear selection          |
//! | ComponentPlacement | commit held component        | cancel and refund        |
//! | WirePlacement      | route click                  | cancel route preview     |
//! | PipePlacement      | logged                       | logged                   |
//! | Simulation         | logged                       | logged                   |
//!
//! The dispatcher owns the grid, the component store and the mode
//! controller; the wire router and the placement session are shared with
//! the controller as mode listeners so that leaving a mode always cleans up
//! after it.

pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod selection;
pub mod session;

pub use dispatcher::{ClickOutcome, DispatcherConfig, HoverInfo, InputDispatcher};
pub use error::InputError;
pub use frame::{FrameInput, Key};
pub use selection::{Selection, SelectionInfo, SelectionTarget};
pub use session::{HeldItem, PlacementSession};
