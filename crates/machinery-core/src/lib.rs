//! Machinery Core -- shared vocabulary for the machine-repair workbench.
//!
//! This crate holds the types every other workbench crate depends on:
//! stable handles for placed components and wires, grid geometry, the
//! immutable component catalog, the inventory collaborator seam, and the
//! interaction-mode state machine that decides which tool may mutate the
//! grid at any moment.
//!
//! # Key Types
//!
//! - [`geometry::GridPosition`] / [`geometry::Rotation`] -- integer cell
//!   coordinates and 90-degree rotation steps.
//! - [`catalog::Catalog`] -- immutable component definitions (footprint
//!   mask, ports, simulation parameters) frozen at startup and looked up by
//!   name or [`id::ComponentDefId`].
//! - [`mode::ModeController`] -- finite-state machine over [`mode::Mode`]
//!   with ordered exit/enter listener notification.
//! - [`inventory::Inventory`] -- the item store placement draws from and
//!   refunds to.
//!
//! Everything here is single-threaded: the host loop owns one instance of
//! each stateful type and drives it synchronously once per frame.

pub mod catalog;
pub mod fixed;
pub mod geometry;
pub mod id;
pub mod inventory;
pub mod mode;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
