//! Spatial layer of the workbench: the cell grid, footprint geometry and
//! component placement.
//!
//! The grid is a fixed-size, row-major array of [`Cell`]s created once at
//! startup. Each cell carries a [`Placeability`] classification plus its
//! contents: an optional component handle, an optional wire, and a pipe
//! flag. Components are multi-cell; their shape comes from the catalog's
//! [`FootprintMask`](machinery_core::catalog::FootprintMask) and is resolved
//! against an anchor cell and a [`Rotation`](machinery_core::geometry::Rotation)
//! by [`footprint::resolve`].
//!
//! Placement is all-or-nothing: [`ComponentStore::place`] validates the whole
//! resolved footprint before writing a single cell.

pub mod footprint;
pub mod grid;
pub mod index;
pub mod placement;

pub use footprint::{CellRejection, check, is_valid, port_at, port_cell, resolve, rotate_offset};
pub use grid::{Cell, CellArchetype, CellGrid, GridError, Occupancy, Placeability, WireType};
pub use placement::{ComponentStore, PlacedComponent, PlacementError};
