//! Wire routing between component ports.
//!
//! A route is built with two clicks on port cells. The first click puts the
//! [`WireRouter`] into a pending state with a live preview; the second runs a
//! breadth-first search ([`find_path`]) and, if a path exists and both
//! endpoints still host components, commits a [`WireConnection`] to the grid.
//! Nothing touches the grid before that commit, so cancelling at any point
//! is free.
//!
//! # Connection registry
//!
//! Every committed connection lives in a slot map keyed by [`WireId`]
//! (from `machinery-core`), and every cell on its path is indexed for
//! reverse lookup through [`WireRouter::connection_at`].
//!
//! [`WireId`]: machinery_core::id::WireId

pub mod connection;
pub mod path;
pub mod router;

pub use connection::{WireColor, WireConnection};
pub use path::find_path;
pub use router::{RouteContext, RouteError, RouteOutcome, RouteState, WireRouter, WireRouterConfig};
