//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::{Catalog, CatalogBuilder, ComponentDef, FootprintMask, PortType};
use crate::geometry::GridPosition;
use crate::mode::{Mode, ModeListener, SharedListener};
use std::cell::RefCell;
use std::rc::Rc;

// ===========================================================================
// Mode listeners
// ===========================================================================

/// Appends `"<name>.enter(<Mode>)"` / `"<name>.exit(<Mode>)"` to a shared log.
#[derive(Debug)]
pub struct RecordingListener {
    pub name: String,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl RecordingListener {
    pub fn new(name: &str, log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            log,
        }
    }
}

impl ModeListener for RecordingListener {
    fn on_enter_mode(&mut self, mode: Mode) {
        self.log
            .borrow_mut()
            .push(format!("{}.enter({mode:?})", self.name));
    }

    fn on_exit_mode(&mut self, mode: Mode) {
        self.log
            .borrow_mut()
            .push(format!("{}.exit({mode:?})", self.name));
    }
}

/// Wrap a listener for registration.
pub fn shared(listener: impl ModeListener + 'static) -> SharedListener {
    Rc::new(RefCell::new(listener))
}

// ===========================================================================
// Catalog fixtures
// ===========================================================================

/// 1x1 part with a single power input port.
pub fn power_terminal() -> ComponentDef {
    ComponentDef::new("power_terminal", FootprintMask::single()).with_port(
        "mains",
        GridPosition::ORIGIN,
        PortType::Power,
        true,
    )
}

/// 1x1 part with a single signal port.
pub fn signal_terminal() -> ComponentDef {
    ComponentDef::new("signal_terminal", FootprintMask::single()).with_port(
        "sig",
        GridPosition::ORIGIN,
        PortType::Signal,
        false,
    )
}

/// Solid 2x2 part anchored at its (0, 0) cell, no ports.
pub fn block_2x2() -> ComponentDef {
    ComponentDef::new("block_2x2", FootprintMask::solid(2, 2))
}

/// L-shaped part (three cells) anchored on its corner, with a power port on
/// the end of the long arm.
///
/// ```text
/// row 1: #.
/// row 0: ##
/// ```
pub fn l_shape() -> ComponentDef {
    ComponentDef::new(
        "l_shape",
        FootprintMask::from_rows(&["##", "#."], GridPosition::ORIGIN),
    )
    .with_port("mains", GridPosition::new(1, 0), PortType::Power, true)
}

/// A boiler with a water inlet and a power inlet on a 2x1 body.
pub fn boiler() -> ComponentDef {
    ComponentDef::new("boiler", FootprintMask::solid(2, 1))
        .with_port("water_in", GridPosition::new(0, 0), PortType::Water, true)
        .with_port("mains", GridPosition::new(1, 0), PortType::Power, true)
}

/// Catalog containing every fixture above.
pub fn test_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    for def in [
        power_terminal(),
        signal_terminal(),
        block_2x2(),
        l_shape(),
        boiler(),
    ] {
        if let Err(e) = b.register(def) {
            panic!("fixture registration failed: {e}");
        }
    }
    match b.build() {
        Ok(catalog) => catalog,
        Err(e) => panic!("fixture catalog invalid: {e}"),
    }
}
