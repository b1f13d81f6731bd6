//! Mode-aware routing of pointer and key input.

use crate::error::InputError;
use crate::frame::{FrameInput, Key};
use crate::selection::{Selection, SelectionInfo};
use crate::session::{HeldItem, PlacementSession};
use machinery_core::catalog::Catalog;
use machinery_core::geometry::GridPosition;
use machinery_core::id::ComponentId;
use machinery_core::inventory::Inventory;
use machinery_core::mode::{Mode, ModeChange, ModeController, SharedListener};
use machinery_spatial::{
    CellGrid, ComponentStore, PlacedComponent, PlacementError, is_valid, resolve,
};
use machinery_wiring::{RouteContext, RouteOutcome, WireRouter};
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::debug;

// ---------------------------------------------------------------------------
// Configuration and snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Drop the whole frame while the pointer is over UI.
    pub block_when_pointer_over_ui: bool,
    /// Number-row and keypad mode hotkeys.
    pub hotkeys_enabled: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            block_when_pointer_over_ui: true,
            hotkeys_enabled: true,
        }
    }
}

/// What the pointer is over this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub cell: GridPosition,
    /// In bounds and not blocked.
    pub highlight: bool,
    /// Resolved cells of the held component (ComponentPlacement only).
    pub footprint: Vec<GridPosition>,
    pub footprint_valid: bool,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Outside the grid, or nothing to act on.
    Ignored,
    Selected(SelectionInfo),
    SelectionCleared,
    Placed(ComponentId),
    PlacementRejected(PlacementError),
    PlacementCancelled,
    Route(RouteOutcome),
    RouteCancelled,
    /// Modes without a tool only log the click.
    Logged(Mode),
}

pub type SelectionObserver = Box<dyn FnMut(Option<&SelectionInfo>)>;

// ---------------------------------------------------------------------------
// InputDispatcher
// ---------------------------------------------------------------------------

/// Owns the workbench state and routes each frame's input to the tool the
/// current mode allows.
pub struct InputDispatcher {
    config: DispatcherConfig,
    grid: CellGrid,
    components: ComponentStore,
    catalog: Rc<Catalog>,
    modes: ModeController,
    router: Rc<RefCell<WireRouter>>,
    session: Rc<RefCell<PlacementSession>>,
    selection: Selection,
    selection_observers: Vec<SelectionObserver>,
    hover: Option<HoverInfo>,
    active: bool,
}

impl std::fmt::Debug for InputDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("config", &self.config)
            .field("mode", &self.modes.current())
            .field("components", &self.components.len())
            .field("selection", &self.selection.current())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl InputDispatcher {
    /// Assemble a dispatcher. Nothing is registered with `modes` until
    /// [`on_activate`](Self::on_activate) or [`start`](Self::start).
    pub fn new(
        grid: CellGrid,
        catalog: Rc<Catalog>,
        inventory: Rc<RefCell<dyn Inventory>>,
        modes: ModeController,
        router: WireRouter,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            config,
            grid,
            components: ComponentStore::new(),
            catalog,
            modes,
            router: Rc::new(RefCell::new(router)),
            session: Rc::new(RefCell::new(PlacementSession::new(inventory))),
            selection: Selection::new(),
            selection_observers: Vec::new(),
            hover: None,
            active: false,
        }
    }

    // -- Lifecycle --

    /// Activate and boot the mode controller (silent initial mode, then
    /// one announce pass).
    pub fn start(&mut self) {
        self.on_activate();
        self.modes.start();
    }

    /// Register the router and placement session as mode listeners.
    pub fn on_activate(&mut self) {
        if self.active {
            return;
        }
        let router: SharedListener = self.router.clone();
        let session: SharedListener = self.session.clone();
        self.modes.register(router);
        self.modes.register(session);
        self.active = true;
    }

    /// Unregister listeners and refund any held component.
    pub fn on_deactivate(&mut self) {
        if !self.active {
            return;
        }
        let router: SharedListener = self.router.clone();
        let session: SharedListener = self.session.clone();
        self.modes.unregister(&router);
        self.modes.unregister(&session);
        self.session.borrow_mut().refund();
        self.hover = None;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // -- Per-frame entry --

    /// Process one frame of input. Does nothing while inactive.
    pub fn tick(&mut self, input: &FrameInput) {
        if !self.active {
            return;
        }
        if self.config.block_when_pointer_over_ui && input.pointer_over_ui {
            return;
        }
        for &key in &input.keys_pressed {
            self.handle_key(key);
        }

        let cell = input
            .pointer_world
            .and_then(|(x, y)| CellGrid::world_to_cell(x, y));
        self.update_hover(cell);
        let Some(cell) = cell else {
            return;
        };
        self.router.borrow_mut().update_preview(cell);

        if input.left_pressed {
            self.left_click(cell);
        }
        if input.right_pressed {
            self.right_click(cell);
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::R => {
                if self.modes.is(Mode::ComponentPlacement)
                    && let Some(rotation) = self.session.borrow_mut().rotate()
                {
                    debug!(?rotation, "held component rotated");
                }
            }
            other => {
                if self.config.hotkeys_enabled
                    && let Some(mode) = other.mode()
                {
                    self.set_mode(mode);
                }
            }
        }
    }

    fn update_hover(&mut self, cell: Option<GridPosition>) {
        let Some(cell) = cell else {
            self.hover = None;
            return;
        };
        let held = self.session.borrow().held().cloned();
        let (footprint, footprint_valid) = match held {
            Some(held) if self.modes.is(Mode::ComponentPlacement) => {
                match self.catalog.get(held.def) {
                    Some(def) => {
                        let cells = resolve(cell, &def.footprint, held.rotation);
                        let valid = is_valid(&cells, &self.grid);
                        (cells, valid)
                    }
                    None => (Vec::new(), false),
                }
            }
            _ => (Vec::new(), false),
        };
        self.hover = Some(HoverInfo {
            cell,
            highlight: self.grid.is_placeable(cell),
            footprint,
            footprint_valid,
        });
    }

    // -- Click routing --

    /// Route a left click on `cell` by the current mode.
    pub fn left_click(&mut self, cell: GridPosition) -> ClickOutcome {
        let Some(&target) = self.grid.try_cell(cell) else {
            return ClickOutcome::Ignored;
        };
        match self.modes.current() {
            Mode::Selection => {
                let info = self.selection.select(cell, &target);
                self.publish_selection();
                ClickOutcome::Selected(info)
            }
            Mode::ComponentPlacement => self.commit_placement(cell),
            Mode::WirePlacement => {
                let ctx = RouteContext {
                    grid: &mut self.grid,
                    components: &self.components,
                    catalog: self.catalog.as_ref(),
                };
                let outcome = self.router.borrow_mut().handle_click(ctx, cell);
                ClickOutcome::Route(outcome)
            }
            mode @ (Mode::PipePlacement | Mode::Simulation) => {
                debug!(%mode, %cell, "left click");
                ClickOutcome::Logged(mode)
            }
        }
    }

    /// Route a right click on `cell` by the current mode.
    pub fn right_click(&mut self, cell: GridPosition) -> ClickOutcome {
        if !self.grid.contains(cell) {
            return ClickOutcome::Ignored;
        }
        match self.modes.current() {
            Mode::Selection => {
                if self.selection.clear() {
                    self.publish_selection();
                }
                ClickOutcome::SelectionCleared
            }
            Mode::ComponentPlacement => self.cancel_placement(),
            Mode::WirePlacement => {
                self.router.borrow_mut().cancel_preview();
                ClickOutcome::RouteCancelled
            }
            mode @ (Mode::PipePlacement | Mode::Simulation) => {
                debug!(%mode, %cell, "right click");
                ClickOutcome::Logged(mode)
            }
        }
    }

    // -- Component placement --

    /// Take one `item_id` from the inventory and enter ComponentPlacement
    /// holding it, rotation reset.
    pub fn begin_component_placement(&mut self, item_id: &str) -> Result<(), InputError> {
        let def = self
            .catalog
            .id(item_id)
            .ok_or_else(|| InputError::UnknownItem(item_id.to_string()))?;
        self.session.borrow_mut().hold(item_id, def)?;
        self.set_mode(Mode::ComponentPlacement);
        Ok(())
    }

    fn commit_placement(&mut self, anchor: GridPosition) -> ClickOutcome {
        let Some(held) = self.session.borrow().held().cloned() else {
            return ClickOutcome::Ignored;
        };
        match self
            .components
            .place(&mut self.grid, &self.catalog, held.def, anchor, held.rotation)
        {
            Ok(id) => {
                self.session.borrow_mut().commit();
                self.set_mode(Mode::Selection);
                ClickOutcome::Placed(id)
            }
            Err(e) => {
                debug!(item = %held.item_id, %anchor, error = %e, "placement rejected");
                ClickOutcome::PlacementRejected(e)
            }
        }
    }

    /// Drop the held component back into the inventory and return to
    /// Selection.
    pub fn cancel_placement(&mut self) -> ClickOutcome {
        self.set_mode(Mode::Selection);
        // Covers the case where the session is not registered as a listener.
        self.session.borrow_mut().refund();
        ClickOutcome::PlacementCancelled
    }

    /// Remove a placed component together with every wire attached to it.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<PlacedComponent, PlacementError> {
        if !self.components.contains(id) {
            return Err(PlacementError::NotPlaced(id));
        }
        let wires = self
            .router
            .borrow_mut()
            .remove_connections_touching(&mut self.grid, id);
        let placed = self.components.remove(&mut self.grid, &self.catalog, id)?;
        debug!(?id, wires = wires.len(), "component and attached wires removed");

        let stale = self.selection.current().is_some_and(|s| {
            s.component == Some(id)
                || s.wire
                    .is_some_and(|w| self.router.borrow().connection(w).is_none())
        });
        if stale && self.selection.clear() {
            self.publish_selection();
        }
        Ok(placed)
    }

    // -- Modes --

    /// Switch modes with full listener notification.
    pub fn set_mode(&mut self, mode: Mode) -> Option<ModeChange> {
        self.modes.set_mode(mode, true)
    }

    pub fn toggle_simulation(&mut self) -> Option<ModeChange> {
        self.modes.toggle_simulation()
    }

    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeController {
        &mut self.modes
    }

    // -- Selection --

    pub fn selection(&self) -> Option<&SelectionInfo> {
        self.selection.current()
    }

    pub fn subscribe_selection(&mut self, observer: SelectionObserver) {
        self.selection_observers.push(observer);
    }

    fn publish_selection(&mut self) {
        let current = self.selection.current().copied();
        for observer in &mut self.selection_observers {
            observer(current.as_ref());
        }
    }

    // -- Read-only snapshots --

    pub fn hover(&self) -> Option<&HoverInfo> {
        self.hover.as_ref()
    }

    pub fn held(&self) -> Option<HeldItem> {
        self.session.borrow().held().cloned()
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Mutable grid access for overlays, spills and loose things.
    pub fn grid_mut(&mut self) -> &mut CellGrid {
        &mut self.grid
    }

    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn router(&self) -> Ref<'_, WireRouter> {
        self.router.borrow()
    }

    /// Shared handle for hosts that drive the router directly (wire type or
    /// colour pickers).
    pub fn router_handle(&self) -> Rc<RefCell<WireRouter>> {
        self.router.clone()
    }
}
