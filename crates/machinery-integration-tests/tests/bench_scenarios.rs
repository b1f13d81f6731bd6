//! Cross-crate scenarios on a bare grid: placement, routing and mode
//! notification driven through the library APIs without a dispatcher.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use machinery_core::catalog::Catalog;
use machinery_core::geometry::{GridPosition, Rotation};
use machinery_core::mode::{Mode, ModeController, ModeControllerConfig};
use machinery_core::test_utils::{RecordingListener, shared, test_catalog};
use machinery_spatial::{
    CellGrid, ComponentStore, Placeability, PlacementError, index, is_valid, resolve,
};
use machinery_wiring::{RouteContext, RouteOutcome, WireRouter, WireRouterConfig, find_path};
use proptest::prelude::*;

fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

fn open_grid(w: u32, h: u32) -> CellGrid {
    CellGrid::filled(w, h, Placeability::Placeable).unwrap()
}

/// A bench with its component store and catalog, as the router sees it.
struct Bench {
    grid: CellGrid,
    components: ComponentStore,
    catalog: Catalog,
    router: WireRouter,
}

impl Bench {
    fn new(w: u32, h: u32) -> Self {
        Self {
            grid: open_grid(w, h),
            components: ComponentStore::new(),
            catalog: test_catalog(),
            router: WireRouter::new(WireRouterConfig::default()),
        }
    }

    fn place(&mut self, name: &str, at: GridPosition) {
        let def = self.catalog.id(name).unwrap();
        self.components
            .place(&mut self.grid, &self.catalog, def, at, Rotation::None)
            .unwrap();
    }

    fn click(&mut self, cell: GridPosition) -> RouteOutcome {
        let ctx = RouteContext {
            grid: &mut self.grid,
            components: &self.components,
            catalog: &self.catalog,
        };
        self.router.handle_click(ctx, cell)
    }

    fn wired_cells(&self) -> Vec<GridPosition> {
        self.grid
            .cells()
            .filter(|(_, c)| c.has_wire())
            .map(|(p, _)| p)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

#[test]
fn block_on_open_4x4() {
    let mut bench = Bench::new(4, 4);
    let def = bench.catalog.id("block_2x2").unwrap();
    let mask = &bench.catalog.get(def).unwrap().footprint;

    let cells = resolve(pos(1, 1), mask, Rotation::None);
    let expected: HashSet<_> = [pos(1, 1), pos(2, 1), pos(1, 2), pos(2, 2)].into();
    assert_eq!(cells.iter().copied().collect::<HashSet<_>>(), expected);
    assert!(is_valid(&cells, &bench.grid));

    bench.place("block_2x2", pos(1, 1));
    for &p in &cells {
        let cell = bench.grid.cell(p).unwrap();
        assert!(cell.has_component());
        assert_eq!(cell.placeability, Placeability::ConnectorsOnly);
    }
    assert!(!is_valid(&cells, &bench.grid));
}

#[test]
fn rejected_placement_leaves_grid_untouched() {
    let mut bench = Bench::new(4, 4);
    bench.place("power_terminal", pos(2, 2));
    let before = bench.grid.clone();

    let def = bench.catalog.id("block_2x2").unwrap();
    let err = bench
        .components
        .place(&mut bench.grid, &bench.catalog, def, pos(1, 1), Rotation::None)
        .unwrap_err();
    assert!(matches!(err, PlacementError::InvalidFootprint { .. }));
    assert_eq!(bench.grid, before);
    assert_eq!(bench.components.len(), 1);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn straight_row_route_registers_every_cell() {
    let mut bench = Bench::new(4, 1);
    bench.place("power_terminal", pos(0, 0));
    bench.place("power_terminal", pos(3, 0));

    assert_eq!(bench.click(pos(0, 0)), RouteOutcome::Started(pos(0, 0)));
    let RouteOutcome::Completed(id) = bench.click(pos(3, 0)) else {
        panic!("route did not complete");
    };

    let wire = bench.router.connection(id).unwrap();
    assert_eq!(wire.path, vec![pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)]);
    for x in 0..4 {
        assert_eq!(bench.router.connection_at(pos(x, 0)).map(|(w, _)| w), Some(id));
    }
    // Only the two free cells between the terminals carry the wire tag.
    assert_eq!(bench.wired_cells(), vec![pos(1, 0), pos(2, 0)]);
}

#[test]
fn cancel_mid_route_changes_nothing() {
    let mut bench = Bench::new(4, 1);
    bench.place("power_terminal", pos(0, 0));
    bench.place("power_terminal", pos(3, 0));
    let before = bench.grid.clone();

    bench.click(pos(0, 0));
    bench.router.update_preview(pos(2, 0));
    assert!(!bench.router.preview_path(&bench.grid).is_empty());
    bench.router.cancel_preview();

    assert!(!bench.router.is_pending());
    assert_eq!(bench.router.connection_count(), 0);
    assert_eq!(bench.grid, before);
    assert!(bench.wired_cells().is_empty());
}

#[test]
fn enclosed_goal_has_no_path() {
    let grid = CellGrid::from_fn(5, 5, |p| {
        let ring = (1..=3).contains(&p.x)
            && (1..=3).contains(&p.y)
            && p != pos(2, 2);
        if ring {
            Placeability::Blocked
        } else {
            Placeability::Placeable
        }
    })
    .unwrap();
    assert!(find_path(&grid, pos(0, 0), pos(2, 2)).is_empty());
    assert_eq!(find_path(&grid, pos(0, 0), pos(4, 4)).len(), 9);
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

#[test]
fn exits_run_before_enters() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut modes = ModeController::new(ModeControllerConfig::default());
    modes.start();
    modes.register(shared(RecordingListener::new("L1", log.clone())));
    modes.register(shared(RecordingListener::new("L2", log.clone())));
    log.borrow_mut().clear();

    modes.set_mode(Mode::WirePlacement, true);
    assert_eq!(
        *log.borrow(),
        vec![
            "L1.exit(Selection)",
            "L2.exit(Selection)",
            "L1.enter(WirePlacement)",
            "L2.enter(WirePlacement)",
        ]
    );

    log.borrow_mut().clear();
    assert!(modes.set_mode(Mode::WirePlacement, true).is_none());
    assert!(log.borrow().is_empty());
}

#[test]
fn leaving_wire_mode_drops_pending_route() {
    let mut bench = Bench::new(4, 1);
    bench.place("power_terminal", pos(0, 0));
    bench.place("power_terminal", pos(3, 0));
    bench.click(pos(0, 0));

    let router = Rc::new(RefCell::new(std::mem::replace(
        &mut bench.router,
        WireRouter::new(WireRouterConfig::default()),
    )));
    let mut modes = ModeController::default();
    modes.set_mode(Mode::WirePlacement, false);
    modes.register(router.clone());
    assert!(router.borrow().is_pending());

    modes.set_mode(Mode::Selection, true);
    assert!(!router.borrow().is_pending());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn index_round_trip(w in 1u32..64, h in 1u32..64, seed in any::<u32>()) {
        let (x, y) = (seed % w, (seed / w) % h);
        prop_assert_eq!(index::from_index(index::to_index(x, y, w), w), (x, y));
    }

    #[test]
    fn placement_is_all_or_nothing(
        ax in -1i32..5,
        ay in -1i32..5,
        steps in 0u8..4,
        blocker in 0usize..25,
    ) {
        let mut bench = Bench::new(5, 5);
        let blocker_pos = bench.grid.from_index(blocker);
        bench.place("power_terminal", blocker_pos);
        let before = bench.grid.clone();

        let def = bench.catalog.id("l_shape").unwrap();
        let rotation = Rotation::from_steps(steps);
        let cells = resolve(pos(ax, ay), &bench.catalog.get(def).unwrap().footprint, rotation);
        let valid = is_valid(&cells, &bench.grid);
        let result = bench
            .components
            .place(&mut bench.grid, &bench.catalog, def, pos(ax, ay), rotation);

        prop_assert_eq!(result.is_ok(), valid);
        if let Ok(id) = result {
            for &p in &cells {
                let cell = bench.grid.cell(p).unwrap();
                prop_assert_eq!(cell.component, Some(id));
                prop_assert_eq!(cell.placeability, Placeability::ConnectorsOnly);
            }
        } else {
            prop_assert_eq!(&bench.grid, &before);
        }
    }

    #[test]
    fn open_grid_path_is_manhattan(
        sx in 0i32..12, sy in 0i32..12, ex in 0i32..12, ey in 0i32..12,
    ) {
        let grid = open_grid(12, 12);
        let (start, end) = (pos(sx, sy), pos(ex, ey));
        let path = find_path(&grid, start, end);
        prop_assert_eq!(path.len() as u32, start.manhattan_distance(&end) + 1);
    }
}
