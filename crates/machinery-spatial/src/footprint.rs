//! Footprint resolution: mask + anchor + rotation -> absolute cells.
//!
//! [`rotate_offset`] is the only rotation transform in the workspace. Both
//! footprint resolution and port mapping go through it.

use crate::grid::{CellGrid, Placeability};
use crate::placement::PlacementError;
use machinery_core::catalog::{ComponentDef, FootprintMask, PortDef, PortType};
use machinery_core::geometry::{GridPosition, Rotation};

/// Why a single cell rejected a prospective placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRejection {
    OutOfBounds,
    Blocked,
    Occupied,
}

impl std::fmt::Display for CellRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellRejection::OutOfBounds => write!(f, "out of bounds"),
            CellRejection::Blocked => write!(f, "blocked"),
            CellRejection::Occupied => write!(f, "already occupied"),
        }
    }
}

/// Rotate an origin-relative offset by `rotation` clockwise quarter turns.
pub fn rotate_offset(local: GridPosition, rotation: Rotation) -> GridPosition {
    let (lx, ly) = (local.x, local.y);
    match rotation {
        Rotation::None => GridPosition::new(lx, ly),
        Rotation::Cw90 => GridPosition::new(ly, -lx),
        Rotation::Cw180 => GridPosition::new(-lx, -ly),
        Rotation::Cw270 => GridPosition::new(-ly, lx),
    }
}

/// Absolute cells covered by `mask` placed at `anchor` with `rotation`,
/// in the mask's row-major order.
pub fn resolve(anchor: GridPosition, mask: &FootprintMask, rotation: Rotation) -> Vec<GridPosition> {
    mask.occupied_cells()
        .map(|cell| anchor + rotate_offset(cell - mask.origin, rotation))
        .collect()
}

/// Validate every cell of a resolved footprint. Returns the first rejection.
/// Pure: the grid is never touched.
pub fn check(cells: &[GridPosition], grid: &CellGrid) -> Result<(), PlacementError> {
    for &cell in cells {
        let reason = match grid.try_cell(cell) {
            None => Some(CellRejection::OutOfBounds),
            Some(c) if c.placeability == Placeability::Blocked => Some(CellRejection::Blocked),
            Some(c) if c.has_component() => Some(CellRejection::Occupied),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            return Err(PlacementError::InvalidFootprint { cell, reason });
        }
    }
    Ok(())
}

pub fn is_valid(cells: &[GridPosition], grid: &CellGrid) -> bool {
    check(cells, grid).is_ok()
}

/// Absolute cell of `port` on a component of `mask` at `anchor`/`rotation`.
pub fn port_cell(
    anchor: GridPosition,
    mask: &FootprintMask,
    rotation: Rotation,
    port: &PortDef,
) -> GridPosition {
    anchor + rotate_offset(port.cell - mask.origin, rotation)
}

/// The port of `port_type` that lands on `cell`, if any.
pub fn port_at<'a>(
    def: &'a ComponentDef,
    anchor: GridPosition,
    rotation: Rotation,
    cell: GridPosition,
    port_type: PortType,
) -> Option<&'a PortDef> {
    def.ports.iter().find(|p| {
        p.port_type == port_type && port_cell(anchor, &def.footprint, rotation, p) == cell
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use machinery_core::test_utils;
    use proptest::prelude::*;

    fn sorted(mut cells: Vec<GridPosition>) -> Vec<GridPosition> {
        cells.sort();
        cells
    }

    #[test]
    fn rotation_table() {
        let p = GridPosition::new(2, 1);
        assert_eq!(rotate_offset(p, Rotation::None), GridPosition::new(2, 1));
        assert_eq!(rotate_offset(p, Rotation::Cw90), GridPosition::new(1, -2));
        assert_eq!(rotate_offset(p, Rotation::Cw180), GridPosition::new(-2, -1));
        assert_eq!(rotate_offset(p, Rotation::Cw270), GridPosition::new(-1, 2));
    }

    #[test]
    fn resolve_2x2_at_anchor() {
        let mask = FootprintMask::solid(2, 2);
        let cells = resolve(GridPosition::new(1, 1), &mask, Rotation::None);
        assert_eq!(
            cells,
            vec![
                GridPosition::new(1, 1),
                GridPosition::new(2, 1),
                GridPosition::new(1, 2),
                GridPosition::new(2, 2),
            ]
        );
    }

    #[test]
    fn resolve_respects_origin() {
        let mask = FootprintMask::from_rows(&["###"], GridPosition::new(1, 0));
        let cells = resolve(GridPosition::new(5, 5), &mask, Rotation::Cw90);
        assert_eq!(
            sorted(cells),
            vec![
                GridPosition::new(5, 4),
                GridPosition::new(5, 5),
                GridPosition::new(5, 6),
            ]
        );
    }

    #[test]
    fn l_shape_rotations_stay_disjoint() {
        let def = test_utils::l_shape();
        let anchor = GridPosition::new(4, 4);
        let mut seen = Vec::new();
        for r in Rotation::all() {
            let cells = sorted(resolve(anchor, &def.footprint, r));
            assert_eq!(cells.len(), 3);
            assert!(cells.contains(&anchor));
            assert!(!seen.contains(&cells), "rotation {r:?} repeated a shape");
            seen.push(cells);
        }
    }

    #[test]
    fn check_reports_first_rejection() {
        let grid = CellGrid::from_fn(3, 3, |p| {
            if p == GridPosition::new(1, 1) {
                Placeability::Blocked
            } else {
                Placeability::Placeable
            }
        })
        .unwrap();

        let cells = [GridPosition::new(0, 0), GridPosition::new(1, 1)];
        assert_eq!(
            check(&cells, &grid),
            Err(PlacementError::InvalidFootprint {
                cell: GridPosition::new(1, 1),
                reason: CellRejection::Blocked,
            })
        );

        let cells = [GridPosition::new(2, 2), GridPosition::new(3, 2)];
        assert_eq!(
            check(&cells, &grid),
            Err(PlacementError::InvalidFootprint {
                cell: GridPosition::new(3, 2),
                reason: CellRejection::OutOfBounds,
            })
        );
        assert!(is_valid(&[GridPosition::new(0, 2)], &grid));
    }

    #[test]
    fn connectors_only_and_display_cells_accept_components() {
        let grid = CellGrid::from_fn(2, 1, |p| {
            if p.x == 0 {
                Placeability::ConnectorsOnly
            } else {
                Placeability::Display
            }
        })
        .unwrap();
        assert!(is_valid(
            &[GridPosition::new(0, 0), GridPosition::new(1, 0)],
            &grid
        ));
    }

    #[test]
    fn port_cell_follows_rotation() {
        let def = test_utils::boiler();
        let mains = def.port("mains").unwrap();
        let anchor = GridPosition::new(3, 3);
        assert_eq!(
            port_cell(anchor, &def.footprint, Rotation::None, mains),
            GridPosition::new(4, 3)
        );
        assert_eq!(
            port_cell(anchor, &def.footprint, Rotation::Cw90, mains),
            GridPosition::new(3, 2)
        );
        assert_eq!(
            port_cell(anchor, &def.footprint, Rotation::Cw180, mains),
            GridPosition::new(2, 3)
        );
    }

    #[test]
    fn port_at_filters_by_type() {
        let def = test_utils::boiler();
        let anchor = GridPosition::new(0, 0);
        let water = port_at(&def, anchor, Rotation::None, anchor, PortType::Water);
        assert_eq!(water.map(|p| p.id.as_str()), Some("water_in"));
        assert!(port_at(&def, anchor, Rotation::None, anchor, PortType::Power).is_none());
        let mains = port_at(
            &def,
            anchor,
            Rotation::None,
            GridPosition::new(1, 0),
            PortType::Power,
        );
        assert_eq!(mains.map(|p| p.id.as_str()), Some("mains"));
    }

    #[test]
    fn ports_land_inside_the_resolved_footprint() {
        let def = test_utils::l_shape();
        for r in Rotation::all() {
            let cells = resolve(GridPosition::new(2, 2), &def.footprint, r);
            for port in &def.ports {
                let at = port_cell(GridPosition::new(2, 2), &def.footprint, r, port);
                assert!(cells.contains(&at), "port {} off footprint at {r:?}", port.id);
            }
        }
    }

    proptest! {
        #[test]
        fn four_quarter_turns_are_identity(x in -100i32..100, y in -100i32..100, steps in 0u8..4) {
            let o = GridPosition::new(x, y);
            let r = Rotation::from_steps(steps);
            let mut p = o;
            for _ in 0..4 {
                p = rotate_offset(p, r);
            }
            prop_assert_eq!(p, o);
        }

        #[test]
        fn rotations_compose(x in -100i32..100, y in -100i32..100, a in 0u8..4, b in 0u8..4) {
            let o = GridPosition::new(x, y);
            let (ra, rb) = (Rotation::from_steps(a), Rotation::from_steps(b));
            prop_assert_eq!(rotate_offset(rotate_offset(o, ra), rb), rotate_offset(o, ra.then(rb)));
        }

        #[test]
        fn rotation_preserves_cell_count(w in 1u32..5, h in 1u32..5, steps in 0u8..4) {
            let mask = FootprintMask::solid(w, h);
            let mut cells = resolve(GridPosition::new(10, 10), &mask, Rotation::from_steps(steps));
            cells.sort();
            cells.dedup();
            prop_assert_eq!(cells.len(), (w * h) as usize);
        }
    }
}
