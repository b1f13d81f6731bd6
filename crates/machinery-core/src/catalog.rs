//! Immutable component catalog.
//!
//! Component definitions describe what a placeable part *is*: its
//! footprint mask, its connection ports, and the simulation ratings the
//! (external) simulation reads. Definitions are registered once through a
//! [`CatalogBuilder`], validated, and frozen into a [`Catalog`] that every
//! placement shares by reference.

use crate::fixed::Fixed64;
use crate::geometry::GridPosition;
use crate::id::ComponentDefId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// The medium a port connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    Power,
    Water,
    Signal,
}

/// A connection point on a component, in mask-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDef {
    /// Unique (per component) identifier used by [`PortLink`]s.
    pub id: String,
    /// Cell within the footprint mask (not relative to the origin).
    pub cell: GridPosition,
    pub port_type: PortType,
    pub is_input: bool,
}

/// How an input port feeds the rest of the component: either an output
/// port, or an internal simulation variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLink {
    pub input_id: String,
    pub output_id: Option<String>,
    pub simulation_variable: Option<String>,
    pub port_type: PortType,
}

// ---------------------------------------------------------------------------
// Footprint mask
// ---------------------------------------------------------------------------

/// The shape of a component: a `width * height` occupancy bitmap (row-major,
/// row 0 first) plus the cell treated as the placement anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintMask {
    pub width: u32,
    pub height: u32,
    pub origin: GridPosition,
    pub occupied: Vec<bool>,
}

impl FootprintMask {
    /// A 1x1 mask anchored on its only cell.
    pub fn single() -> Self {
        Self::solid(1, 1)
    }

    /// A fully occupied `width * height` mask anchored at (0, 0).
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            origin: GridPosition::ORIGIN,
            occupied: vec![true; (width * height) as usize],
        }
    }

    /// Build a mask from rows of `#` (occupied) and `.` (empty). Row 0 is
    /// the first string.
    pub fn from_rows(rows: &[&str], origin: GridPosition) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut occupied = vec![false; (width * height) as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                occupied[y * width as usize + x] = ch == '#';
            }
        }
        Self {
            width,
            height,
            origin,
            occupied,
        }
    }

    /// Whether the mask-local cell is occupied. Cells outside the mask are not.
    pub fn occupies(&self, local: GridPosition) -> bool {
        if local.x < 0 || local.y < 0 {
            return false;
        }
        let (x, y) = (local.x as u32, local.y as u32);
        if x >= self.width || y >= self.height {
            return false;
        }
        self.occupied
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Iterate occupied mask-local cells in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        let w = self.width as i32;
        let h = self.height as i32;
        (0..h)
            .flat_map(move |y| (0..w).map(move |x| GridPosition::new(x, y)))
            .filter(|&p| self.occupies(p))
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("empty mask {}x{}", self.width, self.height));
        }
        let expected = (self.width * self.height) as usize;
        if self.occupied.len() != expected {
            return Err(format!(
                "bitmap has {} cells, expected {expected}",
                self.occupied.len()
            ));
        }
        if self.cell_count() == 0 {
            return Err("mask occupies no cells".to_string());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulation parameters
// ---------------------------------------------------------------------------

/// Ratings read by the external simulation. Stored, never evaluated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub requires_power: bool,
    pub passthrough_power: bool,
    pub passthrough_water: bool,
    /// Bar.
    pub max_pressure: Fixed64,
    pub max_ac_voltage: Fixed64,
    pub max_dc_voltage: Fixed64,
    pub wattage: Fixed64,
    pub flow_coef: Fixed64,
    pub volume_l: Fixed64,
    pub heat_rate_w: Fixed64,
    pub temperature_c: Fixed64,
    pub target_temp_min: Fixed64,
    pub target_temp_max: Fixed64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            requires_power: false,
            passthrough_power: true,
            passthrough_water: true,
            max_pressure: Fixed64::from_num(12),
            max_ac_voltage: Fixed64::from_num(240),
            max_dc_voltage: Fixed64::from_num(24),
            wattage: Fixed64::ZERO,
            flow_coef: Fixed64::from_num(1),
            volume_l: Fixed64::from_num(0.5),
            heat_rate_w: Fixed64::from_num(1800),
            temperature_c: Fixed64::from_num(20),
            target_temp_min: Fixed64::from_num(92),
            target_temp_max: Fixed64::from_num(96),
        }
    }
}

// ---------------------------------------------------------------------------
// Component definition
// ---------------------------------------------------------------------------

/// A component kind in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Catalog key; also the inventory item id.
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub footprint: FootprintMask,
    pub ports: Vec<PortDef>,
    pub port_links: Vec<PortLink>,
    pub max_stack: u32,
    pub params: SimParams,
}

impl ComponentDef {
    /// A definition with the given footprint and no ports.
    pub fn new(name: &str, footprint: FootprintMask) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            footprint,
            ports: Vec::new(),
            port_links: Vec::new(),
            max_stack: 16,
            params: SimParams::default(),
        }
    }

    /// Builder-style port addition.
    pub fn with_port(
        mut self,
        id: &str,
        cell: GridPosition,
        port_type: PortType,
        is_input: bool,
    ) -> Self {
        self.ports.push(PortDef {
            id: id.to_string(),
            cell,
            port_type,
            is_input,
        });
        self
    }

    /// Look up a port by id.
    pub fn port(&self, id: &str) -> Option<&PortDef> {
        self.ports.iter().find(|p| p.id == id)
    }

    /// Whether any port of `port_type` exists.
    pub fn has_port_type(&self, port_type: PortType) -> bool {
        self.ports.iter().any(|p| p.port_type == port_type)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        self.footprint
            .validate()
            .map_err(|detail| CatalogError::InvalidFootprint {
                name: self.name.clone(),
                detail,
            })?;

        for (i, port) in self.ports.iter().enumerate() {
            if self.ports[..i].iter().any(|p| p.id == port.id) {
                return Err(CatalogError::DuplicatePort {
                    component: self.name.clone(),
                    port: port.id.clone(),
                });
            }
            if !self.footprint.occupies(port.cell) {
                return Err(CatalogError::InvalidFootprint {
                    name: self.name.clone(),
                    detail: format!("port '{}' at {} is off the mask", port.id, port.cell),
                });
            }
        }

        for link in &self.port_links {
            let input_ok = self.port(&link.input_id).is_some_and(|p| p.is_input);
            if !input_ok {
                return Err(CatalogError::UnknownPortRef {
                    component: self.name.clone(),
                    port: link.input_id.clone(),
                });
            }
            if let Some(output) = &link.output_id {
                let output_ok = self.port(output).is_some_and(|p| !p.is_input);
                if !output_ok {
                    return Err(CatalogError::UnknownPortRef {
                        component: self.name.clone(),
                        port: output.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder and frozen catalog
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    defs: Vec<ComponentDef>,
    name_to_id: HashMap<String, ComponentDefId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component definition. Returns its ID.
    pub fn register(&mut self, def: ComponentDef) -> Result<ComponentDefId, CatalogError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(CatalogError::DuplicateName(def.name));
        }
        let id = ComponentDefId(self.defs.len() as u32);
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Mutate an already registered definition by name.
    pub fn mutate<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut ComponentDef),
    {
        let id = self
            .name_to_id
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(&mut self.defs[id.0 as usize]);
        Ok(())
    }

    /// Lookup a definition ID by name.
    pub fn id(&self, name: &str) -> Option<ComponentDefId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate every definition and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for def in &self.defs {
            def.validate()?;
        }
        Ok(Catalog {
            defs: self.defs,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable catalog. Frozen after [`CatalogBuilder::build`].
#[derive(Debug, Default)]
pub struct Catalog {
    defs: Vec<ComponentDef>,
    name_to_id: HashMap<String, ComponentDefId>,
}

impl Catalog {
    pub fn get(&self, id: ComponentDefId) -> Option<&ComponentDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn id(&self, name: &str) -> Option<ComponentDefId> {
        self.name_to_id.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&ComponentDef> {
        self.id(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate `(id, def)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentDefId, &ComponentDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (ComponentDefId(i as u32), def))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate component name: {0}")]
    DuplicateName(String),
    #[error("invalid footprint for '{name}': {detail}")]
    InvalidFootprint { name: String, detail: String },
    #[error("duplicate port '{port}' on '{component}'")]
    DuplicatePort { component: String, port: String },
    #[error("port link on '{component}' references unknown port '{port}'")]
    UnknownPortRef { component: String, port: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump() -> ComponentDef {
        ComponentDef::new("pump", FootprintMask::solid(2, 1))
            .with_port("in", GridPosition::new(0, 0), PortType::Water, true)
            .with_port("out", GridPosition::new(1, 0), PortType::Water, false)
            .with_port("mains", GridPosition::new(1, 0), PortType::Power, true)
    }

    #[test]
    fn register_and_build() {
        let mut b = CatalogBuilder::new();
        let id = b.register(pump()).unwrap();
        let catalog = b.build().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.id("pump"), Some(id));
        assert_eq!(catalog.get(id).unwrap().ports.len(), 3);
        assert!(catalog.by_name("boiler").is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut b = CatalogBuilder::new();
        b.register(pump()).unwrap();
        match b.register(pump()) {
            Err(CatalogError::DuplicateName(name)) => assert_eq!(name, "pump"),
            other => panic!("expected DuplicateName, got: {other:?}"),
        }
    }

    #[test]
    fn mask_occupies_respects_bitmap() {
        let mask = FootprintMask::from_rows(&["#.", "##"], GridPosition::ORIGIN);
        assert_eq!(mask.width, 2);
        assert_eq!(mask.height, 2);
        assert!(mask.occupies(GridPosition::new(0, 0)));
        assert!(!mask.occupies(GridPosition::new(1, 0)));
        assert!(mask.occupies(GridPosition::new(1, 1)));
        assert!(!mask.occupies(GridPosition::new(2, 0)));
        assert!(!mask.occupies(GridPosition::new(-1, 0)));
        assert_eq!(mask.cell_count(), 3);
        let cells: Vec<_> = mask.occupied_cells().collect();
        assert_eq!(
            cells,
            vec![
                GridPosition::new(0, 0),
                GridPosition::new(0, 1),
                GridPosition::new(1, 1)
            ]
        );
    }

    #[test]
    fn bitmap_size_mismatch_fails_build() {
        let mut b = CatalogBuilder::new();
        let mut def = ComponentDef::new("broken", FootprintMask::solid(2, 2));
        def.footprint.occupied.pop();
        b.register(def).unwrap();
        assert!(matches!(
            b.build(),
            Err(CatalogError::InvalidFootprint { .. })
        ));
    }

    #[test]
    fn port_off_mask_fails_build() {
        let mut b = CatalogBuilder::new();
        let def = ComponentDef::new("valve", FootprintMask::single()).with_port(
            "p",
            GridPosition::new(1, 0),
            PortType::Water,
            true,
        );
        b.register(def).unwrap();
        let err = b.build().unwrap_err();
        assert!(err.to_string().contains("off the mask"), "got: {err}");
    }

    #[test]
    fn port_link_must_reference_input_and_output() {
        let mut b = CatalogBuilder::new();
        let mut def = pump();
        def.port_links.push(PortLink {
            input_id: "out".to_string(),
            output_id: None,
            simulation_variable: Some("flow".to_string()),
            port_type: PortType::Water,
        });
        b.register(def).unwrap();
        match b.build() {
            Err(CatalogError::UnknownPortRef { port, .. }) => assert_eq!(port, "out"),
            other => panic!("expected UnknownPortRef, got: {other:?}"),
        }
    }

    #[test]
    fn valid_port_link_builds() {
        let mut b = CatalogBuilder::new();
        let mut def = pump();
        def.port_links.push(PortLink {
            input_id: "in".to_string(),
            output_id: Some("out".to_string()),
            simulation_variable: None,
            port_type: PortType::Water,
        });
        b.register(def).unwrap();
        assert!(b.build().is_ok());
    }

    #[test]
    fn mutate_nonexistent_fails() {
        let mut b = CatalogBuilder::new();
        match b.mutate("ghost", |_| {}) {
            Err(CatalogError::NotFound(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn default_params_match_espresso_ratings() {
        let p = SimParams::default();
        assert_eq!(p.max_pressure, Fixed64::from_num(12));
        assert_eq!(p.max_ac_voltage, Fixed64::from_num(240));
        assert!(p.passthrough_power);
        assert!(!p.requires_power);
    }
}
