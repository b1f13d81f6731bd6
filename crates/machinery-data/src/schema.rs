//! Serde data file structs for workshop content.
//!
//! These structs define the on-disk format for component definitions, the
//! bench layout and runtime settings. They are deserialized from RON, JSON,
//! or TOML files and then resolved into runtime types by the loader.

use machinery_core::catalog::{
    ComponentDef, FootprintMask, PortDef, PortLink, PortType, SimParams,
};
use machinery_core::fixed::{f64_to_fixed64, fixed64_to_f64};
use machinery_core::geometry::GridPosition;
use machinery_core::mode::Mode;
use machinery_spatial::WireType;
use machinery_wiring::WireColor;
use serde::Deserialize;

// ===========================================================================
// Components
// ===========================================================================

/// A component definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub footprint: FootprintData,
    #[serde(default)]
    pub ports: Vec<PortData>,
    #[serde(default)]
    pub port_links: Vec<PortLinkData>,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub params: SimParamsData,
}

fn default_max_stack() -> u32 {
    16
}

/// Footprint shape as rows of `#` (occupied) and `.` (empty), first row is
/// mask row 0.
#[derive(Debug, Clone, Deserialize)]
pub struct FootprintData {
    pub rows: Vec<String>,
    #[serde(default)]
    pub origin: (i32, i32),
}

/// A connection point in mask-local coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct PortData {
    pub id: String,
    pub cell: (i32, i32),
    pub port_type: PortType,
    #[serde(default)]
    pub is_input: bool,
}

/// Input-to-output (or input-to-variable) routing inside a component.
#[derive(Debug, Clone, Deserialize)]
pub struct PortLinkData {
    pub input: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub variable: Option<String>,
    pub port_type: PortType,
}

/// Simulation ratings with plain floating point values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimParamsData {
    pub requires_power: bool,
    pub passthrough_power: bool,
    pub passthrough_water: bool,
    pub max_pressure: f64,
    pub max_ac_voltage: f64,
    pub max_dc_voltage: f64,
    pub wattage: f64,
    pub flow_coef: f64,
    pub volume_l: f64,
    pub heat_rate_w: f64,
    pub temperature_c: f64,
    pub target_temp_min: f64,
    pub target_temp_max: f64,
}

impl Default for SimParamsData {
    fn default() -> Self {
        let p = SimParams::default();
        Self {
            requires_power: p.requires_power,
            passthrough_power: p.passthrough_power,
            passthrough_water: p.passthrough_water,
            max_pressure: fixed64_to_f64(p.max_pressure),
            max_ac_voltage: fixed64_to_f64(p.max_ac_voltage),
            max_dc_voltage: fixed64_to_f64(p.max_dc_voltage),
            wattage: fixed64_to_f64(p.wattage),
            flow_coef: fixed64_to_f64(p.flow_coef),
            volume_l: fixed64_to_f64(p.volume_l),
            heat_rate_w: fixed64_to_f64(p.heat_rate_w),
            temperature_c: fixed64_to_f64(p.temperature_c),
            target_temp_min: fixed64_to_f64(p.target_temp_min),
            target_temp_max: fixed64_to_f64(p.target_temp_max),
        }
    }
}

impl SimParamsData {
    pub fn to_params(&self) -> SimParams {
        SimParams {
            requires_power: self.requires_power,
            passthrough_power: self.passthrough_power,
            passthrough_water: self.passthrough_water,
            max_pressure: f64_to_fixed64(self.max_pressure),
            max_ac_voltage: f64_to_fixed64(self.max_ac_voltage),
            max_dc_voltage: f64_to_fixed64(self.max_dc_voltage),
            wattage: f64_to_fixed64(self.wattage),
            flow_coef: f64_to_fixed64(self.flow_coef),
            volume_l: f64_to_fixed64(self.volume_l),
            heat_rate_w: f64_to_fixed64(self.heat_rate_w),
            temperature_c: f64_to_fixed64(self.temperature_c),
            target_temp_min: f64_to_fixed64(self.target_temp_min),
            target_temp_max: f64_to_fixed64(self.target_temp_max),
        }
    }
}

impl ComponentData {
    /// Convert to a catalog definition. Reference checks happen in the
    /// loader and in [`CatalogBuilder::build`](machinery_core::catalog::CatalogBuilder::build).
    pub fn to_def(&self) -> ComponentDef {
        let rows: Vec<&str> = self.footprint.rows.iter().map(String::as_str).collect();
        let origin = GridPosition::from(self.footprint.origin);
        ComponentDef {
            name: self.name.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.name.clone()),
            description: self.description.clone(),
            footprint: FootprintMask::from_rows(&rows, origin),
            ports: self
                .ports
                .iter()
                .map(|p| PortDef {
                    id: p.id.clone(),
                    cell: GridPosition::from(p.cell),
                    port_type: p.port_type,
                    is_input: p.is_input,
                })
                .collect(),
            port_links: self
                .port_links
                .iter()
                .map(|l| PortLink {
                    input_id: l.input.clone(),
                    output_id: l.output.clone(),
                    simulation_variable: l.variable.clone(),
                    port_type: l.port_type,
                })
                .collect(),
            max_stack: self.max_stack,
            params: self.params.to_params(),
        }
    }
}

// ===========================================================================
// Layout
// ===========================================================================

/// Bench layout.
///
/// Either `rows` (one character per cell, listed top-down so the first row
/// is `y = height - 1`) or `cells` (archetype names in row-major order
/// starting at `y = 0`) must be given.
///
/// Row characters: `.` normal, `c` connector, `d` display, `#` blocked.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutData {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub cells: Vec<String>,
}

// ===========================================================================
// Settings
// ===========================================================================

/// Optional runtime settings. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub modes: ModesData,
    pub wiring: WiringData,
    pub input: InputData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModesData {
    pub initial_mode: Mode,
}

/// Named wire colours offered by the wiring palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorData {
    #[default]
    Cyan,
    Red,
    Black,
    Green,
    Blue,
    Purple,
    Orange,
}

impl ColorData {
    pub fn to_color(self) -> WireColor {
        match self {
            ColorData::Cyan => WireColor::CYAN,
            ColorData::Red => WireColor::RED,
            ColorData::Black => WireColor::BLACK,
            ColorData::Green => WireColor::GREEN,
            ColorData::Blue => WireColor::BLUE,
            ColorData::Purple => WireColor::PURPLE,
            ColorData::Orange => WireColor::ORANGE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WiringData {
    pub wire_type: WireType,
    pub color: ColorData,
    pub default_resistance: f64,
    pub max_current: f64,
    pub max_resistance: f64,
}

impl Default for WiringData {
    fn default() -> Self {
        Self {
            wire_type: WireType::AC,
            color: ColorData::Cyan,
            default_resistance: 1.0,
            max_current: 10.0,
            max_resistance: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputData {
    pub block_when_pointer_over_ui: bool,
    pub hotkeys_enabled: bool,
}

impl Default for InputData {
    fn default() -> Self {
        Self {
            block_when_pointer_over_ui: true,
            hotkeys_enabled: true,
        }
    }
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// Wrapper for a list of components in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlComponents {
    pub components: Vec<ComponentData>,
}
