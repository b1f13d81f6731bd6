//! Resolved runtime settings.

use machinery_core::fixed::f64_to_fixed64;
use machinery_core::mode::ModeControllerConfig;
use machinery_input::DispatcherConfig;
use machinery_wiring::WireRouterConfig;
use std::path::Path;

use crate::loader::{DataLoadError, deserialize_file};
use crate::schema::SettingsData;

/// Configuration for every stateful workbench service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub modes: ModeControllerConfig,
    pub wiring: WireRouterConfig,
    pub input: DispatcherConfig,
}

impl From<SettingsData> for Settings {
    fn from(data: SettingsData) -> Self {
        Self {
            modes: ModeControllerConfig {
                initial_mode: data.modes.initial_mode,
            },
            wiring: WireRouterConfig {
                wire_type: data.wiring.wire_type,
                color: data.wiring.color.to_color(),
                default_resistance: f64_to_fixed64(data.wiring.default_resistance),
                max_current: f64_to_fixed64(data.wiring.max_current),
                max_resistance: f64_to_fixed64(data.wiring.max_resistance),
            },
            input: DispatcherConfig {
                block_when_pointer_over_ui: data.input.block_when_pointer_over_ui,
                hotkeys_enabled: data.input.hotkeys_enabled,
            },
        }
    }
}

pub(crate) fn load_settings(path: &Path) -> Result<Settings, DataLoadError> {
    let data: SettingsData = deserialize_file(path)?;
    Ok(data.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SettingsData;

    #[test]
    fn default_data_matches_default_configs() {
        assert_eq!(Settings::from(SettingsData::default()), Settings::default());
    }
}
