//! Loading pipeline: reads data files, checks references, builds the catalog
//! and the bench grid.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus [`load_workshop`] which ties them together.

use machinery_core::catalog::{Catalog, CatalogBuilder, CatalogError};
use machinery_spatial::{CellArchetype, CellGrid, GridError, Placeability};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::schema::{ComponentData, LayoutData};
use crate::settings::{Settings, load_settings};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The layout file describes an impossible grid.
    #[error("bad layout in {file}: {detail}")]
    Layout { file: PathBuf, detail: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Grid(#[from] GridError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan `dir` for `{base_name}.ron`, `{base_name}.toml` and
/// `{base_name}.json`.
///
/// Returns `Ok(None)` if none exists, or `Err(ConflictingFormats)` if more
/// than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so for TOML files the
/// list is read from the array at `toml_key`; RON and JSON hold `Vec<T>`
/// directly.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Catalog
// ===========================================================================

/// Build a catalog from component records, reporting file-level problems
/// (duplicate names, dangling port links) before the builder validates
/// shapes.
pub fn build_catalog(components: &[ComponentData], file: &Path) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    for data in components {
        if builder.id(&data.name).is_some() {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: data.name.clone(),
            });
        }
        for link in &data.port_links {
            let refs = std::iter::once(&link.input).chain(link.output.as_ref());
            for port in refs {
                if !data.ports.iter().any(|p| &p.id == port) {
                    return Err(DataLoadError::UnresolvedRef {
                        file: file.to_path_buf(),
                        name: format!("{}.{port}", data.name),
                        expected_kind: "port",
                    });
                }
            }
        }
        builder.register(data.to_def())?;
    }
    Ok(builder.build()?)
}

// ===========================================================================
// Layout
// ===========================================================================

fn archetype_for_char(ch: char) -> Option<CellArchetype> {
    match ch {
        '.' => Some(CellArchetype::Normal),
        'c' => Some(CellArchetype::Connector),
        'd' => Some(CellArchetype::Display),
        '#' => Some(CellArchetype::Blocked),
        _ => None,
    }
}

/// Build the bench grid from a layout record.
pub fn build_grid(layout: &LayoutData, file: &Path) -> Result<CellGrid, DataLoadError> {
    let bad = |detail: String| DataLoadError::Layout {
        file: file.to_path_buf(),
        detail,
    };
    let (width, height) = (layout.width, layout.height);

    let placeability: Vec<Placeability> = match (layout.rows.is_empty(), layout.cells.is_empty()) {
        (false, true) => {
            if layout.rows.len() != height as usize {
                return Err(bad(format!(
                    "{} rows, expected {height}",
                    layout.rows.len()
                )));
            }
            // Rows are listed top-down; cell storage starts at y = 0.
            let mut out = Vec::with_capacity(width as usize * height as usize);
            for (i, row) in layout.rows.iter().enumerate().rev() {
                let chars: Vec<char> = row.chars().collect();
                if chars.len() != width as usize {
                    return Err(bad(format!(
                        "row {i} has {} cells, expected {width}",
                        chars.len()
                    )));
                }
                for ch in chars {
                    let archetype = archetype_for_char(ch)
                        .ok_or_else(|| bad(format!("unknown cell '{ch}' in row {i}")))?;
                    out.push(archetype.placeability());
                }
            }
            out
        }
        (true, false) => layout
            .cells
            .iter()
            .map(|name| CellArchetype::from_name(name).placeability())
            .collect(),
        (true, true) => return Err(bad("neither rows nor cells given".to_string())),
        (false, false) => return Err(bad("both rows and cells given".to_string())),
    };

    Ok(CellGrid::new(width, height, placeability)?)
}

// ===========================================================================
// Workshop
// ===========================================================================

/// Everything a workbench session needs at startup.
#[derive(Debug)]
pub struct WorkshopData {
    pub catalog: Catalog,
    pub grid: CellGrid,
    pub settings: Settings,
}

/// Load `components` and `layout` (required) and `settings` (optional) from
/// `dir`.
pub fn load_workshop(dir: &Path) -> Result<WorkshopData, DataLoadError> {
    let components_path = require_data_file(dir, "components")?;
    let components: Vec<ComponentData> = deserialize_list(&components_path, "components")?;
    let catalog = build_catalog(&components, &components_path)?;

    let layout_path = require_data_file(dir, "layout")?;
    let layout: LayoutData = deserialize_file(&layout_path)?;
    let grid = build_grid(&layout, &layout_path)?;

    let settings = match find_data_file(dir, "settings")? {
        Some(path) => load_settings(&path)?,
        None => Settings::default(),
    };

    debug!(
        components = catalog.len(),
        width = grid.width(),
        height = grid.height(),
        "workshop loaded"
    );
    Ok(WorkshopData {
        catalog,
        grid,
        settings,
    })
}
