pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{DataLoadError, WorkshopData, load_workshop};
pub use settings::Settings;
