pub mod http;
pub mod settings;
pub mod text_processing;

pub use settings::{AtlasSettings, SettingsError, TtlOverrides};
pub use text_processing::*;
