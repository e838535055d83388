mod error;

pub mod catalog;
pub mod result;
pub mod settings;
pub mod text;

pub use catalog::{Language, LanguageCatalog};
pub use error::ConfigError;
pub use result::{Identification, LanguageResult, UNDETERMINED};
pub use settings::Settings;
