pub mod config;
pub mod error;
pub mod policy;

pub use config::{generate_default_config, Config, DEFAULT_ARCHIVE_EXTENSIONS, DEFAULT_CATALOG_NAME};
pub use error::{ConfigError, Result};
pub use policy::ConflictPolicy;
