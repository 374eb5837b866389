//! Error types for definition document loading.

use defreg_kernel::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported definition file format: {path} (expected .json or .toml)")]
    UnsupportedFormat { path: String },

    #[error("definition document root must be a table or an array")]
    InvalidRoot,

    #[error("invalid entry `{name}`: {message}")]
    InvalidEntry { name: String, message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
