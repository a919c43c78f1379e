use std::{fmt, io};

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use serde_yaml::Error as YamlError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum WaymarkError {
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Diagram render error: {0}")]
    Render(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<io::Error> for WaymarkError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => WaymarkError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => WaymarkError::PermissionDenied,
            _ => WaymarkError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for WaymarkError {
    fn from(x: fmt::Error) -> Self {
        WaymarkError::Codec(format!("{x}"))
    }
}

impl From<JsonError> for WaymarkError {
    fn from(src: JsonError) -> Self {
        WaymarkError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<YamlError> for WaymarkError {
    fn from(src: YamlError) -> Self {
        WaymarkError::Serialization(format!("YAML (de)serialization error: {src}"))
    }
}

impl From<toml::de::Error> for WaymarkError {
    fn from(src: toml::de::Error) -> Self {
        WaymarkError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<RegexError> for WaymarkError {
    fn from(x: RegexError) -> Self {
        WaymarkError::Serialization(format!("Regex parse failed: {x}"))
    }
}

impl From<JoinError> for WaymarkError {
    fn from(x: JoinError) -> Self {
        WaymarkError::Io(format!("Fetch worker task failed to join: {x}"))
    }
}
