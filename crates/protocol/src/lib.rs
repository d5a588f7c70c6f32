use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{EmbeddingMode, GenerationMode, RagConfig, CONFIG_FILE_NAME, ENV_PREFIX};

pub const RESPONSE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// JSON body printed by every `--json` command
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommandResponse {
    pub schema_version: u32,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

impl CommandResponse {
    pub fn ok<T: Serialize>(data: &T) -> serde_json::Result<Self> {
        Ok(Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: ResponseStatus::Ok,
            data: Some(serde_json::to_value(data)?),
            error: None,
        })
    }

    #[must_use]
    pub fn error(error: ErrorEnvelope) -> Self {
        Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: ResponseStatus::Error,
            data: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }
}
