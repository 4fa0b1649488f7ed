//! Vault protocol message types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use vault_core::{GeneratorOptions, NewCredential};

/// A request, tagged by its `type` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    GetStatus,
    Unlock {
        password: String,
    },
    Lock,
    GetCredentials,
    AddCredential(NewCredential),
    DeleteCredential {
        id: Uuid,
    },
    GeneratePassword(GeneratorOptions),
    SearchCredentials {
        query: String,
    },
    ChangePassword {
        #[serde(rename = "currentPassword")]
        current_password: String,
        #[serde(rename = "newPassword")]
        new_password: String,
    },
}

impl Request {
    /// Every accepted `type` value
    pub const TYPES: &'static [&'static str] = &[
        "getStatus",
        "unlock",
        "lock",
        "getCredentials",
        "addCredential",
        "deleteCredential",
        "generatePassword",
        "searchCredentials",
        "changePassword",
    ];

    /// Check if `name` is an accepted request type
    pub fn is_known_type(name: &str) -> bool {
        Self::TYPES.contains(&name)
    }
}

/// Wire error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    AuthError,
    LockedError,
    StorageError,
    ConfigError,
    UnknownRequest,
    InvalidRequest,
    InternalError,
}

/// Error payload of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// `{"success": true, ...payload}` or `{"success": false, "error": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    /// Successful response with no payload
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            payload: Map::new(),
        }
    }

    /// Successful response whose payload fields come from `payload`
    ///
    /// Non-object values are placed under `"result"`.
    pub fn with_payload(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };

        Self {
            success: true,
            error: None,
            payload,
        }
    }

    /// Failed response
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(ErrorBody {
                code,
                message: message.into(),
            }),
            payload: Map::new(),
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}
