//! Vault request router

use serde_json::{json, Value};
use tracing::{debug, error, warn};
use vault_core::{generator, VaultError, VaultSession};

use super::types::*;

/// Dispatches requests to a vault session and the password generator
#[derive(Clone)]
pub struct RequestRouter {
    session: VaultSession,
}

impl RequestRouter {
    /// Create a new router over `session`
    pub fn new(session: VaultSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &VaultSession {
        &self.session
    }

    /// Handle one raw request line
    pub async fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Response::error(ErrorCode::InvalidRequest, format!("Malformed JSON: {}", e))
            }
        }
    }

    /// Handle one request document
    ///
    /// Unknown request types are rejected without touching the session.
    /// Any accepted request re-arms the auto-lock timer when the vault is
    /// unlocked, whatever the outcome of the dispatch.
    pub async fn handle_value(&self, value: Value) -> Response {
        let request_type = match value.get("type").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => {
                return Response::error(
                    ErrorCode::InvalidRequest,
                    "Request is missing a string \"type\" field",
                )
            }
        };

        if !Request::is_known_type(&request_type) {
            debug!("Unknown request type: {}", request_type);
            return Response::error(
                ErrorCode::UnknownRequest,
                format!("Unknown request type: {}", request_type),
            );
        }

        self.session.touch().await;

        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Response::error(
                    ErrorCode::InvalidRequest,
                    format!("Invalid {} request: {}", request_type, e),
                )
            }
        };

        debug!("Handling request: {}", request_type);
        self.handle(request).await
    }

    /// Handle a typed request
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                let code = error_code(&e);
                if code == ErrorCode::InternalError {
                    error!("Request failed: {}", e);
                }
                Response::error(code, e.to_string())
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response, VaultError> {
        match request {
            Request::GetStatus => {
                let unlocked = self.session.is_unlocked().await;
                Ok(Response::with_payload(json!({ "unlocked": unlocked })))
            }
            Request::Unlock { password } => {
                self.session.unlock_or_create(&password).await?;
                Ok(Response::ok())
            }
            Request::Lock => {
                self.session.lock().await;
                Ok(Response::ok())
            }
            Request::GetCredentials => {
                let credentials = self.session.list_credentials().await?;
                Ok(Response::with_payload(json!({ "credentials": credentials })))
            }
            Request::AddCredential(fields) => {
                let credential = self.session.add_credential(fields).await?;
                Ok(Response::with_payload(json!({ "credential": credential })))
            }
            Request::DeleteCredential { id } => {
                self.session.delete_credential(id).await?;
                Ok(Response::ok())
            }
            Request::GeneratePassword(options) => {
                let password = generator::generate(&options)?;
                Ok(Response::with_payload(json!({ "password": password })))
            }
            Request::SearchCredentials { query } => {
                let credentials = self.session.search_credentials(&query).await?;
                Ok(Response::with_payload(json!({ "credentials": credentials })))
            }
            Request::ChangePassword {
                current_password,
                new_password,
            } => {
                self.session
                    .change_password(&current_password, &new_password)
                    .await?;
                Ok(Response::ok())
            }
        }
    }
}

/// Map a vault error onto its wire code
pub(crate) fn error_code(error: &VaultError) -> ErrorCode {
    match error {
        VaultError::InvalidPassword | VaultError::DecryptionError => ErrorCode::AuthError,
        VaultError::VaultLocked => ErrorCode::LockedError,
        VaultError::StorageError(_) | VaultError::IoError(_) | VaultError::CorruptRecord(_) => {
            ErrorCode::StorageError
        }
        VaultError::InvalidOptions(_) => ErrorCode::ConfigError,
        VaultError::EncryptionError(_)
        | VaultError::KeyDerivationError(_)
        | VaultError::SerializationError(_)
        | VaultError::Internal(_) => ErrorCode::InternalError,
    }
}
