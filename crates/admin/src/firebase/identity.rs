//! Identity toolkit REST client for admin sign-in and password rotation.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::{body_text, http_client, send, truncate_body};
use crate::config::FirebaseConfig;
use crate::identity::{IdentityError, IdentityProvider, IdentitySession};

/// Identity toolkit base URL.
const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordRequest<'a> {
    id_token: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Client for the identity toolkit REST API.
#[derive(Clone)]
pub struct IdentityToolkit {
    inner: Arc<IdentityToolkitInner>,
}

struct IdentityToolkitInner {
    client: reqwest::Client,
    api_key: SecretString,
}

impl IdentityToolkit {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, IdentityError> {
        Ok(Self {
            inner: Arc::new(IdentityToolkitInner {
                client: http_client()?,
                api_key: config.api_key.clone(),
            }),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{BASE_URL}/accounts:{method}?key={}",
            urlencoding::encode(self.inner.api_key.expose_secret())
        )
    }

    /// POST a JSON body to an `accounts:*` method.
    async fn call<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<String, IdentityError> {
        let response = send(self.inner.client.post(self.endpoint(method)).json(body)).await?;
        let status = response.status().as_u16();
        let text = body_text(response).await?;
        if (200..300).contains(&status) {
            return Ok(text);
        }

        // Error bodies look like {"error": {"code": 400, "message": "INVALID_PASSWORD"}}
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(String::from)
            })
            .unwrap_or_else(|| truncate_body(&text));
        Err(classify_error(status, &message))
    }
}

/// Map a provider error message to an `IdentityError`.
fn classify_error(status: u16, message: &str) -> IdentityError {
    // Messages may carry detail after the code: "WEAK_PASSWORD : Password should be ..."
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "USER_DISABLED"
        | "INVALID_EMAIL" => IdentityError::InvalidCredentials,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(message.to_string()),
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "USER_NOT_FOUND" => {
            IdentityError::SessionExpired
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::TooManyAttempts,
        _ => IdentityError::Api {
            status,
            message: message.to_string(),
        },
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkit {
    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentitySession, IdentityError> {
        let body = self
            .call(
                "signInWithPassword",
                &SignInRequest {
                    email,
                    password: password.expose_secret(),
                    return_secure_token: true,
                },
            )
            .await?;
        let response: SignInResponse = serde_json::from_str(&body)
            .map_err(|e| IdentityError::Parse(format!("Failed to parse sign-in response: {e}")))?;

        Ok(IdentitySession {
            uid: response.local_id,
            email: response.email,
            id_token: SecretString::from(response.id_token),
        })
    }

    #[instrument(skip(self, session, new_password), fields(uid = %session.uid))]
    async fn update_password(
        &self,
        session: &IdentitySession,
        new_password: &SecretString,
    ) -> Result<(), IdentityError> {
        self.call(
            "update",
            &UpdatePasswordRequest {
                id_token: session.id_token.expose_secret(),
                password: new_password.expose_secret(),
                return_secure_token: true,
            },
        )
        .await?;
        Ok(())
    }
}

impl std::fmt::Debug for IdentityToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkit").finish_non_exhaustive()
    }
}
