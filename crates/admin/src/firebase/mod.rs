//! REST clients for the hosted backend.
//!
//! - [`RealtimeDatabase`] implements [`DocumentStore`](crate::db::DocumentStore)
//!   over `{url}/{path}.json?auth={secret}`
//! - [`CloudStorage`] implements [`BlobStore`](crate::blob::BlobStore)
//!   over `/v0/b/{bucket}/o`
//! - [`IdentityToolkit`] implements [`IdentityProvider`](crate::identity::IdentityProvider)
//!   over `accounts:signInWithPassword` and `accounts:update`
//!
//! Each client wraps a shared `reqwest::Client` in an `Arc` so clones are cheap.

mod database;
mod identity;
mod storage;

pub use database::RealtimeDatabase;
pub use identity::IdentityToolkit;
pub use storage::CloudStorage;

use std::time::Duration;

/// Timeout applied to every hosted-service request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by the hosted-service clients.
fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("taskmaster-admin/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a request, stripping the URL from any error.
///
/// Request URLs carry credentials in the query string, and `reqwest`
/// includes the URL in its error messages.
async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, reqwest::Error> {
    request.send().await.map_err(reqwest::Error::without_url)
}

/// Read a response body as text, stripping the URL from any error.
async fn body_text(response: reqwest::Response) -> Result<String, reqwest::Error> {
    response.text().await.map_err(reqwest::Error::without_url)
}

/// Truncate a response body for logging and error messages.
fn truncate_body(body: &str) -> String {
    body.chars().take(200).collect()
}
