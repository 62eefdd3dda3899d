//! API client for communicating with a Depot server.
//!
//! This module provides the `ApiClient` struct for account registration,
//! login, and the three authenticated file operations: upload, list,
//! and download.

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use crate::auth::SessionData;
use crate::models::FileRecord;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows whole-file transfers on slow links while failing fast enough
/// for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Multipart field name the upload endpoint expects the file under
const UPLOAD_FIELD_NAME: &str = "file";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// API client for a Depot server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given server base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    /// This is more efficient than creating a new client for each request.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// Register a new account. Registration does not log the user in;
    /// a separate authenticate call issues the token.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/register/", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("username", username), ("password", password)])
            .send()
            .await
            .context("Failed to send registration request")?;

        Self::check_response(response).await?;
        debug!(username, "Account registered");
        Ok(())
    }

    /// Authenticate and return session data carrying the issued token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionData> {
        let url = format!("{}/token/", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .context("Failed to send authentication request")?;

        let response = Self::check_response(response).await?;

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        Ok(SessionData {
            token: token.access_token,
            username: username.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Build the Authorization header for the current token.
    /// With no token stored the request is still sent bare; rejecting it
    /// is the server's call.
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    // ===== File Operations =====

    /// Fetch the full list of stored files.
    /// The server's response order is the display order.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let url = format!("{}/files/", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .context("Failed to fetch file list")?;

        let response = Self::check_response(response).await?;

        let files: Vec<FileRecord> = response
            .json()
            .await
            .context("Failed to parse file list response")?;

        debug!(count = files.len(), "File list fetched");
        Ok(files)
    }

    /// Upload one file as a single multipart request.
    /// The whole payload goes up in one request body; there is no chunking
    /// and no resume.
    pub async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        let url = format!("{}/upload/", self.base_url);
        let size = bytes.len();

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;

        Self::check_response(response).await?;

        debug!(filename, size, "File uploaded");
        Ok(())
    }

    /// Download one file's raw content
    pub async fn download_file(&self, file_id: i64) -> Result<Vec<u8>> {
        let url = format!("{}/download/{}", self.base_url, file_id);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send download request for file {}", file_id))?;

        let response = Self::check_response(response).await?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read download body")?;

        debug!(file_id, size = bytes.len(), "File downloaded");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{"access_token": "3f7a9c", "token_type": "bearer"}"#;
        let parsed: TokenResponse = serde_json::from_str(json)
            .expect("Failed to parse token test JSON");
        assert_eq!(parsed.access_token, "3f7a9c");
    }

    #[test]
    fn test_parse_file_list_preserves_order() {
        let json = r#"[
            {"id": 1, "filename": "a.txt", "content_type": "text/plain"},
            {"id": 2, "filename": "b.txt"}
        ]"#;
        let files: Vec<FileRecord> = serde_json::from_str(json)
            .expect("Failed to parse file list test JSON");

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, 1);
        assert_eq!(files[0].filename, "a.txt");
        assert_eq!(files[1].id, 2);
        assert!(files[1].content_type.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://localhost:8000/").expect("client");
        assert_eq!(client.base_url, "http://localhost:8000");

        let client = ApiClient::new("http://localhost:8000").expect("client");
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_with_token_carries_token() {
        let client = ApiClient::new("http://localhost:8000").expect("client");
        assert!(client.token.is_none());

        let authed = client.with_token("tok".to_string());
        assert_eq!(authed.token.as_deref(), Some("tok"));
        // The original client is untouched
        assert!(client.token.is_none());
    }
}
