use reqwest::{redirect, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::identity::UserSession;
use crate::settings::SettingsRecord;
use crate::web::api::error::ErrorResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{path} answered {status}: {message}")]
    Status {
        path: String,
        status: StatusCode,
        message: String,
    },
}

/// Talks to the pass-board backend over HTTP.
///
/// Keeps a cookie jar so every call after the first lands in the same
/// browser session. Redirects are not followed: `/auth` and `/api/logout`
/// answer with one once they are done.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_settings(&self) -> Result<SettingsRecord, ClientError> {
        self.get_json("/api/settings").await
    }

    pub async fn fetch_session(&self) -> Result<Option<UserSession>, ClientError> {
        self.get_json("/api/session").await
    }

    /// The prediction payload is passed through untouched.
    pub async fn fetch_pass_data(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json("/api/passData").await
    }

    /// Sends the whole record to `path` and returns the server's message.
    pub async fn post_settings(
        &self,
        path: &str,
        record: &SettingsRecord,
    ) -> Result<String, ClientError> {
        let resp = self
            .request(Method::POST, path)
            .json(record)
            .send()
            .await?;
        let resp = check_response(path, resp).await?;
        Ok(resp.json().await?)
    }

    /// Completes the identity provider's callback with `token` and returns
    /// the identity now bound to this client's session.
    pub async fn authenticate(&self, token: &str) -> Result<Option<UserSession>, ClientError> {
        let resp = self
            .request(Method::GET, "/auth")
            .query(&[("token", token)])
            .send()
            .await?;
        check_response("/auth", resp).await?;
        self.fetch_session().await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let resp = self.request(Method::GET, "/api/logout").send().await?;
        check_response("/api/logout", resp).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.request(Method::GET, path).send().await?;
        let resp = check_response(path, resp).await?;
        Ok(resp.json().await?)
    }
}

async fn check_response(
    path: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() || status.is_redirection() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_else(|e| {
        log::warn!("Failed to read error body from {}: {}", path, e);
        String::new()
    });
    let message = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => body.user_message(),
        Err(_) => text,
    };

    Err(ClientError::Status {
        path: path.to_string(),
        status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/save_to_session")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":"unknown_satellite","message":"NORAD ID: 7 caused an error, settings not saved."}"#,
            )
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url()).unwrap();
        let err = backend
            .post_settings("/api/save_to_session", &SettingsRecord::default())
            .await
            .unwrap_err();
        match err {
            ClientError::Status {
                status, message, ..
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "NORAD ID: 7 caused an error, settings not saved.");
            }
            other => panic!("unexpected error: {other}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_text_error_is_kept() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/passData")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url()).unwrap();
        let err = backend.fetch_pass_data().await.unwrap_err();
        assert!(err.to_string().ends_with("bad gateway"));
    }

    #[tokio::test]
    async fn anonymous_session_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/session")
            .with_header("content-type", "application/json")
            .with_body("null")
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/", server.url())).unwrap();
        assert_eq!(backend.fetch_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn authenticate_sends_token_and_reads_session() {
        let mut server = mockito::Server::new_async().await;
        let auth = server
            .mock("GET", "/auth")
            .match_query(mockito::Matcher::UrlEncoded("token".into(), "t 1".into()))
            .with_status(303)
            .with_header("location", "/SettingsPage")
            .create_async()
            .await;
        let session = server
            .mock("GET", "/api/session")
            .with_header("content-type", "application/json")
            .with_body(r#"{"email":"ops@example.com"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url()).unwrap();
        let user = backend.authenticate("t 1").await.unwrap();
        assert_eq!(user.unwrap().email, "ops@example.com");
        auth.assert_async().await;
        session.assert_async().await;
    }
}
