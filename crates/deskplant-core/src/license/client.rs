//! Remote license endpoints.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::response::{ActivationResponse, ValidationResponse};
use crate::error::LicenseError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The activation/validation collaborator. Transport failures map to
/// [`LicenseError::NetworkUnavailable`], [`LicenseError::ServerError`], or
/// [`LicenseError::InvalidServerResponse`]; the server's verdict is returned
/// as-is for the gate to judge.
#[async_trait]
pub trait LicenseClient: Send + Sync {
    async fn activate(
        &self,
        license_key: &str,
        instance_name: &str,
    ) -> Result<ActivationResponse, LicenseError>;

    async fn validate(&self, license_key: &str) -> Result<ValidationResponse, LicenseError>;
}

/// HTTP client for the Lemon Squeezy license API.
pub struct LemonSqueezyClient {
    http_client: Client,
    base_url: String,
}

impl LemonSqueezyClient {
    pub fn new(base_url: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<T, LicenseError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, "license request");

        let resp = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "license request failed"))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(LicenseError::ServerError(status.as_u16()));
        }

        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl LicenseClient for LemonSqueezyClient {
    async fn activate(
        &self,
        license_key: &str,
        instance_name: &str,
    ) -> Result<ActivationResponse, LicenseError> {
        self.post_form(
            "activate",
            &[("license_key", license_key), ("instance_name", instance_name)],
        )
        .await
    }

    async fn validate(&self, license_key: &str) -> Result<ValidationResponse, LicenseError> {
        self.post_form("validate", &[("license_key", license_key)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const ACTIVATED: &str = r#"{
        "activated": true, "error": null,
        "license_key": {"id": 1, "status": "active", "key": "KEY-1"},
        "instance": {"id": "inst-9", "name": "deskplant-test"},
        "meta": {"store_id": 53624, "product_id": 720905, "customer_email": "ada@example.com"}
    }"#;

    #[tokio::test]
    async fn activate_posts_form_and_decodes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/licenses/activate")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("license_key".into(), "KEY-1".into()),
                Matcher::UrlEncoded("instance_name".into(), "deskplant-test".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ACTIVATED)
            .create_async()
            .await;

        let client = LemonSqueezyClient::new(&format!("{}/v1/licenses/", server.url()));
        let resp = client.activate("KEY-1", "deskplant-test").await.unwrap();
        assert!(resp.activated);
        assert_eq!(resp.instance.unwrap().id, "inst-9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_200_is_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/validate")
            .with_status(404)
            .with_body(r#"{"valid": false, "error": "license_key not found."}"#)
            .create_async()
            .await;

        let client = LemonSqueezyClient::new(&server.url());
        assert_eq!(
            client.validate("nope").await.unwrap_err(),
            LicenseError::ServerError(404)
        );
    }

    #[tokio::test]
    async fn undecodable_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/validate")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = LemonSqueezyClient::new(&server.url());
        assert_eq!(
            client.validate("KEY-1").await.unwrap_err(),
            LicenseError::InvalidServerResponse
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_network_unavailable() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let client = LemonSqueezyClient::new("http://127.0.0.1:9");
        assert_eq!(
            client.validate("KEY-1").await.unwrap_err(),
            LicenseError::NetworkUnavailable
        );
    }
}
