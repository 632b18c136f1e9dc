//! HTTP implementation of the storefront endpoints.

use reqwest::header::HeaderValue;
use reqwest::{Client, Url};
use rifa_core::environment::{AdminApi, ApiFuture, RaffleApi};
use rifa_core::error::ApiError;
use rifa_core::ticket::Ticket;
use rifa_core::wire::{self, SaleOutcome, StatusReport};
use std::time::Duration;

/// Header carrying the anti-forgery token
pub const CSRF_HEADER: &str = "X-CSRFToken";

const SEARCH_PATH: &str = "/buscar/";
const STATUS_PATH: &str = "/api/status/";

/// Storefront server client
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Client for the server at `base_url`
    ///
    /// Every request, body included, is abandoned after `timeout` and
    /// reported as [`ApiError::RequestFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] if the TLS backend cannot be
    /// initialized.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(format!("building HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Client reusing an existing `reqwest` client
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Server origin
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_success_body(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }

    async fn search_tickets(&self, query: String) -> Result<Vec<Ticket>, ApiError> {
        let url = self.endpoint(SEARCH_PATH)?;
        let request = self.client.get(url).query(&[("q", query.as_str())]);
        let body = self.get_success_body(request).await?;
        let tickets = wire::parse_search(&body)?;
        tracing::debug!(query = %query, results = tickets.len(), "Search answered");
        Ok(tickets)
    }

    async fn fetch_statuses(&self) -> Result<StatusReport, ApiError> {
        let url = self.endpoint(STATUS_PATH)?;
        let body = self.get_success_body(self.client.get(url)).await?;
        wire::parse_status(&body)
    }

    fn csrf_post(&self, action: &str, csrf_token: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.endpoint(action)?;
        let token = HeaderValue::from_str(csrf_token).map_err(|e| {
            ApiError::RequestFailed(format!("invalid anti-forgery token: {e}"))
        })?;
        Ok(self.client.post(url).header(CSRF_HEADER, token))
    }

    async fn post_sale(&self, action: String, csrf_token: String) -> Result<SaleOutcome, ApiError> {
        let response = self
            .csrf_post(&action, &csrf_token)?
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        // Failures still carry the structured body with the server's message
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        match wire::parse_sale(&body) {
            Ok(outcome) => Ok(outcome),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
            }),
            Err(error) => Err(error),
        }
    }

    async fn post_cancel(&self, action: String, csrf_token: String) -> Result<(), ApiError> {
        self.get_success_body(self.csrf_post(&action, &csrf_token)?)
            .await
            .map(|_| ())
    }
}

impl RaffleApi for HttpClient {
    fn search(&self, query: String) -> ApiFuture<'_, Vec<Ticket>> {
        Box::pin(self.search_tickets(query))
    }

    fn ticket_statuses(&self) -> ApiFuture<'_, StatusReport> {
        Box::pin(self.fetch_statuses())
    }
}

impl AdminApi for HttpClient {
    fn confirm_sale(&self, action: String, csrf_token: String) -> ApiFuture<'_, SaleOutcome> {
        Box::pin(self.post_sale(action, csrf_token))
    }

    fn cancel_reservation(&self, action: String, csrf_token: String) -> ApiFuture<'_, ()> {
        Box::pin(self.post_cancel(action, csrf_token))
    }
}
