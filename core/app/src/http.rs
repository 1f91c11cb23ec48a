//! HTTP-backed entity API client.

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use careledger_common::{Error, PullToken, Result};
use careledger_storage::SyncPayload;
use careledger_sync::{EntityApi, PullResponse};

/// Connection settings shared by every entity endpoint: one HTTP client,
/// one base URL, one access token.
#[derive(Clone)]
pub struct ApiConnection {
    http: Client,
    base_url: String,
    access_token: String,
}

impl ApiConnection {
    /// Create a connection against the sync server.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent("CareLedger/0.1")
            .build()
            .expect("Failed to create HTTP client");

        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Build the API client for one entity endpoint.
    pub fn entity_api<P>(&self, entity: &'static str) -> HttpEntityApi<P> {
        HttpEntityApi {
            connection: self.clone(),
            entity,
            _payload: PhantomData,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Push body: the server expects the batch wrapped in a `payloads` field.
#[derive(Serialize)]
struct PushRequest<P> {
    payloads: Vec<P>,
}

/// Pull response as sent by the server.
#[derive(Deserialize)]
struct PullWire<P> {
    payloads: Vec<P>,
    process_token: String,
}

/// [`EntityApi`] over HTTP for one entity endpoint.
///
/// Routes follow the generic shape `{base}/{entity}/sync`: push is a POST
/// of the payload batch, pull is a GET with `batch_size` and the last
/// `process_token` as query parameters.
pub struct HttpEntityApi<P> {
    connection: ApiConnection,
    entity: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P> HttpEntityApi<P> {
    fn url(&self) -> String {
        format!("{}/{}/sync", self.connection.base_url, self.entity)
    }

    async fn check_status(response: Response) -> Result<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthenticated(
                format!("Server rejected the session ({})", response.status()),
            )),
            status => Err(Error::Server(format!(
                "Unexpected status {} from sync endpoint",
                status
            ))),
        }
    }
}

#[async_trait]
impl<P> EntityApi for HttpEntityApi<P>
where
    P: SyncPayload + Serialize + DeserializeOwned,
{
    type Payload = P;

    async fn push(&self, payloads: Vec<P>) -> Result<()> {
        let response = self
            .connection
            .http
            .post(self.url())
            .header(header::AUTHORIZATION, self.connection.auth_header())
            .json(&PushRequest { payloads })
            .send()
            .await
            .map_err(|e| Error::Network(format!("Push failed: {}", e)))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn pull(
        &self,
        batch_size: usize,
        token: Option<&PullToken>,
    ) -> Result<PullResponse<P>> {
        let mut request = self
            .connection
            .http
            .get(self.url())
            .header(header::AUTHORIZATION, self.connection.auth_header())
            .query(&[("batch_size", batch_size.to_string())]);

        if let Some(token) = token {
            request = request.query(&[("process_token", token.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("Pull failed: {}", e)))?;
        let response = Self::check_status(response).await?;

        let wire: PullWire<P> = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Invalid pull response: {}", e)))?;

        Ok(PullResponse {
            payloads: wire.payloads,
            process_token: PullToken::new(wire.process_token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careledger_records::FacilityPayload;

    #[test]
    fn test_entity_routes() {
        let connection = ApiConnection::new("https://sync.careledger.example/v1/", "token");
        let api = connection.entity_api::<FacilityPayload>("facilities");
        assert_eq!(
            api.url(),
            "https://sync.careledger.example/v1/facilities/sync"
        );
    }
}
