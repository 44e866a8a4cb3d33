//! GraphQL-over-HTTP data source.
//!
//! POSTs `{operationName, query, variables}` to a single endpoint and maps
//! the outcome onto [`DataError`]:
//!
//! - 401/403 → `Unauthorized`, 429 → `RateLimited`, other non-2xx → `Server`
//! - a 2xx body with an `errors` array → `Unauthorized` for auth failures,
//!   `Server` otherwise
//! - a body that isn't `{data: ...}` → `Parse`

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use super::{Credential, DataError, DataSource, GqlRequest};

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// GraphQL response envelope.
#[derive(Deserialize, Debug)]
struct GqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Deserialize, Debug)]
struct GqlError {
    message: String,
    #[serde(default)]
    extensions: Option<GqlErrorExtensions>,
}

#[derive(Deserialize, Debug)]
struct GqlErrorExtensions {
    #[serde(default)]
    code: Option<String>,
}

impl GqlError {
    fn is_auth(&self) -> bool {
        let code = self
            .extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .unwrap_or_default();
        let message = self.message.to_lowercase();
        code == "invalid-jwt"
            || code == "access-denied"
            || message.contains("jwt")
            || message.contains("unauthorized")
    }
}

pub struct GraphqlClient {
    endpoint: String,
    client: reqwest::Client,
}

impl GraphqlClient {
    /// `transport_timeout` caps the HTTP exchange itself; commands still apply
    /// their own (usually shorter) budget on top.
    pub fn new(endpoint: impl Into<String>, transport_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(transport_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DataSource for GraphqlClient {
    fn name(&self) -> &str {
        "graphql"
    }

    async fn query(
        &self,
        credential: &Credential,
        request: &GqlRequest,
    ) -> Result<Value, DataError> {
        info!("GraphQL {} -> {}", request.operation, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", credential.header_value())
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DataError::Timeout
                } else {
                    DataError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        debug!("GraphQL {} response status: {}", request.operation, status);

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("GraphQL {} failed: {} - {}", request.operation, status, body);
            return Err(match status {
                401 | 403 => DataError::Unauthorized(body),
                429 => DataError::RateLimited,
                _ => DataError::Server {
                    status,
                    message: body,
                },
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                DataError::Timeout
            } else {
                DataError::Network(e.to_string())
            }
        })?;
        let envelope: GqlResponse =
            serde_json::from_str(&body).map_err(|e| DataError::Parse(e.to_string()))?;

        if let Some(first) = envelope.errors.first() {
            warn!("GraphQL {} returned errors: {}", request.operation, first.message);
            return Err(if first.is_auth() {
                DataError::Unauthorized(first.message.clone())
            } else {
                DataError::Server {
                    status,
                    message: first.message.clone(),
                }
            });
        }

        envelope
            .data
            .ok_or_else(|| DataError::Parse("response has no data".to_string()))
    }
}
