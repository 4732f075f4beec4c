//! The API client.
//!
//! [`Client`] owns the configuration and both transports. Operations are
//! grouped into services: [`Client::messages`] and [`Client::inbox`].

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::adapters::{EventSourceClient, ReqwestHttpClient};
use crate::config::ClientConfig;
use crate::endpoint;
use crate::error::{FlowdockResult, NetworkError, RequestError};
use crate::inbox::InboxService;
use crate::messages::MessagesService;
use crate::traits::{EventSource, HttpClient, HttpError, Method, Request, Response};

/// Flowdock API client.
///
/// Cheap to clone; clones share transports.
///
/// # Example
///
/// ```ignore
/// use flowdock::{Client, ClientConfig, ListOptions};
///
/// let client = Client::new(ClientConfig::new().with_token("personal-api-token"))?;
/// let recent = client
///     .messages()
///     .list("acme", "main", &ListOptions { limit: 10, ..Default::default() })
///     .await?;
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    api_url: Url,
    stream_url: Url,
    authorization: Option<String>,
    http: Arc<dyn HttpClient>,
    events: Arc<dyn EventSource>,
}

impl Client {
    /// Create a client with the reqwest and eventsource-client transports.
    pub fn new(config: ClientConfig) -> FlowdockResult<Self> {
        let http = ReqwestHttpClient::with_settings(config.timeout, &config.user_agent)
            .map_err(|e| NetworkError::Other {
                message: e.to_string(),
            })?;
        let events = EventSourceClient::new()
            .with_retry_interval(config.retry_interval)
            .with_max_reconnect_attempts(config.max_reconnect_attempts)
            .with_user_agent(config.user_agent.clone());

        Self::with_transports(config, Arc::new(http), Arc::new(events))
    }

    /// Create a client over the given transports.
    pub fn with_transports(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        events: Arc<dyn EventSource>,
    ) -> FlowdockResult<Self> {
        let api_url = endpoint::parse_base_url(&config.api_url)?;
        let stream_url = endpoint::parse_base_url(&config.stream_url)?;
        let authorization = config
            .token
            .as_deref()
            .map(basic_authorization)
            .transpose()?;

        debug!(
            api_url = %api_url,
            stream_url = %stream_url,
            authenticated = authorization.is_some(),
            "Client created"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                api_url,
                stream_url,
                authorization,
                http,
                events,
            }),
        })
    }

    /// Message operations.
    pub fn messages(&self) -> MessagesService<'_> {
        MessagesService::new(self)
    }

    /// Team inbox operations.
    pub fn inbox(&self) -> InboxService<'_> {
        InboxService::new(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn stream_url(&self) -> &Url {
        &self.inner.stream_url
    }

    pub(crate) fn event_source(&self) -> &dyn EventSource {
        self.inner.events.as_ref()
    }

    /// Start a request to `path` under the API base URL.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<Request, RequestError> {
        let url = endpoint::join(&self.inner.api_url, path)?;
        let mut request = Request::new(method, url.as_str()).header("Accept", "application/json");
        if let Some(ref authorization) = self.inner.authorization {
            request = request.header("Authorization", authorization.clone());
        }
        Ok(request)
    }

    /// Send a request, turning transport failures and non-2xx statuses into
    /// errors. `route` is what gets logged in place of the URL.
    pub(crate) async fn execute(
        &self,
        request: Request,
        route: &str,
    ) -> Result<Response, NetworkError> {
        let method = request.method;
        debug!(%method, route, "Sending request");

        let response = self
            .inner
            .http
            .send(request)
            .await
            .map_err(|e| transport_error(e, method, route))?;

        if !response.is_success() {
            let body = response.text();
            warn!(%method, route, status = response.status, body = %body, "API request failed");
            return Err(NetworkError::HttpStatus {
                status: response.status,
                body,
            });
        }

        debug!(%method, route, status = response.status, "Request completed");
        Ok(response)
    }

    /// Send a request and decode the JSON response body.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: Request,
        route: &str,
    ) -> Result<T, NetworkError> {
        let response = self.execute(request, route).await?;
        response.json().map_err(|e| NetworkError::InvalidResponse {
            message: e.to_string(),
        })
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn execute_ack(&self, request: Request, route: &str) -> Result<(), NetworkError> {
        self.execute(request, route).await.map(|_| ())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.inner.api_url.as_str())
            .field("stream_url", &self.inner.stream_url.as_str())
            .field("authenticated", &self.inner.authorization.is_some())
            .finish()
    }
}

/// `Basic base64(token:)`
fn basic_authorization(token: &str) -> Result<String, RequestError> {
    if token.is_empty() || token.contains(':') || token.chars().any(char::is_control) {
        return Err(RequestError::InvalidToken);
    }
    Ok(format!("Basic {}", STANDARD.encode(format!("{}:", token))))
}

fn transport_error(err: HttpError, method: Method, route: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: route.to_string(),
            message,
        },
        HttpError::Timeout(_) => NetworkError::Timeout {
            operation: format!("{} {}", method, route),
        },
        other => NetworkError::Other {
            message: other.to_string(),
        },
    }
}
