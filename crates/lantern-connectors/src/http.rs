//! The `http` connector: fetches the target over HTTP(S).
//!
//! The target document is fetched with redirect following, parsed and
//! traversed, then resources the DOM references (stylesheets, scripts, the
//! web app manifest) are fetched in document order. Per-resource failures
//! become `fetch::error` events; only an unreachable target fails the scan.

use crate::select::{query_snapshot, store_first, SnapshotSlot};
use async_trait::async_trait;
use lantern_core::{DomElement, Headers, MediaKind, NetworkData, Request, Response, ResponseBody};
use lantern_events::{Event, EventBus};
use lantern_parsers::{build_snapshot, emit_elements, SimpleSelector};
use lantern_resources::{
    Connector, ConnectorError, ConnectorFactory, ConnectorHost, ConnectorResult,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const CONNECTOR_NAME: &str = "http";

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("lantern/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Options accepted by the `http` connector.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpOptions {
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

struct HttpConnector {
    bus: EventBus,
    client: reqwest::Client,
    target_snapshot: SnapshotSlot,
}

impl HttpConnector {
    async fn fetch(&self, url: &Url, headers: Option<&Headers>) -> Result<NetworkData, String> {
        let mut request = self.client.get(url.clone());
        if let Some(headers) = headers {
            for (name, value) in headers.iter() {
                request = request.header(name, value);
            }
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                response_headers.insert(name.as_str(), value);
            }
        }

        let kind = response_headers
            .get("content-type")
            .map(MediaKind::from_content_type)
            .filter(|kind| *kind != MediaKind::Unknown)
            .unwrap_or_else(|| MediaKind::from_path(std::path::Path::new(url.path())));

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;

        Ok(NetworkData {
            resource: url.to_string(),
            request: Request::new(url.to_string()),
            response: Response {
                url: final_url,
                status,
                headers: response_headers,
                body: ResponseBody::from_bytes(&bytes),
                media_kind: kind,
            },
        })
    }

    /// URLs of sub-resources the document references, in document order.
    fn referenced_resources(
        document: &Arc<lantern_core::DomSnapshot>,
        base: &Url,
    ) -> Vec<(Url, MediaKind)> {
        let mut out = Vec::new();
        let mut push = |attr: Option<&str>, kind: MediaKind| {
            let Some(raw) = attr else { return };
            match base.join(raw) {
                Ok(url) => out.push((url, kind)),
                Err(e) => debug!(reference = raw, error = %e, "unresolvable resource URL"),
            }
        };

        for selector_and_kind in [
            ("link[rel=stylesheet]", "href", MediaKind::Css),
            ("script[src]", "src", MediaKind::Javascript),
            ("link[rel=manifest]", "href", MediaKind::Manifest),
        ] {
            let (selector, attr, kind) = selector_and_kind;
            let parsed = SimpleSelector::parse(selector).expect("valid built-in selector");
            for node in parsed.select(document) {
                push(document.attribute(node, attr), kind);
            }
        }

        out
    }

    async fn fetch_sub_resource(&self, url: &Url, expected: MediaKind) -> ConnectorResult<()> {
        self.bus
            .emit_awaited(Event::FetchStart {
                resource: url.to_string(),
            })
            .await?;

        match self.fetch(url, None).await {
            Ok(mut network) => {
                if network.response.media_kind == MediaKind::Unknown {
                    network.response.media_kind = expected;
                }
                self.bus
                    .emit_awaited(Event::FetchEnd {
                        network: Arc::new(network),
                    })
                    .await?;
            }
            Err(message) => {
                self.bus
                    .emit_awaited(Event::FetchError {
                        resource: url.to_string(),
                        error: message,
                    })
                    .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn collect(&self, target: Url) -> ConnectorResult<()> {
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ConnectorError::UnsupportedTarget {
                connector: CONNECTOR_NAME.to_string(),
                target: target.to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        self.bus
            .emit_awaited(Event::FetchStartTarget {
                resource: target.to_string(),
            })
            .await?;

        let network = self.fetch(&target, None).await.map_err(|message| {
            ConnectorError::TargetUnreachable {
                target: target.to_string(),
                message,
            }
        })?;

        let kind = network.response.media_kind;
        let body = network.response.body.content.clone();
        let base = Url::parse(&network.response.url).unwrap_or_else(|_| target.clone());

        self.bus
            .emit_awaited(Event::FetchEnd {
                network: Arc::new(network),
            })
            .await?;

        if kind == MediaKind::Html {
            let document = Arc::new(build_snapshot(target.as_str(), &body));
            store_first(&self.target_snapshot, &document);
            emit_elements(&self.bus, &document).await?;

            for (url, expected) in Self::referenced_resources(&document, &base) {
                self.fetch_sub_resource(&url, expected).await?;
            }
        }

        Ok(())
    }

    async fn fetch_content(
        &self,
        url: &Url,
        headers: Option<&Headers>,
    ) -> ConnectorResult<NetworkData> {
        self.fetch(url, headers)
            .await
            .map_err(|message| ConnectorError::Fetch {
                resource: url.to_string(),
                message,
            })
    }

    async fn evaluate(&self, _script: &str) -> ConnectorResult<serde_json::Value> {
        Err(ConnectorError::EvaluationUnsupported {
            connector: CONNECTOR_NAME.to_string(),
        })
    }

    fn query_selector_all(&self, selector: &str) -> Vec<DomElement> {
        query_snapshot(&self.target_snapshot, selector)
    }

    async fn close(&self) -> ConnectorResult<()> {
        // The client's pooled connections are released on drop
        Ok(())
    }
}

/// Factory for the `http` connector.
#[derive(Debug, Default)]
pub struct HttpConnectorFactory;

impl ConnectorFactory for HttpConnectorFactory {
    fn name(&self) -> &str {
        CONNECTOR_NAME
    }

    fn create(
        &self,
        host: ConnectorHost,
        options: &serde_json::Value,
    ) -> ConnectorResult<Arc<dyn Connector>> {
        let options: HttpOptions = if options.is_null() {
            HttpOptions::default()
        } else {
            serde_json::from_value(options.clone()).map_err(|e| {
                ConnectorError::InvalidOptions {
                    message: e.to_string(),
                }
            })?
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .user_agent(&options.user_agent)
            .build()
            .map_err(|e| ConnectorError::InvalidOptions {
                message: e.to_string(),
            })?;

        Ok(Arc::new(HttpConnector {
            bus: host.bus,
            client,
            target_snapshot: SnapshotSlot::default(),
        }))
    }
}
