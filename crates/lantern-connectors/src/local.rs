//! The `local` connector: scans files on disk.
//!
//! The target is a `file://` URL naming a file or a directory. Directories
//! are walked to a bounded depth in name order, symlinks are skipped, and
//! every readable file produces a fetch event pair. HTML documents are
//! additionally parsed into a snapshot and traversed element by element.

use crate::select::{query_snapshot, store_first, SnapshotSlot};
use async_trait::async_trait;
use futures::future::BoxFuture;
use lantern_core::{DomElement, Headers, MediaKind, NetworkData, Request, Response, ResponseBody};
use lantern_events::{Event, EventBus};
use lantern_parsers::{build_snapshot, emit_elements};
use lantern_resources::{
    Connector, ConnectorError, ConnectorFactory, ConnectorHost, ConnectorResult,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const CONNECTOR_NAME: &str = "local";

fn default_max_depth() -> usize {
    10
}

/// Options accepted by the `local` connector.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalOptions {
    /// How many directory levels below the target to walk
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

struct LocalConnector {
    bus: EventBus,
    options: LocalOptions,
    target_snapshot: SnapshotSlot,
}

impl LocalConnector {
    fn file_url(path: &Path) -> String {
        Url::from_file_path(path)
            .map_or_else(|()| path.display().to_string(), |url| url.to_string())
    }

    fn network_data(resource: String, bytes: &[u8], kind: MediaKind) -> NetworkData {
        NetworkData {
            request: Request::new(resource.clone()),
            response: Response {
                url: resource.clone(),
                // Local files have no transport status; report success
                status: 200,
                headers: Headers::new(),
                body: ResponseBody::from_bytes(bytes),
                media_kind: kind,
            },
            resource,
        }
    }

    async fn fetch_file(&self, path: &Path, is_target: bool) -> ConnectorResult<()> {
        let resource = Self::file_url(path);
        self.bus
            .emit_awaited(Event::FetchStart {
                resource: resource.clone(),
            })
            .await?;

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if is_target => {
                return Err(ConnectorError::TargetUnreachable {
                    target: resource,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                self.bus
                    .emit_awaited(Event::FetchError {
                        resource,
                        error: e.to_string(),
                    })
                    .await?;
                return Ok(());
            }
        };

        let kind = MediaKind::from_path(path);
        let network = Arc::new(Self::network_data(resource.clone(), &bytes, kind));
        self.bus.emit_awaited(Event::FetchEnd { network }).await?;

        if kind == MediaKind::Html {
            let document = Arc::new(build_snapshot(
                &resource,
                &String::from_utf8_lossy(&bytes),
            ));
            store_first(&self.target_snapshot, &document);
            emit_elements(&self.bus, &document).await?;
        }

        Ok(())
    }

    async fn list_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = reader.next_entry().await? {
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn walk<'a>(&'a self, dir: &'a Path, depth: usize) -> BoxFuture<'a, ConnectorResult<()>> {
        Box::pin(async move {
            let mut entries = match Self::list_dir(dir).await {
                Ok(entries) => entries,
                // Only the target root is fatal; an unreadable subdirectory
                // degrades to a fetch::error like any other resource
                Err(e) if depth == 0 => {
                    return Err(ConnectorError::TargetUnreachable {
                        target: Self::file_url(dir),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    self.bus
                        .emit_awaited(Event::FetchError {
                            resource: Self::file_url(dir),
                            error: e.to_string(),
                        })
                        .await?;
                    return Ok(());
                }
            };
            // Name order keeps event order deterministic across runs
            entries.sort();

            for path in entries {
                let metadata = match tokio::fs::symlink_metadata(&path).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                        continue;
                    }
                };

                if metadata.file_type().is_symlink() {
                    debug!(path = %path.display(), "skipping symlink");
                    continue;
                }

                if metadata.is_dir() {
                    if depth + 1 > self.options.max_depth {
                        debug!(path = %path.display(), "depth limit reached, not descending");
                        continue;
                    }
                    self.walk(&path, depth + 1).await?;
                } else {
                    self.fetch_file(&path, false).await?;
                }
            }

            Ok(())
        })
    }

    fn target_path(target: &Url) -> ConnectorResult<PathBuf> {
        if target.scheme() != "file" {
            return Err(ConnectorError::UnsupportedTarget {
                connector: CONNECTOR_NAME.to_string(),
                target: target.to_string(),
                reason: "expected a file:// URL".to_string(),
            });
        }
        target
            .to_file_path()
            .map_err(|()| ConnectorError::UnsupportedTarget {
                connector: CONNECTOR_NAME.to_string(),
                target: target.to_string(),
                reason: "URL does not name a local path".to_string(),
            })
    }
}

#[async_trait]
impl Connector for LocalConnector {
    async fn collect(&self, target: Url) -> ConnectorResult<()> {
        let path = Self::target_path(&target)?;
        let metadata = tokio::fs::symlink_metadata(&path).await.map_err(|e| {
            ConnectorError::TargetUnreachable {
                target: target.to_string(),
                message: e.to_string(),
            }
        })?;

        self.bus
            .emit_awaited(Event::FetchStartTarget {
                resource: target.to_string(),
            })
            .await?;

        if metadata.is_dir() {
            self.walk(&path, 0).await
        } else {
            self.fetch_file(&path, true).await
        }
    }

    async fn fetch_content(
        &self,
        url: &Url,
        _headers: Option<&Headers>,
    ) -> ConnectorResult<NetworkData> {
        let path = Self::target_path(url)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ConnectorError::Fetch {
                resource: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::network_data(
            url.to_string(),
            &bytes,
            MediaKind::from_path(&path),
        ))
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
        // Nothing held open between operations
        Ok(())
    }
}

/// Factory for the `local` connector.
#[derive(Debug, Default)]
pub struct LocalConnectorFactory;

impl ConnectorFactory for LocalConnectorFactory {
    fn name(&self) -> &str {
        CONNECTOR_NAME
    }

    fn create(
        &self,
        host: ConnectorHost,
        options: &serde_json::Value,
    ) -> ConnectorResult<Arc<dyn Connector>> {
        let options = if options.is_null() {
            LocalOptions::default()
        } else {
            serde_json::from_value(options.clone()).map_err(|e| {
                ConnectorError::InvalidOptions {
                    message: e.to_string(),
                }
            })?
        };

        Ok(Arc::new(LocalConnector {
            bus: host.bus,
            options,
            target_snapshot: SnapshotSlot::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_events::TopicPattern;
    use std::fs;
    use std::sync::Mutex;

    fn connector_for(bus: &EventBus) -> Arc<dyn Connector> {
        LocalConnectorFactory
            .create(
                ConnectorHost { bus: bus.clone() },
                &serde_json::Value::Null,
            )
            .expect("create local connector")
    }

    fn record_topics(bus: &EventBus, pattern: &str) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let entries = Arc::clone(&log);
        bus.on(
            TopicPattern::parse(pattern).expect("valid pattern"),
            move |event| {
                let entries = Arc::clone(&entries);
                Box::pin(async move {
                    entries
                        .lock()
                        .expect("lock")
                        .push(event.topic().as_str().to_string());
                    Ok(())
                })
            },
        );
        log
    }

    #[tokio::test]
    async fn test_single_html_file_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("index.html");
        fs::write(&file, "<html><body><p>hi</p></body></html>").expect("write fixture");

        let bus = EventBus::new();
        let topics = record_topics(&bus, "fetch::**");
        let elements = record_topics(&bus, "element::*");

        let connector = connector_for(&bus);
        let target = Url::from_file_path(&file).expect("file url");
        connector.collect(target).await.expect("collect");

        assert_eq!(
            *topics.lock().expect("lock"),
            vec!["fetch::start::target", "fetch::start", "fetch::end::html"]
        );
        // html, head, body, p
        assert_eq!(elements.lock().expect("lock").len(), 4);
        assert_eq!(connector.query_selector_all("p").len(), 1);
    }

    #[tokio::test]
    async fn test_directory_walk_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.css"), "body {}").expect("write fixture");
        fs::write(dir.path().join("a.js"), "var x;").expect("write fixture");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        fs::write(dir.path().join("sub").join("c.txt"), "text").expect("write fixture");

        let bus = EventBus::new();
        let topics = record_topics(&bus, "fetch::end::*");

        let connector = connector_for(&bus);
        let target = Url::from_directory_path(dir.path()).expect("dir url");
        connector.collect(target).await.expect("collect");

        assert_eq!(
            *topics.lock().expect("lock"),
            vec!["fetch::end::javascript", "fetch::end::css", "fetch::end::text"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_subdirectory_degrades_to_fetch_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), "text").expect("write fixture");
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).expect("mkdir");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");
        if fs::read_dir(&locked).is_ok() {
            // Privileged processes bypass mode bits; the fixture cannot fail
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod");
            return;
        }

        let bus = EventBus::new();
        let topics = record_topics(&bus, "fetch::**");

        let connector = connector_for(&bus);
        let target = Url::from_directory_path(dir.path()).expect("dir url");
        connector.collect(target).await.expect("collect succeeds");

        assert_eq!(
            *topics.lock().expect("lock"),
            vec![
                "fetch::start::target",
                "fetch::start",
                "fetch::end::text",
                "fetch::error",
            ]
        );

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    #[tokio::test]
    async fn test_missing_target_is_unreachable() {
        let bus = EventBus::new();
        let connector = connector_for(&bus);
        let target = Url::parse("file:///definitely/not/here.html").expect("url");

        let err = connector.collect(target).await.expect_err("must fail");
        assert!(matches!(err, ConnectorError::TargetUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_non_file_scheme_rejected() {
        let bus = EventBus::new();
        let connector = connector_for(&bus);
        let target = Url::parse("https://example.com/").expect("url");

        let err = connector.collect(target).await.expect_err("must fail");
        assert!(matches!(err, ConnectorError::UnsupportedTarget { .. }));
    }

    #[tokio::test]
    async fn test_evaluate_unsupported() {
        let bus = EventBus::new();
        let connector = connector_for(&bus);
        let err = connector.evaluate("1 + 1").await.expect_err("must fail");
        assert!(matches!(err, ConnectorError::EvaluationUnsupported { .. }));
    }

    #[tokio::test]
    async fn test_fetch_content_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("style.css");
        fs::write(&file, "body { margin: 0 }").expect("write fixture");

        let bus = EventBus::new();
        let connector = connector_for(&bus);
        let url = Url::from_file_path(&file).expect("file url");

        let data = connector
            .fetch_content(&url, None)
            .await
            .expect("fetch content");
        assert_eq!(data.media_kind(), MediaKind::Css);
        assert_eq!(data.response.body.content, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let bus = EventBus::new();
        let err = LocalConnectorFactory
            .create(
                ConnectorHost { bus },
                &serde_json::json!({ "max_depth": "deep" }),
            )
            .err()
            .expect("must fail");
        assert!(matches!(err, ConnectorError::InvalidOptions { .. }));
    }
}
