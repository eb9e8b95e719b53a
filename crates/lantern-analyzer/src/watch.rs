//! Watch mode: rescan on filesystem change.
//!
//! Only meaningful with the `local` connector. After the initial scan the
//! session stays subscribed to debounced change notifications and reruns an
//! engine cycle limited to each changed file, emitting the usual
//! `scan::start`/`scan::end` pair per increment. The session ends on the
//! stop token or an unrecoverable watcher error.

use crate::analyzer::{Analyzer, ScanHooks};
use crate::error::WatchError;
use lantern_core::AnalyzerResult;
use lantern_engine::{Engine, ScanError};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

const DEBOUNCE: Duration = Duration::from_millis(300);

impl Analyzer {
    /// Scan the target, then keep rescanning changed files until `stop`
    /// fires or the watcher fails.
    ///
    /// Results are delivered through the hooks' `target_end`; `update`
    /// fires once per qualifying change before its rescan.
    pub async fn watch(
        &self,
        target: &str,
        hooks: &ScanHooks,
        stop: CancellationToken,
    ) -> Result<(), WatchError> {
        if self.config.connector.name != "local" {
            return Err(WatchError::UnsupportedConnector {
                connector: self.config.connector.name.clone(),
            });
        }

        let target_url = Url::parse(target).map_err(|e| WatchError::Target {
            target: target.to_string(),
            message: e.to_string(),
        })?;
        let target_path = target_url
            .to_file_path()
            .map_err(|()| WatchError::Target {
                target: target.to_string(),
                message: "not a local path".to_string(),
            })?;

        // Watch before the initial scan so changes made during it are not
        // lost
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result| {
            let _ = tx.send(result);
        })
        .map_err(|e| WatchError::Watcher {
            message: e.to_string(),
        })?;

        let single_file = target_path.is_file();
        let (watch_root, mode) = if single_file {
            let parent = target_path
                .parent()
                .map_or_else(|| target_path.clone(), Path::to_path_buf);
            (parent, RecursiveMode::NonRecursive)
        } else {
            (target_path.clone(), RecursiveMode::Recursive)
        };
        debouncer
            .watcher()
            .watch(&watch_root, mode)
            .map_err(|e| WatchError::Watcher {
                message: e.to_string(),
            })?;

        info!(target = %target_url, "watch session starting");
        hooks.target_start(target_url.as_str());
        self.rescan(target_url.clone(), hooks, &stop).await?;

        loop {
            tokio::select! {
                () = stop.cancelled() => {
                    info!(target = %target_url, "watch session stopped");
                    return Ok(());
                }
                received = rx.recv() => {
                    let events = match received {
                        None => {
                            return Err(WatchError::Watcher {
                                message: "watcher channel closed".to_string(),
                            });
                        }
                        Some(Err(e)) => {
                            return Err(WatchError::Watcher {
                                message: e.to_string(),
                            });
                        }
                        Some(Ok(events)) => events,
                    };

                    for changed in Self::qualifying_paths(events, single_file, &target_path) {
                        let Ok(resource) = Url::from_file_path(&changed) else {
                            continue;
                        };
                        hooks.update(
                            target_url.as_str(),
                            &format!("change detected: {}", changed.display()),
                        );
                        self.rescan(resource, hooks, &stop).await?;
                    }
                }
            }
        }
    }

    /// One engine cycle limited to a single resource.
    async fn rescan(
        &self,
        resource: Url,
        hooks: &ScanHooks,
        stop: &CancellationToken,
    ) -> Result<(), WatchError> {
        debug!(resource = %resource, "rescanning");
        let engine = Engine::new(
            Arc::clone(&self.config),
            Arc::clone(&self.resources),
            stop.child_token(),
        );
        match engine.analyze(resource.clone()).await {
            Ok(problems) => {
                hooks.target_end(&AnalyzerResult::new(resource.as_str(), problems));
                Ok(())
            }
            // Racing the stop token is a clean shutdown, not a failure
            Err(ScanError::Cancelled) => Ok(()),
            Err(source) => Err(WatchError::Scan {
                target: resource.to_string(),
                source,
            }),
        }
    }

    fn qualifying_paths(
        events: Vec<notify_debouncer_mini::DebouncedEvent>,
        single_file: bool,
        target_path: &Path,
    ) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = events
            .into_iter()
            .map(|event| event.path)
            .filter(|path| path.is_file())
            .filter(|path| !single_file || path == target_path)
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}
