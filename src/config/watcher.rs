//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - Watches the parent directory, so editors that save by rename keep working
//! - Only events naming the config file trigger a reload
//! - Unchanged file contents are not re-sent (one save emits several events)
//! - Command-line overrides are re-applied to every reloaded config

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::schema::HookConfig;
use crate::lifecycle::startup::{resolve_config, StartupOptions};

/// Watches the configuration file and emits validated configs when it changes.
pub struct ConfigWatcher {
    options: StartupOptions,
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<HookConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `options.config_path`.
    ///
    /// Returns `None` when no config file was given.
    pub fn new(options: &StartupOptions) -> Option<(Self, mpsc::UnboundedReceiver<HookConfig>)> {
        let path = options.config_path.clone()?;
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        Some((
            Self {
                options: options.clone(),
                path,
                update_tx,
            },
            update_rx,
        ))
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watch_dir(&self.path).to_path_buf();
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let last_seen = Mutex::new(std::fs::read_to_string(&self.path).ok());
        let ConfigWatcher {
            options,
            path,
            update_tx,
        } = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                if !event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name)
                {
                    return;
                }

                // Partially written files fail to read or parse; the next event retries.
                let Ok(content) = std::fs::read_to_string(&path) else {
                    return;
                };
                {
                    let mut last = last_seen.lock().unwrap_or_else(|e| e.into_inner());
                    if last.as_deref() == Some(content.as_str()) {
                        return;
                    }
                    *last = Some(content);
                }

                tracing::info!(path = ?path, "Config file change detected, reloading");
                match resolve_config(&options) {
                    Ok(config) => {
                        let _ = update_tx.send(config);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("auth-hook-watch-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// First update satisfying `accept`; a save may surface intermediate states first.
    async fn wait_for(
        rx: &mut mpsc::UnboundedReceiver<HookConfig>,
        accept: impl Fn(&HookConfig) -> bool,
    ) -> Option<HookConfig> {
        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(config) = rx.recv().await {
                if accept(&config) {
                    return Some(config);
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
    }

    #[test]
    fn test_watch_dir_of_bare_file_name() {
        assert_eq!(watch_dir(Path::new("hook.toml")), Path::new("."));
        assert_eq!(watch_dir(Path::new("/etc/hook/hook.toml")), Path::new("/etc/hook"));
    }

    #[test]
    fn test_no_watcher_without_config_path() {
        assert!(ConfigWatcher::new(&StartupOptions::default()).is_none());
    }

    #[tokio::test]
    async fn test_change_is_delivered_with_bind_override() {
        let dir = temp_config_dir();
        let path = dir.join("hook.toml");
        std::fs::write(&path, "[hook]\nauth_path = \"/_opa\"\n").unwrap();

        let options = StartupOptions {
            config_path: Some(path.clone()),
            bind: Some("127.0.0.1:18181".into()),
            watch: true,
            check_only: false,
        };
        let (watcher, mut updates) = ConfigWatcher::new(&options).unwrap();
        let _watcher = watcher.run().unwrap();

        std::fs::write(&path, "[hook]\nauth_path = \"/_opa/v2\"\n").unwrap();

        let config = wait_for(&mut updates, |c| c.hook.auth_path == "/_opa/v2")
            .await
            .expect("reload not delivered");
        assert_eq!(config.listener.bind_address, "127.0.0.1:18181");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_replace_by_rename_is_delivered() {
        let dir = temp_config_dir();
        let path = dir.join("hook.toml");
        std::fs::write(&path, "").unwrap();

        let options = StartupOptions {
            config_path: Some(path.clone()),
            watch: true,
            ..Default::default()
        };
        let (watcher, mut updates) = ConfigWatcher::new(&options).unwrap();
        let _watcher = watcher.run().unwrap();

        let staged = dir.join(".hook.toml.swp");
        std::fs::write(&staged, "[hook]\nbackend_prefix = \"/_tape\"\n\n[[locations]]\nprefix = \"/_opa\"\nupstream = \"http://127.0.0.1:8181\"\n\n[[locations]]\nprefix = \"/_tape\"\nupstream = \"http://127.0.0.1:8000\"\n").unwrap();
        std::fs::rename(&staged, &path).unwrap();

        let config = wait_for(&mut updates, |c| c.hook.backend_prefix == "/_tape")
            .await
            .expect("reload not delivered");
        assert_eq!(config.locations.len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_invalid_change_is_not_delivered() {
        let dir = temp_config_dir();
        let path = dir.join("hook.toml");
        std::fs::write(&path, "").unwrap();

        let options = StartupOptions {
            config_path: Some(path.clone()),
            watch: true,
            ..Default::default()
        };
        let (watcher, mut updates) = ConfigWatcher::new(&options).unwrap();
        let _watcher = watcher.run().unwrap();

        std::fs::write(&path, "[timeouts]\nrequest_secs = 0\n").unwrap();

        let outcome = tokio::time::timeout(Duration::from_millis(500), updates.recv()).await;
        assert!(
            !matches!(outcome, Ok(Some(ref c)) if c.timeouts.request_secs == 0),
            "invalid config must not be delivered"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
