//! File watching for automatic rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use walkdir::WalkDir;

use inkpress_static::{BuildError, StaticBuilder};

/// Extensions whose changes trigger a rebuild: documents and templates.
const WATCHED_EXTENSIONS: [&str; 2] = ["md", "html"];

/// Errors that can occur while setting up the watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to watch {path}: {source}")]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error(transparent)]
    Notify(#[from] notify::Error),

    #[error("Failed to start watch thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// What the watch loop did with one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not a change to a watched file
    Ignored,
    /// A build was already running
    Dropped,
    Rebuilt,
    Failed,
}

/// Watches a site and rebuilds it on change.
///
/// Dropping the watcher closes the event stream, which ends the background thread.
pub struct SiteWatcher {
    watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
    handle: JoinHandle<()>,
}

impl SiteWatcher {
    /// Register every directory under the builder's source and template roots and
    /// start consuming notifications on a background thread.
    ///
    /// Directories created later are not picked up until the watcher is restarted.
    pub fn start(builder: Arc<StaticBuilder>) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        let config = builder.config();
        let mut watched = Vec::new();
        for root in [&config.source_dir, &config.template_dir] {
            watched.extend(register(&mut watcher, root)?);
        }
        tracing::info!("Watching {} directories for changes", watched.len());

        let handle = thread::Builder::new()
            .name("inkpress-watch".to_string())
            .spawn(move || {
                while let Ok(res) = rx.recv() {
                    if handle_event(&builder, res) == Outcome::Ignored {
                        continue;
                    }
                    // anything queued while that build ran is dropped
                    for res in rx.try_iter() {
                        match res {
                            Ok(event) if should_rebuild(&event) => {
                                tracing::debug!("Dropping change to {:?}", event.paths);
                            }
                            Ok(_) => {}
                            Err(e) => tracing::warn!("Watch error: {}", e),
                        }
                    }
                }
                tracing::debug!("Watch loop finished");
            })?;

        Ok(Self {
            watcher,
            watched,
            handle,
        })
    }

    /// Directories registered for notifications.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Stop watching and wait for an in-flight rebuild to finish.
    pub fn stop(self) {
        let Self {
            watcher, handle, ..
        } = self;
        drop(watcher);
        if handle.join().is_err() {
            tracing::error!("Watch thread panicked");
        }
    }
}

fn register(watcher: &mut RecommendedWatcher, root: &Path) -> Result<Vec<PathBuf>, WatchError> {
    if !root.is_dir() {
        tracing::warn!("Not watching missing directory {}", root.display());
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| WatchError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.into_path();
        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Register {
                path: path.clone(),
                source,
            })?;
        tracing::debug!("Watching {}", path.display());
        dirs.push(path);
    }
    Ok(dirs)
}

/// Whether `event` is a content change to a document or template.
pub fn should_rebuild(event: &Event) -> bool {
    let relevant_kind = match event.kind {
        EventKind::Access(_) | EventKind::Other => false,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
            true
        }
    };

    relevant_kind
        && event.paths.iter().any(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| WATCHED_EXTENSIONS.contains(&ext))
        })
}

/// Handle one notification, rebuilding inline when it warrants it.
///
/// Errors are logged and never stop the caller's loop.
pub fn handle_event(builder: &StaticBuilder, res: notify::Result<Event>) -> Outcome {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Watch error: {}", e);
            return Outcome::Ignored;
        }
    };

    if !should_rebuild(&event) {
        return Outcome::Ignored;
    }
    if builder.is_building() {
        tracing::debug!("Build in progress, dropping change to {:?}", event.paths);
        return Outcome::Dropped;
    }

    tracing::info!("Change detected in {:?}, rebuilding", event.paths);
    match builder.build() {
        Ok(result) => {
            tracing::info!(
                "Rebuilt {} files in {}ms",
                result.files,
                result.duration_ms
            );
            Outcome::Rebuilt
        }
        Err(BuildError::AlreadyBuilding) => {
            tracing::debug!("Build started elsewhere, dropping change");
            Outcome::Dropped
        }
        Err(e) => {
            tracing::error!("Rebuild failed: {}", e);
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_static::BuildConfig;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind};
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    fn site(root: &Path) -> Arc<StaticBuilder> {
        fs::create_dir_all(root.join("source/post")).unwrap();
        fs::write(
            root.join("source/post/first.md"),
            "-----ini\ntitle = First\ndate = 2021-01-01\n-----markdown\nhello\n",
        )
        .unwrap();
        Arc::new(StaticBuilder::new(BuildConfig {
            source_dir: root.join("source"),
            template_dir: root.join("template"),
            output_dir: root.join("public"),
            page_size: 4,
        }))
    }

    #[test]
    fn filters_by_extension_and_kind() {
        let data = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert!(should_rebuild(&event(data, "source/post/a.md")));
        assert!(should_rebuild(&event(
            EventKind::Create(CreateKind::File),
            "template/post.html"
        )));
        assert!(!should_rebuild(&event(data, "source/post/a.txt")));
        assert!(!should_rebuild(&event(data, "source/post")));
        assert!(!should_rebuild(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            "source/post/a.md"
        )));
        assert!(!should_rebuild(&event(
            EventKind::Access(AccessKind::Any),
            "source/post/a.md"
        )));
    }

    #[test]
    fn drops_changes_while_building() {
        let temp = tempdir().unwrap();
        let builder = site(temp.path());
        let change = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            "source/post/first.md",
        );

        let guard = builder.state().try_begin().unwrap();
        assert_eq!(handle_event(&builder, Ok(change.clone())), Outcome::Dropped);
        drop(guard);

        assert!(!temp.path().join("public").exists());
        assert_eq!(handle_event(&builder, Ok(change)), Outcome::Rebuilt);
        assert!(temp.path().join("public/first.html").is_file());
    }

    #[test]
    fn errors_and_failed_builds_do_not_escape() {
        let temp = tempdir().unwrap();
        let builder = site(temp.path());

        let err = notify::Error::generic("stream failed");
        assert_eq!(handle_event(&builder, Err(err)), Outcome::Ignored);

        fs::write(temp.path().join("source/post/broken.md"), "oops\n").unwrap();
        let change = event(EventKind::Create(CreateKind::File), "source/post/broken.md");
        assert_eq!(handle_event(&builder, Ok(change)), Outcome::Failed);
        assert!(!builder.is_building());
    }

    #[test]
    fn rebuilds_when_a_post_is_added() {
        let temp = tempdir().unwrap();
        let builder = site(temp.path());
        fs::create_dir_all(temp.path().join("source/post/2021")).unwrap();

        let watcher = SiteWatcher::start(Arc::clone(&builder)).unwrap();
        assert_eq!(watcher.watched().len(), 3);

        // Give inotify time to set up
        thread::sleep(Duration::from_millis(200));
        // rename into place so no build sees a half-written file
        let staged = temp.path().join("source/post/2021/second.tmp");
        fs::write(
            &staged,
            "-----ini\ntitle = Second\ndate = 2021-02-01\n-----markdown\nagain\n",
        )
        .unwrap();
        fs::rename(&staged, temp.path().join("source/post/2021/second.md")).unwrap();

        let target = temp.path().join("public/second.html");
        let deadline = Instant::now() + Duration::from_secs(5);
        while !target.is_file() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
        }

        watcher.stop();
        assert!(target.is_file(), "timeout waiting for rebuild");
    }
}
