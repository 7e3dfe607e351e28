//! File watching for live reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Which part of the site a changed file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchKind {
    Content,
    Templates,
    Static,
}

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchKind,
    pub path: PathBuf,
}

/// File watcher over the content, template and static directories.
pub struct FileWatcher {
    _watcher: notify::RecommendedWatcher,
}

impl FileWatcher {
    /// Watch each existing root recursively.
    ///
    /// Returns the watcher and a channel to receive events. Dropping the
    /// watcher stops the events.
    pub fn new(
        roots: &[(PathBuf, WatchKind)],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), notify::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })?;

        let mut watched = Vec::new();
        for (path, kind) in roots {
            if !path.exists() {
                tracing::debug!("Not watching missing directory {}", path.display());
                continue;
            }
            let path = path.canonicalize().unwrap_or_else(|_| path.clone());
            watcher.watch(&path, RecursiveMode::Recursive)?;
            watched.push((path, *kind));
        }

        std::thread::spawn(move || {
            let mut debouncer = Debouncer::new(Duration::from_millis(100));

            while let Ok(event) = sync_rx.recv() {
                if !is_change(&event.kind) {
                    continue;
                }

                let now = Instant::now();
                for path in event.paths {
                    let Some(kind) = classify(&watched, &path) else {
                        continue;
                    };
                    if !debouncer.accept(kind, now) {
                        continue;
                    }
                    if async_tx.blocking_send(WatchEvent { kind, path }).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Drops bursts of events, separately for each kind of root.
struct Debouncer {
    window: Duration,
    last: HashMap<WatchKind, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
        }
    }

    fn accept(&mut self, kind: WatchKind, now: Instant) -> bool {
        if let Some(last) = self.last.get(&kind) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        }
        self.last.insert(kind, now);
        true
    }
}

fn is_change(kind: &notify::EventKind) -> bool {
    use notify::EventKind;

    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Find the root a path lies under. The most specific root wins.
fn classify(roots: &[(PathBuf, WatchKind)], path: &Path) -> Option<WatchKind> {
    roots
        .iter()
        .filter(|(root, _)| path.starts_with(root))
        .max_by_key(|(root, _)| root.components().count())
        .map(|(_, kind)| *kind)
}
