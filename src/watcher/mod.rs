//! File watching for live reload.
//!
//! Uses notify crate for cross-platform file system events. The watcher
//! observes the parent directory so that a file replaced by an editor's
//! save-via-rename is still seen.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Debounce applied to content changes before they are reported.
pub const CHANGES_DONE_DEBOUNCE: Duration = Duration::from_millis(200);

/// What happened to the watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Content changed and writes have settled.
    ChangesDone,
    /// The file was (re)created at the watched path.
    Created,
    /// The file was renamed to a new path.
    Moved(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Observed {
    Changed,
    Created,
    Moved(PathBuf),
}

/// Watches a single file. Dropping the watcher cancels the watch.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("target_path", &self.target_path)
            .field("watch_root", &self.watch_root)
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Canonicalize so event paths from the OS (which are always absolute
        // and canonical) match our stored paths.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %target_path.display(), root = %watch_root.display(), "watch installed");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debounce,
            pending_since: None,
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain pending notifications and report at most one event.
    ///
    /// Creation and rename are reported as soon as they are seen; the last
    /// one in a batch wins. Content changes are held back until no further
    /// change arrived for the debounce interval.
    pub fn poll(&mut self) -> Option<WatchEvent> {
        let mut immediate = None;
        let mut saw_change = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) => match self.classify(&ev) {
                    Some(Observed::Changed) => saw_change = true,
                    Some(Observed::Created) => immediate = Some(WatchEvent::Created),
                    Some(Observed::Moved(to)) => immediate = Some(WatchEvent::Moved(to)),
                    None => {
                        tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "irrelevant watch event");
                    }
                },
                Err(err) => tracing::warn!(%err, "watch error"),
            }
        }

        if let Some(event) = immediate {
            self.pending_since = None;
            return Some(event);
        }
        if saw_change {
            self.pending_since = Some(Instant::now());
        }

        let pending_since = self.pending_since?;
        if pending_since.elapsed() >= self.debounce {
            self.pending_since = None;
            return Some(WatchEvent::ChangesDone);
        }
        None
    }

    fn classify(&self, event: &Event) -> Option<Observed> {
        match &event.kind {
            EventKind::Create(_) => self.names_target(&event.paths).then_some(Observed::Created),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let from = event.paths.first()?;
                let to = event.paths.get(1)?;
                if self.is_target(to) {
                    Some(Observed::Created)
                } else if self.is_target(from) {
                    Some(Observed::Moved(to.clone()))
                } else {
                    None
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                self.names_target(&event.paths).then_some(Observed::Created)
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From))
            | EventKind::Modify(ModifyKind::Metadata(_))
            | EventKind::Remove(_)
            | EventKind::Other => None,
            EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(_)
            | EventKind::Any => self.is_relevant(event).then_some(Observed::Changed),
            EventKind::Access(_) => None,
        }
    }

    fn is_target(&self, path: &Path) -> bool {
        path == self.target_path
            || (path.parent() == Some(self.watch_root.as_path())
                && self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name() == Some(name.as_os_str())))
    }

    fn names_target(&self, paths: &[PathBuf]) -> bool {
        paths.iter().any(|path| self.is_target(path))
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
