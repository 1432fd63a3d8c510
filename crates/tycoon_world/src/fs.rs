//! Durable virtual filesystem. The core keeps an in-memory `FileTree` and
//! emits `FileChange`s; a `FileSystemService` replays them somewhere that
//! survives restarts.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tycoon_core::files::{FileChange, FileChangeKind};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("no such file or folder: {0}")]
    NotFound(String),
    #[error("rename of {0} without a target path")]
    MissingTarget(String),
}

impl SyncError {
    /// Disk trouble may clear up; a change that is wrong for the tree never will.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Io { source, .. } => source.kind() != std::io::ErrorKind::NotFound,
            SyncError::InvalidPath(_) | SyncError::NotFound(_) | SyncError::MissingTarget(_) => {
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsEntry {
    pub path: String,
    pub is_folder: bool,
    /// File body; `None` for folders.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsNotification {
    pub kind: FileChangeKind,
    pub path: String,
    #[serde(default)]
    pub new_path: Option<String>,
    /// The entry after the change; `None` after a delete.
    #[serde(default)]
    pub entry: Option<FsEntry>,
}

pub type FsListener = Arc<dyn Fn(&FsNotification) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub trait FileSystemService: Send + Sync {
    /// Creates or overwrites a file, creating missing parent folders.
    fn create_file(&self, path: &str, content: &str) -> Result<FsEntry, SyncError>;
    fn create_folder(&self, path: &str) -> Result<FsEntry, SyncError>;
    fn get_entry(&self, path: &str) -> Result<Option<FsEntry>, SyncError>;
    fn delete_entry(&self, path: &str, recursive: bool) -> Result<(), SyncError>;
    fn rename_entry(&self, from: &str, to: &str) -> Result<FsEntry, SyncError>;
    fn list_folder(&self, path: &str) -> Result<Vec<FsEntry>, SyncError>;
    fn subscribe(&self, listener: FsListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Replay one core `FileChange` against a durable service.
pub fn apply_change(fs: &dyn FileSystemService, change: &FileChange) -> Result<(), SyncError> {
    match change.kind {
        FileChangeKind::Create | FileChangeKind::Update if change.is_folder => {
            fs.create_folder(&change.path)?;
        }
        FileChangeKind::Create | FileChangeKind::Update => {
            fs.create_file(&change.path, change.content.as_deref().unwrap_or_default())?;
        }
        FileChangeKind::Delete => fs.delete_entry(&change.path, change.recursive)?,
        FileChangeKind::Rename => {
            let to = change
                .new_path
                .as_deref()
                .ok_or_else(|| SyncError::MissingTarget(change.path.clone()))?;
            fs.rename_entry(&change.path, to)?;
        }
    }
    Ok(())
}

/// Mirrors the virtual tree into a directory on the local disk.
pub struct LocalDiskFs {
    root: PathBuf,
    listeners: Mutex<Vec<(SubscriptionId, FsListener)>>,
    next_subscription: AtomicU64,
}

fn io_err(path: &str) -> impl FnOnce(std::io::Error) -> SyncError + '_ {
    move |source| SyncError::Io {
        path: path.to_string(),
        source,
    }
}

impl LocalDiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(io_err("/"))?;
        Ok(Self {
            root,
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Virtual absolute path to a disk path under the root. Rejects any
    /// segment that could escape it.
    fn disk_path(&self, path: &str) -> Result<PathBuf, SyncError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(SyncError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn entry_at(path: &str, disk: &Path) -> Result<Option<FsEntry>, SyncError> {
        if disk.is_dir() {
            return Ok(Some(FsEntry {
                path: path.to_string(),
                is_folder: true,
                content: None,
            }));
        }
        match std::fs::read_to_string(disk) {
            Ok(content) => Ok(Some(FsEntry {
                path: path.to_string(),
                is_folder: false,
                content: Some(content),
            })),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_err(path)(err)),
        }
    }

    /// Listeners run outside the lock so they may subscribe or unsubscribe.
    fn notify(&self, notification: &FsNotification) {
        let listeners: Vec<FsListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(notification);
        }
    }
}

fn normalized(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

impl FileSystemService for LocalDiskFs {
    fn create_file(&self, path: &str, content: &str) -> Result<FsEntry, SyncError> {
        let disk = self.disk_path(path)?;
        let existed = disk.exists();
        if let Some(parent) = disk.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(path))?;
        }
        std::fs::write(&disk, content).map_err(io_err(path))?;
        let entry = FsEntry {
            path: normalized(path),
            is_folder: false,
            content: Some(content.to_string()),
        };
        self.notify(&FsNotification {
            kind: if existed {
                FileChangeKind::Update
            } else {
                FileChangeKind::Create
            },
            path: entry.path.clone(),
            new_path: None,
            entry: Some(entry.clone()),
        });
        Ok(entry)
    }

    fn create_folder(&self, path: &str) -> Result<FsEntry, SyncError> {
        let disk = self.disk_path(path)?;
        std::fs::create_dir_all(&disk).map_err(io_err(path))?;
        let entry = FsEntry {
            path: normalized(path),
            is_folder: true,
            content: None,
        };
        self.notify(&FsNotification {
            kind: FileChangeKind::Create,
            path: entry.path.clone(),
            new_path: None,
            entry: Some(entry.clone()),
        });
        Ok(entry)
    }

    fn get_entry(&self, path: &str) -> Result<Option<FsEntry>, SyncError> {
        let disk = self.disk_path(path)?;
        Self::entry_at(&normalized(path), &disk)
    }

    fn delete_entry(&self, path: &str, recursive: bool) -> Result<(), SyncError> {
        let disk = self.disk_path(path)?;
        if disk == self.root {
            return Err(SyncError::InvalidPath(path.to_string()));
        }
        let removed = if disk.is_dir() {
            if recursive {
                std::fs::remove_dir_all(&disk)
            } else {
                std::fs::remove_dir(&disk)
            }
        } else if disk.exists() {
            std::fs::remove_file(&disk)
        } else {
            return Err(SyncError::NotFound(path.to_string()));
        };
        removed.map_err(io_err(path))?;
        self.notify(&FsNotification {
            kind: FileChangeKind::Delete,
            path: normalized(path),
            new_path: None,
            entry: None,
        });
        Ok(())
    }

    fn rename_entry(&self, from: &str, to: &str) -> Result<FsEntry, SyncError> {
        let source = self.disk_path(from)?;
        let target = self.disk_path(to)?;
        if !source.exists() {
            return Err(SyncError::NotFound(from.to_string()));
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(io_err(to))?;
        }
        std::fs::rename(&source, &target).map_err(io_err(from))?;
        let entry = Self::entry_at(&normalized(to), &target)?
            .ok_or_else(|| SyncError::NotFound(to.to_string()))?;
        self.notify(&FsNotification {
            kind: FileChangeKind::Rename,
            path: normalized(from),
            new_path: Some(entry.path.clone()),
            entry: Some(entry.clone()),
        });
        Ok(entry)
    }

    /// Children sorted by name.
    fn list_folder(&self, path: &str) -> Result<Vec<FsEntry>, SyncError> {
        let disk = self.disk_path(path)?;
        let base = normalized(path);
        let mut names = Vec::new();
        for dir_entry in std::fs::read_dir(&disk).map_err(io_err(path))? {
            let dir_entry = dir_entry.map_err(io_err(path))?;
            names.push(dir_entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let child = if base == "/" {
                format!("/{name}")
            } else {
                format!("{base}/{name}")
            };
            if let Some(entry) = Self::entry_at(&child, &disk.join(&name))? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn subscribe(&self, listener: FsListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tycoon_core::files::FileTree;

    fn disk() -> (tempfile::TempDir, LocalDiskFs) {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalDiskFs::new(dir.path().join("vfs")).unwrap();
        (dir, fs)
    }

    #[test]
    fn create_get_list_delete() {
        let (_dir, fs) = disk();
        fs.create_file("/notes/todo.txt", "buy ram").unwrap();
        fs.create_folder("/notes/archive").unwrap();

        let entry = fs.get_entry("/notes/todo.txt").unwrap().unwrap();
        assert_eq!(entry.content.as_deref(), Some("buy ram"));
        let names: Vec<_> = fs
            .list_folder("/notes")
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(names, ["/notes/archive", "/notes/todo.txt"]);

        assert!(fs.delete_entry("/notes", false).is_err());
        fs.delete_entry("/notes", true).unwrap();
        assert!(fs.get_entry("/notes").unwrap().is_none());
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let (_dir, fs) = disk();
        assert!(matches!(
            fs.create_file("/../outside.txt", "x"),
            Err(SyncError::InvalidPath(_))
        ));
        assert!(matches!(fs.delete_entry("/", true), Err(SyncError::InvalidPath(_))));
    }

    #[test]
    fn subscribers_see_changes_until_unsubscribed() {
        let (_dir, fs) = disk();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = fs.subscribe(Arc::new(move |n: &FsNotification| {
            sink.lock().push((n.kind, n.path.clone()));
        }));

        fs.create_file("/a.txt", "1").unwrap();
        fs.create_file("/a.txt", "2").unwrap();
        fs.rename_entry("/a.txt", "/b.txt").unwrap();
        fs.unsubscribe(id);
        fs.delete_entry("/b.txt", false).unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                (FileChangeKind::Create, "/a.txt".to_string()),
                (FileChangeKind::Update, "/a.txt".to_string()),
                (FileChangeKind::Rename, "/a.txt".to_string()),
            ]
        );
    }

    #[test]
    fn listener_can_unsubscribe_itself() {
        let (_dir, fs) = disk();
        let fs = Arc::new(fs);
        let own_id: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicU64::new(0));

        let handle = Arc::clone(&fs);
        let slot = Arc::clone(&own_id);
        let counter = Arc::clone(&calls);
        let id = fs.subscribe(Arc::new(move |_: &FsNotification| {
            counter.fetch_add(1, Ordering::Relaxed);
            if let Some(id) = slot.lock().take() {
                handle.unsubscribe(id);
            }
        }));
        *own_id.lock() = Some(id);

        fs.create_file("/a.txt", "1").unwrap();
        fs.create_file("/b.txt", "2").unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn replaying_tree_changes_mirrors_the_tree() {
        let (_dir, fs) = disk();
        let mut tree = FileTree::new();
        let mut changes = tree.write_file("/projects/demo/main.rs", "fn main() {}").unwrap();
        changes.push(tree.rename("/projects/demo", "/projects/app").unwrap());
        changes.extend(tree.write_file("/readme.md", "hi").unwrap());
        changes.push(tree.delete("/readme.md", false).unwrap());
        for change in &changes {
            apply_change(&fs, change).unwrap();
        }

        let main = fs.get_entry("/projects/app/main.rs").unwrap().unwrap();
        assert_eq!(main.content.as_deref(), Some("fn main() {}"));
        assert!(fs.get_entry("/projects/demo").unwrap().is_none());
        assert!(fs.get_entry("/readme.md").unwrap().is_none());
    }

    #[test]
    fn rename_without_target_is_an_error() {
        let (_dir, fs) = disk();
        let change = FileChange {
            kind: FileChangeKind::Rename,
            path: "/x".to_string(),
            new_path: None,
            content: None,
            is_folder: false,
            recursive: false,
        };
        let err = apply_change(&fs, &change).unwrap_err();
        assert!(matches!(err, SyncError::MissingTarget(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn blocked_parent_is_retryable_until_cleared() {
        let (dir, fs) = disk();
        let blocker = dir.path().join("vfs").join("projects");
        std::fs::write(&blocker, "not a folder").unwrap();

        let err = fs.create_file("/projects/a.txt", "x").unwrap_err();
        assert!(err.is_retryable());

        std::fs::remove_file(&blocker).unwrap();
        fs.create_file("/projects/a.txt", "x").unwrap();
        assert!(fs.get_entry("/projects/a.txt").unwrap().is_some());
    }
}
