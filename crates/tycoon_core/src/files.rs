//! In-memory mirror of the player's virtual filesystem.
//!
//! Nodes live in an arena keyed by id with parent/child id links, so a
//! mutation touches only the affected nodes. Every mutation returns the
//! `FileChange`s the durable filesystem service must replay to catch up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileNodeId(pub u64);

const ROOT: FileNodeId = FileNodeId(0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: FileNodeId,
    pub name: String,
    pub parent: Option<FileNodeId>,
    pub kind: FileNodeKind,
}

impl FileNode {
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, FileNodeKind::Folder { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileNodeKind {
    Folder { children: Vec<FileNodeId> },
    File { content: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    Create,
    Update,
    Delete,
    Rename,
}

/// One durable-sync instruction, in the shape the filesystem service emits
/// for its own change notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub kind: FileChangeKind,
    pub path: String,
    #[serde(default)]
    pub new_path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("no such file or folder: {0}")]
    NotFound(String),
    #[error("not a folder: {0}")]
    NotAFolder(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("folder is not empty: {0}")]
    NotEmpty(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("the root folder cannot be changed")]
    RootImmutable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTree {
    nodes: BTreeMap<FileNodeId, FileNode>,
    next_id: u64,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> Result<Vec<&str>, FsError> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.iter().any(|s| *s == "." || *s == "..") {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

fn join(parts: &[&str]) -> String {
    format!("/{}", parts.join("/"))
}

impl FileTree {
    pub fn new() -> Self {
        let root = FileNode {
            id: ROOT,
            name: String::new(),
            parent: None,
            kind: FileNodeKind::Folder {
                children: Vec::new(),
            },
        };
        Self {
            nodes: BTreeMap::from([(ROOT, root)]),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn child_named(&self, parent: FileNodeId, name: &str) -> Option<FileNodeId> {
        match &self.nodes.get(&parent)?.kind {
            FileNodeKind::Folder { children } => children
                .iter()
                .copied()
                .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name)),
            FileNodeKind::File { .. } => None,
        }
    }

    fn resolve_segments(&self, parts: &[&str]) -> Option<FileNodeId> {
        parts
            .iter()
            .try_fold(ROOT, |current, name| self.child_named(current, name))
    }

    pub fn resolve(&self, path: &str) -> Option<FileNodeId> {
        let parts = segments(path).ok()?;
        self.resolve_segments(&parts)
    }

    pub fn get(&self, path: &str) -> Option<&FileNode> {
        self.resolve(path).and_then(|id| self.nodes.get(&id))
    }

    pub fn node(&self, id: FileNodeId) -> Option<&FileNode> {
        self.nodes.get(&id)
    }

    pub fn path_of(&self, id: FileNodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.nodes.get(&id)?;
        while let Some(parent) = current.parent {
            names.push(current.name.as_str());
            current = self.nodes.get(&parent)?;
        }
        names.reverse();
        Some(join(&names))
    }

    /// Children of a folder, sorted by name.
    pub fn list(&self, path: &str) -> Result<Vec<&FileNode>, FsError> {
        let node = self
            .get(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let FileNodeKind::Folder { children } = &node.kind else {
            return Err(FsError::NotAFolder(path.to_string()));
        };
        let mut listed: Vec<&FileNode> =
            children.iter().filter_map(|id| self.nodes.get(id)).collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    fn insert_child(&mut self, parent: FileNodeId, name: &str, kind: FileNodeKind) -> FileNodeId {
        let id = FileNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            FileNode {
                id,
                name: name.to_string(),
                parent: Some(parent),
                kind,
            },
        );
        if let Some(FileNode {
            kind: FileNodeKind::Folder { children },
            ..
        }) = self.nodes.get_mut(&parent)
        {
            children.push(id);
        }
        id
    }

    /// `mkdir -p`. Returns one change per folder actually created.
    fn ensure_folders(&mut self, parts: &[&str]) -> Result<(FileNodeId, Vec<FileChange>), FsError> {
        let mut current = ROOT;
        let mut changes = Vec::new();
        for (depth, name) in parts.iter().enumerate() {
            current = match self.child_named(current, name) {
                Some(existing) => {
                    if !self.nodes.get(&existing).is_some_and(FileNode::is_folder) {
                        return Err(FsError::NotAFolder(join(&parts[..=depth])));
                    }
                    existing
                }
                None => {
                    let id = self.insert_child(
                        current,
                        name,
                        FileNodeKind::Folder {
                            children: Vec::new(),
                        },
                    );
                    changes.push(FileChange {
                        kind: FileChangeKind::Create,
                        path: join(&parts[..=depth]),
                        new_path: None,
                        content: None,
                        is_folder: true,
                        recursive: false,
                    });
                    id
                }
            };
        }
        Ok((current, changes))
    }

    pub fn create_folder(&mut self, path: &str) -> Result<Vec<FileChange>, FsError> {
        let parts = segments(path)?;
        if parts.is_empty() {
            return Ok(Vec::new());
        }
        let (_, changes) = self.ensure_folders(&parts)?;
        Ok(changes)
    }

    /// Create or overwrite a file, creating missing parent folders.
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<Vec<FileChange>, FsError> {
        let parts = segments(path)?;
        let Some((name, parent_parts)) = parts.split_last() else {
            return Err(FsError::RootImmutable);
        };
        let (parent, mut changes) = self.ensure_folders(parent_parts)?;
        let kind = match self.child_named(parent, name) {
            Some(existing) => {
                let Some(node) = self.nodes.get_mut(&existing) else {
                    return Err(FsError::NotFound(path.to_string()));
                };
                let FileNodeKind::File { content: body } = &mut node.kind else {
                    return Err(FsError::AlreadyExists(path.to_string()));
                };
                *body = content.to_string();
                FileChangeKind::Update
            }
            None => {
                self.insert_child(
                    parent,
                    name,
                    FileNodeKind::File {
                        content: content.to_string(),
                    },
                );
                FileChangeKind::Create
            }
        };
        changes.push(FileChange {
            kind,
            path: join(&parts),
            new_path: None,
            content: Some(content.to_string()),
            is_folder: false,
            recursive: false,
        });
        Ok(changes)
    }

    pub fn delete(&mut self, path: &str, recursive: bool) -> Result<FileChange, FsError> {
        let parts = segments(path)?;
        if parts.is_empty() {
            return Err(FsError::RootImmutable);
        }
        let id = self
            .resolve_segments(&parts)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let (is_folder, parent) = {
            let node = &self.nodes[&id];
            if let FileNodeKind::Folder { children } = &node.kind {
                if !children.is_empty() && !recursive {
                    return Err(FsError::NotEmpty(path.to_string()));
                }
            }
            (node.is_folder(), node.parent)
        };

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&next) {
                if let FileNodeKind::Folder { children } = removed.kind {
                    stack.extend(children);
                }
            }
        }
        if let Some(FileNode {
            kind: FileNodeKind::Folder { children },
            ..
        }) = parent.and_then(|p| self.nodes.get_mut(&p))
        {
            children.retain(|child| *child != id);
        }

        Ok(FileChange {
            kind: FileChangeKind::Delete,
            path: join(&parts),
            new_path: None,
            content: None,
            is_folder,
            recursive,
        })
    }

    /// Move or rename. The destination's parent folder must already exist.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<FileChange, FsError> {
        let from_parts = segments(from)?;
        let to_parts = segments(to)?;
        if from_parts.is_empty() || to_parts.is_empty() {
            return Err(FsError::RootImmutable);
        }
        if to_parts.len() > from_parts.len() && to_parts[..from_parts.len()] == from_parts[..] {
            return Err(FsError::InvalidPath(to.to_string()));
        }
        let id = self
            .resolve_segments(&from_parts)
            .ok_or_else(|| FsError::NotFound(from.to_string()))?;
        if self.resolve_segments(&to_parts).is_some() {
            return Err(FsError::AlreadyExists(to.to_string()));
        }
        let (new_name, new_parent_parts) = to_parts
            .split_last()
            .ok_or(FsError::RootImmutable)?;
        let new_parent = self
            .resolve_segments(new_parent_parts)
            .ok_or_else(|| FsError::NotFound(join(new_parent_parts)))?;
        if !self.nodes.get(&new_parent).is_some_and(FileNode::is_folder) {
            return Err(FsError::NotAFolder(join(new_parent_parts)));
        }

        let old_parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(FileNode {
            kind: FileNodeKind::Folder { children },
            ..
        }) = old_parent.and_then(|p| self.nodes.get_mut(&p))
        {
            children.retain(|child| *child != id);
        }
        if let Some(FileNode {
            kind: FileNodeKind::Folder { children },
            ..
        }) = self.nodes.get_mut(&new_parent)
        {
            children.push(id);
        }
        let is_folder = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.name = (*new_name).to_string();
                node.parent = Some(new_parent);
                node.is_folder()
            }
            None => false,
        };

        Ok(FileChange {
            kind: FileChangeKind::Rename,
            path: join(&from_parts),
            new_path: Some(join(&to_parts)),
            content: None,
            is_folder,
            recursive: false,
        })
    }
}
