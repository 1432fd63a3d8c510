//! Save-file persistence: one versioned JSON envelope per player id.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tycoon_core::{sanitize_state, GameContent, GameState};

/// Envelope format version. Independent of the state schema, which
/// `sanitize_state` migrates.
pub const SAVE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding save: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("corrupt save {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl SaveError {
    /// Corrupt saves never recover by retrying; everything else might.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SaveError::Corrupt { .. })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub player_id: String,
    /// RFC 3339 wall-clock time of the write.
    pub saved_at: String,
    pub state: GameState,
}

/// Persistence port. Implementations take `&self` so a store can be shared
/// with blocking save tasks.
pub trait SaveStore: Send + Sync {
    fn init(&self) -> Result<(), SaveError>;
    fn save(&self, state: &GameState) -> Result<(), SaveError>;
    fn load(&self) -> Result<Option<GameState>, SaveError>;
    fn delete(&self) -> Result<(), SaveError>;
}

pub struct JsonFileStore {
    dir: PathBuf,
    player_id: String,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>, player_id: &str) -> Self {
        Self {
            dir: dir.into(),
            player_id: player_id.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.save.json", self.player_id))
    }

    fn corrupt(path: &Path, reason: impl ToString) -> SaveError {
        SaveError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl SaveStore for JsonFileStore {
    fn init(&self) -> Result<(), SaveError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Write to `.tmp` then rename, so a crash mid-write keeps the old save.
    fn save(&self, state: &GameState) -> Result<(), SaveError> {
        let envelope = SaveEnvelope {
            version: SAVE_FORMAT_VERSION,
            player_id: self.player_id.clone(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(SaveError::Serialize)?;
        let path = self.path();
        let tmp_path = path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<GameState>, SaveError> {
        let path = self.path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let envelope: SaveEnvelope =
            serde_json::from_str(&text).map_err(|err| Self::corrupt(&path, err))?;
        if envelope.version > SAVE_FORMAT_VERSION {
            return Err(Self::corrupt(
                &path,
                format!("format version {} is newer than {SAVE_FORMAT_VERSION}", envelope.version),
            ));
        }
        if envelope.player_id != self.player_id {
            return Err(Self::corrupt(
                &path,
                format!("belongs to player '{}'", envelope.player_id),
            ));
        }
        Ok(Some(envelope.state))
    }

    fn delete(&self) -> Result<(), SaveError> {
        match std::fs::remove_file(self.path()) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Load and repair the saved game, logging every repair.
pub fn load_game(
    store: &dyn SaveStore,
    content: &GameContent,
) -> Result<Option<GameState>, SaveError> {
    let Some(mut state) = store.load()? else {
        return Ok(None);
    };
    for note in sanitize_state(&mut state, content) {
        tracing::warn!(player = %state.meta.player_id, "save repaired: {note}");
    }
    if state.meta.content_version != content.content_version {
        tracing::info!(
            saved = %state.meta.content_version,
            current = %content.content_version,
            "content version changed since save"
        );
        state.meta.content_version.clone_from(&content.content_version);
    }
    Ok(Some(state))
}
