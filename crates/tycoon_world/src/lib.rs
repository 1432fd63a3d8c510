//! `tycoon_world` — everything around the simulation that touches the
//! outside world: content catalogs, new-game factory, saves, the durable
//! virtual filesystem and chat presence.

mod content;
mod factory;
pub mod fs;
pub mod presence;
pub mod store;

pub use content::{load_content, validate_content};
pub use factory::{build_initial_state, INITIAL_FOLDERS};
pub use fs::{apply_change, FileSystemService, FsEntry, FsNotification, LocalDiskFs, SyncError};
pub use presence::{ChatMessage, MockPresence, PresenceService};
pub use store::{load_game, JsonFileStore, SaveError, SaveStore};
