//! Client side of the settings page: the backend calls, the save router,
//! the delayed refresh of what the page shows, and the editor that owns the
//! draft record.

pub mod backend;
pub mod editor;
pub mod refresh;
pub mod router;

pub use backend::{ClientError, HttpBackend};
pub use editor::SettingsEditor;
pub use refresh::{PassBoardView, RefreshCoordinator, DEFAULT_REFRESH_DELAY};
pub use router::{PersistenceRouter, SaveError, SaveTarget};
