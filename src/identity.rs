use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The signed-in identity behind a browser session.
///
/// `/api/session` answers `null` for anonymous visitors, so callers hold an
/// `Option<UserSession>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSession {
    pub email: String,
}
