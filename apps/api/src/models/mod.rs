pub mod profile;
pub mod saved_job;
pub mod search_limits;

use serde::Deserialize;
use uuid::Uuid;

/// `?user_id=` on read endpoints.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}
