//! The identity that itineraries belong to.
//!
//! Owners are issued by an external authentication collaborator; the store
//! only keeps enough of them to enforce ownership on every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub owner_id:   Uuid,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}
