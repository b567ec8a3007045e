//! Persistence seam for the users collection.
//!
//! Handlers only see a [`SharedUserStore`], built once at startup and
//! handed to the router as state. `Database` is the PostgreSQL backend,
//! [`MemoryUserStore`] keeps records in process.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::ApiError, models::User};

pub use memory::MemoryUserStore;

/// Data-access operations the user endpoints rely on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns every stored user, oldest first.
    async fn find_all_users(&self) -> Result<Vec<User>, ApiError>;

    /// Persists `user` and returns the record as stored.
    ///
    /// Fails with [`ApiError::Conflict`] when the email is already taken,
    /// in which case nothing is written.
    async fn create_user(&self, user: User) -> Result<User, ApiError>;
}

pub type SharedUserStore = Arc<dyn UserStore>;
