use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::UserStore;
use crate::{error::ApiError, models::User};

/// In-process user store, used for `USER_STORE=memory` and in tests.
/// Records live for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store; seed records are kept in the given order.
    pub fn with_users(users: Vec<User>) -> Self {
        MemoryUserStore {
            users: RwLock::new(users),
        }
    }

    pub(crate) async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_all_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.read().await.clone())
    }

    async fn create_user(&self, user: User) -> Result<User, ApiError> {
        // Check and insert under one write guard so concurrent creates
        // cannot both pass the uniqueness check.
        let mut users = self.users.write().await;

        if users.iter().any(|existing| existing.email == user.email) {
            return Err(ApiError::conflict("Email address already exists"));
        }

        users.push(user.clone());
        info!("Stored user with id: {} ({} total)", user.id, users.len());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn user(name: &str, email: &str) -> User {
        User::new(name.to_string(), email.to_string())
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = MemoryUserStore::new();

        let users = block_on(store.find_all_users()).unwrap();

        assert!(users.is_empty());
        assert!(block_on(store.is_empty()));
    }

    #[test]
    fn test_lists_seeded_users_in_order() {
        let seeded = vec![user("A", "a@x.com"), user("B", "b@x.com"), user("C", "c@x.com")];
        let store = MemoryUserStore::with_users(seeded.clone());

        let users = block_on(store.find_all_users()).unwrap();

        assert_eq!(users, seeded);
    }

    #[test]
    fn test_create_then_list() {
        let store = MemoryUserStore::new();
        let alice = user("Alice", "a@x.com");

        let created = block_on(store.create_user(alice.clone())).unwrap();

        assert_eq!(created, alice);
        assert_eq!(block_on(store.find_all_users()).unwrap(), vec![alice]);
    }

    #[test]
    fn test_duplicate_email_is_rejected_without_insert() {
        let store = MemoryUserStore::new();
        block_on(store.create_user(user("Alice", "a@x.com"))).unwrap();

        let result = block_on(store.create_user(user("Other", "a@x.com")));

        assert!(matches!(result, Err(ApiError::Conflict(_))));
        assert_eq!(block_on(store.len()), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_store_one_record() {
        let store = std::sync::Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user(user("Dup", "dup@x.com")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }
}
