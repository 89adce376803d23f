//! In-memory user store.
//!
//! Same contract as the PostgreSQL adapter, used to exercise handlers and
//! services without a live database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, ServerError};
use crate::user::{Location, User, UserStore};

/// [`UserStore`] backed by a guarded map.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    /// Create a new, empty [`MemoryUserStore`].
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, User>> {
        self.users.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, User>> {
        self.users.write().unwrap_or_else(|err| err.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        let mut users = self.write();

        if users.values().any(|u| u.email == user.email) {
            return Err(ServerError::Conflict);
        }

        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.read().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.read().values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut users = self.write();

        let Some(stored) = users.get_mut(&user.id) else {
            return Err(ServerError::NotFound);
        };

        // Same allow-list as the SQL adapter.
        stored.name = user.name.clone();
        stored.phone_number = user.phone_number.clone();
        Ok(())
    }

    async fn set_location(
        &self,
        id: &str,
        location: Location,
    ) -> Result<Option<User>> {
        let mut users = self.write();

        Ok(users.get_mut(id).map(|user| {
            user.location = Some(location);
            user.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.into(),
            name: "Asha".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            phone_number: "5551234".into(),
            location: None,
            created_at: chrono::Utc::now().date_naive(),
        }
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let store = MemoryUserStore::new();

        store.create(&user("a", "asha@x.com")).await.unwrap();
        let err = store.create(&user("b", "asha@x.com")).await.unwrap_err();
        assert!(matches!(err, ServerError::Conflict));
    }

    #[tokio::test]
    async fn test_update_does_not_touch_credentials() {
        let store = MemoryUserStore::new();
        store.create(&user("a", "asha@x.com")).await.unwrap();

        let mut patched = user("a", "evil@x.com");
        patched.name = "New".into();
        patched.password_hash = "overwritten".into();
        store.update(&patched).await.unwrap();

        let stored = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(stored.name, "New");
        assert_eq!(stored.email, "asha@x.com");
        assert_eq!(stored.password_hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn test_set_location_roundtrip() {
        let store = MemoryUserStore::new();
        store.create(&user("a", "asha@x.com")).await.unwrap();

        let updated = store
            .set_location(
                "a",
                Location {
                    latitude: 12.9,
                    longitude: 77.6,
                },
            )
            .await
            .unwrap()
            .unwrap();

        let location = updated.location.unwrap();
        assert_eq!(location.latitude, 12.9);
        assert_eq!(location.longitude, 77.6);

        assert!(store.set_location("ghost", location).await.unwrap().is_none());
    }
}
