use std::sync::Arc;

use rand::RngCore;

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::user::{Location, Profile, PublicUser, User, UserStore};

/// Bytes of entropy behind a user id, hex-encoded to 24 characters.
const ID_LENGTH: usize = 12;

/// Account operations on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    pwd: Arc<PasswordManager>,
}

/// Allow-listed profile fields a user may change.
///
/// `email` and the password hash are deliberately unreachable from here.
#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(store: Arc<dyn UserStore>, pwd: Arc<PasswordManager>) -> Self {
        Self { store, pwd }
    }

    /// Register a new account with a freshly hashed password.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone_number: &str,
    ) -> Result<User> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(ServerError::Conflict);
        }

        let user = User {
            id: generate_id(),
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: self.pwd.hash_password(password)?,
            phone_number: phone_number.to_owned(),
            location: None,
            created_at: chrono::Utc::now().date_naive(),
        };

        // The store's unique index still backs the pre-check above.
        self.store.create(&user).await?;
        Ok(user)
    }

    /// Check credentials, returning one error for both unknown email and
    /// wrong password.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Err(ServerError::InvalidCredentials);
        };

        if !self.pwd.verify_password(password, &user.password_hash) {
            return Err(ServerError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Resolve a token subject to its stored record.
    pub async fn find(&self, id: &str) -> Result<User> {
        self.store.find_by_id(id).await?.ok_or(ServerError::NotFound)
    }

    /// Owner view of an account.
    pub async fn profile(&self, id: &str) -> Result<Profile> {
        Ok(self.find(id).await?.into())
    }

    /// Apply an allow-listed partial update onto the current record.
    pub async fn update_profile(
        &self,
        id: &str,
        patch: ProfilePatch,
    ) -> Result<Profile> {
        // Re-read before writing derived fields.
        let mut user = self.find(id).await?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(phone_number) = patch.phone_number {
            user.phone_number = phone_number;
        }

        self.store.update(&user).await?;
        Ok(user.into())
    }

    /// Persist last-known coordinates of an account.
    pub async fn set_location(
        &self,
        id: &str,
        location: Location,
    ) -> Result<PublicUser> {
        self.store
            .set_location(id, location)
            .await?
            .map(PublicUser::from)
            .ok_or(ServerError::NotFound)
    }

    /// Public projection of every account.
    pub async fn list(&self) -> Result<Vec<PublicUser>> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }
}

fn generate_id() -> String {
    let mut bytes = [0u8; ID_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2 as ArgonConfig;
    use crate::user::MemoryUserStore;

    fn service() -> UserService {
        let pwd = PasswordManager::new(Some(ArgonConfig {
            memory_cost: 8 * 1024,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        }))
        .unwrap();

        UserService::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(pwd),
        )
    }

    async fn register_asha(users: &UserService) -> User {
        users
            .register("Asha", "asha@x.com", "pw123", "5551234")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_assigns_id_and_hashes_password() {
        let users = service();
        let user = register_asha(&users).await;

        assert_eq!(user.id.len(), ID_LENGTH * 2);
        assert_ne!(user.password_hash, "pw123");
        assert!(user.location.is_none());
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let users = service();
        register_asha(&users).await;

        let err = users
            .register("Asha Again", "asha@x.com", "other", "5550000")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Conflict));
    }

    #[tokio::test]
    async fn test_authenticate_does_not_leak_which_check_failed() {
        let users = service();
        register_asha(&users).await;

        let wrong_password =
            users.authenticate("asha@x.com", "nope").await.unwrap_err();
        let unknown_email =
            users.authenticate("ghost@x.com", "pw123").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, ServerError::InvalidCredentials));
        assert!(matches!(unknown_email, ServerError::InvalidCredentials));

        assert!(users.authenticate("asha@x.com", "pw123").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_changes_only_patched_fields() {
        let users = service();
        let user = register_asha(&users).await;

        let profile = users
            .update_profile(
                &user.id,
                ProfilePatch {
                    name: Some("X".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.name, "X");
        assert_eq!(profile.email, "asha@x.com");
        assert_eq!(profile.phone_number, "5551234");

        let err = users
            .update_profile("unknown", ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound));
    }

    #[tokio::test]
    async fn test_set_location_then_read_back() {
        let users = service();
        let user = register_asha(&users).await;

        let public = users
            .set_location(
                &user.id,
                Location {
                    latitude: 12.9,
                    longitude: 77.6,
                },
            )
            .await
            .unwrap();

        let location = public.location.unwrap();
        assert_eq!(location.latitude, 12.9);
        assert_eq!(location.longitude, 77.6);

        let listed = users.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].location, Some(location));
    }
}
