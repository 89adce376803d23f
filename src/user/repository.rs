//! User persistence port and its PostgreSQL adapter.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use crate::error::{Result, ServerError};
use crate::user::{Location, User};

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "refuel";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Port for user persistence operations.
///
/// Adapters must enforce `email` uniqueness and per-record atomicity; nothing
/// above this trait guards concurrent writers, last write wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with a conflict when `email` is taken.
    async fn create(&self, user: &User) -> Result<()>;

    /// Find a user by `id`.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Find a user by `email`.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Overwrite the mutable profile fields of an existing user.
    async fn update(&self, user: &User) -> Result<()>;

    /// Persist last-known coordinates, leaving every other field untouched.
    /// Returns the updated record.
    async fn set_location(
        &self,
        id: &str,
        location: Location,
    ) -> Result<Option<User>>;

    /// All users, unordered.
    async fn list(&self) -> Result<Vec<User>>;
}

/// Row as stored on PostgreSQL.
///
/// `location` is flattened into two nullable columns, both set or both null.
#[derive(Debug, FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    phone_number: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: chrono::NaiveDate,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let location = record.latitude.zip(record.longitude).map(
            |(latitude, longitude)| Location {
                latitude,
                longitude,
            },
        );

        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            phone_number: record.phone_number,
            location,
            created_at: record.created_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, name, email, password_hash, phone_number,
           latitude, longitude, created_at
    FROM users
"#;

/// PostgreSQL user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new [`PgUserStore`] from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Init database connection pool.
    pub async fn connect(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
    ) -> std::result::Result<Self, sqlx::Error> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new()
            .max_connections(pool)
            .connect(&addr)
            .await?;

        tracing::info!(%hostname, %db, "postgres connected");

        Ok(Self { pool })
    }

    /// Underlying pool, used to run migrations on start.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn conflict_on_unique(err: sqlx::Error) -> ServerError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ServerError::Conflict
        },
        _ => ServerError::Sql(err),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone_number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            &format!("{SELECT_USER} WHERE id = $1"),
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            &format!("{SELECT_USER} WHERE email = $1"),
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    async fn update(&self, user: &User) -> Result<()> {
        // Allow-listed columns only: email and password_hash are not
        // reachable through this statement.
        let result = sqlx::query(
            r#"UPDATE users SET name = $2, phone_number = $3 WHERE id = $1"#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.phone_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound);
        }

        Ok(())
    }

    async fn set_location(
        &self,
        id: &str,
        location: Location,
    ) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET latitude = $2, longitude = $3
            WHERE id = $1
            RETURNING id, name, email, password_hash, phone_number,
                      latitude, longitude, created_at
            "#,
        )
        .bind(id)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(SELECT_USER)
            .fetch_all(&self.pool)
            .await?;

        Ok(records.into_iter().map(User::from).collect())
    }
}
