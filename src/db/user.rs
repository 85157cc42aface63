use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }

    /// Authority keys granted by this role, as carried in the access token.
    pub fn authorities(&self) -> &'static [&'static str] {
        match self {
            UserRole::User => &["ROLE_USER"],
            UserRole::Admin => &["ROLE_ADMIN"],
        }
    }
}

/// A resolved principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip)]
    pub id: i64,
    /// Stable public identifier
    pub uuid: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    uuid: String,
    email: String,
    name: String,
    avatar_url: Option<String>,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            email: row.email,
            name: row.name,
            avatar_url: row.avatar_url,
            role: UserRole::from_str(&row.role),
        }
    }
}

/// Canonical form of an email address used as the lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str = "id, uuid, email, name, avatar_url, role";

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the user on first federated login, otherwise refresh name and avatar.
    /// Role is only set on creation. Returns the stored user.
    pub async fn upsert_federated(
        &self,
        email: &str,
        name: &str,
        avatar_url: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let uuid = uuid::Uuid::new_v4().to_string();
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (uuid, email, name, avatar_url, role) VALUES (?, ?, ?, ?, 'user')
             ON CONFLICT(email) DO UPDATE SET
                name = excluded.name,
                avatar_url = excluded.avatar_url,
                updated_at = datetime('now')
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&uuid)
        .bind(normalize_email(email))
        .bind(name)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Set the role for the user with the given email.
    pub async fn set_role(&self, email: &str, role: UserRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET role = ?, updated_at = datetime('now') WHERE email = ?",
        )
        .bind(role.as_str())
        .bind(normalize_email(email))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by ID.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}
