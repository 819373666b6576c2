use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};

/// Role tokens a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    User,
    Admin,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::User => "user",
            Authority::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category a user prefers, referenced by value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Stored user record. Never serialized across the API boundary;
/// handlers return [`UserResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, immutable after creation
    pub id: Uuid,
    /// Display name, unique case-insensitively
    pub name: String,
    pub preferred_categories: Vec<Category>,
    /// Never empty, never contains duplicates
    pub authorities: Vec<Authority>,
    /// `None` = never banned; a past instant = ban has lapsed
    pub ban_expiration: Option<DateTime<Utc>>,
    /// Informational only
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh record with a new id and the `user` authority.
    pub fn new(name: String, preferred_categories: Vec<Category>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            preferred_categories,
            authorities: vec![Authority::User],
            ban_expiration: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while `ban_expiration` lies strictly after `now`.
    pub fn is_banned_at(&self, now: DateTime<Utc>) -> bool {
        self.ban_expiration.is_some_and(|expiration| expiration > now)
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }

    pub fn apply_update(&mut self, update: UpdateUser) {
        self.name = update.name;
        self.preferred_categories = update.preferred_categories;
        self.updated_at = Utc::now();
    }

    pub fn ban_until(&mut self, expiration: DateTime<Utc>) {
        self.ban_expiration = Some(expiration);
        self.updated_at = Utc::now();
    }

    /// Sets authorities to exactly `{user, admin}`.
    pub fn grant_admin(&mut self) {
        self.authorities = vec![Authority::User, Authority::Admin];
        self.updated_at = Utc::now();
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub preferred_categories: Vec<Category>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            preferred_categories: user.preferred_categories,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            preferred_categories: user.preferred_categories.clone(),
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    /// Free text; only uniqueness is enforced
    pub name: String,
    #[serde(default)]
    pub preferred_categories: Vec<Category>,
}

/// DTO for updating an existing user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub id: Uuid,
    /// Free text; only uniqueness is enforced
    pub name: String,
    #[serde(default)]
    pub preferred_categories: Vec<Category>,
}

/// Time unit of a ban duration, written in duration-suffix style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BanUnit {
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
}

/// DTO for banning a user for `duration` × `unit`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BanUser {
    #[validate(range(min = 1))]
    pub duration: i64,
    pub unit: BanUnit,
}

impl BanUser {
    pub fn new(duration: i64, unit: BanUnit) -> Self {
        Self { duration, unit }
    }

    /// Ban length. Fails on non-positive or overflowing amounts.
    pub fn to_duration(&self) -> UserResult<chrono::Duration> {
        if self.duration <= 0 {
            return Err(UserError::Validation(format!(
                "Ban duration must be positive, got {}",
                self.duration
            )));
        }

        let duration = match self.unit {
            BanUnit::Milliseconds => chrono::Duration::try_milliseconds(self.duration),
            BanUnit::Seconds => chrono::Duration::try_seconds(self.duration),
            BanUnit::Minutes => chrono::Duration::try_minutes(self.duration),
            BanUnit::Hours => chrono::Duration::try_hours(self.duration),
            BanUnit::Days => chrono::Duration::try_days(self.duration),
        };

        duration.ok_or_else(|| {
            UserError::Validation(format!(
                "Ban duration {} {:?} is out of range",
                self.duration, self.unit
            ))
        })
    }
}

/// DTO for logging in by id
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    pub id: Uuid,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}
