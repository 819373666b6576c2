//! By-id memoization in front of [`UserRepository::get_by_id`].
//!
//! Entries hold the stored record, never the public view. Every mutation
//! in [`crate::UserService`] invalidates the affected id after its write.

use core_config::{ConfigError, FromEnv, env_parse_optional};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// Cache settings.
///
/// Environment variables:
/// - `USER_CACHE_TTL_SECONDS` (optional; unset keeps entries until invalidated)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserCacheConfig {
    pub ttl: Option<Duration>,
}

impl UserCacheConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

impl FromEnv for UserCacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let ttl = env_parse_optional::<u64>("USER_CACHE_TTL_SECONDS")?.map(Duration::from_secs);
        Ok(Self { ttl })
    }
}

#[derive(Debug)]
struct Entry {
    user: User,
    loaded_at: Instant,
}

#[derive(Debug, Default)]
struct Entries {
    /// Bumped on every invalidation so a load that raced it is not stored.
    generation: u64,
    by_id: HashMap<Uuid, Entry>,
}

pub struct UserCache<R: UserRepository> {
    repository: Arc<R>,
    entries: RwLock<Entries>,
    ttl: Option<Duration>,
}

impl<R: UserRepository> UserCache<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, UserCacheConfig::default())
    }

    pub fn with_config(repository: Arc<R>, config: UserCacheConfig) -> Self {
        Self {
            repository,
            entries: RwLock::new(Entries::default()),
            ttl: config.ttl,
        }
    }

    /// Cached record for `id`, loading it from the store on a miss.
    pub async fn get_entity(&self, id: Uuid) -> UserResult<User> {
        let generation = {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.by_id.get(&id) {
                if !self.is_expired(entry) {
                    tracing::trace!(user_id = %id, "User cache hit");
                    return Ok(entry.user.clone());
                }
            }
            entries.generation
        };

        tracing::trace!(user_id = %id, "User cache miss");
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut entries = self.entries.write().await;
        if entries.generation == generation {
            entries.by_id.insert(
                id,
                Entry {
                    user: user.clone(),
                    loaded_at: Instant::now(),
                },
            );
        }

        Ok(user)
    }

    /// Drops any entry for `id`. No-op when absent.
    pub async fn invalidate(&self, id: Uuid) {
        let mut entries = self.entries.write().await;
        entries.generation = entries.generation.wrapping_add(1);
        if entries.by_id.remove(&id).is_some() {
            tracing::trace!(user_id = %id, "Evicted user from cache");
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.loaded_at.elapsed() >= ttl)
    }
}
