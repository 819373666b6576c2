use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::User;

/// Repository trait for User persistence
///
/// Every call is a single round trip; `save` is atomic per record
/// (last writer wins on the whole record).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Insert or replace the record keyed by `user.id`
    async fn save(&self, user: User) -> UserResult<User>;

    /// Delete a user by ID, returning whether a record was removed
    async fn delete_by_id(&self, id: Uuid) -> UserResult<bool>;

    /// All users ordered by name (case-sensitive), ties by insertion order
    async fn list_sorted_by_name(&self) -> UserResult<Vec<User>>;

    /// Whether any user's name equals `name` ignoring case
    async fn exists_by_name_case_insensitive(&self, name: &str) -> UserResult<bool>;
}

/// Case-insensitive name comparison used by every store implementation.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Default)]
struct Table {
    next_seq: u64,
    rows: HashMap<Uuid, (u64, User)>,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(|(_, user)| user.clone()))
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let mut table = self.table.write().await;

        // Replacing keeps the first insertion slot.
        let seq = match table.rows.get(&user.id) {
            Some((seq, _)) => *seq,
            None => {
                let seq = table.next_seq;
                table.next_seq += 1;
                seq
            }
        };

        table.rows.insert(user.id, (seq, user.clone()));
        tracing::trace!(user_id = %user.id, "Saved user");
        Ok(user)
    }

    async fn delete_by_id(&self, id: Uuid) -> UserResult<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn list_sorted_by_name(&self) -> UserResult<Vec<User>> {
        let table = self.table.read().await;

        let mut rows: Vec<&(u64, User)> = table.rows.values().collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| a.name.cmp(&b.name).then(seq_a.cmp(seq_b)));

        Ok(rows.into_iter().map(|(_, user)| user.clone()).collect())
    }

    async fn exists_by_name_case_insensitive(&self, name: &str) -> UserResult<bool> {
        let table = self.table.read().await;
        Ok(table.rows.values().any(|(_, u)| names_match(&u.name, name)))
    }
}

/// Store that suspends after every read, so concurrent callers interleave
/// between a read and the write that depends on it.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct YieldingUserRepository(pub(crate) InMemoryUserRepository);

#[cfg(test)]
#[async_trait]
impl UserRepository for YieldingUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let user = self.0.get_by_id(id).await?;
        tokio::task::yield_now().await;
        Ok(user)
    }

    async fn save(&self, user: User) -> UserResult<User> {
        self.0.save(user).await
    }

    async fn delete_by_id(&self, id: Uuid) -> UserResult<bool> {
        self.0.delete_by_id(id).await
    }

    async fn list_sorted_by_name(&self) -> UserResult<Vec<User>> {
        self.0.list_sorted_by_name().await
    }

    async fn exists_by_name_case_insensitive(&self, name: &str) -> UserResult<bool> {
        let exists = self.0.exists_by_name_case_insensitive(name).await?;
        tokio::task::yield_now().await;
        Ok(exists)
    }
}
