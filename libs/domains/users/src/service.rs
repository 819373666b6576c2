use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cache::{UserCache, UserCacheConfig};
use crate::error::{UserError, UserResult};
use crate::models::{BanUser, CreateUser, UpdateUser, User, UserResponse};
use crate::repository::{UserRepository, names_match};

/// Service layer for user lifecycle logic.
///
/// Owns name uniqueness and cache invalidation: every mutation persists
/// first, then evicts the record's cache entry before returning.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    cache: Arc<UserCache<R>>,
    /// Serialises name check-then-write sequences.
    name_lock: Arc<Mutex<()>>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            cache: self.cache.clone(),
            name_lock: self.name_lock.clone(),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_cache_config(repository, UserCacheConfig::default())
    }

    pub fn with_cache_config(repository: R, config: UserCacheConfig) -> Self {
        let repository = Arc::new(repository);
        let cache = Arc::new(UserCache::with_config(repository.clone(), config));

        Self {
            repository,
            cache,
            name_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn cache(&self) -> &Arc<UserCache<R>> {
        &self.cache
    }

    /// Create a new user with the `user` authority
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        tracing::debug!(name = %input.name, "Creating user");

        let _guard = self.name_lock.lock().await;
        self.ensure_name_available(&input.name).await?;

        let user = User::new(input.name, input.preferred_categories);
        let created = self.repository.save(user).await?;

        tracing::info!(user_id = %created.id, name = %created.name, "User created");
        Ok(created.into())
    }

    /// Rename and/or replace the preferred categories of a user
    pub async fn update_user(&self, input: UpdateUser) -> UserResult<UserResponse> {
        tracing::debug!(user_id = %input.id, "Updating user");

        let id = input.id;
        let mut user = self.cache.get_entity(id).await?;

        // Only a real rename needs the uniqueness check and the name lock.
        let _guard = if names_match(&user.name, &input.name) {
            None
        } else {
            let guard = self.name_lock.lock().await;
            self.ensure_name_available(&input.name).await?;
            Some(guard)
        };

        user.apply_update(input);
        let updated = self.repository.save(user).await?;
        self.cache.invalidate(id).await;

        tracing::info!(user_id = %id, name = %updated.name, "User updated");
        Ok(updated.into())
    }

    /// Block logins until now + the requested duration
    pub async fn ban_user(&self, id: Uuid, ban: BanUser) -> UserResult<UserResponse> {
        tracing::debug!(user_id = %id, duration = ban.duration, unit = ?ban.unit, "Banning user");
        let duration = ban.to_duration()?;

        let mut user = self.cache.get_entity(id).await?;

        let expiration = Utc::now().checked_add_signed(duration).ok_or_else(|| {
            UserError::Validation(format!("Ban of {} {:?} is out of range", ban.duration, ban.unit))
        })?;

        user.ban_until(expiration);
        let banned = self.repository.save(user).await?;
        self.cache.invalidate(id).await;

        tracing::info!(user_id = %id, until = %expiration, "User banned");
        Ok(banned.into())
    }

    /// Grant the admin authority. Applying it again changes nothing.
    pub async fn give_admin_authority_to_user(&self, id: Uuid) -> UserResult<UserResponse> {
        tracing::debug!(user_id = %id, "Granting admin authority");

        let mut user = self.cache.get_entity(id).await?;
        user.grant_admin();

        let updated = self.repository.save(user).await?;
        self.cache.invalidate(id).await;

        tracing::info!(user_id = %id, "Admin authority granted");
        Ok(updated.into())
    }

    /// Delete a user
    pub async fn delete_by_id(&self, id: Uuid) -> UserResult<()> {
        tracing::debug!(user_id = %id, "Deleting user");

        self.cache.get_entity(id).await?;

        let deleted = self.repository.delete_by_id(id).await?;
        self.cache.invalidate(id).await;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Get a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> UserResult<UserResponse> {
        tracing::debug!(user_id = %id, "Retrieving user");
        let user = self.cache.get_entity(id).await?;
        Ok(user.into())
    }

    /// Stored record for `id`, served from the cache when present.
    pub async fn find_entity_by_id(&self, id: Uuid) -> UserResult<User> {
        self.cache.get_entity(id).await
    }

    /// All users ordered by name. Always reads the store.
    pub async fn find_all(&self) -> UserResult<Vec<UserResponse>> {
        tracing::debug!("Retrieving all users");
        let users = self.repository.list_sorted_by_name().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Fails with `UserError::Exists` when `name` is taken (ignoring case).
    pub async fn check_if_user_exists(&self, name: &str) -> UserResult<()> {
        tracing::debug!(name = %name, "Checking user name");
        self.ensure_name_available(name).await
    }

    pub async fn evict_user_cache(&self, id: Uuid) {
        self.cache.invalidate(id).await;
    }

    async fn ensure_name_available(&self, name: &str) -> UserResult<()> {
        if self.repository.exists_by_name_case_insensitive(name).await? {
            return Err(UserError::Exists(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Authority, BanUnit, Category};
    use crate::repository::{InMemoryUserRepository, MockUserRepository, YieldingUserRepository};
    use mockall::predicate::eq;

    fn create(name: &str) -> CreateUser {
        CreateUser {
            name: name.to_string(),
            preferred_categories: vec![],
        }
    }

    fn update(id: Uuid, name: &str) -> UpdateUser {
        UpdateUser {
            id,
            name: name.to_string(),
            preferred_categories: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_name() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_exists_by_name_case_insensitive()
            .withf(|name| name == "Mario")
            .returning(|_| Ok(true));
        mock_repo.expect_save().never();

        let service = UserService::new(mock_repo);
        let result = service.create_user(create("Mario")).await;

        assert!(matches!(result, Err(UserError::Exists(name)) if name == "Mario"));
    }

    #[tokio::test]
    async fn test_create_user_assigns_user_authority() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_exists_by_name_case_insensitive()
            .returning(|_| Ok(false));
        mock_repo
            .expect_save()
            .withf(|user| user.authorities == vec![Authority::User] && user.ban_expiration.is_none())
            .times(1)
            .returning(Ok);

        let service = UserService::new(mock_repo);
        let created = service.create_user(create("luigi")).await.unwrap();

        assert_eq!(created.name, "luigi");
    }

    #[tokio::test]
    async fn test_create_user_accepts_any_name_length() {
        let service = UserService::new(InMemoryUserRepository::new());
        let long = "x".repeat(101);

        assert_eq!(service.create_user(create(&long)).await.unwrap().name, long);
        assert_eq!(service.create_user(create("")).await.unwrap().name, "");
        assert!(matches!(
            service.create_user(create("")).await,
            Err(UserError::Exists(_))
        ));
    }

    #[tokio::test]
    async fn test_uniqueness_ignores_case() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.create_user(create("Mario")).await.unwrap();

        assert!(matches!(
            service.create_user(create("mARIO")).await,
            Err(UserError::Exists(_))
        ));
        assert!(service.create_user(create("Mario2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_same_name_admit_one() {
        // The store yields after the existence check, so both creates
        // reach it before either saves unless the name lock holds.
        let service = UserService::new(YieldingUserRepository::default());

        let (a, b) = tokio::join!(
            service.create_user(create("peach")),
            service.create_user(create("PEACH"))
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!(matches!(a.err().or(b.err()), Some(UserError::Exists(_))));
        assert_eq!(service.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_renames_to_same_name_admit_one() {
        let service = UserService::new(YieldingUserRepository::default());
        let mario = service.create_user(create("mario")).await.unwrap();
        let luigi = service.create_user(create("luigi")).await.unwrap();

        let (a, b) = tokio::join!(
            service.update_user(update(mario.id, "peach")),
            service.update_user(update(luigi.id, "Peach"))
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!(matches!(a.err().or(b.err()), Some(UserError::Exists(_))));

        let peaches = service
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| names_match(&u.name, "peach"))
            .count();
        assert_eq!(peaches, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_fails_without_mutation() {
        let id = Uuid::now_v7();

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(|_| Ok(None));
        mock_repo.expect_save().never();
        mock_repo.expect_delete_by_id().never();

        let service = UserService::new(mock_repo);

        assert!(matches!(service.find_by_id(id).await, Err(UserError::NotFound(e)) if e == id));
        assert!(matches!(
            service.update_user(update(id, "mario")).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.ban_user(id, BanUser::new(1, BanUnit::Hours)).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.give_admin_authority_to_user(id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(service.delete_by_id(id).await, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_id_with_blank_name_is_not_found() {
        let service = UserService::new(InMemoryUserRepository::new());
        let id = Uuid::now_v7();

        let result = service.update_user(update(id, "")).await;

        assert!(matches!(result, Err(UserError::NotFound(e)) if e == id));
    }

    #[tokio::test]
    async fn test_rename_in_different_case_skips_existence_check() {
        let user = User::new("mario".into(), vec![]);
        let id = user.id;

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        mock_repo.expect_exists_by_name_case_insensitive().never();
        mock_repo.expect_save().times(1).returning(Ok);

        let service = UserService::new(mock_repo);
        let updated = service.update_user(update(id, "MARIO")).await.unwrap();

        assert_eq!(updated.name, "MARIO");
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_fails() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.create_user(create("mario")).await.unwrap();
        let luigi = service.create_user(create("luigi")).await.unwrap();

        let result = service.update_user(update(luigi.id, "Mario")).await;

        assert!(matches!(result, Err(UserError::Exists(name)) if name == "Mario"));
        assert_eq!(service.find_by_id(luigi.id).await.unwrap().name, "luigi");
    }

    #[tokio::test]
    async fn test_reads_after_mutation_are_fresh() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(create("mario")).await.unwrap();
        let id = created.id;

        // Seed the cache
        service.find_by_id(id).await.unwrap();
        assert_eq!(service.cache().len().await, 1);

        let category = Category {
            id: Uuid::now_v7(),
            name: "racing".into(),
            background: None,
        };
        service
            .update_user(UpdateUser {
                id,
                name: "super mario".into(),
                preferred_categories: vec![category.clone()],
            })
            .await
            .unwrap();
        let fresh = service.find_by_id(id).await.unwrap();
        assert_eq!(fresh.name, "super mario");
        assert_eq!(fresh.preferred_categories, vec![category]);

        service.give_admin_authority_to_user(id).await.unwrap();
        assert!(service.find_entity_by_id(id).await.unwrap().has_authority(Authority::Admin));

        service.ban_user(id, BanUser::new(1, BanUnit::Hours)).await.unwrap();
        assert!(service.find_entity_by_id(id).await.unwrap().is_banned_at(Utc::now()));

        service.delete_by_id(id).await.unwrap();
        assert!(matches!(service.find_by_id(id).await, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ban_sets_expiration_in_future() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(create("mario")).await.unwrap();

        let before = Utc::now();
        service
            .ban_user(created.id, BanUser::new(2, BanUnit::Days))
            .await
            .unwrap();

        let stored = service.find_entity_by_id(created.id).await.unwrap();
        let expiration = stored.ban_expiration.unwrap();
        assert!(expiration >= before + chrono::Duration::days(2));
        assert!(expiration <= Utc::now() + chrono::Duration::days(2));
    }

    #[tokio::test]
    async fn test_ban_rejects_invalid_duration_before_lookup() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_id().never();

        let service = UserService::new(mock_repo);
        let result = service
            .ban_user(Uuid::now_v7(), BanUser::new(0, BanUnit::Seconds))
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_admin_elevation_is_idempotent() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(create("mario")).await.unwrap();

        for _ in 0..2 {
            service.give_admin_authority_to_user(created.id).await.unwrap();
            let stored = service.find_entity_by_id(created.id).await.unwrap();
            assert_eq!(stored.authorities, vec![Authority::User, Authority::Admin]);
        }
    }

    #[tokio::test]
    async fn test_find_all_is_sorted_by_name() {
        let service = UserService::new(InMemoryUserRepository::new());
        for name in ["b", "A", "c"] {
            service.create_user(create(name)).await.unwrap();
        }

        let names: Vec<String> = service
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();

        assert_eq!(names, vec!["A", "b", "c"]);
    }

    #[tokio::test]
    async fn test_check_if_user_exists() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_exists_by_name_case_insensitive()
            .withf(|name| name == "taken")
            .returning(|_| Ok(true));
        mock_repo
            .expect_exists_by_name_case_insensitive()
            .withf(|name| name == "free")
            .returning(|_| Ok(false));

        let service = UserService::new(mock_repo);

        assert!(matches!(
            service.check_if_user_exists("taken").await,
            Err(UserError::Exists(name)) if name == "taken"
        ));
        assert!(service.check_if_user_exists("free").await.is_ok());
    }
}
