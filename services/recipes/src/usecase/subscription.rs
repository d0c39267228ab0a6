use foodgram_domain::pagination::PageRequest;

use crate::domain::repository::{SubscriptionRepository, UserRepository};
use crate::domain::types::SubscriptionItem;
use crate::error::RecipesServiceError;

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<S: SubscriptionRepository, U: UserRepository> {
    pub repo: S,
    pub users: U,
}

impl<S: SubscriptionRepository, U: UserRepository> SubscribeUseCase<S, U> {
    pub async fn execute(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<SubscriptionItem, RecipesServiceError> {
        if user_id == author_id {
            return Err(RecipesServiceError::SelfSubscription);
        }
        if self.users.find(author_id, None).await?.is_none() {
            return Err(RecipesServiceError::UserNotFound);
        }
        if !self.repo.add(user_id, author_id).await? {
            return Err(RecipesServiceError::SubscriptionAlreadyExists);
        }
        self.repo
            .get(user_id, author_id, recipes_limit)
            .await?
            .ok_or(RecipesServiceError::SubscriptionNotFound)
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<S: SubscriptionRepository, U: UserRepository> {
    pub repo: S,
    pub users: U,
}

impl<S: SubscriptionRepository, U: UserRepository> UnsubscribeUseCase<S, U> {
    pub async fn execute(&self, user_id: i32, author_id: i32) -> Result<(), RecipesServiceError> {
        if self.users.find(author_id, None).await?.is_none() {
            return Err(RecipesServiceError::UserNotFound);
        }
        if !self.repo.remove(user_id, author_id).await? {
            return Err(RecipesServiceError::SubscriptionNotFound);
        }
        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<S: SubscriptionRepository> {
    pub repo: S,
}

impl<S: SubscriptionRepository> ListSubscriptionsUseCase<S> {
    pub async fn execute(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<(Vec<SubscriptionItem>, u64), RecipesServiceError> {
        self.repo.list(user_id, page.clamped(), recipes_limit).await
    }
}
