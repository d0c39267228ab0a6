use foodgram_domain::pagination::PageRequest;

use crate::domain::repository::UserRepository;
use crate::domain::types::{
    MAX_USERNAME_LEN, NewUser, User, UserProfile, validate_email, validate_username,
};
use crate::error::RecipesServiceError;

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct RegisterUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> RegisterUserUseCase<R> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, RecipesServiceError> {
        let email = input.email.trim().to_lowercase();
        if !validate_email(&email) {
            return Err(RecipesServiceError::validation("email", "must be a valid email address"));
        }
        if !validate_username(&input.username) {
            return Err(RecipesServiceError::validation(
                "username",
                "must be 1-150 letters, digits or _ . @ + -",
            ));
        }
        check_name("first_name", &input.first_name)?;
        check_name("last_name", &input.last_name)?;

        let user = NewUser {
            email,
            username: input.username,
            first_name: input.first_name.trim().to_owned(),
            last_name: input.last_name.trim().to_owned(),
        };
        self.repo
            .create(&user)
            .await?
            .ok_or(RecipesServiceError::UserAlreadyExists)
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), RecipesServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecipesServiceError::validation(field, "must not be blank"));
    }
    if value.chars().count() > MAX_USERNAME_LEN {
        return Err(RecipesServiceError::validation(
            field,
            "must be at most 150 characters",
        ));
    }
    Ok(())
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(
        &self,
        user_id: i32,
        viewer: Option<i32>,
    ) -> Result<UserProfile, RecipesServiceError> {
        self.repo
            .find(user_id, viewer)
            .await?
            .ok_or(RecipesServiceError::UserNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<UserProfile>, u64), RecipesServiceError> {
        self.repo.list(viewer, page.clamped()).await
    }
}
