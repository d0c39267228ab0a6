use crate::domain::repository::IngredientRepository;
use crate::domain::types::Ingredient;
use crate::error::RecipesServiceError;

pub struct ListIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> ListIngredientsUseCase<R> {
    /// A blank `name` lists everything.
    pub async fn execute(&self, name: Option<&str>) -> Result<Vec<Ingredient>, RecipesServiceError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        self.repo.list(name).await
    }
}

pub struct GetIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> GetIngredientUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Ingredient, RecipesServiceError> {
        self.repo
            .find(id)
            .await?
            .ok_or(RecipesServiceError::IngredientNotFound)
    }
}
