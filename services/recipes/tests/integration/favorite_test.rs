use foodgram_recipes::error::RecipesServiceError;
use foodgram_recipes::usecase::favorite::{AddFavoriteUseCase, RemoveFavoriteUseCase};

use crate::helpers::{MockLinkRepo, MockRecipeRepo, test_recipe, test_user};

fn recipes() -> MockRecipeRepo {
    MockRecipeRepo::new(vec![test_recipe(10, test_user(1), vec![])])
}

#[tokio::test]
async fn should_favorite_recipe_and_flag_it() {
    let usecase = AddFavoriteUseCase {
        repo: MockLinkRepo::new(vec![]),
        recipes: recipes(),
    };

    let recipe = usecase.execute(2, 10).await.unwrap();

    assert_eq!(recipe.id, 10);
    assert!(recipe.is_favorited);
}

#[tokio::test]
async fn should_reject_second_favorite_and_keep_one_row() {
    let repo = MockLinkRepo::new(vec![]);
    let links = repo.links_handle();
    let usecase = AddFavoriteUseCase {
        repo,
        recipes: recipes(),
    };

    usecase.execute(2, 10).await.unwrap();
    let result = usecase.execute(2, 10).await;

    assert!(
        matches!(result, Err(RecipesServiceError::FavoriteAlreadyExists)),
        "expected FavoriteAlreadyExists, got {result:?}"
    );
    assert_eq!(*links.lock().unwrap(), vec![(2, 10)]);
}

#[tokio::test]
async fn should_not_favorite_missing_recipe() {
    let repo = MockLinkRepo::new(vec![]);
    let links = repo.links_handle();
    let usecase = AddFavoriteUseCase {
        repo,
        recipes: recipes(),
    };

    let result = usecase.execute(2, 99).await;

    assert!(matches!(result, Err(RecipesServiceError::RecipeNotFound)));
    assert!(links.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_remove_existing_favorite() {
    let repo = MockLinkRepo::new(vec![(2, 10), (3, 10)]);
    let links = repo.links_handle();
    let usecase = RemoveFavoriteUseCase {
        repo,
        recipes: recipes(),
    };

    usecase.execute(2, 10).await.unwrap();

    assert_eq!(*links.lock().unwrap(), vec![(3, 10)]);
}

#[tokio::test]
async fn should_report_missing_favorite_on_remove() {
    let repo = MockLinkRepo::new(vec![(3, 10)]);
    let links = repo.links_handle();
    let usecase = RemoveFavoriteUseCase {
        repo,
        recipes: recipes(),
    };

    let result = usecase.execute(2, 10).await;

    assert!(matches!(result, Err(RecipesServiceError::FavoriteNotFound)));
    assert_eq!(links.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_report_missing_recipe_on_remove() {
    let usecase = RemoveFavoriteUseCase {
        repo: MockLinkRepo::new(vec![]),
        recipes: recipes(),
    };
    let result = usecase.execute(2, 99).await;
    assert!(matches!(result, Err(RecipesServiceError::RecipeNotFound)));
}
