use foodgram_domain::pagination::PageRequest;
use foodgram_recipes::domain::types::{IngredientAmount, RecipeFilter};
use foodgram_recipes::error::RecipesServiceError;
use foodgram_recipes::usecase::recipe::{
    CreateRecipeInput, CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeLinkUseCase,
    ListRecipesUseCase, UpdateRecipeInput, UpdateRecipeUseCase,
};

use crate::helpers::{
    MockIngredientRepo, MockMediaStorage, MockRecipeRepo, MockTagRepo, PNG_DATA_URI,
    test_ingredient, test_recipe, test_tag, test_user,
};

fn create_usecase(
    repo: MockRecipeRepo,
    storage: MockMediaStorage,
) -> CreateRecipeUseCase<MockRecipeRepo, MockTagRepo, MockIngredientRepo, MockMediaStorage> {
    CreateRecipeUseCase {
        tags: MockTagRepo {
            tags: repo.tags.clone(),
        },
        ingredients: MockIngredientRepo {
            ingredients: repo.ingredients.clone(),
        },
        repo,
        storage,
    }
}

fn update_usecase(
    repo: MockRecipeRepo,
    storage: MockMediaStorage,
) -> UpdateRecipeUseCase<MockRecipeRepo, MockTagRepo, MockIngredientRepo, MockMediaStorage> {
    UpdateRecipeUseCase {
        tags: MockTagRepo {
            tags: repo.tags.clone(),
        },
        ingredients: MockIngredientRepo {
            ingredients: repo.ingredients.clone(),
        },
        repo,
        storage,
    }
}

fn catalog_repo() -> MockRecipeRepo {
    MockRecipeRepo::with_catalog(
        vec![test_user(1), test_user(2)],
        vec![test_tag(1, "breakfast"), test_tag(2, "dinner")],
        vec![
            test_ingredient(1, "flour", "g"),
            test_ingredient(2, "milk", "ml"),
        ],
    )
}

fn pancakes(ingredients: Vec<IngredientAmount>) -> CreateRecipeInput {
    CreateRecipeInput {
        name: "  Pancakes ".to_owned(),
        text: "Whisk and fry.".to_owned(),
        cooking_time: 20,
        image: PNG_DATA_URI.to_owned(),
        tags: vec![1],
        ingredients,
    }
}

fn amount(id: i32, amount: i32) -> IngredientAmount {
    IngredientAmount { id, amount }
}

// ── CreateRecipeUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_recipe_with_expanded_tags_and_ingredients() {
    let repo = catalog_repo();
    let recipes = repo.recipes_handle();
    let storage = MockMediaStorage::default();
    let files = storage.files_handle();
    let usecase = create_usecase(repo, storage);

    let recipe = usecase
        .execute(1, pancakes(vec![amount(1, 200), amount(2, 300)]))
        .await
        .unwrap();

    assert_eq!(recipe.name, "Pancakes");
    assert_eq!(recipe.author.user.id, 1);
    assert_eq!(recipe.tags[0].slug, "breakfast");
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.ingredients[1].ingredient.name, "milk");
    assert_eq!(recipe.ingredients[1].amount, 300);
    assert_eq!(recipes.lock().unwrap().len(), 1);
    assert_eq!(recipe.image.as_deref(), files.lock().unwrap().first().map(String::as_str));
}

#[tokio::test]
async fn should_reject_duplicate_ingredients_without_writing() {
    let repo = catalog_repo();
    let recipes = repo.recipes_handle();
    let storage = MockMediaStorage::default();
    let files = storage.files_handle();
    let usecase = create_usecase(repo, storage);

    let result = usecase
        .execute(1, pancakes(vec![amount(1, 5), amount(1, 3)]))
        .await;

    assert!(
        matches!(result, Err(RecipesServiceError::InvalidIngredients(_))),
        "expected InvalidIngredients, got {result:?}"
    );
    assert!(recipes.lock().unwrap().is_empty());
    assert!(files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_empty_ingredient_list() {
    let usecase = create_usecase(catalog_repo(), MockMediaStorage::default());
    let result = usecase.execute(1, pancakes(vec![])).await;
    assert!(matches!(
        result,
        Err(RecipesServiceError::InvalidIngredients(_))
    ));
}

#[tokio::test]
async fn should_reject_unknown_ingredient() {
    let usecase = create_usecase(catalog_repo(), MockMediaStorage::default());
    let result = usecase.execute(1, pancakes(vec![amount(99, 1)])).await;
    assert!(matches!(
        result,
        Err(RecipesServiceError::InvalidIngredients(_))
    ));
}

#[tokio::test]
async fn should_reject_out_of_range_amount() {
    let usecase = create_usecase(catalog_repo(), MockMediaStorage::default());
    let result = usecase.execute(1, pancakes(vec![amount(1, 0)])).await;
    assert!(matches!(
        result,
        Err(RecipesServiceError::InvalidIngredients(_))
    ));
}

#[tokio::test]
async fn should_reject_unknown_tag() {
    let usecase = create_usecase(catalog_repo(), MockMediaStorage::default());
    let mut input = pancakes(vec![amount(1, 100)]);
    input.tags = vec![1, 42];

    let result = usecase.execute(1, input).await;

    assert!(matches!(result, Err(RecipesServiceError::InvalidTags(_))));
}

#[tokio::test]
async fn should_reject_malformed_image() {
    let repo = catalog_repo();
    let recipes = repo.recipes_handle();
    let usecase = create_usecase(repo, MockMediaStorage::default());
    let mut input = pancakes(vec![amount(1, 100)]);
    input.image = "https://example.com/cat.png".to_owned();

    let result = usecase.execute(1, input).await;

    assert!(matches!(result, Err(RecipesServiceError::InvalidImage)));
    assert!(recipes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_cooking_time_below_one_minute() {
    let usecase = create_usecase(catalog_repo(), MockMediaStorage::default());
    let mut input = pancakes(vec![amount(1, 100)]);
    input.cooking_time = 0;

    let result = usecase.execute(1, input).await;

    assert!(matches!(
        result,
        Err(RecipesServiceError::Validation {
            field: "cooking_time",
            ..
        })
    ));
}

// ── UpdateRecipeUseCase ──────────────────────────────────────────────────────

fn seeded_repo() -> MockRecipeRepo {
    let repo = catalog_repo();
    repo.recipes
        .lock()
        .unwrap()
        .push(test_recipe(1, test_user(1), vec![test_tag(1, "breakfast")]));
    repo
}

#[tokio::test]
async fn should_forbid_update_by_non_author() {
    let repo = seeded_repo();
    let recipes = repo.recipes_handle();
    let usecase = update_usecase(repo, MockMediaStorage::default());

    let result = usecase
        .execute(
            2,
            false,
            1,
            UpdateRecipeInput {
                name: Some("Stolen".to_owned()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(RecipesServiceError::Forbidden)));
    assert_eq!(recipes.lock().unwrap()[0].name, "Recipe 1");
}

#[tokio::test]
async fn should_replace_tags_and_ingredients_on_update() {
    let usecase = update_usecase(seeded_repo(), MockMediaStorage::default());

    let recipe = usecase
        .execute(
            1,
            false,
            1,
            UpdateRecipeInput {
                tags: Some(vec![2]),
                ingredients: Some(vec![amount(2, 250)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(recipe.name, "Recipe 1");
    assert_eq!(recipe.tags.len(), 1);
    assert_eq!(recipe.tags[0].slug, "dinner");
    assert_eq!(recipe.ingredients.len(), 1);
    assert_eq!(recipe.ingredients[0].ingredient.name, "milk");
}

#[tokio::test]
async fn should_swap_image_and_discard_previous_file() {
    let storage = MockMediaStorage::with_files(vec!["recipes/1.png".to_owned()]);
    let files = storage.files_handle();
    let usecase = update_usecase(seeded_repo(), storage);

    let recipe = usecase
        .execute(
            1,
            false,
            1,
            UpdateRecipeInput {
                image: Some(PNG_DATA_URI.to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let files = files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(recipe.image.as_deref(), Some(files[0].as_str()));
    assert_ne!(files[0], "recipes/1.png");
}

#[tokio::test]
async fn should_let_staff_update_foreign_recipe() {
    let usecase = update_usecase(seeded_repo(), MockMediaStorage::default());

    let recipe = usecase
        .execute(
            2,
            true,
            1,
            UpdateRecipeInput {
                cooking_time: Some(45),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(recipe.cooking_time, 45);
}

#[tokio::test]
async fn should_return_not_found_when_updating_missing_recipe() {
    let usecase = update_usecase(catalog_repo(), MockMediaStorage::default());
    let result = usecase.execute(1, false, 7, UpdateRecipeInput::default()).await;
    assert!(matches!(result, Err(RecipesServiceError::RecipeNotFound)));
}

// ── DeleteRecipeUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_delete_by_non_author() {
    let repo = seeded_repo();
    let recipes = repo.recipes_handle();
    let usecase = DeleteRecipeUseCase {
        repo,
        storage: MockMediaStorage::default(),
    };

    let result = usecase.execute(2, false, 1).await;

    assert!(matches!(result, Err(RecipesServiceError::Forbidden)));
    assert_eq!(recipes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_let_staff_delete_foreign_recipe_and_its_image() {
    let repo = seeded_repo();
    let recipes = repo.recipes_handle();
    let storage = MockMediaStorage::with_files(vec!["recipes/1.png".to_owned()]);
    let files = storage.files_handle();
    let usecase = DeleteRecipeUseCase { repo, storage };

    usecase.execute(2, true, 1).await.unwrap();

    assert!(recipes.lock().unwrap().is_empty());
    assert!(files.lock().unwrap().is_empty());
}

// ── ListRecipesUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_empty_page_for_anonymous_favorited_filter() {
    let usecase = ListRecipesUseCase {
        repo: seeded_repo(),
    };
    let filter = RecipeFilter {
        is_favorited: true,
        ..Default::default()
    };

    let (recipes, count) = usecase
        .execute(filter, None, PageRequest::default())
        .await
        .unwrap();

    assert!(recipes.is_empty());
    assert_eq!(count, 0);
}

#[tokio::test]
async fn should_list_by_tag_slug() {
    let repo = catalog_repo();
    {
        let mut recipes = repo.recipes.lock().unwrap();
        recipes.push(test_recipe(1, test_user(1), vec![test_tag(1, "breakfast")]));
        recipes.push(test_recipe(2, test_user(2), vec![test_tag(2, "dinner")]));
    }
    let usecase = ListRecipesUseCase { repo };
    let filter = RecipeFilter {
        tags: vec!["dinner".to_owned()],
        ..Default::default()
    };

    let (recipes, count) = usecase
        .execute(filter, None, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(recipes[0].id, 2);
}

// ── GetRecipeLinkUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_build_short_link_for_existing_recipe() {
    let usecase = GetRecipeLinkUseCase {
        repo: seeded_repo(),
    };
    let link = usecase.execute(1, "https://foodgram.example/").await.unwrap();
    assert_eq!(link, "https://foodgram.example/recipes/1");
}

#[tokio::test]
async fn should_not_link_missing_recipe() {
    let usecase = GetRecipeLinkUseCase {
        repo: catalog_repo(),
    };
    let result = usecase.execute(5, "https://foodgram.example").await;
    assert!(matches!(result, Err(RecipesServiceError::RecipeNotFound)));
}
