use foodgram_recipes::error::RecipesServiceError;
use foodgram_recipes::infra::pdf::PdfShoppingListRenderer;
use foodgram_recipes::usecase::shopping_cart::{
    AddToCartUseCase, DownloadShoppingListUseCase, RemoveFromCartUseCase,
};

use crate::helpers::{
    MockLinkRepo, MockRecipeRepo, MockShoppingListRepo, shopping_row, test_recipe, test_user,
};

fn recipes() -> MockRecipeRepo {
    MockRecipeRepo::new(vec![test_recipe(4, test_user(1), vec![])])
}

// ── AddToCartUseCase / RemoveFromCartUseCase ─────────────────────────────────

#[tokio::test]
async fn should_add_recipe_to_cart() {
    let usecase = AddToCartUseCase {
        repo: MockLinkRepo::new(vec![]),
        recipes: recipes(),
    };

    let recipe = usecase.execute(1, 4).await.unwrap();

    assert!(recipe.is_in_shopping_cart);
}

#[tokio::test]
async fn should_reject_duplicate_cart_item() {
    let repo = MockLinkRepo::new(vec![(1, 4)]);
    let links = repo.links_handle();
    let usecase = AddToCartUseCase {
        repo,
        recipes: recipes(),
    };

    let result = usecase.execute(1, 4).await;

    assert!(matches!(
        result,
        Err(RecipesServiceError::CartItemAlreadyExists)
    ));
    assert_eq!(links.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_report_missing_cart_item_on_remove() {
    let usecase = RemoveFromCartUseCase {
        repo: MockLinkRepo::new(vec![]),
        recipes: recipes(),
    };
    let result = usecase.execute(1, 4).await;
    assert!(matches!(result, Err(RecipesServiceError::CartItemNotFound)));
}

// ── DownloadShoppingListUseCase ──────────────────────────────────────────────

#[tokio::test]
async fn should_reject_download_of_empty_cart() {
    let usecase = DownloadShoppingListUseCase {
        repo: MockShoppingListRepo { rows: vec![] },
        renderer: PdfShoppingListRenderer::default(),
    };

    let result = usecase.execute(1).await;

    assert!(matches!(result, Err(RecipesServiceError::EmptyCart)));
}

#[tokio::test]
async fn should_render_single_page_pdf_for_short_list() {
    let usecase = DownloadShoppingListUseCase {
        repo: MockShoppingListRepo {
            rows: vec![shopping_row("flour", "g", 500), shopping_row("milk", "ml", 750)],
        },
        renderer: PdfShoppingListRenderer::default(),
    };

    let bytes = usecase.execute(1).await.unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), 1);
}

#[tokio::test]
async fn should_break_long_list_across_pages() {
    let rows = (0..80)
        .map(|i| shopping_row(&format!("ingredient {i:02}"), "g", i64::from(i) + 1))
        .collect();
    let usecase = DownloadShoppingListUseCase {
        repo: MockShoppingListRepo { rows },
        renderer: PdfShoppingListRenderer::default(),
    };

    let bytes = usecase.execute(1).await.unwrap();

    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), 3);
}
