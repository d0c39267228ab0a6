//! Page layout for the downloadable shopping list.
//!
//! Layout is pure arithmetic over PDF points so it can be checked without
//! producing a document; `infra::pdf` draws the result.

use crate::domain::types::ShoppingListRow;

pub const TITLE: &str = "Shopping list";

/// Fixed geometry of a shopping-list page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub title_x: f32,
    pub title_y: f32,
    pub title_size: f32,
    pub row_x: f32,
    pub row_top: f32,
    pub row_size: f32,
    pub line_height: f32,
    pub bottom_margin: f32,
}

impl Default for PageLayout {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            title_x: 100.0,
            title_y: 800.0,
            title_size: 16.0,
            row_x: 100.0,
            row_top: 760.0,
            row_size: 12.0,
            line_height: 20.0,
            bottom_margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaidOutPage {
    /// Only the first page has a title.
    pub title: Option<PlacedLine>,
    pub rows: Vec<PlacedLine>,
}

pub fn row_text(row: &ShoppingListRow) -> String {
    format!(
        "{} ({}) - {}",
        row.name, row.measurement_unit, row.total_amount
    )
}

/// Place every row on fixed-height lines, starting a new page once the cursor
/// drops below the bottom margin and another row is still pending.
pub fn paginate(rows: &[ShoppingListRow], layout: &PageLayout) -> Vec<LaidOutPage> {
    let mut pages = Vec::new();
    let mut page = LaidOutPage {
        title: Some(PlacedLine {
            text: TITLE.to_owned(),
            x: layout.title_x,
            y: layout.title_y,
        }),
        rows: Vec::new(),
    };
    let mut y = layout.row_top;

    for (index, row) in rows.iter().enumerate() {
        page.rows.push(PlacedLine {
            text: row_text(row),
            x: layout.row_x,
            y,
        });
        y -= layout.line_height;
        let more_follow = index + 1 < rows.len();
        if y < layout.bottom_margin && more_follow {
            pages.push(std::mem::take(&mut page));
            y = layout.row_top;
        }
    }
    pages.push(page);
    pages
}
