pub mod avatar;
pub mod extract;
pub mod favorite;
pub mod health;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod tag;
pub mod user;

use axum::http::Uri;
use serde::Deserialize;

use foodgram_domain::pagination::{DEFAULT_PER_PAGE, PageRequest};

/// `page` / `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            per_page: self.limit.unwrap_or(DEFAULT_PER_PAGE),
            page: self.page.unwrap_or(1),
        }
        .clamped()
    }
}

/// Absolute URL of `uri` with its `page` parameter replaced. Other query
/// parameters are kept exactly as the client sent them.
pub fn page_link(base_url: &str, uri: &Uri, page: u32) -> String {
    let page_param = format!("page={page}");
    let mut params: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty() && p.split('=').next() != Some("page"))
        .collect();
    params.push(&page_param);
    format!(
        "{}{}?{}",
        base_url.trim_end_matches('/'),
        uri.path(),
        params.join("&")
    )
}
