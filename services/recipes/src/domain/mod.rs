pub mod media;
pub mod repository;
pub mod shopping_list;
pub mod types;
