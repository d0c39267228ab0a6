pub mod db;
pub mod media;
pub mod pdf;
pub mod seed;
