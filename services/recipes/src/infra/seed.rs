//! Bulk loading of catalog data (ingredients, tags) from JSON fixtures.

use anyhow::Context as _;
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, sea_query::OnConflict};
use serde::Deserialize;

use foodgram_recipes_schema::{ingredients, tags};

const CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientSeed {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagSeed {
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Insert ingredients, skipping any `(name, measurement_unit)` pair already
/// present. Returns the number of rows inserted.
pub async fn load_ingredients<C: ConnectionTrait>(
    db: &C,
    seeds: &[IngredientSeed],
) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for chunk in seeds.chunks(CHUNK_SIZE) {
        let rows = chunk.iter().map(|seed| ingredients::ActiveModel {
            name: Set(seed.name.trim().to_owned()),
            measurement_unit: Set(seed.measurement_unit.trim().to_owned()),
            ..Default::default()
        });
        inserted += ingredients::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    ingredients::Column::Name,
                    ingredients::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .context("insert ingredients")?;
    }
    Ok(inserted)
}

/// Insert tags, skipping any that collide on name, color or slug.
pub async fn load_tags<C: ConnectionTrait>(db: &C, seeds: &[TagSeed]) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for chunk in seeds.chunks(CHUNK_SIZE) {
        let rows = chunk.iter().map(|seed| tags::ActiveModel {
            name: Set(seed.name.clone()),
            color: Set(seed.color.clone()),
            slug: Set(seed.slug.clone()),
            ..Default::default()
        });
        inserted += tags::Entity::insert_many(rows)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(db)
            .await
            .context("insert tags")?;
    }
    Ok(inserted)
}
