//! `fairway list` / `fairway show` - store inspection

use comfy_table::Table;

use fairway_common::FairwayError;
use fairway_sync::queries;

use crate::db;
use crate::Result;

pub async fn list(database_url: Option<&str>) -> Result<()> {
    let pool = db::connect(database_url).await?;
    let locations = queries::fetch_all(&pool).await?;

    let mut table = Table::new();
    table.set_header(["Slug", "Name", "City", "State", "Rating"]);
    for location in &locations {
        table.add_row([
            location.slug.clone(),
            location.business_name.clone(),
            location.city.clone(),
            location.state.to_string(),
            location
                .rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{table}");
    println!("{} locations", locations.len());
    Ok(())
}

pub async fn show(database_url: Option<&str>, slug: &str) -> Result<()> {
    let pool = db::connect(database_url).await?;
    let location = queries::find_by_slug(&pool, slug)
        .await?
        .ok_or_else(|| FairwayError::LocationNotFound(slug.to_string()))?;

    println!("{}", serde_json::to_string_pretty(&location)?);
    Ok(())
}
