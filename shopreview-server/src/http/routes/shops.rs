//! Shop listing endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::repos::{DbError, ShopRepo, ShopRow};
use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::http::response::Success;
use crate::http::server::AppState;
use crate::models::{merge_duplicates, Merged, ShopFilter};

/// Shop listing query params
#[derive(Debug, Default, Deserialize)]
pub struct ShopListParams {
    pub area: Option<String>,
    pub theme: Option<String>,
}

/// Shop with its categories gathered into one list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopResponse {
    pub shop_id: i32,
    pub shop_name: String,
    pub area: String,
    pub theme: Option<String>,
    pub category: Vec<String>,
    pub image: Option<String>,
}

impl ShopResponse {
    fn new(shop: Merged<ShopRow>, image: Option<String>) -> Self {
        let Merged { row, values } = shop;
        Self {
            shop_id: row.shop_id,
            shop_name: row.shop_name,
            area: row.area,
            theme: row.theme,
            category: values,
            image,
        }
    }
}

/// GET /shop?area=&theme= - shops by area and/or theme
async fn list_shops(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<ShopListParams>,
) -> Result<Success<Vec<ShopResponse>>, ApiError> {
    let filter = ShopFilter::new(params.area, params.theme)?;

    let rows = {
        let mut conn = state.pool.acquire().await?;
        ShopRepo::new(&mut conn).list(&filter).await?
    };

    let shops = merge_duplicates(rows);
    let shop_ids: Vec<i32> = shops.iter().map(|shop| shop.row.shop_id).collect();
    let images = fetch_images(&state.pool, shop_ids).await;

    let data = shops
        .into_iter()
        .zip(images)
        .map(|(shop, image)| ShopResponse::new(shop, image))
        .collect();

    Ok(Success::ok(filter.message(), data))
}

/// Look up every shop image, a few at a time.
///
/// Each lookup checks out its own pooled connection, so at most
/// [`image_lookup_limit`] run at once and the rest of the pool stays free
/// for other requests. A failed lookup is logged and yields `None`; it never
/// fails the others. Output order matches `shop_ids`.
async fn fetch_images<I>(pool: &PgPool, shop_ids: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = i32>,
{
    let limit = image_lookup_limit(pool.options().get_max_connections());

    stream::iter(shop_ids)
        .map(|shop_id| async move {
            let result: Result<Option<String>, DbError> = async {
                let mut conn = pool.acquire().await?;
                ShopRepo::new(&mut conn).image(shop_id).await
            }
            .await;

            result.unwrap_or_else(|e| {
                tracing::warn!(shop_id, error = %e, "shop image lookup failed");
                None
            })
        })
        .buffered(limit)
        .collect()
        .await
}

/// Concurrent image lookups allowed for a pool of `max_connections`.
fn image_lookup_limit(max_connections: u32) -> usize {
    (max_connections as usize / 2).max(1)
}

/// Shop routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/shop", get(list_shops))
}
