use axum::{extract::State, Json};
use std::collections::HashMap;
use std::sync::Arc;

use gather_shared::store::GatherStore;

use crate::error::Result;
use crate::models::{GameView, RecipeView};

// GET /recipes
pub async fn list_recipes<S>(State(store): State<Arc<S>>) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let recipes = store.get_recipes().await?;
    let mut links: HashMap<String, String> = store
        .get_affiliate_links("recipe")
        .await?
        .into_iter()
        .map(|link| (link.item_id, link.affiliate_url))
        .collect();

    let views: Vec<RecipeView> = recipes
        .into_iter()
        .map(|recipe| {
            let affiliate_url = links.remove(&recipe.id);
            RecipeView {
                recipe,
                affiliate_url,
            }
        })
        .collect();

    Ok(Json(serde_json::json!({ "recipes": views })))
}

// GET /games
pub async fn list_games<S>(State(store): State<Arc<S>>) -> Result<Json<serde_json::Value>>
where
    S: GatherStore,
{
    let games = store.get_games().await?;
    let mut links: HashMap<String, String> = store
        .get_affiliate_links("game")
        .await?
        .into_iter()
        .map(|link| (link.item_id, link.affiliate_url))
        .collect();

    let views: Vec<GameView> = games
        .into_iter()
        .map(|game| {
            let affiliate_url = links.remove(&game.id);
            GameView {
                game,
                affiliate_url,
            }
        })
        .collect();

    Ok(Json(serde_json::json!({ "games": views })))
}
