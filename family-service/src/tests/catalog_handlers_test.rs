use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use gather_shared::auth::create_test_request;
use gather_shared::models::{AffiliateLink, Game, Recipe};
use gather_shared::store::CatalogStore;
use gather_shared::test_utils::http_test_utils::response_to_json;

use super::create_test_app;

#[tokio::test]
async fn test_list_recipes_joins_affiliate_links() {
    let (app, store) = create_test_app().await;

    store
        .put_recipe(Recipe {
            id: "recipe-1".to_string(),
            name: "Classic Lasagna".to_string(),
            tags: vec!["Italian".to_string(), "Pasta".to_string()],
            description: "Layers of pasta, meat sauce, and cheese.".to_string(),
            link: "https://www.example.com/lasagna".to_string(),
        })
        .await
        .unwrap();
    store
        .put_recipe(Recipe {
            id: "recipe-2".to_string(),
            name: "Summer Fruit Salad".to_string(),
            tags: vec!["Fruit".to_string()],
            description: "Seasonal fruits with a honey-lime dressing.".to_string(),
            link: "https://www.example.com/fruit-salad".to_string(),
        })
        .await
        .unwrap();
    store
        .put_affiliate_link(AffiliateLink {
            item_type: "recipe".to_string(),
            item_id: "recipe-1".to_string(),
            affiliate_url: "https://www.amazon.com/lasagna-ingredients".to_string(),
        })
        .await
        .unwrap();

    let response = app
        .oneshot(create_test_request(
            "GET",
            "/recipes",
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_resp = response_to_json(response).await;
    let recipes = json_resp["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 2);

    let lasagna = recipes
        .iter()
        .find(|r| r["id"] == "recipe-1")
        .unwrap();
    assert_eq!(
        lasagna["affiliateUrl"],
        "https://www.amazon.com/lasagna-ingredients"
    );
    let fruit_salad = recipes
        .iter()
        .find(|r| r["id"] == "recipe-2")
        .unwrap();
    assert!(fruit_salad["affiliateUrl"].is_null());
}

#[tokio::test]
async fn test_list_games() {
    let (app, store) = create_test_app().await;

    store
        .put_game(Game {
            id: "game-1".to_string(),
            name: "Family Trivia".to_string(),
            category: "Trivia".to_string(),
            description: "Trivia about shared memories and history.".to_string(),
            link: "https://www.example.com/family-trivia".to_string(),
        })
        .await
        .unwrap();

    let response = app
        .oneshot(create_test_request(
            "GET",
            "/games",
            "alice@example.com",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_resp = response_to_json(response).await;
    let games = json_resp["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["name"], "Family Trivia");
    assert_eq!(games[0]["category"], "Trivia");
}

#[tokio::test]
async fn test_catalog_requires_authentication() {
    let (app, _store) = create_test_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/recipes")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
