use lambda_http::Error;
use log::info;
use uuid::Uuid;

use gather_shared::models::{AffiliateLink, Game, Recipe};
use gather_shared::store::dynamo::DynamoStore;
use gather_shared::store::CatalogStore;

/// Loads the demo recipe and game catalog into DynamoDB
#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = DynamoStore::new().await;

    let recipes = [
        (
            "Classic Lasagna",
            vec!["Italian", "Pasta", "Main Course", "Family Favorite"],
            "A hearty Italian dish perfect for large family gatherings. Layers of pasta, meat sauce, and cheese.",
            "https://www.example.com/lasagna",
            Some("https://www.amazon.com/lasagna-ingredients"),
        ),
        (
            "BBQ Pulled Pork",
            vec!["BBQ", "Meat", "Main Course", "Slow Cooker"],
            "Tender pulled pork in a sweet and tangy BBQ sauce. Perfect for sandwiches and feeding a crowd.",
            "https://www.example.com/pulled-pork",
            Some("https://www.amazon.com/bbq-ingredients"),
        ),
        (
            "Summer Fruit Salad",
            vec!["Fruit", "Dessert", "Healthy", "Quick"],
            "A refreshing mix of seasonal fruits with a honey-lime dressing.",
            "https://www.example.com/fruit-salad",
            None,
        ),
    ];

    for (name, tags, description, link, affiliate_url) in recipes {
        let recipe = Recipe {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            tags: tags.into_iter().map(str::to_string).collect(),
            description: description.to_string(),
            link: link.to_string(),
        };
        let recipe_id = recipe.id.clone();
        store.put_recipe(recipe).await?;
        if let Some(url) = affiliate_url {
            store
                .put_affiliate_link(AffiliateLink {
                    item_type: "recipe".to_string(),
                    item_id: recipe_id,
                    affiliate_url: url.to_string(),
                })
                .await?;
        }
        info!("Seeded recipe '{}'", name);
    }

    let games = [
        (
            "Family Trivia",
            "Trivia",
            "A customizable trivia game where families can create questions about their shared memories and history.",
            "https://www.example.com/family-trivia",
            Some("https://www.amazon.com/trivia-game"),
        ),
        (
            "Pictionary",
            "Drawing",
            "The classic drawing and guessing game that's fun for all ages.",
            "https://www.example.com/pictionary",
            Some("https://www.amazon.com/pictionary"),
        ),
        (
            "Charades",
            "Acting",
            "No boards or pieces needed. Act out the prompt and see who guesses first.",
            "https://www.example.com/charades",
            None,
        ),
    ];

    for (name, category, description, link, affiliate_url) in games {
        let game = Game {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            link: link.to_string(),
        };
        let game_id = game.id.clone();
        store.put_game(game).await?;
        if let Some(url) = affiliate_url {
            store
                .put_affiliate_link(AffiliateLink {
                    item_type: "game".to_string(),
                    item_id: game_id,
                    affiliate_url: url.to_string(),
                })
                .await?;
        }
        info!("Seeded game '{}'", name);
    }

    info!("Catalog seeding complete");
    Ok(())
}
