mod config;
mod fetcher;
mod routes;
mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::routes::AppState;
use crate::store::MealStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mealboard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::load("mealboard.toml")?);
    info!("Loaded feed sources from configuration");

    // Open the meal store
    let meals_path =
        std::env::var("MEALS_PATH").unwrap_or_else(|_| "sharedMeals.json".to_string());
    let store = Arc::new(MealStore::new(meals_path));
    info!("Meal store at {}", store.path().display());

    // Create fetcher
    let fetcher = Arc::new(Fetcher::new(config));

    // Create app state
    let state = Arc::new(AppState { store, fetcher });

    // Build router
    let app = Router::new()
        .route("/", get(routes::home))
        .route("/food", get(routes::food))
        .route("/meals", post(routes::share_meal))
        .route("/news/:category", get(routes::news_section))
        .route("/healthz", get(routes::health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Server starting on http://localhost:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
