use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::error;

use crate::fetcher::{Fetcher, NewsCategory, NewsStory};
use crate::store::{Meal, MealStore, StoreError};

const VALIDATION_PROMPT: &str = "Please provide both a name and a description for the meal.";

pub struct AppState {
    pub store: Arc<MealStore>,
    pub fetcher: Arc<Fetcher>,
}

// Template structs
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: [NewsCategory; 4],
}

#[derive(Template)]
#[template(path = "food.html")]
pub struct FoodTemplate {
    pub meals: Vec<Meal>,
    pub form_error: Option<&'static str>,
    pub form_name: String,
    pub form_description: String,
}

#[derive(Template)]
#[template(path = "meal_panel.html")]
pub struct MealPanelTemplate {
    pub meals: Vec<Meal>,
    pub form_error: Option<&'static str>,
    pub form_name: String,
    pub form_description: String,
}

#[derive(Template)]
#[template(path = "news_items.html")]
pub struct NewsItemsTemplate {
    pub stories: Vec<NewsStory>,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

// Route handlers
pub async fn home() -> impl IntoResponse {
    HtmlTemplate(HomeTemplate {
        categories: NewsCategory::ALL,
    })
}

pub async fn food(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let meals = state.store.list().await;

    HtmlTemplate(FoodTemplate {
        meals,
        form_error: None,
        form_name: String::new(),
        form_description: String::new(),
    })
}

#[derive(Deserialize)]
pub struct MealForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn share_meal(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MealForm>,
) -> Result<Response, AppError> {
    let meal = Meal {
        name: form.name,
        description: form.description,
    };

    match state.store.append(&meal).await {
        Ok(()) => {
            let meals = state.store.list().await;
            Ok(HtmlTemplate(MealPanelTemplate {
                meals,
                form_error: None,
                form_name: String::new(),
                form_description: String::new(),
            })
            .into_response())
        }
        Err(StoreError::EmptyName | StoreError::EmptyDescription) => {
            // Keep what was typed so nothing is lost behind the prompt
            let meals = state.store.list().await;
            Ok(HtmlTemplate(MealPanelTemplate {
                meals,
                form_error: Some(VALIDATION_PROMPT),
                form_name: meal.name,
                form_description: meal.description,
            })
            .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn news_section(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Response {
    // Unknown categories have no region to fill: nothing to do
    let category = match category.parse::<NewsCategory>() {
        Ok(category) => category,
        Err(_) => return StatusCode::NO_CONTENT.into_response(),
    };

    match state.fetcher.load(category).await {
        Ok(stories) if stories.is_empty() => StatusCode::NO_CONTENT.into_response(),
        Ok(stories) => HtmlTemplate(NewsItemsTemplate { stories }).into_response(),
        Err(err) => {
            // The section keeps whatever it currently shows
            error!("Failed to load {} news: {}", category, err);
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
