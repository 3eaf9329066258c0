use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;
use uuid::Uuid;

/// Body served by `GET /api/v1/dogs`.
pub const DOGS_FIXTURE: &str = include_str!("../../fixtures/get_dogs_response.json");

/// A listing with required fields stripped, served by `GET /missing-values/dogs`.
pub const MISSING_VALUES_FIXTURE: &str =
    include_str!("../../fixtures/get_dogs_missing_values_response.json");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: Uuid,
    #[serde(rename = "sellerID")]
    pub seller_id: Uuid,
    pub about: String,
    pub birthday: String,
    pub breed: String,
    #[serde(rename = "breederRating")]
    pub breeder_rating: f64,
    pub cost: f64,
    pub created: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub name: String,
}

pub type Db = Arc<Vec<Dog>>;

/// The dogs shipped in the fixture file.
///
/// # Panics
/// If the compiled-in fixture is not a valid dog list.
pub fn fixture_dogs() -> Vec<Dog> {
    serde_json::from_str(DOGS_FIXTURE).expect("fixtures/get_dogs_response.json is a valid dog list")
}

pub fn app() -> Router {
    app_with_dogs(fixture_dogs())
}

pub fn app_with_dogs(dogs: Vec<Dog>) -> Router {
    let db: Db = Arc::new(dogs);
    Router::new()
        .route("/api/v1/dogs", get(list_dogs))
        .route("/broken/dogs", get(internal_error))
        .route("/missing-values/dogs", get(missing_values))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_dogs(State(db): State<Db>) -> Json<Vec<Dog>> {
    debug!(count = db.len(), "GET /api/v1/dogs");
    Json(db.as_ref().clone())
}

async fn internal_error() -> StatusCode {
    debug!("GET /broken/dogs");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn missing_values() -> ([(HeaderName, &'static str); 1], &'static str) {
    debug!("GET /missing-values/dogs");
    (
        [(header::CONTENT_TYPE, "application/json")],
        MISSING_VALUES_FIXTURE,
    )
}
