//! Domain DTOs for the dogs API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Every
//! field is required: a listing with a missing or mistyped field fails to
//! decode as a whole rather than yielding a partially filled `Dog`.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A single dog listing returned by `GET dogs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dog {
    pub id: Uuid,
    #[serde(rename = "sellerID")]
    pub seller_id: Uuid,
    pub about: String,
    /// RFC 3339 timestamp, kept verbatim.
    pub birthday: String,
    pub breed: String,
    #[serde(rename = "breederRating")]
    pub breeder_rating: f64,
    pub cost: f64,
    pub created: String,
    #[serde(rename = "imageURL")]
    pub image_url: Url,
    pub name: String,
}
