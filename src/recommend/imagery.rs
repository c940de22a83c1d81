//! Mood photo lookup against the photo-search API.
//!
//! The lookup is best effort: without credentials, on any error, and when the
//! search comes back empty the caller gets [`FALLBACK_IMAGE`].

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::{
    config::PhotoSearchConfig,
    emotion::Emotion,
    fetch::{Fallback, FetchError},
    transport::{HttpRequest, Transport},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const FALLBACK_IMAGE: &str = "/life.jpg";

const RESULTS_PER_PAGE: u32 = 10;
/// Only the top of the result list is considered; later hits drift off-topic.
const PICK_FROM_TOP: usize = 5;

fn search_terms_for(emotion: Emotion) -> &'static [&'static str; 4] {
    match emotion {
        Emotion::Sad => &[
            "peaceful rain window",
            "gentle sunset ocean",
            "soft candlelight comfort",
            "quiet forest misty morning",
        ],
        Emotion::Angry => &[
            "storm clouds dramatic sky",
            "powerful ocean waves nature",
            "mountain peak strength",
            "controlled fire fireplace",
        ],
        Emotion::Anxious => &[
            "meditation peaceful zen",
            "flowing water tranquil stream",
            "soft clouds open sky",
            "peaceful garden serene",
        ],
        Emotion::Excited => &[
            "vibrant sunrise energy",
            "colorful flowers blooming",
            "celebration lights sparkle",
            "rainbow after rain joy",
        ],
        Emotion::Exhausted => &[
            "cozy bedroom soft pillows",
            "peaceful hammock breeze",
            "quiet library reading light",
            "spa relaxation calm",
        ],
        Emotion::Confused => &[
            "winding forest path",
            "compass map direction",
            "lighthouse fog guidance",
            "crossroads nature choices",
        ],
        Emotion::Grateful => &[
            "beautiful sunrise hope",
            "heart shaped clouds",
            "golden hour appreciation",
            "peaceful meadow gratitude",
        ],
        Emotion::Lonely => &[
            "single tree field solitude",
            "cozy reading nook peaceful",
            "gentle moonlight reflection",
            "warm coffee self care",
        ],
        Emotion::Hopeful => &[
            "sunrise through clouds hope",
            "green shoots new growth",
            "bridge over water forward",
            "open door bright light",
        ],
        Emotion::Reflective => &[
            "calm lake mirror reflection",
            "journal pen thoughtful",
            "quiet park bench contemplation",
            "soft morning light gentle",
        ],
    }
}

pub fn search_terms(label: &str) -> &'static [&'static str] {
    search_terms_for(Emotion::resolve(label))
}

pub fn pick_search_term<R: Rng + ?Sized>(label: &str, rng: &mut R) -> &'static str {
    search_terms(label)
        .choose(rng)
        .copied()
        .unwrap_or("calm lake mirror reflection")
}

#[derive(Debug, Deserialize)]
pub struct PhotoSearchResponse {
    #[serde(default)]
    pub results: Vec<Photo>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u64,
}

#[derive(Debug, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: String,
    pub urls: PhotoUrls,
    pub alt_description: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoUrls {
    pub raw: Option<String>,
    pub full: Option<String>,
    pub regular: String,
    pub small: Option<String>,
    pub thumb: Option<String>,
}

/// Uniform pick among the first five results.
pub fn pick_photo<'a, R: Rng + ?Sized>(results: &'a [Photo], rng: &mut R) -> Option<&'a Photo> {
    let top = &results[..results.len().min(PICK_FROM_TOP)];
    top.choose(rng)
}

#[derive(Clone)]
pub struct MoodImageFinder {
    transport: Arc<dyn Transport>,
    config: Option<PhotoSearchConfig>,
}

impl MoodImageFinder {
    pub fn new(transport: Arc<dyn Transport>, config: Option<PhotoSearchConfig>) -> Self {
        Self { transport, config }
    }

    /// Always yields an image location: a search hit or [`FALLBACK_IMAGE`].
    pub async fn fetch_mood_image(&self, label: &str) -> String {
        self.search(label)
            .await
            .or_fallback("mood image lookup", || FALLBACK_IMAGE.to_string())
    }

    pub async fn search(&self, label: &str) -> Result<String, FetchError> {
        let config = self
            .config
            .as_ref()
            .ok_or(FetchError::MissingCredentials("photo search"))?;

        let term = pick_search_term(label, &mut rand::thread_rng());
        log_debug!("searching photos for {label:?} with {term:?}");

        let request = HttpRequest::get(&config.endpoint)
            .query("query", term)
            .query("per_page", RESULTS_PER_PAGE.to_string())
            .query("orientation", "landscape")
            .header("Accept-Version", "v1")
            .header("Authorization", format!("Client-ID {}", config.client_id));

        let response = self.transport.send(request).await?.error_for_status()?;
        let parsed: PhotoSearchResponse = serde_json::from_str(&response.body)?;
        log_info!(
            "photo search for {term:?}: {} results ({} total)",
            parsed.results.len(),
            parsed.total
        );

        pick_photo(&parsed.results, &mut rand::thread_rng())
            .map(|photo| photo.urls.regular.clone())
            .ok_or(FetchError::Empty("photo search returned no results"))
    }
}
