pub mod imagery;
pub mod music;

pub use imagery::{MoodImageFinder, FALLBACK_IMAGE};
pub use music::{recommend_song, youtube_search_url, SongRecommendation};
