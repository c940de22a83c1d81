use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

const YOUTUBE_SEARCH_URL: &str = "https://www.youtube.com/results";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SongRecommendation {
    pub song: String,
    pub artist: String,
}

type Song = (&'static str, &'static str);

fn songs_for(emotion: Emotion) -> &'static [Song; 4] {
    match emotion {
        Emotion::Sad => &[
            ("The Night We Met", "Lord Huron"),
            ("Hurt", "Johnny Cash"),
            ("Mad World", "Gary Jules"),
            ("Black", "Pearl Jam"),
        ],
        Emotion::Angry => &[
            ("Breathe Me", "Sia"),
            ("Heavy", "Linkin Park ft. Kiiara"),
            ("Scream", "Usher"),
            ("Break Stuff", "Limp Bizkit"),
        ],
        Emotion::Anxious => &[
            ("Weightless", "Marconi Union"),
            ("Clair de Lune", "Claude Debussy"),
            ("Aqueous Transmission", "Incubus"),
            ("Mad About You", "Sting"),
        ],
        Emotion::Excited => &[
            ("Good as Hell", "Lizzo"),
            ("Can't Stop the Feeling", "Justin Timberlake"),
            ("Happy", "Pharrell Williams"),
            ("Walking on Sunshine", "Katrina and the Waves"),
        ],
        Emotion::Exhausted => &[
            ("Weightless", "Marconi Union"),
            ("River", "Joni Mitchell"),
            ("The Sound of Silence", "Simon & Garfunkel"),
            ("Holocene", "Bon Iver"),
        ],
        Emotion::Confused => &[
            ("Lost in the Light", "Bahamas"),
            ("The Middle", "Jimmy Eat World"),
            ("Unwritten", "Natasha Bedingfield"),
            ("Learning to Fly", "Tom Petty"),
        ],
        Emotion::Grateful => &[
            ("Count on Me", "Bruno Mars"),
            ("Three Little Birds", "Bob Marley"),
            ("What a Wonderful World", "Louis Armstrong"),
            ("Grateful", "Rita Ora"),
        ],
        Emotion::Lonely => &[
            ("The Sound of Silence", "Disturbed"),
            ("Alone", "Heart"),
            ("Mad World", "Tears for Fears"),
            ("Eleanor Rigby", "The Beatles"),
        ],
        Emotion::Hopeful => &[
            ("Here Comes the Sun", "The Beatles"),
            ("Three Little Birds", "Bob Marley"),
            ("Don't Stop Believin'", "Journey"),
            ("Stronger", "Kelly Clarkson"),
        ],
        Emotion::Reflective => &[
            ("Here Comes the Sun", "The Beatles"),
            ("The Long and Winding Road", "The Beatles"),
            ("Mad World", "Gary Jules"),
            ("Hallelujah", "Jeff Buckley"),
        ],
    }
}

/// Candidates for a label; unknown labels get the reflective list.
pub fn song_candidates(label: &str) -> Vec<SongRecommendation> {
    songs_for(Emotion::resolve(label))
        .iter()
        .map(|(song, artist)| SongRecommendation {
            song: song.to_string(),
            artist: artist.to_string(),
        })
        .collect()
}

pub fn recommend_song(label: &str) -> SongRecommendation {
    recommend_song_with(label, &mut rand::thread_rng())
}

pub fn recommend_song_with<R: Rng + ?Sized>(label: &str, rng: &mut R) -> SongRecommendation {
    let (song, artist) = songs_for(Emotion::resolve(label))
        .choose(rng)
        .copied()
        .unwrap_or(("Here Comes the Sun", "The Beatles"));
    SongRecommendation {
        song: song.to_string(),
        artist: artist.to_string(),
    }
}

/// Search link for `"<song> <artist>"`. Pure, no network.
pub fn youtube_search_url(song: &str, artist: &str) -> String {
    let query = format!("{song} {artist}");
    match Url::parse_with_params(YOUTUBE_SEARCH_URL, &[("search_query", query.as_str())]) {
        Ok(url) => url.to_string(),
        Err(_) => YOUTUBE_SEARCH_URL.to_string(),
    }
}
