use serde::{Deserialize, Serialize};
use std::fmt;

/// The emotion labels that key the recommendation and greeting tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Sad,
    Angry,
    Anxious,
    Excited,
    Exhausted,
    Confused,
    Grateful,
    Lonely,
    Hopeful,
    Reflective,
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Reflective
    }
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Anxious,
        Emotion::Excited,
        Emotion::Exhausted,
        Emotion::Confused,
        Emotion::Grateful,
        Emotion::Lonely,
        Emotion::Hopeful,
        Emotion::Reflective,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Anxious => "anxious",
            Emotion::Excited => "excited",
            Emotion::Exhausted => "exhausted",
            Emotion::Confused => "confused",
            Emotion::Grateful => "grateful",
            Emotion::Lonely => "lonely",
            Emotion::Hopeful => "hopeful",
            Emotion::Reflective => "reflective",
        }
    }

    /// Case-insensitive lookup. `None` for labels outside the fixed set, such
    /// as "stressed" coming back from the completion service.
    pub fn from_label(label: &str) -> Option<Emotion> {
        let label = label.trim();
        Emotion::ALL
            .into_iter()
            .find(|emotion| emotion.as_str().eq_ignore_ascii_case(label))
    }

    /// Table key for a label: the matching emotion, or `Reflective`.
    pub fn resolve(label: &str) -> Emotion {
        Emotion::from_label(label).unwrap_or_default()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::from_label(emotion.as_str()), Some(emotion));
        }
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(Emotion::from_label("  Anxious "), Some(Emotion::Anxious));
        assert_eq!(Emotion::from_label("LONELY"), Some(Emotion::Lonely));
    }

    #[test]
    fn unknown_label_resolves_to_reflective() {
        assert_eq!(Emotion::from_label("stressed"), None);
        assert_eq!(Emotion::resolve("stressed"), Emotion::Reflective);
        assert_eq!(Emotion::resolve(""), Emotion::Reflective);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Emotion::Exhausted).unwrap();
        assert_eq!(json, "\"exhausted\"");
    }
}
