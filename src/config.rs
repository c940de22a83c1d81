use std::env;

pub const DEFAULT_COMPLETION_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.1-sonar-small-128k-online";
pub const DEFAULT_PHOTO_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";
pub const DEFAULT_CONVERSATION_BASE_URL: &str = "https://tavusapi.com/v2";

/// Credentials and endpoint for the empathetic-reply completion service.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

/// Credentials and endpoint for the mood photo search.
#[derive(Debug, Clone)]
pub struct PhotoSearchConfig {
    /// Sent as `Client-ID`. Holds the access key, or the application id when
    /// only that was provided.
    pub client_id: String,
    pub endpoint: String,
}

/// Conversation credentials. Both `api_key` and `persona_id` are required for
/// a session; `replica_id` is optional.
#[derive(Debug, Clone, Default)]
pub struct ConversationConfig {
    pub api_key: Option<String>,
    pub persona_id: Option<String>,
    pub replica_id: Option<String>,
    pub base_url: String,
}

impl ConversationConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.api_key, &self.persona_id) {
            (Some(key), Some(persona)) => Some((key.as_str(), persona.as_str())),
            _ => None,
        }
    }
}

/// Everything read from the environment at start-up. Built once and cloned
/// into each service.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub completion: Option<CompletionConfig>,
    pub photo_search: Option<PhotoSearchConfig>,
    pub conversation: ConversationConfig,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let completion = get("PERPLEXITY_API_KEY").map(|api_key| CompletionConfig {
            api_key,
            model: get("PERPLEXITY_MODEL").unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.into()),
            endpoint: get("PERPLEXITY_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.into()),
        });

        let photo_search = get("UNSPLASH_ACCESS_KEY")
            .or_else(|| get("UNSPLASH_APPLICATION_ID"))
            .map(|client_id| PhotoSearchConfig {
                client_id,
                endpoint: get("UNSPLASH_API_URL")
                    .unwrap_or_else(|| DEFAULT_PHOTO_SEARCH_URL.into()),
            });

        let conversation = ConversationConfig {
            api_key: get("TAVUS_API_KEY"),
            persona_id: get("TAVUS_PERSONA_ID"),
            replica_id: get("TAVUS_REPLICA_ID"),
            base_url: get("TAVUS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CONVERSATION_BASE_URL.into()),
        };

        let debug = get("SOUNDHEAL_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            completion,
            photo_search,
            conversation,
            debug,
        }
    }

    /// Services currently running on their local fallbacks.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.completion.is_none() {
            missing.push("completion");
        }
        if self.photo_search.is_none() {
            missing.push("photo search");
        }
        if self.conversation.credentials().is_none() {
            missing.push("video conversation");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_disables_every_remote() {
        let config = config_from(&[]);
        assert!(config.completion.is_none());
        assert!(config.photo_search.is_none());
        assert!(config.conversation.credentials().is_none());
        assert_eq!(
            config.missing_credentials(),
            vec!["completion", "photo search", "video conversation"]
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = config_from(&[("PERPLEXITY_API_KEY", "   "), ("TAVUS_API_KEY", "")]);
        assert!(config.completion.is_none());
        assert!(config.conversation.api_key.is_none());
    }

    #[test]
    fn completion_defaults_model_and_endpoint() {
        let config = config_from(&[("PERPLEXITY_API_KEY", "pk")]);
        let completion = config.completion.expect("completion configured");
        assert_eq!(completion.api_key, "pk");
        assert_eq!(completion.model, DEFAULT_COMPLETION_MODEL);
        assert_eq!(completion.endpoint, DEFAULT_COMPLETION_URL);
    }

    #[test]
    fn photo_search_prefers_access_key() {
        let config = config_from(&[
            ("UNSPLASH_ACCESS_KEY", "access"),
            ("UNSPLASH_APPLICATION_ID", "app"),
        ]);
        assert_eq!(config.photo_search.unwrap().client_id, "access");

        let config = config_from(&[("UNSPLASH_APPLICATION_ID", "app")]);
        assert_eq!(config.photo_search.unwrap().client_id, "app");
    }

    #[test]
    fn conversation_needs_key_and_persona() {
        let config = config_from(&[("TAVUS_API_KEY", "key")]);
        assert!(config.conversation.credentials().is_none());

        let config = config_from(&[("TAVUS_API_KEY", "key"), ("TAVUS_PERSONA_ID", "p1")]);
        assert_eq!(config.conversation.credentials(), Some(("key", "p1")));
        assert_eq!(config.conversation.base_url, DEFAULT_CONVERSATION_BASE_URL);
    }

    #[test]
    fn debug_flag_accepts_one_or_true() {
        assert!(config_from(&[("SOUNDHEAL_DEBUG", "1")]).debug);
        assert!(config_from(&[("SOUNDHEAL_DEBUG", "TRUE")]).debug);
        assert!(!config_from(&[("SOUNDHEAL_DEBUG", "no")]).debug);
    }
}
