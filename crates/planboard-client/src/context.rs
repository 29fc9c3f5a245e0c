use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::feedback::Feedback;
use crate::queries::Queries;

/// Everything a screen controller needs, passed in rather than reached for.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub api: ApiClient,
    pub cache: QueryCache,
    pub feedback: Feedback,
    pub origin: String,
}

impl ClientContext {
    pub fn new(api: ApiClient, feedback: Feedback, origin: impl Into<String>) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
            feedback,
            origin: origin.into(),
        }
    }

    pub fn from_config(config: &ClientConfig, feedback: Feedback) -> Self {
        let mut api = ApiClient::new(&config.app_url);
        if let Some(identity) = &config.identity {
            api = api.with_identity(identity.clone());
        }
        Self::new(api, feedback, config.origin.clone())
    }

    pub fn queries(&self) -> Queries {
        Queries::new(self.api.clone(), self.cache.clone())
    }
}
