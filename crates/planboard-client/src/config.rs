use std::env;

use anyhow::Context;
use uuid::Uuid;

use crate::api::Identity;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub app_url: String,
    /// Origin that invite links point at.
    pub origin: String,
    pub identity: Option<Identity>,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_url = env::var("PLANBOARD_APP_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let origin = env::var("PLANBOARD_ORIGIN").unwrap_or_else(|_| app_url.clone());

        let identity = match env::var("PLANBOARD_USER_ID") {
            Ok(raw) => {
                let user_id = Uuid::parse_str(&raw).context("PLANBOARD_USER_ID must be a UUID")?;
                let name = env::var("PLANBOARD_USER_NAME").unwrap_or_else(|_| "Planboard user".to_string());
                let email = env::var("PLANBOARD_USER_EMAIL").unwrap_or_default();
                Some(Identity::new(user_id, name, email))
            }
            Err(_) => None,
        };

        Ok(Self {
            app_url,
            origin,
            identity,
        })
    }
}
