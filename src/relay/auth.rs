use tracing::warn;

use crate::config::AuthConfig;
use crate::error::{RelayError, Result};

/// Which party a credential belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Controller,
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::Bot => "bot",
        }
    }
}

/// Static pre-shared secrets for the controller and the bots
#[derive(Clone)]
pub struct Credentials {
    controller_key: String,
    bot_key: String,
}

impl Credentials {
    pub fn new(controller_key: impl Into<String>, bot_key: impl Into<String>) -> Self {
        Self {
            controller_key: controller_key.into(),
            bot_key: bot_key.into(),
        }
    }

    fn expected(&self, role: Role) -> &str {
        match role {
            Role::Controller => &self.controller_key,
            Role::Bot => &self.bot_key,
        }
    }

    /// Exact string match; a missing credential never matches
    pub fn is_valid(&self, role: Role, provided: Option<&str>) -> bool {
        provided.is_some_and(|p| p == self.expected(role))
    }

    pub fn authorize(&self, role: Role, provided: Option<&str>) -> Result<()> {
        if self.is_valid(role, provided) {
            return Ok(());
        }
        warn!(
            role = role.as_str(),
            present = provided.is_some(),
            "Rejected {} credential",
            role.as_str()
        );
        Err(RelayError::Unauthorized(match role {
            Role::Controller => "Valid controller key required".to_string(),
            Role::Bot => "Valid bot key required".to_string(),
        }))
    }
}

impl From<&AuthConfig> for Credentials {
    fn from(config: &AuthConfig) -> Self {
        Self::new(config.controller_key.clone(), config.bot_key.clone())
    }
}
