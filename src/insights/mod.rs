//! Narrative insights from an external text-generation service
//!
//! Failures never reach the caller: [`generate_narrative`] always returns a
//! [`Narrative`], and views render their metrics either way.

pub mod client;
pub mod prompt;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use client::{build_provider, DisabledProvider, HttpInsightClient, InsightProvider};
pub use prompt::{build_prompt, InsightPrompt, DEFAULT_QUESTION};

use crate::error::InsightError;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Narrative {
    Available { text: String },
    Unavailable { reason: String },
}

impl Narrative {
    pub fn is_available(&self) -> bool {
        matches!(self, Narrative::Available { .. })
    }
}

pub async fn generate_narrative(provider: &dyn InsightProvider, prompt: &InsightPrompt) -> Narrative {
    match provider.generate(prompt).await {
        Ok(text) => {
            info!("Insight generated ({} chars)", text.len());
            Narrative::Available { text }
        }
        Err(InsightError::NotConfigured) => {
            debug!("Insight service not configured");
            Narrative::Unavailable {
                reason: "not configured".to_string(),
            }
        }
        Err(e) => {
            warn!("Insight unavailable: {}", e);
            Narrative::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Failing;

    #[async_trait]
    impl InsightProvider for Failing {
        async fn generate(&self, _prompt: &InsightPrompt) -> Result<String, InsightError> {
            Err(InsightError::Timeout(Duration::from_secs(8)))
        }
    }

    fn prompt() -> InsightPrompt {
        InsightPrompt {
            system: "s".into(),
            user: "u".into(),
        }
    }

    #[tokio::test]
    async fn failures_become_unavailable() {
        let narrative = generate_narrative(&Failing, &prompt()).await;
        assert!(!narrative.is_available());
        assert_eq!(
            narrative,
            Narrative::Unavailable {
                reason: "insight request timed out after 8s".into()
            }
        );
    }

    #[tokio::test]
    async fn unconfigured_service_says_so() {
        let narrative = generate_narrative(&DisabledProvider, &prompt()).await;
        assert_eq!(
            narrative,
            Narrative::Unavailable {
                reason: "not configured".into()
            }
        );
    }

    #[test]
    fn narrative_serializes_with_status_tag() {
        let value = serde_json::to_value(Narrative::Available { text: "ok".into() }).unwrap();
        assert_eq!(value, serde_json::json!({"status": "available", "text": "ok"}));
    }
}
