//! Keyword router

use askdocs_core::{ConversationRecord, PipelineState, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Stage;

const HR_KEYWORDS: &[&str] = &["leave", "work hours", "remote", "holiday"];
const TECHNICAL_KEYWORDS: &[&str] = &["docker", "repo", "api", "deploy", "microservice"];

/// Topical bucket a query falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Hr,
    Technical,
    General,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Hr => "hr",
            Route::Technical => "technical",
            Route::General => "general",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies the newest message by case-insensitive substring match.
///
/// HR keywords win over technical ones; anything else is general.
/// Matching is on substrings, so "leaves" and "rapid" both match.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<(Route, &'static [&'static str])>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            rules: vec![(Route::Hr, HR_KEYWORDS), (Route::Technical, TECHNICAL_KEYWORDS)],
        }
    }

    pub fn classify(&self, text: &str) -> Route {
        let lowered = text.to_lowercase();

        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
            .map(|(route, _)| *route)
            .unwrap_or(Route::General)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for Router {
    fn name(&self) -> &'static str {
        "router"
    }

    fn entry_state(&self) -> PipelineState {
        PipelineState::Start
    }

    fn exit_state(&self) -> PipelineState {
        PipelineState::Routed
    }

    async fn run(&self, record: &mut ConversationRecord) -> Result<()> {
        let route = self.classify(record.latest()?.content());
        info!(route = %route, "routed query");
        record.context = Some(route.as_str().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_in_any_case_is_hr() {
        let router = Router::new();
        assert_eq!(router.classify("When is the next HOLIDAY?"), Route::Hr);
        assert_eq!(router.classify("holiday schedule"), Route::Hr);
        assert_eq!(router.classify("Is Friday a Holiday"), Route::Hr);
    }

    #[test]
    fn test_hr_beats_technical() {
        let router = Router::new();
        assert_eq!(router.classify("Can I deploy while on leave?"), Route::Hr);
        assert_eq!(router.classify("remote docker setup"), Route::Hr);
    }

    #[test]
    fn test_technical_keywords() {
        let router = Router::new();
        assert_eq!(router.classify("what is our deploy process"), Route::Technical);
        assert_eq!(router.classify("Where is the API gateway repo?"), Route::Technical);
        assert_eq!(router.classify("microservice naming"), Route::Technical);
    }

    #[test]
    fn test_no_keywords_is_general() {
        let router = Router::new();
        assert_eq!(router.classify("Who founded the company?"), Route::General);
        assert_eq!(router.classify(""), Route::General);
    }

    #[test]
    fn test_substring_matching() {
        let router = Router::new();
        // "rapid" contains "api", "cleaver" contains "leave"
        assert_eq!(router.classify("rapid growth"), Route::Technical);
        assert_eq!(router.classify("Is the kitchen cleaver sharp?"), Route::Hr);
    }

    #[tokio::test]
    async fn test_stage_writes_label_to_context() {
        let mut record = ConversationRecord::new(Vec::new(), "What are the work hours?");
        Router::new().run(&mut record).await.unwrap();

        assert_eq!(record.context.as_deref(), Some("hr"));
        assert_eq!(record.messages.len(), 1);
    }
}
