use std::time::Duration;

use thiserror::Error;

/// Failures of the browser rendering stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Failed to launch browser session: {0}")]
    Launch(String),

    #[error("Failed to render {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Failed to release browser session: {0}")]
    Release(String),

    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("Renderer is overloaded, {queued} requests already waiting for a session")]
    Overloaded { queued: usize },

    #[error("Render pool is closed")]
    Closed,
}

/// Every way an extraction request can fail, as seen by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Render failure: {0}")]
    Render(#[from] RenderError),

    #[error("No extraction rule matches {0}")]
    NoRuleMatched(String),
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::InvalidInput(_) => "invalid_input",
            ExtractionError::Render(_) => "render_failure",
            ExtractionError::NoRuleMatched(_) => "no_rule_matched",
        }
    }
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid selector `{selector}` in rule {rule}: {reason}")]
    InvalidSelector {
        rule: String,
        selector: String,
        reason: String,
    },
    #[error("Rule {rule} sets a title_label but no title selector")]
    LabelWithoutTitle { rule: String },
}
