use uuid::Uuid;

use crate::{
    domain::{
        Document, Extraction, ExtractionRequest, ExtractionResult, ExtractionStatus, RuleSet,
        SiteRule, UnmatchedPolicy,
    },
    error::ExtractionError,
};

use super::Renderer;

/// Url in, article text out: classify, render, parse, apply the site rule.
pub struct Extractor {
    rules: RuleSet,
    renderer: Renderer,
    unmatched: UnmatchedPolicy,
}

impl Extractor {
    pub fn new(rules: RuleSet, renderer: Renderer, unmatched: UnmatchedPolicy) -> Self {
        Extractor {
            rules,
            renderer,
            unmatched,
        }
    }

    /// Validates the raw url before anything else, so bad input never costs
    /// a browser session.
    pub async fn extract_url(&self, raw: Option<&str>) -> ExtractionResult {
        let request = ExtractionRequest::parse(raw).inspect_err(|e| {
            log::info!("Rejected extraction request: {}", e);
        })?;

        self.extract(&request).await
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> ExtractionResult {
        let request_id = Uuid::new_v4();
        let url = request.as_str();

        let rule = self.rules.classify(url);
        match rule {
            Some(rule) => log::info!("[{}] {} classified as {}", request_id, url, rule.name),
            None => {
                log::info!("[{}] No rule matches {}", request_id, url);
                if self.unmatched == UnmatchedPolicy::Error {
                    return Err(ExtractionError::NoRuleMatched(url.to_string()));
                }
            }
        }

        let document = self.renderer.render(url).await.inspect_err(|e| {
            log::error!("[{}] Render of {} failed: {}", request_id, url, e);
        })?;
        log::info!(
            "[{}] Rendered {} ({} bytes)",
            request_id,
            url,
            document.html.len()
        );

        let extraction = match rule {
            Some(rule) => Extraction {
                site: Some(rule.name.clone()),
                text: read_article(rule, &document.html),
                status: ExtractionStatus::Complete,
            },
            None => Extraction {
                site: None,
                text: String::new(),
                status: match self.unmatched {
                    UnmatchedPolicy::Partial => ExtractionStatus::Partial,
                    _ => ExtractionStatus::Complete,
                },
            },
        };
        log::info!(
            "[{}] Extracted {} chars from {}",
            request_id,
            extraction.text.chars().count(),
            url
        );

        Ok(extraction)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

fn read_article(rule: &SiteRule, html: &str) -> String {
    let document = Document::parse(html);
    rule.apply(&document)
}
