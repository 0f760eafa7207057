use std::fmt;

use scraper::Selector;
use serde::Deserialize;

use crate::{configuration::RuleSettings, domain::Document, error::RuleError};

pub const BRUNCH_PREFIX: &str = "https://brunch.co.kr/";
pub const MEDIUM_PREFIX: &str = "https://medium.com/";

/// What to do with a page whose url no rule claims.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Render anyway and answer with empty text.
    #[default]
    Empty,
    /// Like `Empty`, but the result is flagged partial.
    Partial,
    /// Fail before rendering.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
}

pub struct FieldSelector {
    pub field: Field,
    pub source: String,
    selector: Selector,
}

impl FieldSelector {
    pub fn new(rule: &str, field: Field, source: &str) -> Result<Self, RuleError> {
        let selector = Selector::parse(source).map_err(|e| RuleError::InvalidSelector {
            rule: rule.to_string(),
            selector: source.to_string(),
            reason: format!("{:?}", e),
        })?;

        Ok(FieldSelector {
            field,
            source: source.to_string(),
            selector,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    Body,
    /// `label + title + body`, nothing in between.
    LabeledTitle { label: String },
}

#[derive(Debug, Default, PartialEq)]
pub struct Fields {
    pub title: String,
    pub body: String,
}

impl Assembly {
    pub fn assemble(&self, fields: &Fields) -> String {
        match self {
            Assembly::Body => fields.body.clone(),
            Assembly::LabeledTitle { label } => {
                format!("{}{}{}", label, fields.title, fields.body)
            }
        }
    }
}

pub struct SiteRule {
    pub name: String,
    pub prefix: String,
    pub selectors: Vec<FieldSelector>,
    pub assembly: Assembly,
}

impl fmt::Debug for SiteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteRule")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("assembly", &self.assembly)
            .finish()
    }
}

impl SiteRule {
    pub fn brunch() -> Result<Self, RuleError> {
        Ok(SiteRule {
            name: "brunch".to_string(),
            prefix: BRUNCH_PREFIX.to_string(),
            selectors: vec![
                FieldSelector::new("brunch", Field::Title, "h1.cover_title")?,
                FieldSelector::new("brunch", Field::Body, ".wrap_body > p.item_type_text")?,
            ],
            assembly: Assembly::LabeledTitle {
                label: "제목: ".to_string(),
            },
        })
    }

    pub fn medium() -> Result<Self, RuleError> {
        Ok(SiteRule {
            name: "medium".to_string(),
            prefix: MEDIUM_PREFIX.to_string(),
            selectors: vec![FieldSelector::new(
                "medium",
                Field::Body,
                "p.pw-post-body-paragraph",
            )?],
            assembly: Assembly::Body,
        })
    }

    pub fn from_settings(settings: &RuleSettings) -> Result<Self, RuleError> {
        let mut selectors = vec![];
        if let Some(title) = &settings.title {
            selectors.push(FieldSelector::new(&settings.name, Field::Title, title)?);
        }
        selectors.push(FieldSelector::new(&settings.name, Field::Body, &settings.body)?);

        let assembly = match (&settings.title, &settings.title_label) {
            (Some(_), label) => Assembly::LabeledTitle {
                label: label.clone().unwrap_or_default(),
            },
            (None, Some(_)) => {
                return Err(RuleError::LabelWithoutTitle {
                    rule: settings.name.clone(),
                })
            }
            (None, None) => Assembly::Body,
        };

        Ok(SiteRule {
            name: settings.name.clone(),
            prefix: settings.prefix.clone(),
            selectors,
            assembly,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }

    /// Runs every selector against the document and assembles the result.
    /// Selectors that match nothing contribute empty text.
    pub fn apply(&self, document: &Document) -> String {
        let mut fields = Fields::default();

        for fs in self.selectors.iter() {
            let text = document.text_of_all(&fs.selector);
            match fs.field {
                Field::Title => fields.title.push_str(&text),
                Field::Body => fields.body.push_str(&text),
            }
        }

        self.assembly.assemble(&fields)
    }
}

/// Ordered rules; registration order is priority order.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<SiteRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { rules: vec![] }
    }

    pub fn builtin() -> Result<Self, RuleError> {
        let mut rules = RuleSet::new();
        rules.register(SiteRule::brunch()?);
        rules.register(SiteRule::medium()?);

        Ok(rules)
    }

    /// Built-in rules followed by the ones from configuration.
    pub fn from_settings(settings: &[RuleSettings]) -> Result<Self, RuleError> {
        let mut rules = RuleSet::builtin()?;
        for rs in settings {
            rules.register(SiteRule::from_settings(rs)?);
        }

        Ok(rules)
    }

    pub fn register(&mut self, rule: SiteRule) {
        self.rules.push(rule);
    }

    pub fn classify(&self, url: &str) -> Option<&SiteRule> {
        self.rules.iter().find(|rule| rule.matches(url))
    }

    pub fn rules(&self) -> &[SiteRule] {
        &self.rules
    }
}
