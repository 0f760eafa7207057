use crate::error::ExtractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    Complete,
    /// The page rendered but no rule knew how to read it.
    Partial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub site: Option<String>,
    pub text: String,
    pub status: ExtractionStatus,
}

impl Extraction {
    pub fn is_partial(&self) -> bool {
        self.status == ExtractionStatus::Partial
    }
}

pub type ExtractionResult = Result<Extraction, ExtractionError>;
