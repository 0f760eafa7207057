use url::Url;

use crate::error::ExtractionError;

/// A validated article URL. Classification works on the string exactly as
/// the caller sent it, so the raw form is kept next to the parsed one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    raw: String,
    url: Url,
}

impl ExtractionRequest {
    pub fn parse(raw: Option<&str>) -> Result<Self, ExtractionError> {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r.trim(),
            _ => return Err(ExtractionError::InvalidInput("url is missing".to_string())),
        };

        let url = Url::parse(raw)
            .map_err(|e| ExtractionError::InvalidInput(format!("{} is not a valid url: {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(ExtractionRequest {
                raw: raw.to_string(),
                url,
            }),
            scheme => Err(ExtractionError::InvalidInput(format!(
                "unsupported scheme `{}`, only http and https pages can be read",
                scheme
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
