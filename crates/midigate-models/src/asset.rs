//! URL types passed between the upload, job and fetch stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid URL '{0}': {1}")]
    Invalid(String, url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

fn parse_http_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw).map_err(|e| UrlError::Invalid(raw.to_string(), e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::UnsupportedScheme(other.to_string())),
    }
}

/// Public URL of an uploaded input, returned by the storage service.
///
/// The remote copy is never deleted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagedUrl(String);

impl StagedUrl {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        parse_http_url(raw).map(|u| Self(u.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StagedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL of the final artifact, extracted from a completed job's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultReference(String);

impl ResultReference {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        parse_http_url(raw).map(|u| Self(u.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_url_accepts_https() {
        let url = StagedUrl::parse("https://res.cloudinary.com/demo/raw/upload/a.wav").unwrap();
        assert_eq!(url.as_str(), "https://res.cloudinary.com/demo/raw/upload/a.wav");
    }

    #[test]
    fn test_result_reference_rejects_other_schemes() {
        assert!(matches!(
            ResultReference::parse("ftp://x/y.mid"),
            Err(UrlError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            ResultReference::parse("not a url"),
            Err(UrlError::Invalid(..))
        ));
    }

    #[test]
    fn test_result_reference_keeps_path() {
        let reference = ResultReference::parse("https://x/y.mid").unwrap();
        assert_eq!(reference.as_str(), "https://x/y.mid");
    }
}
