//! A single mirror site and the site-list parser.

use serde::Serialize;
use url::Url;

use crate::http::rewrite::ResponseRewriter;

/// Errors raised while turning configuration into sites.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("site list is empty")]
    Empty,

    #[error("entry {position} ({entry:?}) is not of the form name|url")]
    Malformed { position: usize, entry: String },

    #[error("site {name:?} has an invalid url {url:?}: {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },
}

/// One interchangeable mirror origin.
#[derive(Debug, Clone, Serialize)]
pub struct Site {
    pub name: String,
    /// Absolute origin exactly as configured, e.g. `https://mirror.example`.
    pub url: String,
    #[serde(skip)]
    rewriter: ResponseRewriter,
}

impl Site {
    /// Build a site, checking that `url` is an absolute http(s) origin.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self, SiteError> {
        let name = name.into();
        let url = url.into();

        let parsed = Url::parse(&url).map_err(|e| SiteError::InvalidUrl {
            name: name.clone(),
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(SiteError::InvalidUrl {
                name,
                url,
                reason: "expected an absolute http or https origin".to_string(),
            });
        }

        let rewriter = match ResponseRewriter::for_origin(&url) {
            Ok(r) => r,
            Err(e) => {
                return Err(SiteError::InvalidUrl {
                    name,
                    url,
                    reason: e.to_string(),
                })
            }
        };
        Ok(Self {
            name,
            url,
            rewriter,
        })
    }

    /// Rewriter that strips this site's origin from HTML bodies.
    pub fn rewriter(&self) -> &ResponseRewriter {
        &self.rewriter
    }
}

/// Parse a `name|url` list separated by commas. Whitespace around entries,
/// names and urls is ignored; any malformed entry fails the whole list.
pub fn parse_sites(raw: &str) -> Result<Vec<Site>, SiteError> {
    if raw.trim().is_empty() {
        return Err(SiteError::Empty);
    }

    raw.split(',')
        .enumerate()
        .map(|(position, entry)| {
            let (name, url) = entry
                .trim()
                .split_once('|')
                .map(|(n, u)| (n.trim(), u.trim()))
                .filter(|(n, u)| !n.is_empty() && !u.is_empty())
                .ok_or_else(|| SiteError::Malformed {
                    position,
                    entry: entry.trim().to_string(),
                })?;
            Site::new(name, url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_keeps_order() {
        let sites = parse_sites(" main | https://a.example ,backup|https://b.example/ ").unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].name, "main");
        assert_eq!(sites[0].url, "https://a.example");
        assert_eq!(sites[1].name, "backup");
        // Kept verbatim, trailing slash included
        assert_eq!(sites[1].url, "https://b.example/");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(parse_sites(""), Err(SiteError::Empty)));
        assert!(matches!(parse_sites("   "), Err(SiteError::Empty)));
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        let err = parse_sites("a|https://a.example,b").unwrap_err();
        assert!(matches!(err, SiteError::Malformed { position: 1, .. }));

        let err = parse_sites("a|https://a.example,").unwrap_err();
        assert!(matches!(err, SiteError::Malformed { position: 1, .. }));

        let err = parse_sites("|https://a.example").unwrap_err();
        assert!(matches!(err, SiteError::Malformed { position: 0, .. }));
    }

    #[test]
    fn test_parse_rejects_non_http_urls() {
        assert!(matches!(
            parse_sites("a|ftp://a.example"),
            Err(SiteError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_sites("a|not a url"),
            Err(SiteError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_serializes_name_and_url_only() {
        let site = Site::new("main", "https://a.example").unwrap();
        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "main", "url": "https://a.example" })
        );
    }
}
