//! Ordered, immutable collection of mirror sites.

use serde::Serialize;

use super::site::{parse_sites, Site, SiteError};

/// The configured mirrors, in configuration order.
///
/// Never empty. Built once at startup and shared behind an `Arc`; it has no
/// interior mutability, so concurrent reads need no locking.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SiteRegistry {
    sites: Vec<Site>,
}

impl SiteRegistry {
    /// Create a registry, rejecting an empty site list.
    pub fn new(sites: Vec<Site>) -> Result<Self, SiteError> {
        if sites.is_empty() {
            return Err(SiteError::Empty);
        }
        Ok(Self { sites })
    }

    /// Parse and build in one step from a `name|url,...` string.
    pub fn from_list(raw: &str) -> Result<Self, SiteError> {
        Self::new(parse_sites(raw)?)
    }

    pub fn get(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Site)> {
        self.sites.iter().enumerate()
    }

    /// The default site (index 0).
    pub fn primary(&self) -> &Site {
        &self.sites[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_preserves_order() {
        let registry =
            SiteRegistry::from_list("a|https://a.example,b|https://b.example,c|https://c.example")
                .unwrap();

        assert_eq!(registry.len(), 3);
        let names: Vec<_> = registry.iter().map(|(i, s)| (i, s.name.as_str())).collect();
        assert_eq!(names, vec![(0, "a"), (1, "b"), (2, "c")]);
        assert_eq!(registry.primary().name, "a");
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_registry_rejects_empty() {
        assert!(matches!(SiteRegistry::new(Vec::new()), Err(SiteError::Empty)));
    }

    #[test]
    fn test_registry_serializes_as_array() {
        let registry = SiteRegistry::from_list("a|https://a.example,b|https://b.example").unwrap();
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "name": "a", "url": "https://a.example" },
                { "name": "b", "url": "https://b.example" }
            ])
        );
    }
}
