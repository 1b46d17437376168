//! Site activation matcher for `targetUrls`.
//!
//! Supported pattern forms:
//! - `example.com`: the domain and all of its subdomains
//! - `*://example.com`: same, the scheme wildcard is ignored
//! - `https://example.com/path`: the host of the URL
//! - `*.example.org`, `docs.rs?`: glob over the whole domain

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::Settings;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid site pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Site pattern '{pattern}' has no domain")]
    EmptyPattern { pattern: String },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// One parsed `targetUrls` entry.
#[derive(Debug, Clone)]
pub(super) enum SitePattern {
    /// Plain domain, matched exactly or as a parent domain.
    Domain(String),
    Glob(Glob),
}

impl SitePattern {
    pub(super) fn parse(pattern: &str) -> Result<Self, MatcherError> {
        let trimmed = pattern.trim().to_lowercase();
        let without_scheme = trimmed.strip_prefix("*://").unwrap_or(&trimmed);
        let host = if without_scheme.contains("://") {
            domain_of(without_scheme).unwrap_or_default()
        } else {
            without_scheme.split('/').next().unwrap_or_default().to_string()
        };

        if host.is_empty() {
            return Err(MatcherError::EmptyPattern { pattern: pattern.to_string() });
        }

        if host.contains(['*', '?', '[', '{']) {
            let glob = Glob::new(&host)
                .map_err(|source| MatcherError::InvalidPattern { pattern: pattern.to_string(), source })?;
            Ok(Self::Glob(glob))
        } else {
            Ok(Self::Domain(host))
        }
    }
}

/// Decides whether the extension runs on a domain.
#[derive(Debug, Clone)]
pub struct SiteMatcher {
    /// Plain domain patterns
    domains: Vec<String>,
    /// Glob patterns
    globs: GlobSet,
    /// No pattern configured: active everywhere
    match_all: bool,
}

impl SiteMatcher {
    /// Compiles `targetUrls` patterns.
    pub fn new(patterns: &[String]) -> Result<Self, MatcherError> {
        let mut domains = Vec::new();
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            match SitePattern::parse(pattern)? {
                SitePattern::Domain(domain) => domains.push(domain),
                SitePattern::Glob(glob) => {
                    builder.add(glob);
                }
            }
        }

        Ok(Self { domains, globs: builder.build()?, match_all: patterns.is_empty() })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, MatcherError> {
        Self::new(&settings.target_urls)
    }

    /// Returns true if `domain` is covered by any pattern, or no pattern is
    /// configured.
    #[must_use]
    pub fn is_active(&self, domain: &str) -> bool {
        if self.match_all {
            return true;
        }

        let domain = domain.trim().to_lowercase();
        self.domains.iter().any(|pattern| {
            domain == *pattern
                || domain.strip_suffix(pattern.as_str()).is_some_and(|rest| rest.ends_with('.'))
        }) || self.globs.is_match(&domain)
    }
}

/// Host part of `url`, lowercased, without user info or port.
///
/// Input without a scheme is read as `host[/path]`.
#[must_use]
pub fn domain_of(url: &str) -> Option<String> {
    let url = url.trim();
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = after_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or_default()
    } else {
        host_port.split(':').next().unwrap_or_default()
    };

    (!host.is_empty()).then(|| host.to_lowercase())
}
