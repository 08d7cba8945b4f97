//! The single upstream the proxy talks to.

use axum::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use axum::http::Uri;
use std::str::FromStr;

/// Scheme and host of the upstream API. Built once at startup, read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamTarget {
    /// Parse a target from its configured scheme and host (`host` may carry a port).
    pub fn new(scheme: &str, host: &str) -> Result<Self, InvalidUri> {
        Ok(Self {
            scheme: Scheme::from_str(scheme)?,
            authority: Authority::from_str(host)?,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Point `uri` at this target, keeping its path and query.
    pub fn rewrite(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_keeps_path_and_query() {
        let target = UpstreamTarget::new("http", "api.internal:9000").unwrap();
        let uri: Uri = "/api/users?page=2".parse().unwrap();

        let rewritten = target.rewrite(&uri).unwrap();
        assert_eq!(rewritten.to_string(), "http://api.internal:9000/api/users?page=2");
    }

    #[test]
    fn rewrite_replaces_existing_authority() {
        let target = UpstreamTarget::new("http", "backend").unwrap();
        let uri: Uri = "http://proxy.example.com:8080/api/login".parse().unwrap();

        let rewritten = target.rewrite(&uri).unwrap();
        assert_eq!(rewritten.authority().unwrap().as_str(), "backend");
        assert_eq!(rewritten.path(), "/api/login");
    }

    #[test]
    fn rewrite_targets_https_upstream() {
        let target = UpstreamTarget::new("https", "api.example.com").unwrap();
        let uri: Uri = "http://localhost:8080/api/items?sort=asc".parse().unwrap();

        let rewritten = target.rewrite(&uri).unwrap();
        assert_eq!(rewritten.scheme(), Some(&Scheme::HTTPS));
        assert_eq!(rewritten.to_string(), "https://api.example.com/api/items?sort=asc");
    }

    #[test]
    fn rejects_bad_host() {
        assert!(UpstreamTarget::new("http", "bad host").is_err());
    }
}
