//! Responses as seen by the sync engine

use std::collections::BTreeMap;

use reqwest::Url;
use serde_json::Value;

use crate::{Error, Result};

/// A hypermedia link taken from the `Link` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub uri: String,
}

/// A raw response. Header names are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a header. Repeated headers are folded into one comma-separated value.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON and extract links.
    ///
    /// An empty body decodes to `null`.
    pub fn parse(self) -> Result<ParsedResponse> {
        let body = if self.body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&self.body).map_err(|source| Error::Decode {
                url: self.url.clone(),
                source,
            })?
        };
        let links = self
            .header("link")
            .map(|value| parse_link_header(value, &self.url))
            .unwrap_or_default();

        Ok(ParsedResponse {
            status: self.status,
            headers: self.headers,
            body,
            links,
        })
    }
}

/// A response with its body decoded as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    pub links: Vec<Link>,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First link with the given relation.
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel.eq_ignore_ascii_case(rel))
            .map(|link| link.uri.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Parse an RFC 8288 `Link` header value.
///
/// Relative targets are resolved against `base`. A link carrying several
/// space-separated relations yields one [`Link`] per relation.
pub fn parse_link_header(value: &str, base: &str) -> Vec<Link> {
    let base_url = Url::parse(base).ok();
    let mut links = Vec::new();

    for part in value.split(',') {
        let mut pieces = part.split(';');
        let Some(target) = pieces.next() else {
            continue;
        };
        let Some(uri) = target
            .trim()
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
        else {
            continue;
        };
        let uri = match &base_url {
            Some(base) => base
                .join(uri)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| uri.to_string()),
            None => uri.to_string(),
        };

        for param in pieces {
            let Some((key, val)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            for rel in val.trim().trim_matches('"').split_whitespace() {
                links.push(Link {
                    rel: rel.to_string(),
                    uri: uri.clone(),
                });
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_relative_describedby_link() {
        let links = parse_link_header(
            "</schemas/user>; rel=\"describedby\"",
            "https://api.example.com/users/1",
        );
        assert_eq!(
            links,
            vec![Link {
                rel: "describedby".into(),
                uri: "https://api.example.com/schemas/user".into(),
            }]
        );
    }

    #[test]
    fn parses_multiple_links_and_relations() {
        let links = parse_link_header(
            "<https://x.test/a>; rel=\"next last\", <https://x.test/b>; title=\"B\"; rel=prev",
            "https://x.test/",
        );
        let rels: Vec<&str> = links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["next", "last", "prev"]);
        assert_eq!(links[2].uri, "https://x.test/b");
    }

    #[test]
    fn malformed_link_segments_are_skipped() {
        assert!(parse_link_header("nonsense; rel=x", "https://x.test/").is_empty());
    }

    #[test]
    fn parse_decodes_body_and_links() {
        let parsed = Response::new("https://api.example.com/users/1", 200)
            .with_header("ETag", "\"v1\"")
            .with_header("Link", "</schemas/user>; rel=describedby")
            .with_body(r#"{"id": 1}"#)
            .parse()
            .unwrap();

        assert_eq!(parsed.body, json!({"id": 1}));
        assert_eq!(parsed.header("etag"), Some("\"v1\""));
        assert_eq!(parsed.link("describedby"), Some("https://api.example.com/schemas/user"));
    }

    #[test]
    fn empty_body_parses_as_null() {
        let parsed = Response::new("https://x.test/", 204).parse().unwrap();
        assert_eq!(parsed.body, Value::Null);
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = Response::new("https://x.test/", 200)
            .with_body("<html></html>")
            .parse()
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn repeated_headers_are_folded() {
        let response = Response::new("https://x.test/", 200)
            .with_header("Link", "<a>; rel=a")
            .with_header("link", "<b>; rel=b");
        assert_eq!(response.header("LINK"), Some("<a>; rel=a, <b>; rel=b"));
    }
}
