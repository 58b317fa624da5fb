//! Remote index refresh
//!
//! Reconciles [`Meta`] against the remote listing. Only metadata changes
//! here: no resource bodies are fetched and nothing is saved.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info};

use bulk_fs::{BulkPath, NormalizedPath};
use bulk_http::{HttpClient, Request, Url};

use crate::entry::{self, URL_KEYS, VERSION_KEYS};
use crate::meta::{FileRecord, Meta};
use crate::{Error, Result, json_path};

/// One listing entry reduced to what the engine tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Listed {
    url: String,
    version: String,
}

impl Meta {
    /// Query the listing and update every record's remote version.
    ///
    /// The whole listing is validated before anything is applied, so a
    /// fatal error leaves the metadata untouched. Records that are no
    /// longer listed end up with an empty `version_remote`.
    pub fn refresh_index(&mut self, client: &dyn HttpClient) -> Result<()> {
        debug!(url = %self.url, "refreshing index");
        let listing_url = parse_url(&self.url)?;

        let response = client.send(&Request::get(&self.url))?;
        if !response.is_success() {
            return Err(Error::ListRequest {
                url: self.url.clone(),
                status: response.status,
            });
        }
        let response = response.parse()?;

        let entries = match &self.filter {
            Some(filter) => json_path::select(&response.body, filter),
            None => Some(&response.body),
        }
        .and_then(Value::as_array)
        .ok_or(Error::NotAList)?;

        let listed = entries
            .iter()
            .enumerate()
            .map(|(index, value)| self.resolve_entry(&listing_url, index, value))
            .collect::<Result<Vec<_>>>()?;

        let base = if listed.is_empty() {
            self.empty_listing_base(&listing_url)
        } else {
            let urls: Vec<&str> = listed.iter().map(|l| l.url.as_str()).collect();
            common_base(&urls)
        };

        let mut by_path: BTreeMap<String, Listed> = BTreeMap::new();
        for (index, item) in listed.into_iter().enumerate() {
            let path = local_path(&base, &item.url).ok_or_else(|| Error::InvalidEntry {
                index,
                reason: format!("{} does not map to a local path under {base}", item.url),
            })?;
            if let Some(first) = by_path.get(&path) {
                return Err(Error::DuplicateEntry {
                    path,
                    first: first.url.clone(),
                    second: item.url,
                });
            }
            by_path.insert(path, item);
        }

        self.base = base;
        for record in self.files.values_mut() {
            record.version_remote.clear();
        }
        for (path, item) in by_path {
            let record = self
                .files
                .entry(path.clone())
                .or_insert_with(|| FileRecord::new(path, item.url.clone()));
            record.url = item.url;
            record.version_remote = item.version;
        }

        info!(
            base = %self.base,
            tracked = self.files.len(),
            "index refreshed"
        );
        Ok(())
    }

    fn resolve_entry(&self, listing_url: &Url, index: usize, value: &Value) -> Result<Listed> {
        let raw_url = entry::first_field(value, &URL_KEYS).or_else(|| {
            self.url_template
                .as_deref()
                .and_then(|template| entry::expand_template(template, value))
        });
        let Some(raw_url) = raw_url else {
            return Err(Error::InvalidEntry {
                index,
                reason: "no url".to_string(),
            });
        };
        let Some(version) = entry::first_field(value, &VERSION_KEYS) else {
            return Err(Error::InvalidEntry {
                index,
                reason: "no version".to_string(),
            });
        };

        let url = listing_url
            .join(&raw_url)
            .map_err(|e| Error::InvalidEntry {
                index,
                reason: format!("bad url {raw_url}: {e}"),
            })?;

        Ok(Listed {
            url: url.to_string(),
            version,
        })
    }

    /// Base for a listing with no entries: the previous base, else the
    /// listing URL itself as a directory.
    fn empty_listing_base(&self, listing_url: &Url) -> String {
        if !self.base.is_empty() {
            return self.base.clone();
        }
        let mut url = listing_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        let mut base = url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        base
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Directory part of a URL: everything up to and including the last `/`,
/// ignoring one trailing slash.
fn directory(url: &str) -> &str {
    let trimmed = url.strip_suffix('/').unwrap_or(url);
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[..=pos],
        None => "",
    }
}

/// Longest `/`-terminated prefix shared by the directories of all URLs.
///
/// URLs with no shared path segment degenerate to their common origin.
pub fn common_base(urls: &[&str]) -> String {
    let Some((first, rest)) = urls.split_first() else {
        return String::new();
    };
    let mut prefix = directory(first);
    for url in rest {
        let dir = directory(url);
        let shared = prefix
            .char_indices()
            .zip(dir.chars())
            .find(|((_, a), b)| a != b)
            .map(|((pos, _), _)| pos)
            .unwrap_or_else(|| prefix.len().min(dir.len()));
        prefix = &prefix[..shared];
    }
    match prefix.rfind('/') {
        Some(pos) => prefix[..=pos].to_string(),
        None => String::new(),
    }
}

/// Checkout-relative path for a resolved URL: its suffix after `base`,
/// plus `.json`.
///
/// Paths that escape the checkout or land in the hidden directory are
/// rejected.
fn local_path(base: &str, url: &str) -> Option<String> {
    let suffix = url.strip_prefix(base)?;
    let suffix = suffix.strip_suffix('/').unwrap_or(suffix);
    if suffix.is_empty() {
        return None;
    }
    let path = NormalizedPath::new(format!("{suffix}.json"));
    if !path.is_contained() || BulkPath::is_hidden(path.as_str()) {
        return None;
    }
    Some(path.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&["https://api.example.com/items/a1", "https://api.example.com/items/b2"], "https://api.example.com/items/")]
    #[case(&["https://api.example.com/items/a1"], "https://api.example.com/items/")]
    #[case(&["https://api.example.com/a/1", "https://api.example.com/ab/2"], "https://api.example.com/")]
    #[case(&["https://api.example.com/a1", "https://api.example.com/b1"], "https://api.example.com/")]
    #[case(&["https://api.example.com/items/a1/", "https://api.example.com/items/b1/"], "https://api.example.com/items/")]
    #[case(&["https://api.example.com/v1/users/1", "https://api.example.com/v1/groups/2"], "https://api.example.com/v1/")]
    fn computes_common_base(#[case] urls: &[&str], #[case] expected: &str) {
        assert_eq!(common_base(urls), expected);
    }

    #[rstest]
    #[case("https://x.test/items/", "https://x.test/items/a1", Some("a1.json"))]
    #[case("https://x.test/items/", "https://x.test/items/a1/", Some("a1.json"))]
    #[case("https://x.test/", "https://x.test/users/7", Some("users/7.json"))]
    #[case("https://x.test/items/", "https://x.test/items/", None)]
    #[case("https://x.test/items/", "https://y.test/items/a1", None)]
    #[case("https://x.test/items/", "https://x.test/items/.restbulk/notes", None)]
    #[case("https://x.test/items/", "https://x.test/items/.restbulk/cache/a1", None)]
    #[case("https://x.test/items/", "https://x.test/items/.restbulker/a1", Some(".restbulker/a1.json"))]
    fn maps_urls_to_local_paths(
        #[case] base: &str,
        #[case] url: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(local_path(base, url).as_deref(), expected);
    }
}
