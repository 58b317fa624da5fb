//! Typed access to listing entries
//!
//! Listing entries are arbitrary JSON objects. Everything the engine needs
//! from them is a string looked up by key, so lookups go through
//! [`FieldView`] and come back as `Option<String>`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Keys that may hold an entry's resource URL, in priority order.
pub const URL_KEYS: [&str; 4] = ["url", "uri", "self", "link"];

/// Keys that may hold an entry's version marker, in priority order.
pub const VERSION_KEYS: [&str; 5] = [
    "version",
    "etag",
    "last_modified",
    "lastModified",
    "modified",
];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// A read-only key/value view over an entry.
pub trait FieldView {
    fn field(&self, key: &str) -> Option<&Value>;
}

impl FieldView for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl FieldView for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

/// String form of a field. Numbers are rendered, empty strings are absent.
pub fn field_string<V: FieldView + ?Sized>(view: &V, key: &str) -> Option<String> {
    match view.field(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First usable field among `keys`, in the given order.
pub fn first_field<V: FieldView + ?Sized>(view: &V, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| field_string(view, key))
}

/// Substitute `{field}` placeholders from the entry's own fields.
///
/// Returns `None` when any placeholder has no usable value.
pub fn expand_template<V: FieldView + ?Sized>(template: &str, view: &V) -> Option<String> {
    let mut complete = true;
    let expanded = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        match field_string(view, caps[1].trim()) {
            Some(value) => value,
            None => {
                complete = false;
                String::new()
            }
        }
    });
    complete.then(|| expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"url": "/a", "uri": "/b", "self": "/c", "link": "/d"}), Some("/a"))]
    #[case(json!({"uri": "/b", "self": "/c", "link": "/d"}), Some("/b"))]
    #[case(json!({"self": "/c", "link": "/d"}), Some("/c"))]
    #[case(json!({"link": "/d"}), Some("/d"))]
    #[case(json!({"url": "", "uri": "/b"}), Some("/b"))]
    #[case(json!({"href": "/x"}), None)]
    fn url_key_priority(#[case] entry: Value, #[case] expected: Option<&str>) {
        assert_eq!(first_field(&entry, &URL_KEYS).as_deref(), expected);
    }

    #[rstest]
    #[case(json!({"version": "v1", "etag": "e", "modified": "m"}), Some("v1"))]
    #[case(json!({"etag": "e", "last_modified": "lm", "lastModified": "LM"}), Some("e"))]
    #[case(json!({"last_modified": "lm", "lastModified": "LM"}), Some("lm"))]
    #[case(json!({"lastModified": "LM", "modified": "m"}), Some("LM"))]
    #[case(json!({"modified": "m"}), Some("m"))]
    #[case(json!({"version": 3}), Some("3"))]
    #[case(json!({"version": null}), None)]
    fn version_key_priority(#[case] entry: Value, #[case] expected: Option<&str>) {
        assert_eq!(first_field(&entry, &VERSION_KEYS).as_deref(), expected);
    }

    #[test]
    fn template_substitutes_fields() {
        let entry = json!({"org": "acme", "id": 42});
        assert_eq!(
            expand_template("/orgs/{org}/users/{id}", &entry).as_deref(),
            Some("/orgs/acme/users/42")
        );
    }

    #[test]
    fn template_with_missing_field_is_none() {
        let entry = json!({"id": 42});
        assert_eq!(expand_template("/orgs/{org}/users/{id}", &entry), None);
    }

    #[test]
    fn template_without_placeholders_is_verbatim() {
        assert_eq!(
            expand_template("/static", &json!({})).as_deref(),
            Some("/static")
        );
    }
}
