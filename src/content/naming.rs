//! Name transformations: directory names and documentation slugs.

use regex::Regex;
use std::sync::LazyLock;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid pattern"));
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid pattern"));
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9-]").expect("valid pattern"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]+").expect("valid pattern"));

/// `SomeHTTPIntegration` → `some_http_integration`.
#[must_use]
pub fn underscore(word: &str) -> String {
    let word = ACRONYM_BOUNDARY.replace_all(word, "${1}_${2}");
    let word = CAMEL_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// Replaces underscores and spaces with dashes.
#[must_use]
pub fn dasherize(word: &str) -> String {
    word.replace(['_', ' '], "-")
}

/// Documentation slug of an integration id.
///
/// ```
/// use packsmith_cli::content::naming::normalize_integration_id;
///
/// assert_eq!(normalize_integration_id("Cortex XDR - IOC"), "cortex-xdr---ioc");
/// assert_eq!(normalize_integration_id("SomeIntegration"), "some-integration");
/// ```
#[must_use]
pub fn normalize_integration_id(id: &str) -> String {
    let slug = dasherize(&underscore(id)).to_lowercase();
    NON_SLUG.replace_all(&slug, "").into_owned()
}

/// Joins the alphanumeric words of `name`, capitalizing the first letter of each.
///
/// `"Hello World"` → `"HelloWorld"`, `"my-integration v2"` → `"MyIntegrationV2"`.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    WORD.find_iter(name)
        .map(|m| {
            let mut chars = m.as_str().chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Uppercases the first character and lowercases the rest (`partner` → `Partner`).
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
