//! Message lookup and interpolation
//!
//! Dictionaries are flat `key -> template` maps embedded at build time, one per
//! supported language. The active language is carried by an explicit
//! [`Locale`] value instead of process-wide state, so concurrent callers
//! (one per request, one per CLI invocation) never observe each other's choice.
//!
//! ```
//! use controlfin_core::i18n::{catalog, Locale};
//! use serde_json::json;
//!
//! let locale = Locale::default();
//! let msg = catalog().get_message(&locale, "errors.validation.required", Some(&json!({"field": "email"})));
//! assert_eq!(msg, "Field email is required");
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

pub const DEFAULT_LANGUAGE: &str = "en";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

static CATALOG: Lazy<MessageCatalog> = Lazy::new(MessageCatalog::builtin);

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// The catalogue built from the embedded dictionaries
pub fn catalog() -> &'static MessageCatalog {
    &CATALOG
}

/// The language a caller wants messages in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Locale {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Overwrite the language, even with an unsupported code
    ///
    /// Lookups fall back to English for codes without a dictionary.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Language code → flat key/template dictionary
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    dictionaries: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    pub fn new(dictionaries: HashMap<String, HashMap<String, String>>) -> Self {
        Self { dictionaries }
    }

    fn builtin() -> Self {
        let dictionaries = EMBEDDED
            .iter()
            .map(|(code, source)| {
                let dictionary: HashMap<String, String> =
                    serde_json::from_str(source).expect("embedded locale is valid JSON");
                (code.to_string(), dictionary)
            })
            .collect();
        Self { dictionaries }
    }

    pub fn supports(&self, language: &str) -> bool {
        self.dictionaries.contains_key(language)
    }

    /// Supported language codes, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.dictionaries.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Resolve `key` for `locale` and interpolate `{name}` placeholders
    ///
    /// Lookup order: the locale's language, then English, then the key itself.
    /// A placeholder whose param is missing or `null` is left verbatim; params
    /// not referenced by the template are ignored.
    pub fn get_message(&self, locale: &Locale, key: &str, params: Option<&Value>) -> String {
        let template = self
            .lookup(locale.language(), key)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE, key))
            .unwrap_or(key);

        match params {
            Some(params) => interpolate(template, params),
            None => template.to_string(),
        }
    }

    fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.dictionaries
            .get(language)
            .and_then(|d| d.get(key))
            .map(String::as_str)
    }

    /// Pick a language from an Accept-Language style header
    ///
    /// Entries are ranked by their `q` weight (default 1.0, ties keep header
    /// order); the first primary subtag with a dictionary wins, otherwise `en`.
    pub fn negotiate_language(&self, header: Option<&str>) -> String {
        let Some(header) = header else {
            return DEFAULT_LANGUAGE.to_string();
        };

        let mut candidates: Vec<(String, f64)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().splitn(2, ";q=");
                let tag = pieces.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let quality = match pieces.next() {
                    Some(q) => q.trim().parse::<f64>().unwrap_or(0.0),
                    None => 1.0,
                };
                let primary = tag.split('-').next().unwrap_or(tag).to_lowercase();
                Some((primary, quality))
            })
            .collect();

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        candidates
            .into_iter()
            .map(|(code, _)| code)
            .find(|code| self.supports(code))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }
}

fn interpolate(template: &str, params: &Value) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            None | Some(Value::Null) => caps[0].to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}
