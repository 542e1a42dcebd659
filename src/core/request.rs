use std::collections::HashMap;
use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Query keys that must arrive at most once.
const SCALAR_KEYS: [&str; 5] = ["fontSize", "pattern", "overlay", "textColor", "textStrongColor"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected a single {key}")]
    MalformedRequest { key: String },
}

/// Output encoding requested through the path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Png,
    Jpeg,
}

impl FileType {
    /// Only the literal extension `jpeg` selects JPEG; everything else is PNG.
    pub fn from_extension(extension: &str) -> Self {
        if extension == "jpeg" {
            FileType::Jpeg
        } else {
            FileType::Png
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Png => "png",
            FileType::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Png => "image/png",
            FileType::Jpeg => "image/jpeg",
        }
    }
}

/// Background decoration applied to the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pattern {
    None,
    #[default]
    Cross,
    Polka,
}

impl Pattern {
    /// Unknown or missing values fall back to [`Pattern::Cross`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("none") => Pattern::None,
            Some("cross") => Pattern::Cross,
            Some("polka") => Pattern::Polka,
            _ => Pattern::default(),
        }
    }

    /// Class name used on `<body>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::None => "none",
            Pattern::Cross => "cross",
            Pattern::Polka => "polka",
        }
    }
}

/// Fallbacks for the free-form style parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    pub font_size: String,
    pub text_color: String,
    pub text_strong_color: String,
    pub overlay: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            font_size: "96px".to_string(),
            text_color: "#000000".to_string(),
            text_strong_color: "#8340BB".to_string(),
            overlay: String::new(),
        }
    }
}

/// A fully resolved rendering request. Values are decoded but not yet sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub file_type: FileType,
    pub text: String,
    pub pattern: Pattern,
    pub md: bool,
    pub font_size: String,
    pub text_color: String,
    pub text_strong_color: String,
    pub overlay: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multiple(Vec<String>),
}

impl QueryValue {
    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                let first = std::mem::take(first);
                *self = QueryValue::Multiple(vec![first, value]);
            }
            QueryValue::Multiple(values) => values.push(value),
        }
    }
}

/// Query string decoded into a multimap. Repeated keys become [`QueryValue::Multiple`].
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    raw: String,
    values: HashMap<String, QueryValue>,
}

impl RawQuery {
    pub fn from_query_string(raw: &str) -> Self {
        let mut values: HashMap<String, QueryValue> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match values.get_mut(key.as_ref()) {
                Some(existing) => existing.push(value.into_owned()),
                None => {
                    values.insert(key.into_owned(), QueryValue::Single(value.into_owned()));
                }
            }
        }
        Self {
            raw: raw.to_string(),
            values,
        }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let raw = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        Self::from_query_string(&raw)
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.values.get(key)
    }

    /// The value of `key` when it was supplied exactly once.
    fn single(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(QueryValue::Single(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Like [`RawQuery::single`], but an empty value counts as absent.
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.single(key).filter(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for RawQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Splits `text.ext` on its last dot. Earlier dots stay part of the text.
pub fn split_extension(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((text, extension)) => (text, extension),
        None => (path, ""),
    }
}

/// Turns the raw request path and query into a [`RenderRequest`].
pub fn parse_request(
    raw_path: &str,
    query: &RawQuery,
    defaults: &RequestDefaults,
) -> Result<RenderRequest, ParseError> {
    if query.is_empty() {
        tracing::info!("HTTP {}", raw_path);
    } else {
        tracing::info!("HTTP {}?{}", raw_path, query);
    }

    for key in SCALAR_KEYS {
        if let Some(QueryValue::Multiple(_)) = query.get(key) {
            return Err(ParseError::MalformedRequest {
                key: key.to_string(),
            });
        }
    }

    let path = raw_path.strip_prefix('/').unwrap_or(raw_path);
    let (text, extension) = split_extension(path);

    let md = matches!(query.single("md"), Some("1") | Some("true"));

    Ok(RenderRequest {
        file_type: FileType::from_extension(extension),
        text: decode(text),
        pattern: Pattern::parse_or_default(query.single("pattern")),
        md,
        font_size: query
            .non_empty("fontSize")
            .map(str::to_string)
            .unwrap_or_else(|| defaults.font_size.clone()),
        text_color: decode(query.non_empty("textColor").unwrap_or(defaults.text_color.as_str())),
        text_strong_color: decode(
            query
                .non_empty("textStrongColor")
                .unwrap_or(defaults.text_strong_color.as_str()),
        ),
        overlay: decode(query.non_empty("overlay").unwrap_or(defaults.overlay.as_str())),
    })
}
