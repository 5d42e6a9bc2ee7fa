use log::trace;
use regex::Regex;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// Pure text transform applied to actual output before it is compared
///
/// Normalizers strip content that changes between runs, such as version
/// banners or line numbers. They are never applied to the expected file.
#[derive(Clone)]
pub struct Normalizer {
    name: String,
    transform: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl Normalizer {
    pub fn new<F>(name: impl Into<String>, transform: F) -> Normalizer
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Normalizer {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// Replace every match of `pattern`, like `sed 's/pattern/replacement/g'`
    ///
    /// `replacement` may refer to capture groups as `$1` or `${name}`.
    pub fn replace(pattern: &str, replacement: &str) -> Result<Normalizer, NormalizerError> {
        let regex = Regex::new(pattern).map_err(|source| NormalizerError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        let replacement = replacement.to_owned();

        Ok(Normalizer::new(
            format!("replace '{}' with '{}'", pattern, replacement),
            move |text| regex.replace_all(text, replacement.as_str()).into_owned(),
        ))
    }

    pub fn strip_digits() -> Normalizer {
        Normalizer::new("strip digits", |text| {
            text.chars().filter(|c| !c.is_ascii_digit()).collect()
        })
    }

    pub fn strip_first_line() -> Normalizer {
        Normalizer::new("strip first line", |text| match text.split_once('\n') {
            Some((_, rest)) => rest.to_owned(),
            None => String::new(),
        })
    }

    pub fn unix_newlines() -> Normalizer {
        Normalizer::new("unix newlines", |text| text.replace("\r\n", "\n"))
    }

    /// Compose normalizers, applied left to right
    pub fn chain(normalizers: Vec<Normalizer>) -> Normalizer {
        let name = normalizers
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(", then ");

        Normalizer::new(name, move |text| {
            normalizers
                .iter()
                .fold(text.to_owned(), |acc, normalizer| normalizer.apply(&acc))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, text: &str) -> String {
        trace!("normalizing with {}", self.name);
        (self.transform)(text)
    }
}

impl Debug for Normalizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Normalizer").field(&self.name).finish()
    }
}
