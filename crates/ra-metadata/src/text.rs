//! Language-tagged description text.

use serde::{Deserialize, Serialize};

/// Language assumed for descriptions that carry no `xml:lang` attribute.
pub const DEFAULT_LANG: &str = "en";

/// A description string with an optional language tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Value of the `xml:lang` attribute, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// The text content.
    pub value: String,
}

impl LocalizedText {
    /// Text without a language tag.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            lang: None,
            value: value.into(),
        }
    }

    /// Text with an explicit language tag.
    pub fn with_lang(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            value: value.into(),
        }
    }

    /// Language used to identify this entry among its siblings.
    ///
    /// Untagged text counts as [`DEFAULT_LANG`], so `<description>` and
    /// `<description xml:lang="en">` describe the same slot.
    pub fn lang_key(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }
}
