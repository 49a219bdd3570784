//! Language type: the two languages the site renders in.
//!
//! Arabic is the canonical language and the fallback default; English is the
//! secondary language. The active language decides which content variant is
//! loaded, the document text direction, and the font family class.

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A supported site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Arabic — canonical, rendered right-to-left.
    Arabic,
    /// English — secondary, rendered left-to-right.
    English,
}

/// The document-level attributes the presentation layer applies on a
/// language switch: `<html lang="..." dir="...">` plus the font class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentAttributes {
    pub lang: &'static str,
    pub dir: &'static str,
    pub font_class: &'static str,
}

impl Language {
    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` for `"ar"` or `"en"`
    /// * `Err` for anything else (unknown code, empty string, wrong case)
    pub fn from_code(code: &str) -> Result<Language> {
        match code {
            "ar" => Ok(Language::Arabic),
            "en" => Ok(Language::English),
            _ => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }

    /// The English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::English => "English",
        }
    }

    /// The language name in its native form.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Arabic => "العربية",
            Language::English => "English",
        }
    }

    /// Whether the language is rendered right-to-left.
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }

    /// The document text-direction attribute value (`"rtl"` or `"ltr"`).
    pub fn dir(&self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    /// The CSS font class the presentation layer uses for this language.
    pub fn font_class(&self) -> &'static str {
        match self {
            Language::Arabic => "font-arabic",
            Language::English => "font-english",
        }
    }

    /// The full set of document attributes for this language.
    pub fn document_attributes(&self) -> DocumentAttributes {
        DocumentAttributes {
            lang: self.code(),
            dir: self.dir(),
            font_class: self.font_class(),
        }
    }

    /// All supported languages, canonical first.
    pub fn all() -> [Language; 2] {
        [Language::Arabic, Language::English]
    }
}

impl Default for Language {
    /// Arabic is the site default when no persisted preference exists.
    fn default() -> Self {
        Language::Arabic
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}
