//! Internationalization (i18n) module for the bilingual site.
//!
//! The site renders in exactly two languages: Arabic (the default, rendered
//! right-to-left) and English. All language-related logic lives here.
//!
//! # Architecture
//!
//! - `language`: the type-safe `Language` value and its document attributes
//! - `store`: the single process-wide language selection, persisted to disk
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Language, LanguageStore};
//!
//! let store = LanguageStore::open("data/language", Language::default());
//! store.set(Language::English)?;
//! assert_eq!(store.current().dir(), "ltr");
//! ```

mod language;
mod store;

pub use language::{DocumentAttributes, Language};
pub use store::LanguageStore;
