//! Persisted language selection.
//!
//! The active language is process-wide state: initialized once at startup
//! from a single durable key, mutated only through [`LanguageStore::set`],
//! and read by every content-consuming component. The store is held in an
//! `Arc` and shared; there are no other writers.

use crate::i18n::{DocumentAttributes, Language};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

/// The single source of truth for the active language.
#[derive(Debug)]
pub struct LanguageStore {
    path: PathBuf,
    current: RwLock<Language>,
}

impl LanguageStore {
    /// Open the store, reading the persisted language from `path`.
    ///
    /// An absent file or an unrecognized stored value falls back to
    /// `default` without touching the file; the default is only persisted
    /// once the user explicitly switches.
    pub fn open(path: impl AsRef<Path>, default: Language) -> Self {
        let path = path.as_ref().to_path_buf();

        let current = match std::fs::read_to_string(&path) {
            Ok(stored) => match Language::from_code(stored.trim()) {
                Ok(lang) => lang,
                Err(_) => {
                    warn!(
                        "Ignoring invalid persisted language {:?}, using {}",
                        stored.trim(),
                        default.code()
                    );
                    default
                }
            },
            Err(_) => default,
        };

        info!("Active language: {}", current.code());

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    /// The currently active language.
    pub fn current(&self) -> Language {
        *self.current.read().expect("language lock poisoned")
    }

    /// Switch the active language.
    ///
    /// Persists the new code first, then updates the in-memory value, so a
    /// failed write leaves both the file and the active language unchanged.
    pub fn set(&self, language: Language) -> Result<()> {
        std::fs::write(&self.path, language.code()).with_context(|| {
            format!("Failed to persist language to {}", self.path.display())
        })?;

        *self.current.write().expect("language lock poisoned") = language;
        info!("Language switched to {}", language.code());
        Ok(())
    }

    /// Document attributes (`lang`, `dir`, font class) for the active language.
    pub fn document_attributes(&self) -> DocumentAttributes {
        self.current().document_attributes()
    }
}
