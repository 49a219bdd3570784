//! Content resolver: maps a (page, language) pair to its typed content document.
//!
//! Each page has one JSON document per language on disk, named
//! `<page>.<code>.json` (e.g. `home.ar.json`). Documents are deserialized
//! into a per-page record type at load time, so a malformed or misshapen
//! document surfaces as a [`ContentError`] instead of rendering blank fields.
//!
//! There is no caching and no automatic retry: every resolution reads the
//! file, and a failure is terminal until the caller re-triggers it. A fetch
//! outrun by a newer one (language switch mid-flight) is discarded via the
//! generation ticket, never applied.

use crate::i18n::Language;
use crate::latest::{Latest, Ticket};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Logical page names, one per site page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKey {
    Home,
    About,
    Services,
    Expertise,
    News,
    Contact,
}

impl PageKey {
    /// The file-name stem for this page's content documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKey::Home => "home",
            PageKey::About => "about",
            PageKey::Services => "services",
            PageKey::Expertise => "expertise",
            PageKey::News => "news",
            PageKey::Contact => "contact",
        }
    }

    /// Every page the site has.
    pub fn all() -> [PageKey; 6] {
        [
            PageKey::Home,
            PageKey::About,
            PageKey::Services,
            PageKey::Expertise,
            PageKey::News,
            PageKey::Contact,
        ]
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled block of copy, shared by several page schemas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// A named offering on the services page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceEntry {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HomeContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub cta_label: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AboutContent {
    pub title: String,
    pub intro: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServicesContent {
    pub title: String,
    pub intro: String,
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpertiseContent {
    pub title: String,
    pub areas: Vec<Section>,
}

/// Static chrome around the news listing; the articles themselves come from
/// the news API (see `crate::news`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsPageContent {
    pub title: String,
    pub empty_notice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactLabels {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub submit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactContent {
    pub title: String,
    pub intro: String,
    pub labels: ContactLabels,
}

/// A fully loaded, validated content document for one (page, language) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentDocument {
    Home(HomeContent),
    About(AboutContent),
    Services(ServicesContent),
    Expertise(ExpertiseContent),
    News(NewsPageContent),
    Contact(ContactContent),
}

impl ContentDocument {
    /// The page this document belongs to.
    pub fn page(&self) -> PageKey {
        match self {
            ContentDocument::Home(_) => PageKey::Home,
            ContentDocument::About(_) => PageKey::About,
            ContentDocument::Services(_) => PageKey::Services,
            ContentDocument::Expertise(_) => PageKey::Expertise,
            ContentDocument::News(_) => PageKey::News,
            ContentDocument::Contact(_) => PageKey::Contact,
        }
    }
}

/// Why a content document could not be resolved.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("No content document for page '{page}' in language '{language}'")]
    Missing { page: PageKey, language: Language },

    #[error("Malformed content document for page '{page}' in language '{language}': {detail}")]
    Malformed {
        page: PageKey,
        language: Language,
        detail: String,
    },

    #[error("Failed to read content document for page '{page}': {source}")]
    Io {
        page: PageKey,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves (page, language) pairs to typed content documents.
#[derive(Debug, Clone)]
pub struct ContentResolver {
    content_dir: PathBuf,
    latest: Latest,
}

impl ContentResolver {
    pub fn new(content_dir: impl AsRef<Path>) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            latest: Latest::new(),
        }
    }

    /// Start a new resolution generation.
    ///
    /// Every call invalidates previously issued tickets, so a resolution
    /// still in flight for the old (page, language) pair will be discarded
    /// by [`resolve_tagged`](Self::resolve_tagged).
    pub fn begin(&self) -> Ticket {
        self.latest.begin()
    }

    /// Resolve, discarding the result if `ticket` is no longer current.
    ///
    /// Returns `None` for a stale completion. The staleness check runs after
    /// the I/O completes, so the consumer only ever observes the result that
    /// matches the most recently initiated resolution.
    pub async fn resolve_tagged(
        &self,
        ticket: &Ticket,
        page: PageKey,
        language: Language,
    ) -> Option<Result<ContentDocument, ContentError>> {
        let result = self.resolve(page, language).await;

        if !ticket.is_current() {
            warn!(
                "Discarding stale content resolution for {}.{}",
                page,
                language.code()
            );
            return None;
        }

        Some(result)
    }

    /// Resolve with a fresh ticket in one call.
    pub async fn resolve_latest(
        &self,
        page: PageKey,
        language: Language,
    ) -> Option<Result<ContentDocument, ContentError>> {
        let ticket = self.begin();
        self.resolve_tagged(&ticket, page, language).await
    }

    /// Load and validate the content document for one (page, language) pair.
    pub async fn resolve(
        &self,
        page: PageKey,
        language: Language,
    ) -> Result<ContentDocument, ContentError> {
        let path = self.document_path(page, language);

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::Missing { page, language });
            }
            Err(e) => return Err(ContentError::Io { page, source: e }),
        };

        parse_document(page, language, &raw)
    }

    fn document_path(&self, page: PageKey, language: Language) -> PathBuf {
        self.content_dir
            .join(format!("{}.{}.json", page.as_str(), language.code()))
    }
}

/// Deserialize `raw` into the typed document for `page`.
fn parse_document(
    page: PageKey,
    language: Language,
    raw: &str,
) -> Result<ContentDocument, ContentError> {
    let malformed = |e: serde_json::Error| ContentError::Malformed {
        page,
        language,
        detail: e.to_string(),
    };

    let document = match page {
        PageKey::Home => ContentDocument::Home(serde_json::from_str(raw).map_err(malformed)?),
        PageKey::About => ContentDocument::About(serde_json::from_str(raw).map_err(malformed)?),
        PageKey::Services => {
            ContentDocument::Services(serde_json::from_str(raw).map_err(malformed)?)
        }
        PageKey::Expertise => {
            ContentDocument::Expertise(serde_json::from_str(raw).map_err(malformed)?)
        }
        PageKey::News => ContentDocument::News(serde_json::from_str(raw).map_err(malformed)?),
        PageKey::Contact => {
            ContentDocument::Contact(serde_json::from_str(raw).map_err(malformed)?)
        }
    };

    Ok(document)
}
