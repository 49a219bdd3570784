//! Core of the bilingual corporate site: localized content resolution, the
//! persisted language selection, the news feed, and the contact-form relay.
//!
//! The presentation layer (pages, styling, routing) lives elsewhere; this
//! crate owns everything with a contract: which content variant loads for
//! the active language, how async results that arrive out of order are
//! suppressed, and how a contact submission becomes exactly one email.

pub mod config;
pub mod contact;
pub mod content;
pub mod i18n;
pub mod latest;
pub mod mailer;
pub mod news;
pub mod server;
