//! Core translation-history subsystem
//!
//! Three pieces with one consistency contract:
//! - `history`: the in-session ledger of translation records and its
//!   persistent single-slot mirror
//! - `translator`: the single-flight request controller over the remote
//!   translation service
//! - `languages`: the static language catalog consulted at record creation

pub mod history;
pub mod languages;
pub mod translator;

pub use history::HistoryLedger;
pub use translator::{HttpTranslationBackend, TranslationController};
