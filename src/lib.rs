//! lingo: translate text and keep a locally persisted translation history.
//!
//! The library is split the same way the running client is wired: one
//! [`core::HistoryLedger`] per process, seeded once from a
//! [`core::history::store::HistoryStore`], shared by reference with the
//! [`core::TranslationController`] and whatever front end renders it.

pub mod core;
pub mod shared;
