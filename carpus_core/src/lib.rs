#![forbid(unsafe_code)]

//! Core domain model and classification engine for the carpus system.
//!
//! This crate provides:
//! - Domain types (bones, families, selections, fracture entries)
//! - The hand/carpus bone taxonomy
//! - Code generation and structural validation
//! - The classification cascade state machine
//! - Persistence (journal, case store, CSV register) and referral intake

pub mod types;
pub mod error;
pub mod taxonomy;
pub mod generate;
pub mod validate;
pub mod cascade;
pub mod config;
pub mod logging;
pub mod journal;
pub mod case;
pub mod register;
pub mod intake;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use taxonomy::{build_default_taxonomy, default_taxonomy};
pub use generate::{generate, CRUSH_CODE};
pub use validate::{validate, Validation};
pub use cascade::{apply, derive_step, next_step, CaptureSession, Choice, Event, Prompt, Step};
pub use config::Config;
pub use journal::{EntrySink, JsonlSink};
pub use register::{journal_to_csv_and_archive, load_recent_entries};
pub use intake::load_referral;
