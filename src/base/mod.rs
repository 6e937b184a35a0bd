//! Foundation types for the rewriting toolchain.
//!
//! - [`FileId`] - Handles for files taking part in a run
//! - [`Name`], [`Interner`] - String interning for type and member names
//!
//! This module has NO dependencies on other modules of the crate.

mod file_id;
mod intern;

pub use file_id::FileId;
pub use intern::{Interner, Name};
