//! # rewrite-base
//!
//! Core of a source-to-source rewriting engine: a project-wide symbol index
//! and a pipeline that runs rewrite rules over batches of files.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → Pipeline: parse, transform, emit, reconcile
//!   ↓
//! hir     → Symbol index, name helpers, external capabilities
//!   ↓
//! syntax  → Tree model produced by the external parser, walker
//!   ↓
//! base    → Primitives (FileId, Name interning)
//! ```
//!
//! Parsing, type inference, printing and the rules themselves live outside
//! this crate and plug in through the traits of [`project`] and [`hir`].

/// Foundation types: FileId, Name interning
pub mod base;

/// Source tree model and traversal
pub mod syntax;

/// Semantic layer: symbol index and name resolution
pub mod hir;

/// Batch processing: the pipeline orchestrator
pub mod project;

pub use base::{FileId, Interner, Name};
pub use hir::{Capabilities, SymbolIndex};
pub use project::{Pipeline, RunOptions, RunReport};
