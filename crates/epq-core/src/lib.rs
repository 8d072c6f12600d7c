//! # epq-core
//!
//! Core types and error definitions for the epq interpolation engine.
//!
//! This crate provides the building blocks shared by the other crates in
//! the workspace: scalar type aliases, the error hierarchy with its
//! `ensure!` / `fail!` macros, and the process-wide `Settings`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

/// Global library settings (duplicate-abscissa policy).
pub mod settings;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result, SlicePath};
pub use settings::{DuplicatePolicy, ScopedSettings, Settings};
