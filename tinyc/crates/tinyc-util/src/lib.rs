//! tinyc-util - Foundation Types for the TINY Toolchain
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! This crate provides the types every pipeline stage depends on:
//!
//! 1. SOURCE LOCATIONS
//!    `TokenLocation` identifies a point in a source file as
//!    (file name, line, column). Every token and AST node carries one,
//!    and every diagnostic prints one.
//!
//! 2. DIAGNOSTICS
//!    `Handler` is the shared error context threaded through the stages.
//!    Each stage reports as many diagnostics as it can and keeps going;
//!    the driver checks the handler at stage boundaries and stops the
//!    pipeline when an upstream stage has failed. `Phase` names which
//!    stage produced a diagnostic and renders as the user-visible error
//!    kind ("Token Error", "Syntax Error", ...).
//!
//! 3. DRIVER ERRORS
//!    `SourceError` covers the failures that happen before the pipeline
//!    proper starts (the source file cannot be opened or read).
//!
//! The pipeline is single-threaded and strictly linear, so the handler
//! uses interior mutability (`RefCell`) rather than locks: stages share
//! `&Handler` and report through it without threading `&mut` everywhere.

pub mod diagnostic;
pub mod error;
pub mod location;

pub use diagnostic::{Diagnostic, Handler, Phase};
pub use error::SourceError;
pub use location::TokenLocation;
