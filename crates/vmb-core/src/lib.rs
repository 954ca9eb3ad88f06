//! Core of the virtual market bot: the size-constrained content composer.
//!
//! This crate is framework-agnostic. Chat transports live behind the
//! [`messaging::port::MessagingPort`] trait, implemented in adapter crates.

pub mod chunk;
pub mod compose;
pub mod config;
pub mod domain;
pub mod embed;
pub mod errors;
pub mod eval;
pub mod formatting;
pub mod help;
pub mod limits;
pub mod logging;
pub mod messaging;
pub mod notice;
pub mod security;

pub use errors::{ComposeError, Error, Result};
