//! Core traits and types for the duplink simulated-link pipe.
//!
//! This crate defines the vocabulary of the system. The pipe engine in
//! `duplink-pipe` and any future transport speak its types.
//!
//! # Structure
//!
//! - [`error`]  — [`DuplinkError`] and [`Result<T>`] alias
//! - [`stream`] — the [`DuplinkStream`] endpoint trait

mod error;
mod stream;

// --- error
pub use error::{DuplinkError, Result};

// --- stream
pub use stream::{DuplinkStream, DuplinkStreamPtr};
