//! Credence Fetch Layer
//!
//! Turns article URLs into plain text for analysis:
//! - HTTP client with browser user agents and optional proxy
//! - Paragraph extraction from article HTML
//! - A [`TextProvider`] seam so callers can swap the source

pub mod client;
pub mod extract;

pub use client::*;
pub use extract::*;
