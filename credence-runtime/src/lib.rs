//! Credence Runtime
//!
//! The boundary between callers and the analyzers: resolves article text
//! from a URL when needed, enforces the minimum input length, and routes
//! each request to the local heuristic analyzer or a remote provider.

pub mod detector;

pub use detector::*;
