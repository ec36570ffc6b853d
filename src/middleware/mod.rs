//! Tower middleware layers.
//!
//! [`correlation`] derives the per-request correlation identifier, makes
//! it available to handlers and echoes it on every response.

pub mod correlation;
