//! Crate error type.
//!
//! The error surface is narrow by design: invalid script contexts are
//! normalized with a warning rather than raised, identity collisions are
//! an accepted heuristic weakness, and calling into the hooks without an
//! active session is a caller ordering bug that fails loudly instead of
//! returning an error.

use thiserror::Error;

/// Errors produced by the rehydration core.
#[derive(Debug, Error)]
pub enum SdomError {
	/// A value could not be encoded as a bootstrap script literal.
	#[error("failed to encode bootstrap literal: {0}")]
	BootstrapEncode(#[from] serde_json::Error),
}
