//! Script execution-context classification.
//!
//! Script elements declare where they are meant to run through the
//! [`CONTEXT_ATTR`] attribute: `server` (runs in the server pass, then
//! survives as an ordinary client script), `server-only` (runs in the
//! server pass, then must never reach the client) or `client-only` (the
//! default — not executed server-side). Anything else is invalid input
//! and is downgraded to a diagnostic warning plus normalization to the
//! safe default, never a hard failure.

use tracing::{debug, warn};

use crate::dom::ElementOps;

/// Attribute carrying a script element's declared execution context.
pub const CONTEXT_ATTR: &str = "context";

/// Declared execution context of a script element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptContext {
	/// Executes during the server pass, then stays in the markup as an
	/// ordinary script (the marker is dropped after execution).
	Server,
	/// Executes during the server pass; the element is removed before
	/// serialization so its content never reaches the client.
	ServerOnly,
	/// Never executes server-side. The default when the attribute is
	/// absent.
	ClientOnly,
}

impl ScriptContext {
	/// Parses a raw attribute value. `None` for unrecognized input.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"server" => Some(Self::Server),
			"server-only" => Some(Self::ServerOnly),
			"client-only" => Some(Self::ClientOnly),
			_ => None,
		}
	}

	/// The canonical attribute value.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Server => "server",
			Self::ServerOnly => "server-only",
			Self::ClientOnly => "client-only",
		}
	}

	/// Whether this context executes during the server pass.
	pub fn executes_on_server(self) -> bool {
		matches!(self, Self::Server | Self::ServerOnly)
	}
}

/// Classifies a script element, normalizing invalid input.
///
/// Absent attribute classifies as `client-only` without touching the
/// element. An unrecognized value emits a warning and is rewritten to
/// `client-only` on the element, preventing unintended server-side
/// execution of unclassified scripts.
pub fn classify<E: ElementOps>(script: &E) -> ScriptContext {
	match script.get_attribute(CONTEXT_ATTR) {
		None => ScriptContext::ClientOnly,
		Some(raw) => ScriptContext::parse(&raw).unwrap_or_else(|| {
			warn!(
				context = %raw,
				"unknown script context, defaulting to 'client-only'"
			);
			script.set_attribute(CONTEXT_ATTR, ScriptContext::ClientOnly.as_str());
			ScriptContext::ClientOnly
		}),
	}
}

/// Decides whether a script element should execute during the server
/// pass. Call before executing any script found in the document.
pub fn script_pre_execution<E: ElementOps>(script: &E) -> bool {
	classify(script).executes_on_server()
}

/// Applies the post-execution policy to a script element.
///
/// Only call after [`script_pre_execution`] returned `true` and the
/// script has run. `server` scripts lose their context marker (their
/// server-side execution already happened; what survives is an ordinary
/// client script). `server-only` scripts are removed from the document
/// entirely.
pub fn script_post_execution<E: ElementOps>(script: &E, source: &str) {
	match classify(script) {
		ScriptContext::Server => {
			script.remove_attribute(CONTEXT_ATTR);
			debug!(bytes = source.len(), "normalized server script after execution");
		}
		ScriptContext::ServerOnly => {
			debug!(bytes = source.len(), "removing server-only script");
			remove_element(script);
		}
		ScriptContext::ClientOnly => {}
	}
}

/// Detaches an element, falling back to parent-mediated removal when the
/// host element type has no self-removal operation.
pub(crate) fn remove_element<E: ElementOps>(element: &E) {
	if !element.remove()
		&& let Some(parent) = element.parent()
	{
		parent.remove_child(element);
	}
}
