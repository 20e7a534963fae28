//! Bootstrap script generation.
//!
//! The rehydration bootstrap is generated structurally: the serializer
//! builds an ordered list of [`BootstrapEntry`] values (one per tracked
//! element with recorded events), and [`render_bootstrap`] renders the
//! whole list through a single templating pass. The result is a
//! self-executing script with no injected dependency: a report helper
//! plus, per entry, one element lookup and one listener registration per
//! recorded event type.

use serde::{Deserialize, Serialize};

use crate::error::SdomError;
use crate::identity::IDENTITY_ATTR;

/// How the bootstrap resolves a tracked element in the client DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementLookup {
	/// By the element's own `id` attribute — cheaper and human-stable.
	ById(String),
	/// By attribute selector on the persisted identity.
	ByIdentity(String),
}

impl ElementLookup {
	/// The JS expression resolving the element, rendered as escaped
	/// literals.
	fn to_js(&self) -> Result<String, SdomError> {
		match self {
			Self::ById(id) => Ok(format!("document.getElementById({})", js_string(id)?)),
			Self::ByIdentity(identity) => {
				let selector = format!("[{IDENTITY_ATTR}=\"{identity}\"]");
				Ok(format!("document.querySelector({})", js_string(&selector)?))
			}
		}
	}
}

/// One element's worth of generated rehydration: how to find it and which
/// event types to re-register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapEntry {
	/// Client-side lookup for the element.
	pub lookup: ElementLookup,
	/// The identity reported back to the server when an event fires.
	pub identity: String,
	/// Event types to re-register, in recorded order.
	pub events: Vec<String>,
}

/// Wire payload the generated helper POSTs to the page's own address
/// whenever a tracked event fires in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReport {
	/// The element's persisted identity.
	pub id: String,
	/// The event type that fired.
	#[serde(rename = "eventType")]
	pub event_type: String,
}

/// Renders the bootstrap script for `entries`.
///
/// With no entries the output is the static helper boilerplate only — no
/// per-element statements. The rendered text is safe to place inside a
/// `<script>` element (`</` is escaped).
pub fn render_bootstrap(entries: &[BootstrapEntry]) -> Result<String, SdomError> {
	let mut script = String::with_capacity(512 + entries.len() * 192);

	script.push_str("(function () {\n");
	script.push_str("  \"use strict\";\n");
	script.push_str("  function report(id, eventType) {\n");
	script.push_str("    fetch(window.location.href, {\n");
	script.push_str("      method: \"POST\",\n");
	script.push_str("      headers: { \"Content-Type\": \"application/json\" },\n");
	script.push_str("      body: JSON.stringify({ id: id, eventType: eventType })\n");
	script.push_str("    });\n");
	script.push_str("  }\n");

	for entry in entries {
		let lookup = entry.lookup.to_js()?;
		let identity = js_string(&entry.identity)?;

		script.push_str("  (function (el) {\n");
		script.push_str("    if (!el) { return; }\n");
		for event in &entry.events {
			let event_type = js_string(event)?;
			script.push_str(&format!(
				"    el.addEventListener({event_type}, function () {{ report({identity}, {event_type}); }});\n"
			));
		}
		script.push_str(&format!("  }})({lookup});\n"));
	}

	script.push_str("})();\n");

	Ok(escape_inline_script(&script))
}

/// Renders a value as a JS string literal (JSON string syntax is a subset
/// of JS), escaping quotes and control characters from host-supplied
/// attribute values.
fn js_string(value: &str) -> Result<String, SdomError> {
	Ok(serde_json::to_string(value)?)
}

/// Escapes `</` so the generated text cannot close the `<script>` element
/// it is embedded in. JS reads `<\/` as `</`; HTML does not recognize
/// `<\/script>` as a closing tag.
fn escape_inline_script(script: &str) -> String {
	script.replace("</", "<\\/")
}
