//! Pre-serialization pass.
//!
//! Runs once, immediately before the host turns the document into markup:
//! purges server-only material (defense-in-depth — execution and
//! serialization passes can diverge when scripts are added in between),
//! builds the bootstrap plan from the session registry, and appends the
//! rendered bootstrap script to the document body.

use tracing::debug;

use crate::bootstrap::{BootstrapEntry, ElementLookup, render_bootstrap};
use crate::dom::{DocumentOps, ElementOps};
use crate::error::SdomError;
use crate::identity::IDENTITY_ATTR;
use crate::script::{CONTEXT_ATTR, ScriptContext, classify, remove_element};
use crate::session::TrackedElement;

/// Applies the post-execution context policy to every script element in
/// the document: spent `server` markers are dropped, `server-only`
/// elements are removed, unknown values are normalized by [`classify`].
pub(crate) fn purge_scripts<D: DocumentOps>(document: &D) {
	for script in document.elements_by_tag_name("script") {
		match classify(&script) {
			ScriptContext::Server => script.remove_attribute(CONTEXT_ATTR),
			ScriptContext::ServerOnly => remove_element(&script),
			ScriptContext::ClientOnly => {}
		}
	}
}

/// Builds the ordered bootstrap plan from the session's tracked entries.
///
/// Entries with no recorded events are omitted entirely, as are entries
/// whose element no longer carries its persisted identity (the registry
/// holds non-owning handles; the attribute is the liveness check).
/// Elements with their own `id` attribute are looked up by it; everything
/// else falls back to the identity attribute selector.
pub(crate) fn bootstrap_plan<E: ElementOps>(entries: &[TrackedElement<E>]) -> Vec<BootstrapEntry> {
	entries
		.iter()
		.filter_map(|tracked| {
			if tracked.events.is_empty() {
				return None;
			}
			match tracked.element.get_attribute(IDENTITY_ATTR) {
				Some(identity) if identity == tracked.identity => {}
				_ => return None,
			}

			let lookup = match tracked.element.get_attribute("id") {
				Some(dom_id) if !dom_id.is_empty() => ElementLookup::ById(dom_id),
				_ => ElementLookup::ByIdentity(tracked.identity.clone()),
			};

			Some(BootstrapEntry {
				lookup,
				identity: tracked.identity.clone(),
				events: tracked.events.clone(),
			})
		})
		.collect()
}

/// Renders `plan` and appends it to the document body as a new script
/// element.
pub(crate) fn inject_bootstrap<D: DocumentOps>(
	document: &D,
	plan: &[BootstrapEntry],
) -> Result<(), SdomError> {
	let script = document.create_element("script");
	script.set_text_content(&render_bootstrap(plan)?);
	document.append_to_body(&script);
	debug!(entries = plan.len(), "injected rehydration bootstrap script");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MemoryEnvironment;
	use crate::dom::Environment;

	fn tracked(
		element: crate::testing::MemoryElement,
		identity: &str,
		events: &[&str],
	) -> TrackedElement<crate::testing::MemoryElement> {
		TrackedElement {
			identity: identity.to_string(),
			element,
			events: events.iter().map(|e| e.to_string()).collect(),
		}
	}

	#[test]
	fn test_plan_skips_eventless_entries() {
		let env = MemoryEnvironment::new();
		let el = env.document().create_element("div");
		el.set_attribute(IDENTITY_ATTR, "2q");

		let plan = bootstrap_plan(&[tracked(el, "2q", &[])]);
		assert!(plan.is_empty());
	}

	#[test]
	fn test_plan_skips_entries_without_live_identity() {
		let env = MemoryEnvironment::new();
		let el = env.document().create_element("div");
		// Attribute stripped between tracking and serialization.
		let plan = bootstrap_plan(&[tracked(el, "2q", &["click"])]);
		assert!(plan.is_empty());
	}

	#[test]
	fn test_plan_prefers_dom_id_lookup() {
		let env = MemoryEnvironment::new();
		let doc = env.document();

		let with_id = doc.create_element("button");
		with_id.set_attribute(IDENTITY_ATTR, "aa");
		with_id.set_attribute("id", "btn");

		let without_id = doc.create_element("button");
		without_id.set_attribute(IDENTITY_ATTR, "bb");

		let plan = bootstrap_plan(&[
			tracked(with_id, "aa", &["click"]),
			tracked(without_id, "bb", &["click"]),
		]);

		assert_eq!(plan.len(), 2);
		assert_eq!(plan[0].lookup, ElementLookup::ById("btn".to_string()));
		assert_eq!(plan[1].lookup, ElementLookup::ByIdentity("bb".to_string()));
	}

	#[test]
	fn test_purge_handles_every_context() {
		let env = MemoryEnvironment::new();
		let doc = env.document();
		let body = env.body();

		let server = doc.create_element("script");
		server.set_attribute(CONTEXT_ATTR, "server");
		body.append_child(&server);

		let server_only = doc.create_element("script");
		server_only.set_attribute(CONTEXT_ATTR, "server-only");
		body.append_child(&server_only);

		let plain = doc.create_element("script");
		body.append_child(&plain);

		purge_scripts(&doc);

		let remaining = doc.elements_by_tag_name("script");
		assert_eq!(remaining.len(), 2);
		for script in &remaining {
			assert_eq!(script.get_attribute(CONTEXT_ATTR), None);
		}
	}
}
