//! Session lifecycle and the per-session identity registry.
//!
//! One render = one session = one registry. The registry is explicit state
//! owned by the [`Session`] handle — there is no hidden field on the
//! shared environment — and it is discarded when the session finishes.
//! Hook installation on the shared element capability is keyed per
//! capability, not per session, and is intentionally left in place after
//! cleanup (uninstalling would risk breaking a still-running sibling
//! session over the same capability); a finished session's binding inside
//! the hook simply goes dead.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::dom::{ElementOps, Environment};
use crate::error::SdomError;
use crate::hooks;
use crate::identity::{IDENTITY_ATTR, identity_of, render_identity, structural_seed};
use crate::serialize;

/// One tracked element: its identity, a handle to the element, and the
/// distinct event types recorded for it, in registration order.
///
/// The registry never owns the element — the handle is a cheap-clone
/// reference into the host tree, and liveness is checked out of band at
/// serialization time by confirming the persisted identity attribute is
/// still present.
#[derive(Debug, Clone)]
pub struct TrackedElement<E> {
	/// The assigned identity string.
	pub identity: String,
	/// Handle to the tracked element.
	pub(crate) element: E,
	/// Distinct recorded event types, insertion order preserved.
	pub events: Vec<String>,
}

/// Per-session registry: insertion-ordered tracked entries plus the
/// sequence of numeric seeds already issued (its length drives the
/// disambiguation shift of the identity heuristic).
pub(crate) struct SessionState<E: ElementOps> {
	entries: Vec<TrackedElement<E>>,
	index: HashMap<String, usize>,
	seeds: Vec<u64>,
}

impl<E: ElementOps> SessionState<E> {
	pub(crate) fn new() -> Self {
		Self {
			entries: Vec::new(),
			index: HashMap::new(),
			seeds: Vec::new(),
		}
	}

	/// Returns the element's identity, assigning one if necessary.
	///
	/// Lookup before creation is mandatory: an element already carrying
	/// the persisted attribute keeps its identity and consumes no seed.
	/// Once assigned within a session, an identity is never reassigned to
	/// a different element — on a (heuristic) collision the original entry
	/// wins and keeps accumulating events.
	pub(crate) fn ensure_identity(&mut self, element: &E) -> String {
		if let Some(identity) = identity_of(element) {
			self.adopt(identity.clone(), element);
			return identity;
		}

		let issued = self.seeds.len();
		let seed = structural_seed(element)
			.checked_shr(issued as u32)
			.unwrap_or(0);
		let identity = render_identity(seed);

		element.set_attribute(IDENTITY_ATTR, &identity);
		self.seeds.push(seed);
		self.adopt(identity.clone(), element);

		identity
	}

	/// Registers an entry for `identity` unless one already exists.
	fn adopt(&mut self, identity: String, element: &E) {
		if self.index.contains_key(&identity) {
			return;
		}
		self.index.insert(identity.clone(), self.entries.len());
		self.entries.push(TrackedElement {
			identity,
			element: element.clone(),
			events: Vec::new(),
		});
	}

	/// Records a hooked event registration, deduplicated, and returns the
	/// element's identity.
	pub(crate) fn record_event(&mut self, element: &E, event_type: &str) -> String {
		let identity = self.ensure_identity(element);
		if let Some(&slot) = self.index.get(&identity) {
			let events = &mut self.entries[slot].events;
			if !events.iter().any(|e| e == event_type) {
				events.push(event_type.to_string());
			}
		}
		identity
	}

	pub(crate) fn entries(&self) -> &[TrackedElement<E>] {
		&self.entries
	}

	pub(crate) fn issued_count(&self) -> usize {
		self.seeds.len()
	}
}

/// Handle to one document/session's rehydration state.
///
/// [`Session::begin`] creates the registry and installs (or rebinds) the
/// event interception hooks on the environment's element capability;
/// dropping the session — or calling [`Session::finish`] — discards the
/// registry.
///
/// # Example
///
/// ```ignore
/// let session = Session::begin(environment);
/// // ... execute server-side scripts; hooked registrations are recorded ...
/// session.pre_serialize(&session.environment().document())?;
/// let markup = host_serializer.render();
/// session.finish();
/// ```
pub struct Session<Env: Environment> {
	environment: Env,
	state: Rc<RefCell<SessionState<Env::Element>>>,
}

impl<Env: Environment> Session<Env> {
	/// Starts a session over `environment`: fresh registry, hooks
	/// installed once per capability.
	pub fn begin(environment: Env) -> Self {
		let state = Rc::new(RefCell::new(SessionState::new()));
		hooks::install(&environment, &state);
		debug!("rehydration session started");
		Self { environment, state }
	}

	/// The environment this session runs over.
	pub fn environment(&self) -> &Env {
		&self.environment
	}

	/// Returns the element's identity, assigning and persisting one if
	/// absent. Idempotent: a second call returns the same string and does
	/// not advance the session's issued count.
	pub fn ensure_identity(&self, element: &Env::Element) -> String {
		self.state.borrow_mut().ensure_identity(element)
	}

	/// Number of elements currently tracked.
	pub fn tracked_count(&self) -> usize {
		self.state.borrow().entries().len()
	}

	/// Number of identities issued by this session.
	pub fn issued_count(&self) -> usize {
		self.state.borrow().issued_count()
	}

	/// The event types recorded for `identity`, in registration order.
	pub fn recorded_events(&self, identity: &str) -> Option<Vec<String>> {
		self.state
			.borrow()
			.entries()
			.iter()
			.find(|entry| entry.identity == identity)
			.map(|entry| entry.events.clone())
	}

	/// Runs the pre-serialization pass: purges server-only scripts,
	/// normalizes spent `server` markers, and appends the rehydration
	/// bootstrap script to the document body.
	///
	/// Call this once, immediately before handing the document to the
	/// host's markup serializer.
	pub fn pre_serialize(&self, document: &Env::Document) -> Result<(), SdomError> {
		serialize::purge_scripts(document);
		let plan = serialize::bootstrap_plan(self.state.borrow().entries());
		serialize::inject_bootstrap(document, &plan)
	}

	/// Post-serialization extension point. Currently a no-op.
	pub fn post_serialize(&self, _document: &Env::Document) {}

	/// Ends the session and discards its registry.
	///
	/// Hooks installed on the shared element capability stay in place;
	/// their binding to this session goes dead and a later
	/// [`Session::begin`] over the same environment rebinds them.
	pub fn finish(self) {
		debug!(
			tracked = self.tracked_count(),
			"rehydration session finished"
		);
	}
}
