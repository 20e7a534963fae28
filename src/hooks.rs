//! Event interception.
//!
//! Registrations of interesting event types are observed by composing a
//! delegating wrapper over the environment's element capability — the
//! same interface, selected at session setup, no mutation of shared
//! built-in behavior. The wrapper records hooked registrations in the
//! bound session's registry and always forwards to the original
//! capability, so behavior inside the server pass is unaffected.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::dom::{ElementOps, Environment, EventCapability, SharedCapability};
use crate::session::SessionState;

/// The closed allow-list of hooked event types.
///
/// Extending it is a source change, not runtime configuration.
pub const HOOKED_EVENT_TYPES: &[&str] = &["click"];

/// Whether registrations of `event_type` are observed.
pub fn is_hooked_event(event_type: &str) -> bool {
	HOOKED_EVENT_TYPES.contains(&event_type)
}

/// Marker carried by an installed interception wrapper.
///
/// Doubles as the wrapper's binding to the active session: installation
/// over an already-wrapped capability rebinds this instead of wrapping
/// again. The binding is weak — a finished session goes dead in place
/// without the hook being uninstalled.
pub struct InterceptMarker<E: ElementOps> {
	session: RefCell<Weak<RefCell<SessionState<E>>>>,
}

impl<E: ElementOps> InterceptMarker<E> {
	pub(crate) fn new(session: &Rc<RefCell<SessionState<E>>>) -> Self {
		Self {
			session: RefCell::new(Rc::downgrade(session)),
		}
	}

	pub(crate) fn bind(&self, session: &Rc<RefCell<SessionState<E>>>) {
		*self.session.borrow_mut() = Rc::downgrade(session);
	}

	/// The bound session's registry.
	///
	/// Panics when no session is live: a hooked registration reaching the
	/// wrapper outside `Session::begin` .. `finish` is a caller ordering
	/// bug, and the contract is to fail loudly rather than drop the
	/// record silently.
	fn session(&self) -> Rc<RefCell<SessionState<E>>> {
		self.session
			.borrow()
			.upgrade()
			.expect("event interception fired without an active session; call Session::begin before executing server-side scripts")
	}
}

/// Delegating wrapper over the host's event capability.
///
/// On `add_event_listener` of a hooked type it ensures the element's
/// identity and records the event type in the session registry, then
/// forwards. `remove_event_listener` forwards unconditionally — tracking
/// is append-only, a removal during the server pass does not retract a
/// pending rehydration entry.
pub struct InterceptingCapability<E: ElementOps, L: Clone + 'static> {
	inner: SharedCapability<E, L>,
	marker: InterceptMarker<E>,
}

impl<E: ElementOps, L: Clone + 'static> EventCapability for InterceptingCapability<E, L> {
	type Element = E;
	type Listener = L;

	fn add_event_listener(&self, element: &E, event_type: &str, listener: L) {
		if is_hooked_event(event_type) {
			let session = self.marker.session();
			let identity = session.borrow_mut().record_event(element, event_type);
			trace!(%identity, event_type, "recorded hooked event registration");
		}
		self.inner.add_event_listener(element, event_type, listener);
	}

	fn remove_event_listener(&self, element: &E, event_type: &str, listener: L) {
		self.inner.remove_event_listener(element, event_type, listener);
	}

	fn intercept_marker(&self) -> Option<&InterceptMarker<E>> {
		Some(&self.marker)
	}
}

/// Installs the interception wrapper on `environment`'s capability, or
/// rebinds the existing wrapper to `state`. Idempotent per capability:
/// a second install never double-wraps.
pub(crate) fn install<Env: Environment>(
	environment: &Env,
	state: &Rc<RefCell<SessionState<Env::Element>>>,
) {
	let current = environment.event_capability();
	if let Some(marker) = current.intercept_marker() {
		marker.bind(state);
		trace!("event hooks already installed; rebound session");
		return;
	}

	let wrapper: SharedCapability<Env::Element, Env::Listener> =
		Rc::new(InterceptingCapability {
			inner: current,
			marker: InterceptMarker::new(state),
		});
	environment.set_event_capability(wrapper);
	debug!(hooked = ?HOOKED_EVENT_TYPES, "installed event interception hooks");
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::DocumentOps;
	use crate::session::Session;
	use crate::testing::{MemoryEnvironment, noop_listener};

	#[test]
	fn test_hooked_event_allow_list() {
		assert!(is_hooked_event("click"));
		assert!(!is_hooked_event("mouseover"));
		assert!(!is_hooked_event("Click"));
		assert!(!is_hooked_event(""));
	}

	#[test]
	fn test_hooked_registration_is_recorded_and_forwarded() {
		let env = MemoryEnvironment::new();
		let session = Session::begin(env.clone());
		let button = env.document().create_element("button");
		env.body().append_child(&button);

		env.add_event_listener(&button, "click", noop_listener());

		// Forwarded to the host capability exactly once.
		assert_eq!(env.listener_count(&button, "click"), 1);
		// Recorded in the registry.
		assert_eq!(session.tracked_count(), 1);
		let identity = session.ensure_identity(&button);
		assert_eq!(
			session.recorded_events(&identity),
			Some(vec!["click".to_string()])
		);
	}

	#[test]
	fn test_non_hooked_registration_is_forwarded_only() {
		let env = MemoryEnvironment::new();
		let session = Session::begin(env.clone());
		let div = env.document().create_element("div");
		env.body().append_child(&div);

		env.add_event_listener(&div, "mouseover", noop_listener());

		assert_eq!(env.listener_count(&div, "mouseover"), 1);
		assert_eq!(session.tracked_count(), 0);
	}

	#[test]
	fn test_duplicate_registrations_deduplicate() {
		let env = MemoryEnvironment::new();
		let session = Session::begin(env.clone());
		let button = env.document().create_element("button");
		env.body().append_child(&button);

		env.add_event_listener(&button, "click", noop_listener());
		env.add_event_listener(&button, "click", noop_listener());

		// Both registrations reach the host capability...
		assert_eq!(env.listener_count(&button, "click"), 2);
		// ...but the recorded event set stays deduplicated.
		let identity = session.ensure_identity(&button);
		assert_eq!(
			session.recorded_events(&identity),
			Some(vec!["click".to_string()])
		);
	}

	#[test]
	fn test_remove_does_not_retract_tracking() {
		let env = MemoryEnvironment::new();
		let session = Session::begin(env.clone());
		let button = env.document().create_element("button");
		env.body().append_child(&button);

		let listener = noop_listener();
		env.add_event_listener(&button, "click", listener.clone());
		env.remove_event_listener(&button, "click", listener);

		assert_eq!(env.listener_count(&button, "click"), 0);
		// Append-only: the rehydration entry survives the removal.
		let identity = session.ensure_identity(&button);
		assert_eq!(
			session.recorded_events(&identity),
			Some(vec!["click".to_string()])
		);
	}

	#[test]
	fn test_install_twice_does_not_double_wrap() {
		let env = MemoryEnvironment::new();
		let first = Session::begin(env.clone());
		first.finish();
		let second = Session::begin(env.clone());

		let button = env.document().create_element("button");
		env.body().append_child(&button);
		env.add_event_listener(&button, "click", noop_listener());

		// A single registration produces a single host-side effect and a
		// single recorded event, proving there is exactly one wrapper.
		assert_eq!(env.listener_count(&button, "click"), 1);
		let identity = second.ensure_identity(&button);
		assert_eq!(
			second.recorded_events(&identity),
			Some(vec!["click".to_string()])
		);
	}

	#[test]
	#[should_panic(expected = "without an active session")]
	fn test_hooked_registration_without_session_fails_loudly() {
		let env = MemoryEnvironment::new();
		let session = Session::begin(env.clone());
		session.finish();

		let button = env.document().create_element("button");
		env.body().append_child(&button);
		env.add_event_listener(&button, "click", noop_listener());
	}
}
