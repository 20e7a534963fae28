//! Environment contract consumed by the rehydration core.
//!
//! This crate does not ship a DOM. The host supplies one by implementing
//! the traits below over its own element and document types; the core only
//! navigates, reads and annotates nodes through this seam. An in-memory
//! reference implementation lives in [`crate::testing`] and doubles as a
//! conformance fixture for host integrations.
//!
//! Element handles are expected to behave like cheap-clone references into
//! a tree owned by the document (an `Rc`-backed node handle, an arena id,
//! a wrapper over a foreign object). The core never takes ownership of a
//! node; it only annotates attributes and, for server-only scripts,
//! requests removal.

use std::rc::Rc;

/// A cheap-clone handle to one element of the host DOM.
///
/// Attribute mutation goes through `&self`: handles are references into a
/// shared tree, so hosts are expected to use interior mutability the same
/// way a browser DOM handle would.
pub trait ElementOps: Clone + 'static {
	/// The element's tag name.
	fn tag_name(&self) -> String;

	/// Reads an attribute, `None` when absent.
	fn get_attribute(&self, name: &str) -> Option<String>;

	/// Sets an attribute, replacing any previous value.
	fn set_attribute(&self, name: &str, value: &str);

	/// Removes an attribute. Removing an absent attribute is a no-op.
	fn remove_attribute(&self, name: &str);

	/// Number of attributes currently present.
	fn attribute_count(&self) -> usize;

	/// The element's own text content.
	fn text_content(&self) -> String;

	/// Replaces the element's text content.
	fn set_text_content(&self, text: &str);

	/// Number of element children.
	fn child_count(&self) -> usize;

	/// The parent element, `None` at the tree root or when detached.
	fn parent(&self) -> Option<Self>;

	/// Detaches the element from the document.
	///
	/// Returns `false` when the host element type has no self-removal
	/// operation; callers then fall back to parent-mediated removal via
	/// [`ElementOps::remove_child`].
	fn remove(&self) -> bool;

	/// Detaches `child` from this element.
	fn remove_child(&self, child: &Self);
}

/// The document half of the environment contract.
pub trait DocumentOps {
	/// The element handle type this document produces.
	type Element: ElementOps;

	/// Creates a detached element.
	fn create_element(&self, tag_name: &str) -> Self::Element;

	/// All attached elements with the given tag name, in document order.
	fn elements_by_tag_name(&self, tag_name: &str) -> Vec<Self::Element>;

	/// Appends an element to the document body.
	fn append_to_body(&self, element: &Self::Element);
}

/// The listener-dispatch capability shared by every element of an
/// environment.
///
/// This is the analogue of an element class's `addEventListener` slot: one
/// capability object serves all elements, and the rehydration hooks are
/// installed by composing a delegating wrapper over it (see
/// [`crate::hooks::InterceptingCapability`]) rather than by mutating any
/// shared built-in behavior.
pub trait EventCapability {
	/// The element handle type listeners attach to.
	type Element: ElementOps;

	/// The host's listener payload. Opaque to this crate; it is only ever
	/// forwarded, never invoked.
	type Listener: Clone + 'static;

	/// Registers `listener` for `event_type` on `element`.
	fn add_event_listener(&self, element: &Self::Element, event_type: &str, listener: Self::Listener);

	/// Unregisters `listener` for `event_type` on `element`.
	fn remove_event_listener(
		&self,
		element: &Self::Element,
		event_type: &str,
		listener: Self::Listener,
	);

	/// Interception marker.
	///
	/// `None` for every host capability; `Some` only on the wrapper
	/// installed by [`crate::session::Session::begin`]. Installation uses
	/// this to detect an already-hooked capability and rebind its session
	/// instead of wrapping twice.
	fn intercept_marker(&self) -> Option<&crate::hooks::InterceptMarker<Self::Element>> {
		None
	}
}

/// Shared handle to an environment's event capability.
pub type SharedCapability<E, L> = Rc<dyn EventCapability<Element = E, Listener = L>>;

/// One document environment (the analogue of a window): a document plus
/// the element capability its nodes dispatch listener registration
/// through.
pub trait Environment {
	/// Element handle type.
	type Element: ElementOps;
	/// Document type.
	type Document: DocumentOps<Element = Self::Element>;
	/// Host listener payload type.
	type Listener: Clone + 'static;

	/// The environment's document.
	fn document(&self) -> Self::Document;

	/// The currently installed event capability.
	fn event_capability(&self) -> SharedCapability<Self::Element, Self::Listener>;

	/// Replaces the event capability. Called once per environment by hook
	/// installation; hosts route their elements' listener registration
	/// through whatever capability is current.
	fn set_event_capability(&self, capability: SharedCapability<Self::Element, Self::Listener>);
}
