//! In-memory reference implementation of the environment contract.
//!
//! Backs the crate's own test-suite and doubles as a conformance fixture
//! for host integrations: a minimal arena-backed element tree with
//! attributes, text, parent/child links and listener book-keeping. The
//! host-side listener dispatch is a plain recording capability, so tests
//! can assert exactly how many registrations reached the "real" DOM.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::{DocumentOps, ElementOps, Environment, EventCapability, SharedCapability};

/// Listener payload used by the in-memory environment. Never invoked by
/// the core; the fixture only counts registrations.
pub type TestListener = Rc<dyn Fn()>;

/// A no-op listener.
pub fn noop_listener() -> TestListener {
	Rc::new(|| {})
}

struct NodeData {
	tag: String,
	attributes: Vec<(String, String)>,
	text: String,
	parent: Option<usize>,
	children: Vec<usize>,
	listeners: Vec<String>,
}

impl NodeData {
	fn new(tag: &str) -> Self {
		Self {
			tag: tag.to_string(),
			attributes: Vec::new(),
			text: String::new(),
			parent: None,
			children: Vec::new(),
			listeners: Vec::new(),
		}
	}
}

struct DomShared {
	nodes: RefCell<Vec<NodeData>>,
	capability: RefCell<SharedCapability<MemoryElement, TestListener>>,
	self_removal: Cell<bool>,
}

impl DomShared {
	fn detach(&self, node: usize) {
		let mut nodes = self.nodes.borrow_mut();
		if let Some(parent) = nodes[node].parent.take() {
			nodes[parent].children.retain(|&child| child != node);
		}
	}
}

const ROOT: usize = 0;
const BODY: usize = 1;

/// The in-memory environment: document plus swappable event capability.
#[derive(Clone)]
pub struct MemoryEnvironment {
	shared: Rc<DomShared>,
}

impl MemoryEnvironment {
	/// Creates an environment with an `html` root containing a `body`.
	pub fn new() -> Self {
		let shared = Rc::new(DomShared {
			nodes: RefCell::new(vec![NodeData::new("html"), NodeData::new("body")]),
			capability: RefCell::new(Rc::new(RecordingCapability)),
			self_removal: Cell::new(true),
		});
		{
			let mut nodes = shared.nodes.borrow_mut();
			nodes[ROOT].children.push(BODY);
			nodes[BODY].parent = Some(ROOT);
		}
		Self { shared }
	}

	/// Like [`MemoryEnvironment::new`], but elements have no self-removal
	/// operation ([`ElementOps::remove`] returns `false`), exercising the
	/// parent-mediated removal fallback.
	pub fn without_self_removal() -> Self {
		let env = Self::new();
		env.shared.self_removal.set(false);
		env
	}

	/// The document body.
	pub fn body(&self) -> MemoryElement {
		MemoryElement {
			shared: self.shared.clone(),
			node: BODY,
		}
	}

	/// Registers a listener through the currently installed capability,
	/// the way host element code would.
	pub fn add_event_listener(
		&self,
		element: &MemoryElement,
		event_type: &str,
		listener: TestListener,
	) {
		let capability = self.event_capability();
		capability.add_event_listener(element, event_type, listener);
	}

	/// Unregisters a listener through the currently installed capability.
	pub fn remove_event_listener(
		&self,
		element: &MemoryElement,
		event_type: &str,
		listener: TestListener,
	) {
		let capability = self.event_capability();
		capability.remove_event_listener(element, event_type, listener);
	}

	/// How many registrations for `event_type` reached the host DOM.
	pub fn listener_count(&self, element: &MemoryElement, event_type: &str) -> usize {
		self.shared.nodes.borrow()[element.node]
			.listeners
			.iter()
			.filter(|ty| ty.as_str() == event_type)
			.count()
	}
}

impl Default for MemoryEnvironment {
	fn default() -> Self {
		Self::new()
	}
}

impl Environment for MemoryEnvironment {
	type Element = MemoryElement;
	type Document = MemoryDocument;
	type Listener = TestListener;

	fn document(&self) -> MemoryDocument {
		MemoryDocument {
			shared: self.shared.clone(),
		}
	}

	fn event_capability(&self) -> SharedCapability<MemoryElement, TestListener> {
		self.shared.capability.borrow().clone()
	}

	fn set_event_capability(&self, capability: SharedCapability<MemoryElement, TestListener>) {
		*self.shared.capability.borrow_mut() = capability;
	}
}

/// Handle to one node of the in-memory tree.
#[derive(Clone)]
pub struct MemoryElement {
	shared: Rc<DomShared>,
	node: usize,
}

impl MemoryElement {
	/// Appends `child`, detaching it from any previous parent.
	pub fn append_child(&self, child: &MemoryElement) {
		self.shared.detach(child.node);
		let mut nodes = self.shared.nodes.borrow_mut();
		nodes[child.node].parent = Some(self.node);
		let children = &mut nodes[self.node].children;
		children.push(child.node);
	}
}

impl ElementOps for MemoryElement {
	fn tag_name(&self) -> String {
		self.shared.nodes.borrow()[self.node].tag.clone()
	}

	fn get_attribute(&self, name: &str) -> Option<String> {
		self.shared.nodes.borrow()[self.node]
			.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.clone())
	}

	fn set_attribute(&self, name: &str, value: &str) {
		let mut nodes = self.shared.nodes.borrow_mut();
		let attributes = &mut nodes[self.node].attributes;
		if let Some(entry) = attributes.iter_mut().find(|(key, _)| key == name) {
			entry.1 = value.to_string();
		} else {
			attributes.push((name.to_string(), value.to_string()));
		}
	}

	fn remove_attribute(&self, name: &str) {
		self.shared.nodes.borrow_mut()[self.node]
			.attributes
			.retain(|(key, _)| key != name);
	}

	fn attribute_count(&self) -> usize {
		self.shared.nodes.borrow()[self.node].attributes.len()
	}

	fn text_content(&self) -> String {
		self.shared.nodes.borrow()[self.node].text.clone()
	}

	fn set_text_content(&self, text: &str) {
		self.shared.nodes.borrow_mut()[self.node].text = text.to_string();
	}

	fn child_count(&self) -> usize {
		self.shared.nodes.borrow()[self.node].children.len()
	}

	fn parent(&self) -> Option<Self> {
		self.shared.nodes.borrow()[self.node]
			.parent
			.map(|node| MemoryElement {
				shared: self.shared.clone(),
				node,
			})
	}

	fn remove(&self) -> bool {
		if !self.shared.self_removal.get() {
			return false;
		}
		self.shared.detach(self.node);
		true
	}

	fn remove_child(&self, child: &Self) {
		let is_child = self.shared.nodes.borrow()[child.node].parent == Some(self.node);
		if is_child {
			self.shared.detach(child.node);
		}
	}
}

/// The in-memory document.
pub struct MemoryDocument {
	shared: Rc<DomShared>,
}

impl DocumentOps for MemoryDocument {
	type Element = MemoryElement;

	fn create_element(&self, tag_name: &str) -> MemoryElement {
		let mut nodes = self.shared.nodes.borrow_mut();
		nodes.push(NodeData::new(tag_name));
		MemoryElement {
			shared: self.shared.clone(),
			node: nodes.len() - 1,
		}
	}

	fn elements_by_tag_name(&self, tag_name: &str) -> Vec<MemoryElement> {
		let nodes = self.shared.nodes.borrow();
		let mut found = Vec::new();
		let mut stack = vec![ROOT];
		while let Some(node) = stack.pop() {
			if nodes[node].tag == tag_name {
				found.push(MemoryElement {
					shared: self.shared.clone(),
					node,
				});
			}
			for &child in nodes[node].children.iter().rev() {
				stack.push(child);
			}
		}
		found
	}

	fn append_to_body(&self, element: &MemoryElement) {
		self.shared.detach(element.node);
		let mut nodes = self.shared.nodes.borrow_mut();
		nodes[element.node].parent = Some(BODY);
		nodes[BODY].children.push(element.node);
	}
}

/// Plain host capability: records each registration on the node, nothing
/// else. Stands in for the real DOM's listener dispatch.
struct RecordingCapability;

impl EventCapability for RecordingCapability {
	type Element = MemoryElement;
	type Listener = TestListener;

	fn add_event_listener(&self, element: &MemoryElement, event_type: &str, _listener: TestListener) {
		element.shared.nodes.borrow_mut()[element.node]
			.listeners
			.push(event_type.to_string());
	}

	fn remove_event_listener(
		&self,
		element: &MemoryElement,
		event_type: &str,
		_listener: TestListener,
	) {
		let mut nodes = element.shared.nodes.borrow_mut();
		let listeners = &mut nodes[element.node].listeners;
		if let Some(position) = listeners.iter().position(|ty| ty == event_type) {
			listeners.remove(position);
		}
	}
}
