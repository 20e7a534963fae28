//! Structural element identity.
//!
//! Every element that registers an interesting event gets a stable
//! identity string, persisted on the element as the [`IDENTITY_ATTR`]
//! attribute so repeated passes (or plain lookups) recognize the element
//! without recomputation.
//!
//! The identity is derived from the element's structural position: depth,
//! tag name, text length, child count and attribute count, right-shifted
//! by the number of identities the session has already issued. The shift
//! is a de-collision heuristic, not a uniqueness guarantee; collisions
//! remain possible under pathological inputs and are accepted (the test
//! suite characterizes this rather than fixing it).

use crate::dom::ElementOps;

/// Attribute under which an element's identity is persisted.
///
/// Values are base-36 renderings of an unsigned integer, so they are safe
/// to embed verbatim in a CSS attribute-selector literal.
pub const IDENTITY_ATTR: &str = "data-sdom-id";

/// Reads the persisted identity of an element. Pure read, no side effect.
pub fn identity_of<E: ElementOps>(element: &E) -> Option<String> {
	element.get_attribute(IDENTITY_ATTR)
}

/// Computes the raw structural seed for an element.
///
/// `charsum(tag) * (textLen+1) * (childCount+1) * (attrCount+1) + depth`,
/// all arithmetic wrapping.
pub(crate) fn structural_seed<E: ElementOps>(element: &E) -> u64 {
	let mut depth: u64 = 0;
	let mut cursor = element.parent();
	while let Some(node) = cursor {
		depth += 1;
		cursor = node.parent();
	}

	let tag_sum: u64 = element.tag_name().chars().map(|c| c as u64).sum();
	let text_len = element.text_content().chars().count() as u64;

	let factor = (text_len + 1)
		.wrapping_mul(element.child_count() as u64 + 1)
		.wrapping_mul(element.attribute_count() as u64 + 1);

	tag_sum.wrapping_mul(factor).wrapping_add(depth)
}

/// Renders an identity number in base 36.
pub(crate) fn render_identity(value: u64) -> String {
	const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

	if value == 0 {
		return "0".to_string();
	}

	let mut remainders = Vec::new();
	let mut v = value;
	while v > 0 {
		remainders.push((v % 36) as usize);
		v /= 36;
	}

	remainders.iter().rev().map(|&d| DIGITS[d] as char).collect()
}
