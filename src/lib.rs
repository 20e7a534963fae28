//! sdom - Server-Side DOM Event Rehydration
//!
//! Lets a server that executes scripts against a browser-like DOM capture
//! the event bindings those scripts register, then re-establish them once
//! the serialized page reaches a real browser. Interactivity set up by
//! server-executed code survives the trip through static markup.
//!
//! ## Architecture
//!
//! - [`dom`]: the environment contract the host DOM implements
//! - [`identity`]: stable structural identities, persisted as `data-sdom-id`
//! - [`hooks`]: interception of interesting event registrations, composed
//!   over the host's listener capability by delegation
//! - [`script`]: execution-context classification of script elements
//!   (`server`, `server-only`, `client-only`)
//! - [`bootstrap`]: structured generation of the self-contained client
//!   bootstrap script
//! - [`session`]: the explicit per-render session handle tying it together
//! - [`testing`]: in-memory reference environment for tests and host
//!   conformance checks
//!
//! ## Flow
//!
//! [`Session::begin`] installs the interception hooks once per
//! environment. The host executes its server-side scripts, gating each on
//! [`script_pre_execution`] and following up with
//! [`script_post_execution`]; any hooked event registration made during
//! execution lands in the session registry. Immediately before markup
//! generation, [`Session::pre_serialize`] strips server-only scripts and
//! appends one bootstrap script that re-registers every recorded event in
//! the browser and POSTs `{ id, eventType }` back to the page's own
//! address when one fires. [`Session::finish`] discards the registry.
//!
//! ## Example
//!
//! ```ignore
//! use sdom::{Session, script_pre_execution, script_post_execution};
//!
//! let session = Session::begin(environment.clone());
//!
//! for script in environment.document().elements_by_tag_name("script") {
//!     let source = script.text_content();
//!     if script_pre_execution(&script) {
//!         host_runtime.execute(&source);
//!         script_post_execution(&script, &source);
//!     }
//! }
//!
//! session.pre_serialize(&environment.document())?;
//! let markup = host_serializer.to_markup();
//! session.post_serialize(&environment.document());
//! session.finish();
//! ```

#![warn(missing_docs)]

pub mod bootstrap;
pub mod dom;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod script;
pub mod session;
pub mod testing;

mod serialize;

pub use bootstrap::{BootstrapEntry, ElementLookup, EventReport, render_bootstrap};
pub use error::SdomError;
pub use hooks::{HOOKED_EVENT_TYPES, is_hooked_event};
pub use identity::{IDENTITY_ATTR, identity_of};
pub use script::{
	CONTEXT_ATTR, ScriptContext, script_post_execution, script_pre_execution,
};
pub use session::Session;
