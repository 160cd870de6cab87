//! domx bridge - one mutation observer for every genX module
//!
//! Feature modules subscribe with a module id and a set of attribute
//! prefixes. The bridge connects a single observer on the first
//! subscription, filters each mutation batch per subscriber and delivers
//! it in isolation: a failing subscriber never stops the others.
//!
//! ```text
//! Disconnected --subscribe--> Connecting --ready--> Connected
//!      ^                                                |
//!      +------------------ last unsubscribe -----------+
//! ```

mod bridge;
mod error;
mod filter;
mod subscription;

pub use bridge::{ConnectionState, DispatchReport, MutationBridge};
pub use error::BridgeError;
pub use filter::{filter_batch, record_matches};
pub use subscription::{SubscribeOptions, Unsubscribe};

/// Subscriber callback: receives the filtered batch
pub type Callback = dyn Fn(&[genx_dom::MutationRecord]) -> anyhow::Result<()>;
