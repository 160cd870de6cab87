//! Subscriptions

use std::rc::{Rc, Weak};

use serde::Deserialize;

use crate::Callback;
use crate::bridge::BridgeInner;

/// What a subscriber wants to see
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscribeOptions {
    /// Attribute name prefixes, e.g. `["fx-"]`
    pub attribute_filter: Vec<String>,
    /// Interested in child list changes. With an empty filter this
    /// means every record, unfiltered.
    pub child_list: bool,
}

impl SubscribeOptions {
    /// Filter on attribute prefixes
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute_filter: prefixes.into_iter().map(Into::into).collect(),
            child_list: false,
        }
    }

    /// Every record, unfiltered
    pub fn everything() -> Self {
        Self {
            attribute_filter: Vec::new(),
            child_list: true,
        }
    }

    pub fn with_child_list(mut self, child_list: bool) -> Self {
        self.child_list = child_list;
        self
    }

    /// Full batches are delivered as-is
    pub fn wants_everything(&self) -> bool {
        self.child_list && self.attribute_filter.is_empty()
    }
}

/// One registered module
pub(crate) struct Subscription {
    pub(crate) module_id: String,
    pub(crate) options: SubscribeOptions,
    pub(crate) callback: Box<Callback>,
    /// Distinguishes this registration from a later one under the same id
    pub(crate) token: u64,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("module_id", &self.module_id)
            .field("options", &self.options)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

pub(crate) type SharedSubscription = Rc<Subscription>;

/// Handle returned by [`MutationBridge::subscribe`](crate::MutationBridge::subscribe)
///
/// Removes exactly the registration it was issued for: once the module
/// re-subscribes, an older handle does nothing.
#[derive(Debug, Clone)]
#[must_use = "dropping the handle keeps the subscription alive; call unsubscribe() to remove it"]
pub struct Unsubscribe {
    pub(crate) bridge: Weak<BridgeInner>,
    pub(crate) module_id: String,
    pub(crate) token: u64,
}

impl Unsubscribe {
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Remove the subscription. Idempotent; returns whether anything was removed.
    pub fn unsubscribe(&self) -> bool {
        match self.bridge.upgrade() {
            Some(inner) => inner.remove(&self.module_id, Some(self.token)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let options: SubscribeOptions =
            serde_json::from_str(r#"{"attributeFilter":["fx-"],"childList":true}"#).unwrap();
        assert_eq!(options.attribute_filter, vec!["fx-".to_string()]);
        assert!(options.child_list);

        let options: SubscribeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SubscribeOptions::default());
    }

    #[test]
    fn test_wants_everything() {
        assert!(SubscribeOptions::everything().wants_everything());
        assert!(!SubscribeOptions::prefixes(["fx-"]).with_child_list(true).wants_everything());
        assert!(!SubscribeOptions::default().wants_everything());
    }
}
