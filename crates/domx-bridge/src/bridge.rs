//! Mutation bridge
//!
//! Owns the subscription registry and the connection to the document's
//! mutation observer. On a shared observer the bridge reads through a
//! listener of its own, leaving the observer's queue to the host.
//! Dispatch snapshots the registry and releases every borrow before
//! running callbacks, so subscribers may freely subscribe, unsubscribe or
//! mutate the document from inside a callback.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use genx_dom::{
    Document, ListenerId, MutationObserverInit, MutationRecord, ObserverId, ReadyState, SharedDocument,
};

use crate::filter::filter_batch;
use crate::subscription::{SharedSubscription, Subscription};
use crate::{BridgeError, SubscribeOptions, Unsubscribe};

/// Observable connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Waiting for the document to finish loading
    Connecting,
    Connected,
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Records in the incoming batch
    pub records: usize,
    /// Callbacks that returned `Ok`
    pub delivered: usize,
    /// Callbacks that returned `Err` or panicked
    pub failed: usize,
}

#[derive(Debug, Clone, Copy)]
enum Connection {
    Disconnected,
    Connecting { generation: u64 },
    Connected(Feed),
}

/// Where connected records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    /// Fallback observer created and removed by the bridge
    Owned(ObserverId),
    /// The document's shared observer, read through our listener
    Shared { observer: ObserverId, listener: ListenerId },
}

impl Feed {
    fn observer(self) -> ObserverId {
        match self {
            Feed::Owned(observer) | Feed::Shared { observer, .. } => observer,
        }
    }

    fn take_records(self, doc: &mut Document) -> Result<Vec<MutationRecord>, BridgeError> {
        let records = match self {
            Feed::Owned(observer) => doc.take_records(observer)?,
            Feed::Shared { listener, .. } => doc.observers_mut().take_listener_records(listener)?,
        };
        Ok(records)
    }

    /// Give back whatever the bridge holds on the document
    fn release(self, doc: &mut Document) {
        match self {
            Feed::Owned(observer) => {
                doc.observers_mut().remove(observer);
            }
            Feed::Shared { listener, .. } => {
                doc.observers_mut().remove_listener(listener);
            }
        }
    }
}

#[derive(Debug)]
struct BridgeState {
    /// Registration order, at most one entry per module id
    subscriptions: Vec<SharedSubscription>,
    connection: Connection,
    /// Bumped on every disconnect so stale ready listeners do nothing
    generation: u64,
    next_token: u64,
    fallback_warned: bool,
    /// Feeds that could not be released while the document was busy
    stale_feeds: Vec<Feed>,
}

#[derive(Debug)]
pub(crate) struct BridgeInner {
    doc: SharedDocument,
    state: RefCell<BridgeState>,
}

/// Shared mutation observation for genX modules
///
/// Cheap to clone; clones share one registry and one connection.
#[derive(Debug, Clone)]
pub struct MutationBridge {
    inner: Rc<BridgeInner>,
}

impl MutationBridge {
    pub fn new(doc: SharedDocument) -> Self {
        Self {
            inner: Rc::new(BridgeInner {
                doc,
                state: RefCell::new(BridgeState {
                    subscriptions: Vec::new(),
                    connection: Connection::Disconnected,
                    generation: 0,
                    next_token: 1,
                    fallback_warned: false,
                    stale_feeds: Vec::new(),
                }),
            }),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.inner.doc
    }

    /// Register `callback` for `module_id`, replacing any previous
    /// registration under that id. The first subscription connects the
    /// bridge, deferred until the document leaves `Loading`.
    pub fn subscribe<F>(
        &self,
        module_id: &str,
        callback: F,
        options: SubscribeOptions,
    ) -> Result<Unsubscribe, BridgeError>
    where
        F: Fn(&[MutationRecord]) -> anyhow::Result<()> + 'static,
    {
        let disconnected = matches!(self.inner.state.borrow().connection, Connection::Disconnected);
        if disconnected {
            self.inner.connect()?;
        }

        let mut state = self.inner.state.borrow_mut();
        let token = state.next_token;
        state.next_token += 1;

        let subscription = Rc::new(Subscription {
            module_id: module_id.to_string(),
            options,
            callback: Box::new(callback),
            token,
        });
        match state.subscriptions.iter().position(|s| s.module_id == module_id) {
            Some(index) => {
                tracing::debug!("Replacing subscription for {}", module_id);
                state.subscriptions[index] = subscription;
            }
            None => {
                tracing::debug!("Subscribed {}", module_id);
                state.subscriptions.push(subscription);
            }
        }

        Ok(Unsubscribe {
            bridge: Rc::downgrade(&self.inner),
            module_id: module_id.to_string(),
            token,
        })
    }

    /// Remove `module_id`'s subscription. Idempotent.
    pub fn unsubscribe(&self, module_id: &str) -> bool {
        self.inner.remove(module_id, None)
    }

    pub fn is_subscribed(&self, module_id: &str) -> bool {
        self.inner
            .state
            .borrow()
            .subscriptions
            .iter()
            .any(|s| s.module_id == module_id)
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.state.borrow().subscriptions.len()
    }

    /// Module ids in registration order
    pub fn subscribers(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .subscriptions
            .iter()
            .map(|s| s.module_id.clone())
            .collect()
    }

    pub fn state(&self) -> ConnectionState {
        match self.inner.state.borrow().connection {
            Connection::Disconnected => ConnectionState::Disconnected,
            Connection::Connecting { .. } => ConnectionState::Connecting,
            Connection::Connected(_) => ConnectionState::Connected,
        }
    }

    /// Observer currently in use, if connected
    pub fn observer(&self) -> Option<ObserverId> {
        match self.inner.state.borrow().connection {
            Connection::Connected(feed) => Some(feed.observer()),
            _ => None,
        }
    }

    /// Take pending records from the connected feed and dispatch them
    pub fn pump(&self) -> Result<DispatchReport, BridgeError> {
        let Connection::Connected(feed) = self.inner.state.borrow().connection else {
            return Ok(DispatchReport::default());
        };

        let records = {
            let mut doc = self.inner.doc.try_borrow_mut().map_err(|_| BridgeError::DocumentBusy)?;
            self.inner.release_stale(&mut doc);
            if !doc.observers().contains(feed.observer()) {
                return Err(BridgeError::NoObserver(feed.observer()));
            }
            feed.take_records(&mut doc)?
        };

        if records.is_empty() {
            return Ok(DispatchReport::default());
        }
        self.dispatch(&records)
    }

    /// Filter `records` for every subscriber and deliver non-empty batches
    pub fn dispatch(&self, records: &[MutationRecord]) -> Result<DispatchReport, BridgeError> {
        let snapshot: Vec<SharedSubscription> = self.inner.state.borrow().subscriptions.clone();

        let batches: Vec<_> = {
            let doc = self.inner.doc.try_borrow().map_err(|_| BridgeError::DocumentBusy)?;
            snapshot
                .into_iter()
                .filter_map(|sub| {
                    let batch = filter_batch(&doc, &sub.options, records);
                    (!batch.is_empty()).then_some((sub, batch))
                })
                .collect()
        };

        let mut report = DispatchReport {
            records: records.len(),
            ..Default::default()
        };
        for (sub, batch) in batches {
            // Removed or replaced by an earlier callback of this batch
            if !self.inner.is_current(&sub) {
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (sub.callback)(&batch)));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    tracing::warn!(module = %sub.module_id, "Subscriber callback failed: {:#}", err);
                    report.failed += 1;
                }
                Err(payload) => {
                    tracing::warn!(
                        module = %sub.module_id,
                        "Subscriber callback panicked: {}",
                        panic_message(payload.as_ref())
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Drop every subscription and disconnect
    pub fn dispose(&self) {
        let dropped = std::mem::take(&mut self.inner.state.borrow_mut().subscriptions);
        tracing::debug!("Disposing bridge with {} subscriptions", dropped.len());
        self.inner.disconnect();
        drop(dropped);
    }
}

impl BridgeInner {
    /// Start connecting; completes now unless the document is loading
    fn connect(self: &Rc<Self>) -> Result<(), BridgeError> {
        let mut doc = self.doc.try_borrow_mut().map_err(|_| BridgeError::DocumentBusy)?;
        self.release_stale(&mut doc);

        if doc.ready_state() != ReadyState::Loading {
            return self.finish_connect(&mut doc);
        }

        let generation = {
            let mut state = self.state.borrow_mut();
            state.connection = Connection::Connecting {
                generation: state.generation,
            };
            state.generation
        };
        tracing::debug!("Document loading, deferring bridge connection");

        let weak: Weak<BridgeInner> = Rc::downgrade(self);
        doc.on_ready(move |doc| {
            let Some(inner) = weak.upgrade() else { return };
            let pending = matches!(
                inner.state.borrow().connection,
                Connection::Connecting { generation: g } if g == generation
            );
            if pending {
                if let Err(err) = inner.finish_connect(doc) {
                    tracing::warn!("Deferred bridge connection failed: {}", err);
                    inner.state.borrow_mut().connection = Connection::Disconnected;
                }
            }
        });
        Ok(())
    }

    fn finish_connect(&self, doc: &mut Document) -> Result<(), BridgeError> {
        let mut state = self.state.borrow_mut();

        let feed = match doc.shared_observer() {
            Some(observer) => Feed::Shared {
                observer,
                listener: doc.observers_mut().add_listener(observer)?,
            },
            None => {
                let target = if doc.body().is_valid() { doc.body() } else { doc.root() };
                let observer = doc.observe(target, MutationObserverInit::everything())?;
                if !state.fallback_warned {
                    tracing::warn!("No shared mutation observer installed, bridge is observing on its own");
                    state.fallback_warned = true;
                }
                Feed::Owned(observer)
            }
        };

        tracing::debug!("Bridge connected: {:?}", feed);
        state.connection = Connection::Connected(feed);
        Ok(())
    }

    /// Remove a subscription; `token` restricts removal to one registration
    pub(crate) fn remove(&self, module_id: &str, token: Option<u64>) -> bool {
        let (removed, now_empty) = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state
                .subscriptions
                .iter()
                .position(|s| s.module_id == module_id && token.is_none_or(|t| t == s.token))
            else {
                return false;
            };
            let removed = state.subscriptions.remove(index);
            (removed, state.subscriptions.is_empty())
        };

        tracing::debug!("Unsubscribed {}", removed.module_id);
        if now_empty {
            self.disconnect();
        }
        true
    }

    fn is_current(&self, sub: &SharedSubscription) -> bool {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .any(|s| Rc::ptr_eq(s, sub))
    }

    /// Release the connection. A shared observer is left running, only
    /// our listener on it is detached.
    fn disconnect(&self) {
        let previous = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            std::mem::replace(&mut state.connection, Connection::Disconnected)
        };

        if let Connection::Connected(feed) = previous {
            match self.doc.try_borrow_mut() {
                Ok(mut doc) => feed.release(&mut doc),
                Err(_) => self.state.borrow_mut().stale_feeds.push(feed),
            }
        }
        tracing::debug!("Bridge disconnected");
    }

    fn release_stale(&self, doc: &mut Document) {
        let stale = std::mem::take(&mut self.state.borrow_mut().stale_feeds);
        for feed in stale {
            feed.release(doc);
        }
    }
}

impl Drop for BridgeInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        let mut feeds = std::mem::take(&mut state.stale_feeds);
        if let Connection::Connected(feed) = state.connection {
            feeds.push(feed);
        }
        if feeds.is_empty() {
            return;
        }
        if let Ok(mut doc) = self.doc.try_borrow_mut() {
            for feed in feeds {
                feed.release(&mut doc);
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "<non-string panic payload>"
    }
}
