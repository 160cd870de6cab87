//! Mutation Observers
//!
//! Observers register interest in a target node (optionally its whole
//! subtree) and accumulate mutation records until they are taken.
//! Listeners attached to an observer receive their own copy of every
//! record it accepts, so several consumers can share one observer without
//! draining each other's queue.

use crate::{DomError, NodeId};

/// Observer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

/// Listener handle, unique within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value,
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub character_data_old_value: bool,
    /// Exact attribute names; `None` observes every attribute
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// childList + subtree + attributes + characterData
    pub fn everything() -> Self {
        Self {
            child_list: true,
            attributes: true,
            character_data: true,
            subtree: true,
            ..Default::default()
        }
    }

    fn wants(&self, record: &MutationRecord) -> bool {
        match record.kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes => {
                self.attributes
                    && match (&self.attribute_filter, &record.attribute_name) {
                        (Some(filter), Some(name)) => filter.iter().any(|f| f == name),
                        _ => true,
                    }
            }
        }
    }

    fn keeps_old_value(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Attributes => self.attribute_old_value,
            MutationKind::CharacterData => self.character_data_old_value,
            MutationKind::ChildList => false,
        }
    }
}

/// Mutation observer
#[derive(Debug)]
struct MutationObserver {
    id: ObserverId,
    observations: Vec<(NodeId, MutationObserverInit)>,
    pending: Vec<MutationRecord>,
    listeners: Vec<(ListenerId, Vec<MutationRecord>)>,
}

impl MutationObserver {
    /// Record a mutation if any observation covers it.
    /// `path` is the mutation target followed by its ancestors.
    fn record(&mut self, mutation: &MutationRecord, path: &[NodeId]) {
        let matching = self.observations.iter().find(|(target, options)| {
            let covers = match path.iter().position(|n| n == target) {
                Some(0) => true,
                Some(_) => options.subtree,
                None => false,
            };
            covers && options.wants(mutation)
        });

        if let Some((_, options)) = matching {
            let mut record = mutation.clone();
            if !options.keeps_old_value(record.kind) {
                record.old_value = None;
            }
            for (_, queue) in &mut self.listeners {
                queue.push(record.clone());
            }
            self.pending.push(record);
        }
    }
}

/// Owns every observer of a document
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    observers: Vec<MutationObserver>,
    next_id: u32,
    next_listener: u32,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an observer with no observations
    pub fn create(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.observers.push(MutationObserver {
            id,
            observations: Vec::new(),
            pending: Vec::new(),
            listeners: Vec::new(),
        });
        id
    }

    fn get_mut(&mut self, id: ObserverId) -> Result<&mut MutationObserver, DomError> {
        self.observers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomError::UnknownObserver(id))
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.iter().any(|o| o.id == id)
    }

    /// Observe a target; re-observing the same target replaces its options
    pub fn observe(
        &mut self,
        id: ObserverId,
        target: NodeId,
        options: MutationObserverInit,
    ) -> Result<(), DomError> {
        let observer = self.get_mut(id)?;
        match observer.observations.iter_mut().find(|(t, _)| *t == target) {
            Some(entry) => entry.1 = options,
            None => observer.observations.push((target, options)),
        }
        Ok(())
    }

    /// Stop observing and drop pending records, listeners' included
    pub fn disconnect(&mut self, id: ObserverId) -> Result<(), DomError> {
        let observer = self.get_mut(id)?;
        observer.observations.clear();
        observer.pending.clear();
        for (_, queue) in &mut observer.listeners {
            queue.clear();
        }
        Ok(())
    }

    /// Attach a listener to `id`. It receives every record the observer
    /// accepts from now on, independently of [`Self::take_records`].
    pub fn add_listener(&mut self, id: ObserverId) -> Result<ListenerId, DomError> {
        let listener = ListenerId(self.next_listener);
        self.get_mut(id)?.listeners.push((listener, Vec::new()));
        self.next_listener = self.next_listener.wrapping_add(1);
        Ok(listener)
    }

    fn listener_queue(&mut self, listener: ListenerId) -> Option<&mut Vec<MutationRecord>> {
        self.observers
            .iter_mut()
            .flat_map(|o| o.listeners.iter_mut())
            .find(|(l, _)| *l == listener)
            .map(|(_, queue)| queue)
    }

    pub fn take_listener_records(&mut self, listener: ListenerId) -> Result<Vec<MutationRecord>, DomError> {
        self.listener_queue(listener)
            .map(std::mem::take)
            .ok_or(DomError::UnknownListener(listener))
    }

    /// Detach a listener; its undelivered records are dropped
    pub fn remove_listener(&mut self, listener: ListenerId) -> bool {
        self.observers.iter_mut().any(|o| {
            let before = o.listeners.len();
            o.listeners.retain(|(l, _)| *l != listener);
            o.listeners.len() != before
        })
    }

    /// Observer a listener is attached to
    pub fn listener_observer(&self, listener: ListenerId) -> Option<ObserverId> {
        self.observers
            .iter()
            .find(|o| o.listeners.iter().any(|(l, _)| *l == listener))
            .map(|o| o.id)
    }

    /// Remove an observer entirely, with its listeners
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    pub fn take_records(&mut self, id: ObserverId) -> Result<Vec<MutationRecord>, DomError> {
        Ok(std::mem::take(&mut self.get_mut(id)?.pending))
    }

    pub fn has_pending(&self, id: ObserverId) -> bool {
        self.observers
            .iter()
            .any(|o| o.id == id && !o.pending.is_empty())
    }

    /// Offer a mutation to every observer
    pub fn notify(&mut self, mutation: &MutationRecord, path: &[NodeId]) {
        for observer in &mut self.observers {
            observer.record(mutation, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: NodeId = NodeId::ROOT;
    const CHILD: NodeId = NodeId(5);

    #[test]
    fn test_target_only_observation() {
        let mut reg = ObserverRegistry::new();
        let id = reg.create();
        reg.observe(id, ROOT, MutationObserverInit {
            attributes: true,
            ..Default::default()
        })
        .unwrap();

        reg.notify(&MutationRecord::attributes(CHILD, "fx-format", None), &[CHILD, ROOT]);
        assert!(!reg.has_pending(id));

        reg.notify(&MutationRecord::attributes(ROOT, "fx-format", None), &[ROOT]);
        assert_eq!(reg.take_records(id).unwrap().len(), 1);
    }

    #[test]
    fn test_subtree_observation() {
        let mut reg = ObserverRegistry::new();
        let id = reg.create();
        reg.observe(id, ROOT, MutationObserverInit::everything()).unwrap();

        reg.notify(&MutationRecord::attributes(CHILD, "class", Some("old".into())), &[CHILD, ROOT]);
        let records = reg.take_records(id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attribute_name.as_deref(), Some("class"));
        // Old values only kept when asked for
        assert_eq!(records[0].old_value, None);
        assert!(reg.take_records(id).unwrap().is_empty());
    }

    #[test]
    fn test_attribute_filter_is_exact() {
        let mut reg = ObserverRegistry::new();
        let id = reg.create();
        reg.observe(id, ROOT, MutationObserverInit {
            attributes: true,
            attribute_old_value: true,
            attribute_filter: Some(vec!["fx-opts".into()]),
            ..Default::default()
        })
        .unwrap();

        reg.notify(&MutationRecord::attributes(ROOT, "fx-format", None), &[ROOT]);
        reg.notify(&MutationRecord::attributes(ROOT, "fx-opts", Some("{}".into())), &[ROOT]);
        let records = reg.take_records(id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_value.as_deref(), Some("{}"));
    }

    #[test]
    fn test_disconnect_and_remove() {
        let mut reg = ObserverRegistry::new();
        let id = reg.create();
        reg.observe(id, ROOT, MutationObserverInit::everything()).unwrap();
        reg.notify(&MutationRecord::child_list(ROOT, vec![CHILD], vec![]), &[ROOT]);

        reg.disconnect(id).unwrap();
        assert!(!reg.has_pending(id));
        reg.notify(&MutationRecord::child_list(ROOT, vec![CHILD], vec![]), &[ROOT]);
        assert!(!reg.has_pending(id));

        assert!(reg.remove(id));
        assert_eq!(reg.take_records(id), Err(DomError::UnknownObserver(id)));
    }

    #[test]
    fn test_listeners_get_their_own_copy() {
        let mut reg = ObserverRegistry::new();
        let id = reg.create();
        reg.observe(id, ROOT, MutationObserverInit::everything()).unwrap();
        reg.notify(&MutationRecord::attributes(ROOT, "fx-format", None), &[ROOT]);

        let first = reg.add_listener(id).unwrap();
        let second = reg.add_listener(id).unwrap();
        assert_ne!(first, second);
        assert_eq!(reg.listener_observer(first), Some(id));

        reg.notify(&MutationRecord::attributes(CHILD, "fx-opts", None), &[CHILD, ROOT]);

        // attached after the first record, so only the second one
        let seen = reg.take_listener_records(first).unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].attribute_name.as_deref(), Some("fx-opts"));
        assert!(reg.take_listener_records(first).unwrap().is_empty());

        assert_eq!(reg.take_listener_records(second).unwrap().len(), 1);
        assert_eq!(reg.take_records(id).unwrap().len(), 2);
    }

    #[test]
    fn test_listener_lifecycle() {
        let mut reg = ObserverRegistry::new();
        let id = reg.create();
        reg.observe(id, ROOT, MutationObserverInit::everything()).unwrap();
        let listener = reg.add_listener(id).unwrap();

        reg.notify(&MutationRecord::child_list(ROOT, vec![CHILD], vec![]), &[ROOT]);
        reg.disconnect(id).unwrap();
        assert!(reg.take_listener_records(listener).unwrap().is_empty());

        assert!(reg.remove_listener(listener));
        assert!(!reg.remove_listener(listener));
        assert_eq!(
            reg.take_listener_records(listener),
            Err(DomError::UnknownListener(listener))
        );

        let listener = reg.add_listener(id).unwrap();
        reg.remove(id);
        assert_eq!(reg.listener_observer(listener), None);
        assert_eq!(reg.add_listener(id), Err(DomError::UnknownObserver(id)));
    }
}
