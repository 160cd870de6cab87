//! Document - High-level document API
//!
//! Every mutating call goes through here so observers see a record for it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    DomError, DomTree, ElementRef, MutationObserverInit, MutationRecord, NodeId, ObserverId,
    ObserverRegistry,
};

/// Document shared between the host and subscribers on one thread
pub type SharedDocument = Rc<RefCell<Document>>;

/// One-shot callback run when the document stops loading
type ReadyListener = Box<dyn FnOnce(&mut Document)>;

/// Document loading state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// HTML Document
pub struct Document {
    tree: DomTree,
    url: String,
    observers: ObserverRegistry,
    /// Host-installed observer that other components may share
    shared_observer: Option<ObserverId>,
    ready_state: ReadyState,
    ready_listeners: Vec<ReadyListener>,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("nodes", &self.tree.len())
            .field("ready_state", &self.ready_state)
            .field("shared_observer", &self.shared_observer)
            .field("ready_listeners", &self.ready_listeners.len())
            .finish()
    }
}

impl Document {
    /// Create a fully loaded document with html/head/body
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");

        // Fresh nodes under a fresh root cannot violate the hierarchy
        let root = doc.tree.root();
        for (parent, child) in [(root, html), (html, head), (html, body)] {
            if let Err(err) = doc.tree.append_child(parent, child) {
                tracing::error!("Failed to build document skeleton: {}", err);
            }
        }

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create a document that is still loading
    pub fn loading(url: &str) -> Self {
        let mut doc = Self::new(url);
        doc.ready_state = ReadyState::Loading;
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            observers: ObserverRegistry::new(),
            shared_observer: None,
            ready_state: ReadyState::Complete,
            ready_listeners: Vec::new(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// Locate html/head/body after the tree was built externally
    pub fn finalize(&mut self) {
        let find = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.children(parent)
                .find(|(_, n)| n.as_element().is_some_and(|e| e.tag_name() == tag))
                .map_or(NodeId::NONE, |(id, _)| id)
        };
        self.html_element = find(&self.tree, self.tree.root(), "html");
        self.head_element = find(&self.tree, self.html_element, "head");
        self.body_element = find(&self.tree, self.html_element, "body");
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Direct tree access; changes made this way are not observed
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.tree.element(id)
    }

    /// First element in tree order with the given id
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&n| self.tree.element(n).and_then(|e| e.id()) == Some(id))
    }

    /// Element descendants of `root` in tree order, `root` included
    pub fn elements(&self, root: NodeId) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.tree
            .descendants(root)
            .filter_map(|n| self.tree.element(n))
    }

    /// True if `node` or any descendant has an attribute starting with a prefix
    pub fn subtree_has_attribute_prefix<S: AsRef<str>>(&self, node: NodeId, prefixes: &[S]) -> bool {
        self.elements(node)
            .any(|e| e.data().attrs.has_prefix(prefixes))
    }

    // ------------------------------------------------------------------
    // Ready state
    // ------------------------------------------------------------------

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Update the ready state; leaving `Loading` fires ready listeners once
    pub fn set_ready_state(&mut self, state: ReadyState) {
        let was_loading = self.ready_state == ReadyState::Loading;
        self.ready_state = state;
        if was_loading && state != ReadyState::Loading {
            tracing::debug!("Document ready ({:?}), {} listeners", state, self.ready_listeners.len());
            for listener in std::mem::take(&mut self.ready_listeners) {
                listener(self);
            }
        }
    }

    /// Run `listener` once the document is no longer loading.
    /// Runs immediately if it already is.
    pub fn on_ready(&mut self, listener: impl FnOnce(&mut Document) + 'static) {
        if self.ready_state == ReadyState::Loading {
            self.ready_listeners.push(Box::new(listener));
        } else {
            listener(self);
        }
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut ObserverRegistry {
        &mut self.observers
    }

    /// Create an observer and start observing `target`
    pub fn observe(
        &mut self,
        target: NodeId,
        options: MutationObserverInit,
    ) -> Result<ObserverId, DomError> {
        if self.tree.get(target).is_none() {
            return Err(DomError::UnknownNode(target));
        }
        let id = self.observers.create();
        self.observers.observe(id, target, options)?;
        Ok(id)
    }

    pub fn take_records(&mut self, id: ObserverId) -> Result<Vec<MutationRecord>, DomError> {
        self.observers.take_records(id)
    }

    /// Install the document-wide observer that components may share
    pub fn install_shared_observer(&mut self) -> Result<ObserverId, DomError> {
        if let Some(id) = self.shared_observer {
            return Ok(id);
        }
        let target = if self.body_element.is_valid() {
            self.body_element
        } else {
            self.tree.root()
        };
        let id = self.observe(target, MutationObserverInit::everything())?;
        self.shared_observer = Some(id);
        Ok(id)
    }

    pub fn shared_observer(&self) -> Option<ObserverId> {
        self.shared_observer
            .filter(|&id| self.observers.contains(id))
    }

    fn record(&mut self, mutation: MutationRecord) {
        let path: Vec<NodeId> = self.tree.ancestors(mutation.target).collect();
        self.observers.notify(&mutation, &path);
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let old_parent = self.tree.get(child).map_or(NodeId::NONE, |n| n.parent);
        self.tree.append_child(parent, child)?;
        if old_parent.is_valid() {
            self.record(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
        }
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let actual = self
            .tree
            .get(child)
            .ok_or(DomError::UnknownNode(child))?
            .parent;
        if actual != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.tree.detach(child);
        self.record(MutationRecord::child_list(parent, Vec::new(), vec![child]));
        Ok(())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let old = self.tree.element_mut(node)?.attrs.set(name, value);
        self.record(MutationRecord::attributes(node, name, old));
        Ok(())
    }

    /// Remove an attribute; absent attributes produce no record
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let old = self.tree.element_mut(node)?.attrs.remove(name);
        if old.is_some() {
            self.record(MutationRecord::attributes(node, name, old.clone()));
        }
        Ok(old)
    }

    /// Replace the character data of a text or comment node
    pub fn set_character_data(&mut self, node: NodeId, content: &str) -> Result<(), DomError> {
        let target = self.tree.get_mut(node).ok_or(DomError::UnknownNode(node))?;
        let old = match &mut target.data {
            crate::NodeData::Text(t) | crate::NodeData::Comment(t) => {
                std::mem::replace(t, content.to_string())
            }
            _ => return Err(DomError::NotCharacterData(node)),
        };
        self.record(MutationRecord::character_data(node, Some(old)));
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationKind;
    use std::cell::Cell;

    #[test]
    fn test_document_structure() {
        let doc = Document::new("about:blank");
        assert!(doc.document_element().is_valid());
        assert!(doc.head().is_valid());
        assert!(doc.body().is_valid());
        assert_eq!(doc.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn test_mutations_are_recorded() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let obs = doc.observe(body, MutationObserverInit {
            attribute_old_value: true,
            ..MutationObserverInit::everything()
        })
        .unwrap();

        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.set_attribute(div, "fx-format", "currency").unwrap();
        doc.set_attribute(div, "fx-format", "number").unwrap();
        doc.remove_attribute(div, "missing").unwrap();

        let records = doc.take_records(obs).unwrap();
        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![
            MutationKind::ChildList,
            MutationKind::Attributes,
            MutationKind::Attributes,
        ]);
        assert_eq!(records[0].added_nodes, vec![div]);
        assert_eq!(records[2].old_value.as_deref(), Some("currency"));
    }

    #[test]
    fn test_character_data_record() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let obs = doc.observe(body, MutationObserverInit::everything()).unwrap();
        let text = doc.create_text("old");
        doc.append_child(body, text).unwrap();
        doc.set_character_data(text, "new").unwrap();

        let records = doc.take_records(obs).unwrap();
        assert_eq!(records.last().map(|r| r.kind), Some(MutationKind::CharacterData));
        assert_eq!(doc.tree().get(text).and_then(|n| n.character_data()), Some("new"));
    }

    #[test]
    fn test_remove_child_checks_parent() {
        let mut doc = Document::new("about:blank");
        let div = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, div).unwrap();

        let head = doc.head();
        assert_eq!(doc.remove_child(head, div), Err(DomError::NotAChild { parent: head, child: div }));
        assert!(doc.remove_child(body, div).is_ok());
    }

    #[test]
    fn test_ready_listeners_fire_once() {
        let mut doc = Document::loading("about:blank");
        let fired = std::rc::Rc::new(Cell::new(0));
        let f = fired.clone();
        doc.on_ready(move |_| f.set(f.get() + 1));
        assert_eq!(fired.get(), 0);

        doc.set_ready_state(ReadyState::Interactive);
        doc.set_ready_state(ReadyState::Complete);
        assert_eq!(fired.get(), 1);

        // Already ready: runs immediately
        let f = fired.clone();
        doc.on_ready(move |_| f.set(f.get() + 1));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_shared_observer_is_installed_once() {
        let mut doc = Document::new("about:blank");
        assert_eq!(doc.shared_observer(), None);
        let first = doc.install_shared_observer().unwrap();
        let second = doc.install_shared_observer().unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.shared_observer(), Some(first));
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new("about:blank");
        let div = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, div).unwrap();
        doc.set_attribute(div, "id", "price").unwrap();

        assert_eq!(doc.get_element_by_id("price"), Some(div));
        assert_eq!(doc.get_element_by_id("nope"), None);
    }
}
