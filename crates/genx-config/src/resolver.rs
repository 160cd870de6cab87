//! Configuration resolver
//!
//! Applies the four notations in increasing precedence:
//! verbose → colon → class → JSON. A later layer overwrites an earlier one
//! key by key, regardless of attribute declaration order.
//!
//! The resolver owns its caches, so independent instances never share
//! state. Results memoised per element are tagged with the element's
//! attribute generation and recomputed once it moves on. Removed subtrees
//! are evicted through [`ConfigResolver::forget`] or
//! [`ConfigResolver::apply_mutations`].

use std::collections::HashMap;

use genx_dom::{Document, DomTree, MutationKind, MutationRecord, NodeId};
use serde::Deserialize;

use crate::cache::DEFAULT_CAPACITY;
use crate::{
    CacheStats, ClassParseOptions, ClassParser, ConfigMap, ConfigSource, Diagnostic, DiagnosticLog,
    cardinality, colon, json, verbose,
};

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub class: ClassParseOptions,
    /// Class parse cache entries
    pub cache_capacity: usize,
    /// Diagnostics kept for inspection
    pub diagnostics_capacity: usize,
    /// Memoise [`ConfigResolver::resolve_node`] results per element
    pub memoize_elements: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            class: ClassParseOptions::default(),
            cache_capacity: DEFAULT_CAPACITY,
            diagnostics_capacity: 64,
            memoize_elements: true,
        }
    }
}

/// Turns annotated elements into configuration maps
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    class_parser: ClassParser,
    diagnostics: DiagnosticLog,
    memoize_elements: bool,
    /// node → prefix → resolved config
    element_cache: HashMap<NodeId, HashMap<Box<str>, Memo>>,
}

/// Resolved config and the attribute generation it was read at
#[derive(Debug, Clone)]
struct Memo {
    generation: u64,
    config: ConfigMap,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl ConfigResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            class_parser: ClassParser::new(config.class, config.cache_capacity),
            diagnostics: DiagnosticLog::new(config.diagnostics_capacity),
            memoize_elements: config.memoize_elements,
            element_cache: HashMap::new(),
        }
    }

    /// Resolve `element`'s configuration for `prefix` on top of `base`
    pub fn resolve<E: ConfigSource + ?Sized>(&mut self, element: &E, prefix: &str, base: &ConfigMap) -> ConfigMap {
        let mut config = base.clone();
        verbose::apply(element, prefix, &mut config);
        colon::apply(element, prefix, &mut config);
        self.class_parser.apply(element, prefix, &mut config);
        if let Err(err) = json::apply(element, prefix, &mut config) {
            self.diagnostics.push(Diagnostic::from_error(prefix, &err));
        }
        config
    }

    /// Resolve a document element with an empty base.
    /// Returns `None` if `node` is not an element.
    /// A memoised result is reused only while the element's attributes
    /// are unchanged.
    pub fn resolve_node(&mut self, doc: &Document, node: NodeId, prefix: &str) -> Option<ConfigMap> {
        let element = doc.element(node)?;
        let generation = element.attributes_generation();

        if self.memoize_elements {
            let hit = self
                .element_cache
                .get(&node)
                .and_then(|m| m.get(prefix))
                .filter(|memo| memo.generation == generation);
            if let Some(memo) = hit {
                return Some(memo.config.clone());
            }
        }

        let config = self.resolve(&element, prefix, &ConfigMap::new());
        if self.memoize_elements {
            self.element_cache.entry(node).or_default().insert(
                prefix.into(),
                Memo {
                    generation,
                    config: config.clone(),
                },
            );
        }
        Some(config)
    }

    /// Every element under `root` carrying any notation for `prefix`,
    /// in tree order, with its resolved configuration
    pub fn scan(&mut self, doc: &Document, root: NodeId, prefix: &str) -> Vec<(NodeId, ConfigMap)> {
        let class_prefix = cardinality::class_prefix(prefix);
        let annotated: Vec<NodeId> = doc
            .elements(root)
            .filter(|e| has_notation(e, prefix, class_prefix))
            .map(|e| e.node_id())
            .collect();

        annotated
            .into_iter()
            .filter_map(|node| Some((node, self.resolve_node(doc, node, prefix)?)))
            .collect()
    }

    /// Drop memoised results for one element
    pub fn forget(&mut self, node: NodeId) -> bool {
        self.element_cache.remove(&node).is_some()
    }

    /// Evict memoised results made stale by a mutation batch: attribute
    /// targets, and removed nodes together with their subtrees
    pub fn apply_mutations(&mut self, tree: &DomTree, records: &[MutationRecord]) -> usize {
        if self.element_cache.is_empty() {
            return 0;
        }
        let mut evicted = 0;
        for record in records {
            match record.kind {
                MutationKind::Attributes => evicted += usize::from(self.forget(record.target)),
                MutationKind::ChildList => {
                    for &removed in &record.removed_nodes {
                        for node in tree.descendants(removed) {
                            evicted += usize::from(self.forget(node));
                        }
                    }
                }
                MutationKind::CharacterData => {}
            }
        }
        evicted
    }

    /// Number of elements with memoised results
    pub fn memoized_elements(&self) -> usize {
        self.element_cache.len()
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain()
    }

    pub fn class_cache_stats(&self) -> CacheStats {
        self.class_parser.cache_stats()
    }

    /// Clear caches, memoised results and diagnostics
    pub fn reset(&mut self) {
        self.class_parser.clear_cache();
        self.element_cache.clear();
        self.diagnostics.clear();
    }
}

/// True if the element carries any notation for `prefix`
fn has_notation<E: ConfigSource + ?Sized>(element: &E, prefix: &str, class_prefix: Option<&str>) -> bool {
    let attr = element.attributes().any(|(name, _)| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| rest.len() > 1 && rest.starts_with('-'))
    });
    attr || class_prefix.is_some_and(|cp| {
        element
            .classes()
            .any(|c| c.strip_prefix(cp).is_some_and(|rest| rest.starts_with('-')))
    })
}
