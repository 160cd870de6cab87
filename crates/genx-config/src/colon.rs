//! Colon notation: positional continuation of one attribute
//!
//! `fx-format="currency:USD:2"` sets `format`, then fills the keys after
//! `format` in the `fx` cardinality order: `currency`, `decimals`.

use crate::source::config_attributes;
use crate::{ConfigMap, ConfigSource, cardinality};

/// Copy `base` and apply every colon-separated `{prefix}-{key}` value
pub fn parse<E: ConfigSource + ?Sized>(element: &E, prefix: &str, base: &ConfigMap) -> ConfigMap {
    let mut config = base.clone();
    apply(element, prefix, &mut config);
    config
}

/// In-place form of [`parse`]
pub fn apply<E: ConfigSource + ?Sized>(element: &E, prefix: &str, config: &mut ConfigMap) {
    let order = cardinality::order(prefix);

    for (key, value) in config_attributes(element, prefix) {
        if !value.contains(':') {
            continue;
        }
        let mut parts = value.split(':');
        if let Some(first) = parts.next() {
            config.insert(key, first);
        }

        let Some(order) = order else { continue };
        let Some(start) = order.iter().position(|k| *k == key) else {
            continue;
        };
        // Segment j (1-based) targets order[start + j], clipped at the end
        for (target, segment) in order[start + 1..].iter().zip(parts) {
            config.insert(*target, segment);
        }
    }
}
