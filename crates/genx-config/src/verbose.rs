//! Verbose notation: one attribute per key
//!
//! `<span fx-format="currency" fx-currency="USD">` → `{format, currency}`.
//! Values are kept as raw strings. This is the baseline the other
//! notations layer on top of.

use crate::source::config_attributes;
use crate::{ConfigMap, ConfigSource};

/// Copy `base` and apply every `{prefix}-{key}` attribute onto it
pub fn parse<E: ConfigSource + ?Sized>(element: &E, prefix: &str, base: &ConfigMap) -> ConfigMap {
    let mut config = base.clone();
    apply(element, prefix, &mut config);
    config
}

/// In-place form of [`parse`]
pub fn apply<E: ConfigSource + ?Sized>(element: &E, prefix: &str, config: &mut ConfigMap) {
    for (key, value) in config_attributes(element, prefix) {
        config.insert(key, value);
    }
}
