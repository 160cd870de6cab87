//! Class notation: positional values packed in a class name
//!
//! `class="fmt-currency-USD-2"` with prefix `fx` maps the segments after
//! `fmt` onto the `fx` cardinality order: `{format: "currency", currency:
//! "USD", decimals: 2}`.
//!
//! Class names are attacker-reachable in many pages, so the parser is
//! defensive only: unsafe segments and dangerous target keys are dropped,
//! never reported as errors.

use std::ops::Range;

use serde::Deserialize;

use crate::cache::ClassParseCache;
use crate::{CacheStats, ConfigMap, ConfigSource, ConfigValue, cardinality, is_dangerous_key};

/// Class parsing limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassParseOptions {
    /// Store segments that round-trip as numbers as numbers
    pub coerce_numbers: bool,
    /// Longer segments are dropped
    pub max_segment_length: usize,
    /// Segments after the class prefix considered at most
    pub max_segments: usize,
}

impl Default for ClassParseOptions {
    fn default() -> Self {
        Self {
            coerce_numbers: true,
            max_segment_length: 64,
            max_segments: 10,
        }
    }
}

impl ClassParseOptions {
    /// Stable encoding of the options for cache keys
    pub fn fingerprint(&self) -> String {
        format!(
            "c{}:s{}:l{}",
            u8::from(self.coerce_numbers),
            self.max_segments,
            self.max_segment_length
        )
    }
}

/// Byte ranges of the `-` separated segments of `class`.
/// Empty segments are yielded too, so positions stay stable.
pub fn segments(class: &str) -> Segments<'_> {
    Segments {
        bytes: class.as_bytes(),
        pos: 0,
        done: false,
    }
}

/// Allocation-free segment scanner
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl Iterator for Segments<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.done {
            return None;
        }
        let start = self.pos;
        let mut i = start;
        while i < self.bytes.len() {
            if self.bytes[i] == b'-' {
                self.pos = i + 1;
                return Some(start..i);
            }
            i += 1;
        }
        self.done = true;
        Some(start..self.bytes.len())
    }
}

/// Conservative allow-list: `[A-Za-z0-9_:\-@.]`
pub fn is_safe_segment(segment: &str) -> bool {
    segment
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'@' | b'.'))
}

/// Parse `token` as a number only if formatting the number back gives the
/// exact same text, the way a script engine prints numbers.
///
/// `"2"` → 2, while `"02"`, `"2.50"`, `"1e3"`, `"+1"`, `"-0"` stay strings.
pub fn coerce_number(token: &str) -> Option<f64> {
    let value: f64 = token.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    // Negative zero prints as "0"
    if value == 0.0 && value.is_sign_negative() {
        return None;
    }
    // Outside this range script engines switch to exponent notation
    let magnitude = value.abs();
    if value != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        return None;
    }
    (value.to_string() == token).then_some(value)
}

/// Class-notation parser with its parse cache
#[derive(Debug, Clone, Default)]
pub struct ClassParser {
    cache: ClassParseCache,
    options: ClassParseOptions,
}

impl ClassParser {
    pub fn new(options: ClassParseOptions, cache_capacity: usize) -> Self {
        Self {
            cache: ClassParseCache::new(cache_capacity),
            options,
        }
    }

    pub fn options(&self) -> &ClassParseOptions {
        &self.options
    }

    /// Copy `base` and merge the element's class-notation keys over it
    pub fn parse<E: ConfigSource + ?Sized>(&mut self, element: &E, prefix: &str, base: &ConfigMap) -> ConfigMap {
        let options = self.options;
        self.parse_with(element, prefix, base, &options)
    }

    /// [`parse`](Self::parse) with explicit options
    pub fn parse_with<E: ConfigSource + ?Sized>(
        &mut self,
        element: &E,
        prefix: &str,
        base: &ConfigMap,
        options: &ClassParseOptions,
    ) -> ConfigMap {
        let mut config = base.clone();
        self.apply_with(element, prefix, &mut config, options);
        config
    }

    /// In-place form of [`parse`](Self::parse)
    pub fn apply<E: ConfigSource + ?Sized>(&mut self, element: &E, prefix: &str, config: &mut ConfigMap) {
        let options = self.options;
        self.apply_with(element, prefix, config, &options);
    }

    fn apply_with<E: ConfigSource + ?Sized>(
        &mut self,
        element: &E,
        prefix: &str,
        config: &mut ConfigMap,
        options: &ClassParseOptions,
    ) {
        let Some(entry) = cardinality::lookup(prefix) else {
            return;
        };
        let Some(class) = matching_class(element, entry.class_prefix) else {
            return;
        };

        let key = ClassParseCache::key(prefix, class, &options.fingerprint());
        if let Some(cached) = self.cache.get(&key) {
            config.merge(cached);
            return;
        }

        tracing::debug!("Class parse cache miss for {:?}", key);
        let mapped = map_class(class, entry.order, options);
        config.merge(&mapped);
        self.cache.insert(key, mapped);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// First class token starting with `{class_prefix}-`
fn matching_class<'e, E: ConfigSource + ?Sized>(element: &'e E, class_prefix: &str) -> Option<&'e str> {
    element.classes().find(|class| {
        class
            .strip_prefix(class_prefix)
            .is_some_and(|rest| rest.starts_with('-'))
    })
}

/// Map the segments of one class string onto `order`.
/// Pure: the result depends only on the arguments.
pub fn map_class(class: &str, order: &[&str], options: &ClassParseOptions) -> ConfigMap {
    let mut mapped = ConfigMap::new();
    let limit = options.max_segments.min(order.len());

    // First segment is the class prefix itself
    for (position, range) in segments(class).skip(1).take(limit).enumerate() {
        let token = &class[range];
        if token.is_empty() || token.len() > options.max_segment_length || !is_safe_segment(token) {
            continue;
        }
        let target = order[position];
        if is_dangerous_key(target) {
            continue;
        }
        let value = match options.coerce_numbers.then(|| coerce_number(token)).flatten() {
            Some(n) => ConfigValue::Number(n),
            None => ConfigValue::from(token),
        };
        mapped.insert(target, value);
    }
    mapped
}
