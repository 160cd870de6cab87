//! Cardinality orders
//!
//! Positional meaning for colon and class notation. Index `i` of a
//! positional value always maps to `order[i]` for a given prefix; the table
//! is static and never changes at runtime.

/// One genX module's attribute namespace and positional key order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    /// Attribute prefix, e.g. `fx`
    pub prefix: &'static str,
    /// Class-notation alias, e.g. `fmt`
    pub class_prefix: &'static str,
    /// Module name used in diagnostics
    pub module: &'static str,
    /// Positional key order
    pub order: &'static [&'static str],
}

pub static CARDINALITY_ORDERS: [Cardinality; 7] = [
    Cardinality {
        prefix: "fx",
        class_prefix: "fmt",
        module: "fmtX",
        order: &["format", "currency", "decimals", "pattern", "locale", "symbol"],
    },
    Cardinality {
        prefix: "bx",
        class_prefix: "bind",
        module: "bindX",
        order: &["bind", "debounce", "throttle", "format", "validate"],
    },
    Cardinality {
        prefix: "ax",
        class_prefix: "acc",
        module: "accX",
        order: &["enhance", "label", "role", "live", "describedby"],
    },
    Cardinality {
        prefix: "dx",
        class_prefix: "drag",
        module: "dragX",
        order: &["draggable", "dropzone", "data", "effect", "handle"],
    },
    Cardinality {
        prefix: "lx",
        class_prefix: "load",
        module: "loadX",
        order: &["strategy", "duration", "delay", "text", "min"],
    },
    Cardinality {
        prefix: "nx",
        class_prefix: "nav",
        module: "navX",
        order: &["nav", "active", "orientation", "breakpoint", "toggle"],
    },
    Cardinality {
        prefix: "tx",
        class_prefix: "table",
        module: "tableX",
        order: &["sortable", "column", "direction", "type", "default"],
    },
];

/// Table entry for a prefix
pub fn lookup(prefix: &str) -> Option<&'static Cardinality> {
    CARDINALITY_ORDERS.iter().find(|c| c.prefix == prefix)
}

/// Positional key order for a prefix
pub fn order(prefix: &str) -> Option<&'static [&'static str]> {
    lookup(prefix).map(|c| c.order)
}

/// Class-notation alias for a prefix
pub fn class_prefix(prefix: &str) -> Option<&'static str> {
    lookup(prefix).map(|c| c.class_prefix)
}

/// Index of `key` within the prefix's order
pub fn position(prefix: &str, key: &str) -> Option<usize> {
    order(prefix)?.iter().position(|k| *k == key)
}

/// Module name for diagnostics, falling back to the raw prefix
pub fn module_name(prefix: &str) -> &str {
    lookup(prefix).map_or(prefix, |c| c.module)
}

/// All known attribute prefixes
pub fn prefixes() -> impl Iterator<Item = &'static str> {
    CARDINALITY_ORDERS.iter().map(|c| c.prefix)
}
