//! genX configuration core
//!
//! Every genX module (fmtX, bindX, accX, dragX, loadX, navX, tableX) reads
//! its options from HTML attributes written in one of four notations:
//!
//! - verbose: `fx-format="currency" fx-currency="USD"`
//! - colon: `fx-format="currency:USD:2"`
//! - class: `class="fmt-currency-USD-2"`
//! - JSON: `fx-opts='{"format":"currency","currency":"USD"}'`
//!
//! The parsers here normalise all four into one [`ConfigMap`]. Colon and
//! class notation get positional meaning from the [`cardinality`] table.
//! [`ConfigResolver`] applies them in increasing precedence order.

pub mod cardinality;
pub mod class;
pub mod colon;
pub mod json;
pub mod verbose;

mod cache;
mod diagnostics;
mod error;
mod resolver;
mod source;
mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStats, ClassParseCache};
pub use class::{ClassParseOptions, ClassParser};
pub use diagnostics::{Diagnostic, DiagnosticLog};
pub use error::ConfigError;
pub use resolver::{ConfigResolver, ResolverConfig};
pub use source::{ConfigSource, selector};
pub use value::{ConfigMap, ConfigValue, DANGEROUS_KEYS, is_dangerous_key};

/// Attribute suffix holding the JSON blob
pub const OPTS_SUFFIX: &str = "-opts";

/// Attribute suffix reserved for raw values, never a configuration key
pub const RAW_SUFFIX: &str = "-raw";
