//! JSON notation: `{prefix}-opts` holds a strict JSON object
//!
//! Highest precedence. A malformed blob contributes nothing: it is never
//! partially applied and never fails the caller.

use crate::{ConfigError, ConfigMap, ConfigSource, Diagnostic, OPTS_SUFFIX, selector};

/// Name of the JSON attribute for a prefix
pub fn opts_attribute(prefix: &str) -> String {
    format!("{prefix}{OPTS_SUFFIX}")
}

/// Merge the element's JSON options over a copy of `base`.
///
/// On malformed input a warning is logged and a copy of `base` returned.
pub fn parse<E: ConfigSource + ?Sized>(element: &E, prefix: &str, base: &ConfigMap) -> ConfigMap {
    match try_parse(element, prefix, base) {
        Ok(config) => config,
        Err(err) => {
            Diagnostic::from_error(prefix, &err).log();
            base.clone()
        }
    }
}

/// Like [`parse`] but hands the failure back instead of logging it
pub fn try_parse<E: ConfigSource + ?Sized>(
    element: &E,
    prefix: &str,
    base: &ConfigMap,
) -> Result<ConfigMap, ConfigError> {
    let mut config = base.clone();
    apply(element, prefix, &mut config)?;
    Ok(config)
}

/// In-place form of [`try_parse`]. `config` is untouched on error.
pub fn apply<E: ConfigSource + ?Sized>(
    element: &E,
    prefix: &str,
    config: &mut ConfigMap,
) -> Result<(), ConfigError> {
    let attribute = opts_attribute(prefix);
    let Some(raw) = element.get_attribute(&attribute) else {
        return Ok(());
    };

    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(source) => {
            return Err(ConfigError::MalformedJson {
                attribute,
                selector: selector(element),
                raw: raw.to_string(),
                source,
            });
        }
    };

    let serde_json::Value::Object(object) = value else {
        return Err(ConfigError::NotAnObject {
            attribute,
            selector: selector(element),
            raw: raw.to_string(),
        });
    };

    config.merge(&ConfigMap::from_json_object(object));
    Ok(())
}
