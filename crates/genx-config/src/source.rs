//! Read-only element capability the parsers work against

use genx_dom::ElementRef;

/// What a parser may read from an element
pub trait ConfigSource {
    /// Lowercase tag name
    fn tag_name(&self) -> &str;

    /// Non-empty `id` attribute
    fn element_id(&self) -> Option<&str>;

    fn get_attribute(&self, name: &str) -> Option<&str>;

    /// `(name, value)` pairs in declaration order
    fn attributes(&self) -> impl Iterator<Item = (&str, &str)>;

    /// Class tokens in declaration order
    fn classes(&self) -> impl Iterator<Item = &str>;
}

impl ConfigSource for ElementRef<'_> {
    fn tag_name(&self) -> &str {
        ElementRef::tag_name(self)
    }

    fn element_id(&self) -> Option<&str> {
        self.id()
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        ElementRef::get_attribute(self, name)
    }

    fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data().attrs.iter().map(|a| (&*a.name, a.value.as_str()))
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.data().classes()
    }
}

/// Short selector naming an element in diagnostics:
/// `#id`, else `.firstClass`, else the tag name
pub fn selector<E: ConfigSource + ?Sized>(element: &E) -> String {
    if let Some(id) = element.element_id() {
        return format!("#{id}");
    }
    if let Some(class) = element.classes().next() {
        return format!(".{class}");
    }
    element.tag_name().to_ascii_lowercase()
}

/// Attributes `{prefix}-{key}` carrying configuration, with the key
/// extracted. Reserved `-opts` and `-raw` attributes are skipped.
pub(crate) fn config_attributes<'e, E: ConfigSource + ?Sized>(
    element: &'e E,
    prefix: &'e str,
) -> impl Iterator<Item = (&'e str, &'e str)> + 'e {
    element.attributes().filter_map(move |(name, value)| {
        if name.ends_with(crate::OPTS_SUFFIX) || name.ends_with(crate::RAW_SUFFIX) {
            return None;
        }
        let key = name.strip_prefix(prefix)?.strip_prefix('-')?;
        (!key.is_empty()).then_some((key, value))
    })
}
