//! Interned identifiers for concept, role, and individual names.

use std::fmt;
use std::sync::Arc;

/// An opaque interned name.
///
/// Identifiers compare, hash, and order by value; cloning is cheap (the
/// backing string is shared). The same type names concepts, roles, and
/// individuals — which set a given identifier belongs to is recorded by the
/// [`Ontology`](crate::Ontology) that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Interns a name.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Identifier(Arc::from(name.as_ref()))
    }

    /// Returns the full name as given at construction.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the shortened local form used by simplified-name rendering.
    ///
    /// Strips everything up to (and including) the last `#` or `/`, then any
    /// surrounding double quotes. Falls back to the full name when stripping
    /// would leave nothing.
    #[must_use]
    pub fn local_name(&self) -> &str {
        let full: &str = &self.0;
        let tail = match full.rfind(['#', '/']) {
            Some(cut) => &full[cut + 1..],
            None => full,
        };
        let tail = tail.trim_matches('"');
        if tail.is_empty() {
            full
        } else {
            tail
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::new(name)
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Identifier::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::Identifier;

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Identifier::new("A"), Identifier::new("A"));
        assert_ne!(Identifier::new("A"), Identifier::new("B"));
    }

    #[test]
    fn local_name_strips_namespace_prefixes() {
        let iri = Identifier::new("http://example.org/pizza#Margherita");
        assert_eq!(iri.local_name(), "Margherita");
        let slash = Identifier::new("http://example.org/pizza/Margherita");
        assert_eq!(slash.local_name(), "Margherita");
    }

    #[test]
    fn local_name_strips_quotes() {
        let quoted = Identifier::new("\"Margherita\"");
        assert_eq!(quoted.local_name(), "Margherita");
    }

    #[test]
    fn local_name_of_plain_name_is_the_name() {
        assert_eq!(Identifier::new("Pizza").local_name(), "Pizza");
    }

    #[test]
    fn local_name_of_bare_namespace_falls_back_to_full() {
        let ns = Identifier::new("http://example.org/");
        assert_eq!(ns.local_name(), "http://example.org/");
    }
}
