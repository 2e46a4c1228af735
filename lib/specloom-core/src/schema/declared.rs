use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

static NEXT_TYPE_KEY: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`DeclaredType`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u64);

/// A type taking part in a compilation unit.
///
/// A declared type has a human identifier, used as the default component name,
/// and an identity that survives cloning. Two types created with the same
/// identifier are still different types.
///
/// ```rust
/// use specloom_core::DeclaredType;
///
/// let menu = DeclaredType::new("Menu");
/// let same = menu.clone();
/// let other = DeclaredType::new("Menu");
///
/// assert_eq!(menu, same);
/// assert_ne!(menu, other);
/// assert_eq!(menu.ident(), "Menu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    key: TypeKey,
    ident: String,
}

impl DeclaredType {
    /// Creates a fresh type with the given identifier.
    pub fn new(ident: impl Into<String>) -> Self {
        let key = TypeKey(NEXT_TYPE_KEY.fetch_add(1, Ordering::Relaxed));
        Self {
            key,
            ident: ident.into(),
        }
    }

    /// Returns the identifier given at creation.
    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Returns the identity key of this type.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.ident)
    }
}

/// What a reference points at, before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RefTarget {
    /// A component name, used verbatim.
    Name(String),
    /// A declared type, resolved to its registered name.
    Type(DeclaredType),
    /// Anything else a declaration file may carry. Never resolvable.
    Other(Value),
}

impl From<&str> for RefTarget {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for RefTarget {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&DeclaredType> for RefTarget {
    fn from(value: &DeclaredType) -> Self {
        Self::Type(value.clone())
    }
}

impl From<DeclaredType> for RefTarget {
    fn from(value: DeclaredType) -> Self {
        Self::Type(value)
    }
}

impl From<Value> for RefTarget {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => Self::Name(name),
            other => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_keep_identity_on_clone() {
        let product = DeclaredType::new("Product");
        let cloned = product.clone();

        assert_eq!(product.key(), cloned.key());
        assert_ne!(product.key(), DeclaredType::new("Product").key());
    }

    #[test]
    fn should_convert_json_values_to_targets() {
        assert_eq!(
            RefTarget::from(json!("Menu")),
            RefTarget::Name("Menu".to_string())
        );
        assert_eq!(RefTarget::from(json!(42)), RefTarget::Other(json!(42)));
    }
}
