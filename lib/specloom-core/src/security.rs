//! Security requirements carried onto operations.
//!
//! Requirements are opaque: scheme names are not checked against any
//! `securitySchemes` section, they are copied as declared.
//!
//! ```yaml
//! security:
//!   - bearerAuth: []
//!   - oauth2:
//!       - read:menus
//! ```

/// A security requirement for an operation.
///
/// # Example
///
/// ```rust
/// use specloom_core::SecurityRequirement;
///
/// let bearer_req = SecurityRequirement::new("bearerAuth");
/// let oauth_req = SecurityRequirement::with_scopes("oauth2", ["read:menus"]);
///
/// assert!(bearer_req.scopes.is_empty());
/// assert_eq!(oauth_req.scopes, vec!["read:menus"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    /// Name of the security scheme.
    pub name: String,
    /// Required scopes (empty for non-OAuth schemes)
    pub scopes: Vec<String>,
}

impl SecurityRequirement {
    /// Creates a new security requirement without scopes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scopes: Vec::new(),
        }
    }

    /// Creates a new security requirement with scopes.
    pub fn with_scopes(
        name: impl Into<String>,
        scopes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Converts to utoipa SecurityRequirement.
    pub(crate) fn to_utoipa(&self) -> utoipa::openapi::security::SecurityRequirement {
        utoipa::openapi::security::SecurityRequirement::new(
            &self.name,
            self.scopes.iter().map(String::as_str),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_serialize_requirement_with_scopes() {
        let requirement = SecurityRequirement::with_scopes("oauth2", ["read:menus", "write:menus"]);

        let value = serde_json::to_value(requirement.to_utoipa()).expect("should serialize");

        assert_eq!(value, json!({"oauth2": ["read:menus", "write:menus"]}));
    }

    #[test]
    fn should_serialize_requirement_without_scopes() {
        let value = serde_json::to_value(SecurityRequirement::new("bearerAuth").to_utoipa())
            .expect("should serialize");

        assert_eq!(value, json!({"bearerAuth": []}));
    }
}
