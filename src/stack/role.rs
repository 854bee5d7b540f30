//! Architectural roles an entry can declare.

use std::fmt;

/// Closed set of roles recognised in build contexts.
///
/// Roles select the target file extension through [`super::Extensions`].
/// Anything unrecognised maps to [`Role::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// UI component.
    Presentation,
    /// Stateful logic with no UI.
    BusinessLogic,
    /// Domain entities and factories.
    Domain,
    /// Data model definitions.
    Model,
    /// Server-side code.
    Backend,
    /// No role declared, or an unknown one.
    Default,
}

impl Role {
    /// Every role that can be named explicitly, in canonical order.
    pub const NAMED: [Role; 5] =
        [Role::Presentation, Role::BusinessLogic, Role::Domain, Role::Model, Role::Backend];

    /// Parse a declared role value. Case and inner whitespace runs are ignored.
    #[must_use]
    pub fn parse(value: &str) -> Role {
        let normalized: String =
            value.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
        match normalized.as_str() {
            "presentation" => Role::Presentation,
            "business logic" => Role::BusinessLogic,
            "domain" => Role::Domain,
            "model" => Role::Model,
            "backend" => Role::Backend,
            _ => Role::Default,
        }
    }

    /// Canonical name, as written in stack extension tables.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Presentation => "Presentation",
            Role::BusinessLogic => "Business Logic",
            Role::Domain => "Domain",
            Role::Model => "Model",
            Role::Backend => "Backend",
            Role::Default => "default",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_loosely() {
        assert_eq!(Role::parse("Presentation"), Role::Presentation);
        assert_eq!(Role::parse("  business   LOGIC "), Role::BusinessLogic);
        assert_eq!(Role::parse("domain"), Role::Domain);
        assert_eq!(Role::parse("Backend"), Role::Backend);
    }

    #[test]
    fn unknown_roles_fall_back_to_default() {
        assert_eq!(Role::parse("Widget"), Role::Default);
        assert_eq!(Role::parse(""), Role::Default);
        assert_eq!(Role::parse("default"), Role::Default);
    }

    #[test]
    fn canonical_names_round_trip() {
        for role in Role::NAMED {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }
}
