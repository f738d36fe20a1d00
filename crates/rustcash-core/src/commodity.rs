//! Commodities (currencies and other tradable units).

use serde::Serialize;
use std::fmt;

/// Namespace and id of the sentinel commodity GnuCash uses for template transactions.
pub const TEMPLATE_KEY: &str = "template";

/// A `<gnc:commodity>` record.
///
/// Identity is the `(space, id)` pair compared by value, e.g.
/// `("ISO4217", "EUR")`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Commodity {
    /// Namespace, e.g. `ISO4217`.
    pub space: String,
    /// Code within the namespace, e.g. `EUR`.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Exchange code.
    pub xcode: String,
    /// Smallest fraction as written in the file, e.g. `"100"`.
    pub fraction: String,
    /// Whether online quotes are enabled.
    pub get_quotes: bool,
    /// Quote source name.
    pub quote_source: String,
    /// Quote time zone.
    pub quote_tz: String,
}

impl Commodity {
    /// Create a commodity with only its key set.
    #[must_use]
    pub fn new(space: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the full name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the fraction.
    #[must_use]
    pub fn with_fraction(mut self, fraction: impl Into<String>) -> Self {
        self.fraction = fraction.into();
        self
    }

    /// Whether this commodity has the given key.
    #[must_use]
    pub fn matches(&self, space: &str, id: &str) -> bool {
        self.space == space && self.id == id
    }

    /// Whether this is the `template:template` sentinel.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.matches(TEMPLATE_KEY, TEMPLATE_KEY)
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.space, self.id)
    }
}
