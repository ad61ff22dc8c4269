//! Name hints attached to graph nodes.
//!
//! A [`NameHints`] bundle collects naming suggestions for a type. Explicit
//! names (given by the caller) always win over names inferred from sample
//! data: combining an explicit bundle with inferred ones keeps only the
//! explicit names.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A combinable bundle of naming suggestions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameHints {
    names: BTreeSet<String>,
    inferred: bool,
}

impl Default for NameHints {
    fn default() -> Self {
        Self::empty()
    }
}

impl NameHints {
    /// No suggestions at all.
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
            inferred: true,
        }
    }

    /// A single name inferred from the data (e.g. the property it was found under).
    pub fn inferred(name: impl Into<String>) -> Self {
        Self {
            names: BTreeSet::from([name.into()]),
            inferred: true,
        }
    }

    /// A single name given explicitly by the caller.
    pub fn explicit(name: impl Into<String>) -> Self {
        Self {
            names: BTreeSet::from([name.into()]),
            inferred: false,
        }
    }

    /// Returns `true` if every name in the bundle was inferred.
    pub fn is_inferred(&self) -> bool {
        self.inferred
    }

    /// Returns `true` if the bundle carries no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The suggested names, in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The first suggestion in lexicographic order.
    pub fn first(&self) -> Option<&str> {
        self.names.iter().next().map(String::as_str)
    }

    /// Merge two bundles.
    pub fn union(&self, other: &NameHints) -> NameHints {
        Self::union_all([self, other])
    }

    /// Merge any number of bundles into one.
    ///
    /// If at least one bundle is explicit, only explicit names survive.
    pub fn union_all<'a>(bundles: impl IntoIterator<Item = &'a NameHints>) -> NameHints {
        let bundles: Vec<&NameHints> = bundles.into_iter().collect();
        let any_explicit = bundles.iter().any(|b| !b.inferred && !b.names.is_empty());

        let names = bundles
            .iter()
            .filter(|b| !any_explicit || !b.inferred)
            .flat_map(|b| b.names.iter().cloned())
            .collect();

        NameHints {
            names,
            inferred: !any_explicit,
        }
    }
}

impl fmt::Display for NameHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.names().collect();
        if self.inferred {
            write!(f, "~{{{}}}", joined.join(","))
        } else {
            write!(f, "{{{}}}", joined.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_inferred_keeps_all() {
        let merged = NameHints::inferred("user").union(&NameHints::inferred("author"));
        assert!(merged.is_inferred());
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["author", "user"]);
    }

    #[test]
    fn explicit_names_win() {
        let merged = NameHints::union_all([
            &NameHints::inferred("owner"),
            &NameHints::explicit("Person"),
            &NameHints::inferred("author"),
        ]);
        assert!(!merged.is_inferred());
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["Person"]);
    }

    #[test]
    fn empty_bundles_are_neutral() {
        let merged = NameHints::empty().union(&NameHints::inferred("item"));
        assert_eq!(merged.first(), Some("item"));
        assert!(NameHints::union_all(std::iter::empty::<&NameHints>()).is_empty());
    }

    #[test]
    fn display_marks_inferred() {
        assert_eq!(NameHints::inferred("a").to_string(), "~{a}");
        assert_eq!(NameHints::explicit("A").to_string(), "{A}");
    }
}
