//! Name → layout lookup with a default fallback.
//!
//! Layouts are built on first use and live for the rest of the process, so
//! lookups hand out `&'static Layout` and callers can never mutate them.

use std::sync::OnceLock;

use tracing::debug;

use crate::domain::builtin;
use crate::domain::layout::Layout;

/// Name of the layout returned for unknown or empty names.
pub const DEFAULT_LAYOUT_NAME: &str = "ES";

static LAYOUTS: OnceLock<Vec<Layout>> = OnceLock::new();

fn layouts() -> &'static [Layout] {
    LAYOUTS.get_or_init(|| vec![builtin::spanish(), builtin::us()])
}

/// Resolves layout names to the built-in layouts.
pub struct LayoutRegistry;

impl LayoutRegistry {
    /// Returns the layout registered under `name`.
    ///
    /// Comparison ignores case and surrounding whitespace.  Unknown names,
    /// including the empty string, resolve to the default layout.
    pub fn get_layout(name: &str) -> &'static Layout {
        match Self::find(name) {
            Some(layout) => layout,
            None => {
                debug!(requested = name, "unknown layout name, using {DEFAULT_LAYOUT_NAME}");
                Self::default_layout()
            }
        }
    }

    /// Returns the designated default layout.
    pub fn default_layout() -> &'static Layout {
        // The default name is always registered.
        Self::find(DEFAULT_LAYOUT_NAME).unwrap_or(&layouts()[0])
    }

    /// Returns `true` if `name` resolves without falling back to the default.
    pub fn contains(name: &str) -> bool {
        Self::find(name).is_some()
    }

    /// Registered layout names, in registration order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        layouts().iter().map(Layout::name)
    }

    /// Every registered layout.
    pub fn all() -> &'static [Layout] {
        layouts()
    }

    fn find(name: &str) -> Option<&'static Layout> {
        let name = name.trim();
        layouts()
            .iter()
            .find(|layout| layout.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_layout_is_case_insensitive() {
        assert_eq!(LayoutRegistry::get_layout("us").name(), "US");
        assert_eq!(LayoutRegistry::get_layout("Es").name(), "ES");
    }

    #[test]
    fn test_get_layout_trims_whitespace() {
        assert_eq!(LayoutRegistry::get_layout("  US\n").name(), "US");
    }

    #[test]
    fn test_unknown_name_resolves_to_default() {
        let fallback = LayoutRegistry::get_layout("XX");
        assert_eq!(fallback.name(), DEFAULT_LAYOUT_NAME);
        assert!(std::ptr::eq(fallback, LayoutRegistry::default_layout()));
    }

    #[test]
    fn test_empty_name_resolves_to_same_layout_as_unknown_name() {
        let empty = LayoutRegistry::get_layout("");
        let unknown = LayoutRegistry::get_layout("XX");
        assert!(std::ptr::eq(empty, unknown));
    }

    #[test]
    fn test_repeated_lookups_return_the_same_instance() {
        assert!(std::ptr::eq(
            LayoutRegistry::get_layout("US"),
            LayoutRegistry::get_layout("us")
        ));
    }

    #[test]
    fn test_contains_distinguishes_registered_names() {
        assert!(LayoutRegistry::contains("us"));
        assert!(!LayoutRegistry::contains("XX"));
        assert!(!LayoutRegistry::contains(""));
    }

    #[test]
    fn test_names_lists_both_built_in_layouts() {
        let names: Vec<&str> = LayoutRegistry::names().collect();
        assert_eq!(names, vec!["ES", "US"]);
    }
}
