//! Presentation rules ("specs") and matching them against node names.

use std::ops::RangeInclusive;
use std::sync::Arc;

use compact_str::CompactString;
use globset::{Glob, GlobMatcher};

/// Name of the per-directory spec file.
pub const SPEC_FILE_NAME: &str = ".plume.toml";

/// Valid importance values.
pub const IMPORTANCE_RANGE: RangeInclusive<i8> = -2..=2;

/// Importance that hides a node unless everything is shown.
pub const HIDDEN_IMPORTANCE: i8 = -2;

/// How a spec selects node names.
#[derive(Debug, Clone)]
pub enum SpecPattern {
    /// Exact entry name.
    Name(CompactString),
    /// Extension after the last dot, without the dot.
    Extension(CompactString),
    /// Glob matched against the whole name.
    Glob(GlobMatcher),
}

impl SpecPattern {
    /// Compile a glob pattern.
    pub fn glob(pattern: &str) -> Result<Self, globset::Error> {
        Ok(SpecPattern::Glob(Glob::new(pattern)?.compile_matcher()))
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            SpecPattern::Name(expected) => name == expected.as_str(),
            SpecPattern::Extension(ext) => name
                .rsplit_once('.')
                .is_some_and(|(_, actual)| actual == ext.as_str()),
            SpecPattern::Glob(matcher) => matcher.is_match(name),
        }
    }
}

/// A presentation rule: a name matcher plus optional attributes.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub pattern: SpecPattern,
    pub color: Option<CompactString>,
    pub importance: Option<i8>,
    pub icon: Option<CompactString>,
}

impl NodeSpec {
    pub fn new(pattern: SpecPattern) -> Self {
        Self {
            pattern,
            color: None,
            importance: None,
            icon: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<CompactString>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_importance(mut self, importance: i8) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<CompactString>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Check if this spec selects the given node name.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Attributes a spec can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecAttr {
    Color,
    Importance,
    Icon,
}

/// Value of a spec attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecValue<'a> {
    Color(&'a str),
    Importance(i8),
    Icon(&'a str),
}

/// Specs that matched one node, in global spec order.
///
/// Each attribute is taken from the first spec that defines it, independently
/// of the other attributes. An empty string or an importance of 0 leaves the
/// attribute undefined.
#[derive(Debug, Clone, Default)]
pub struct MatchedSpecs(Vec<Arc<NodeSpec>>);

impl MatchedSpecs {
    /// Keep every spec matching `name`, preserving input order.
    pub fn match_all(name: &str, specs: &[Arc<NodeSpec>]) -> Self {
        Self(
            specs
                .iter()
                .filter(|spec| spec.matches(name))
                .cloned()
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeSpec> {
        self.0.iter().map(|spec| spec.as_ref())
    }

    pub fn color(&self) -> Option<&str> {
        self.iter()
            .find_map(|spec| spec.color.as_deref().filter(|color| !color.is_empty()))
    }

    pub fn importance(&self) -> Option<i8> {
        self.iter()
            .find_map(|spec| spec.importance.filter(|importance| *importance != 0))
    }

    pub fn icon(&self) -> Option<&str> {
        self.iter()
            .find_map(|spec| spec.icon.as_deref().filter(|icon| !icon.is_empty()))
    }

    /// Look up an attribute by kind.
    pub fn attr(&self, attr: SpecAttr) -> Option<SpecValue<'_>> {
        match attr {
            SpecAttr::Color => self.color().map(SpecValue::Color),
            SpecAttr::Importance => self.importance().map(SpecValue::Importance),
            SpecAttr::Icon => self.icon().map(SpecValue::Icon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(pattern: SpecPattern) -> NodeSpec {
        NodeSpec::new(pattern)
    }

    #[test]
    fn test_pattern_kinds() {
        assert!(SpecPattern::Name("Cargo.toml".into()).is_match("Cargo.toml"));
        assert!(!SpecPattern::Name("Cargo.toml".into()).is_match("cargo.toml"));

        let ext = SpecPattern::Extension("yml".into());
        assert!(ext.is_match("config.yml"));
        assert!(ext.is_match(".pls.yml"));
        assert!(!ext.is_match("yml"));

        let glob = SpecPattern::glob("*.{png,jpg}").unwrap();
        assert!(glob.is_match("cat.png"));
        assert!(!glob.is_match("cat.gif"));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(SpecPattern::glob("[unclosed").is_err());
    }

    #[test]
    fn test_match_all_keeps_order() {
        let specs = vec![
            Arc::new(spec(SpecPattern::Extension("rs".into())).with_icon("rust")),
            Arc::new(spec(SpecPattern::Name("README.md".into())).with_icon("book")),
            Arc::new(spec(SpecPattern::glob("*").unwrap()).with_color("blue")),
        ];

        let matched = MatchedSpecs::match_all("main.rs", &specs);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched.icon(), Some("rust"));
        assert_eq!(matched.color(), Some("blue"));

        let matched = MatchedSpecs::match_all("Makefile", &specs);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.icon(), None);
    }

    #[test]
    fn test_attributes_resolve_independently() {
        let specs = vec![
            Arc::new(spec(SpecPattern::glob("*").unwrap()).with_icon("a")),
            Arc::new(
                spec(SpecPattern::glob("*").unwrap())
                    .with_color("red")
                    .with_icon("b"),
            ),
        ];

        let matched = MatchedSpecs::match_all("file", &specs);
        assert_eq!(matched.attr(SpecAttr::Icon), Some(SpecValue::Icon("a")));
        assert_eq!(matched.attr(SpecAttr::Color), Some(SpecValue::Color("red")));
        assert_eq!(matched.attr(SpecAttr::Importance), None);
    }

    #[test]
    fn test_zero_importance_defers_to_later_specs() {
        let specs = vec![
            Arc::new(spec(SpecPattern::Extension("log".into())).with_importance(0)),
            Arc::new(spec(SpecPattern::Extension("log".into())).with_importance(-2)),
        ];

        let matched = MatchedSpecs::match_all("debug.log", &specs);
        assert_eq!(matched.importance(), Some(-2));

        let matched = MatchedSpecs::match_all("debug.log", &specs[..1]);
        assert_eq!(matched.importance(), None);
        assert!(!matched.is_empty());
    }

    #[test]
    fn test_empty_strings_defer_to_later_specs() {
        let specs = vec![
            Arc::new(spec(SpecPattern::glob("*").unwrap()).with_color("").with_icon("")),
            Arc::new(spec(SpecPattern::glob("*").unwrap()).with_color("red").with_icon("rust")),
        ];

        let matched = MatchedSpecs::match_all("main.rs", &specs);
        assert_eq!(matched.color(), Some("red"));
        assert_eq!(matched.icon(), Some("rust"));
    }
}
