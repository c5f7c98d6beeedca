//! Parser configuration (`SPEC_FULL.md` §11): a builder-style struct
//! collecting every tunable `spec.md` names or implies, built with the
//! teacher's own `gen_setters!` macro (`src/macros.rs`).

/// Tunables for a `PullParser` / `EventReader`. Constructed with
/// `ParserConfig::new()` and configured fluently:
///
/// ```ignore
/// let config = ParserConfig::new().partial(true).max_entity_expansion_depth(8);
/// ```
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Enables the templating suspension protocol (`spec.md` §4.4, §6):
    /// end-of-input at certain points yields an `ExpectX` placeholder
    /// event instead of `Syntax("1")`, and a trailing `feed()` resumes.
    /// Default `false`.
    pub(crate) partial: bool,
    /// Under XML 1.0, `xmlns=""` / `xmlns:p=""` undeclaring a namespace
    /// is normally `NSCNoPrefixUndeclaring` (`spec.md` §4.6). Setting this
    /// allows the XML 1.1 behaviour even in a `version="1.0"` document.
    /// Default `false`.
    pub(crate) xml11_permissive_undeclare: bool,
    /// Recursion depth at which entity expansion fails `Syntax("9")`
    /// rather than looping forever on a pathological (non-infinite but
    /// deep) chain of declared entities. Default `32`.
    pub(crate) max_entity_expansion_depth: u32,
    /// Total expanded-text length at which entity expansion fails
    /// `Syntax("9")`, guarding against "billion laughs"-style expansion.
    /// Default `8 * 1024 * 1024` (8 MiB).
    pub(crate) max_entity_expansion_length: usize,
    /// Whether `<![INCLUDE[`/`<![IGNORE[` conditional sections are
    /// recognised inside the internal DTD subset (`spec.md` §4.5, §9). If
    /// `false`, any `<![` inside the subset is a syntax error instead.
    /// Default `true`.
    pub(crate) recognize_conditional_sections: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            partial: false,
            xml11_permissive_undeclare: false,
            max_entity_expansion_depth: 32,
            max_entity_expansion_length: 8 * 1024 * 1024,
            recognize_conditional_sections: true,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

gen_setters! { ParserConfig,
    /// See [`ParserConfig::partial`](ParserConfig) field docs.
    partial: val bool,
    /// See [`ParserConfig::xml11_permissive_undeclare`](ParserConfig) field docs.
    xml11_permissive_undeclare: val bool,
    /// See [`ParserConfig::max_entity_expansion_depth`](ParserConfig) field docs.
    max_entity_expansion_depth: val u32,
    /// See [`ParserConfig::max_entity_expansion_length`](ParserConfig) field docs.
    max_entity_expansion_length: val usize,
    /// See [`ParserConfig::recognize_conditional_sections`](ParserConfig) field docs.
    recognize_conditional_sections: val bool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let cfg = ParserConfig::new().partial(true).max_entity_expansion_depth(4);
        assert!(cfg.partial);
        assert_eq!(cfg.max_entity_expansion_depth, 4);
        assert!(!cfg.xml11_permissive_undeclare);
    }
}
