//! Search query grammar.
//!
//! ```text
//! query  := ["!"] [prefix ":"] pattern
//! prefix := t | table | v | view | f | func | function | s | schema
//!         | seq | sequence | ext | extension | col | column | idx | index
//! ```
//!
//! Every input parses. An unknown prefix is kept as ordinary pattern text.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Object classes a query can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    Table,
    View,
    Function,
    Schema,
    Sequence,
    Extension,
    Column,
    Index,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 8] = [
        TypeFilter::Table,
        TypeFilter::View,
        TypeFilter::Function,
        TypeFilter::Schema,
        TypeFilter::Sequence,
        TypeFilter::Extension,
        TypeFilter::Column,
        TypeFilter::Index,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeFilter::Table => "table",
            TypeFilter::View => "view",
            TypeFilter::Function => "function",
            TypeFilter::Schema => "schema",
            TypeFilter::Sequence => "sequence",
            TypeFilter::Extension => "extension",
            TypeFilter::Column => "column",
            TypeFilter::Index => "index",
        }
    }

    /// Look up a short or long prefix, case-insensitively
    pub fn from_prefix(prefix: &str) -> Option<TypeFilter> {
        PREFIXES.get(prefix.to_lowercase().as_str()).copied()
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref PREFIXES: HashMap<&'static str, TypeFilter> = {
        let mut m = HashMap::new();
        m.insert("t", TypeFilter::Table);
        m.insert("table", TypeFilter::Table);
        m.insert("v", TypeFilter::View);
        m.insert("view", TypeFilter::View);
        m.insert("f", TypeFilter::Function);
        m.insert("func", TypeFilter::Function);
        m.insert("function", TypeFilter::Function);
        m.insert("s", TypeFilter::Schema);
        m.insert("schema", TypeFilter::Schema);
        m.insert("seq", TypeFilter::Sequence);
        m.insert("sequence", TypeFilter::Sequence);
        m.insert("ext", TypeFilter::Extension);
        m.insert("extension", TypeFilter::Extension);
        m.insert("col", TypeFilter::Column);
        m.insert("column", TypeFilter::Column);
        m.insert("idx", TypeFilter::Index);
        m.insert("index", TypeFilter::Index);
        m
    };
}

/// Structured form of the text typed into the search prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Empty means "match all"
    pub pattern: String,
    pub negate: bool,
    pub type_filter: Option<TypeFilter>,
}

impl SearchQuery {
    pub fn parse(input: &str) -> Self {
        let (negate, rest) = match input.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (type_filter, pattern) = match rest.split_once(':') {
            Some((prefix, remainder)) => match TypeFilter::from_prefix(prefix) {
                Some(filter) => (Some(filter), remainder),
                None => (None, rest),
            },
            None => (None, rest),
        };

        SearchQuery {
            pattern: pattern.to_string(),
            negate,
            type_filter,
        }
    }

    /// True when the query neither filters by type nor by text
    pub fn is_match_all(&self) -> bool {
        self.pattern.is_empty() && self.type_filter.is_none() && !self.negate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(pattern: &str, negate: bool, type_filter: Option<TypeFilter>) -> SearchQuery {
        SearchQuery {
            pattern: pattern.to_string(),
            negate,
            type_filter,
        }
    }

    #[test]
    fn test_plain_pattern() {
        assert_eq!(SearchQuery::parse("plan"), q("plan", false, None));
        assert_eq!(SearchQuery::parse(""), q("", false, None));
    }

    #[test]
    fn test_type_prefix() {
        assert_eq!(
            SearchQuery::parse("t:plan"),
            q("plan", false, Some(TypeFilter::Table))
        );
        assert_eq!(
            SearchQuery::parse("function:get"),
            q("get", false, Some(TypeFilter::Function))
        );
    }

    #[test]
    fn test_negated_prefix() {
        assert_eq!(
            SearchQuery::parse("!f:get"),
            q("get", true, Some(TypeFilter::Function))
        );
        assert_eq!(SearchQuery::parse("!t:"), q("", true, Some(TypeFilter::Table)));
        assert_eq!(SearchQuery::parse("!plan"), q("plan", true, None));
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert_eq!(
            SearchQuery::parse("TABLE:Users"),
            q("Users", false, Some(TypeFilter::Table))
        );
        assert_eq!(
            SearchQuery::parse("Col:id"),
            q("id", false, Some(TypeFilter::Column))
        );
    }

    #[test]
    fn test_unknown_prefix_stays_in_pattern() {
        assert_eq!(SearchQuery::parse("foo:bar"), q("foo:bar", false, None));
        assert_eq!(SearchQuery::parse("!x:y"), q("x:y", true, None));
    }

    #[test]
    fn test_only_first_colon_splits() {
        assert_eq!(
            SearchQuery::parse("idx:a:b"),
            q("a:b", false, Some(TypeFilter::Index))
        );
    }

    #[test]
    fn test_bang_only_after_prefix_is_pattern() {
        assert_eq!(
            SearchQuery::parse("t:!plan"),
            q("!plan", false, Some(TypeFilter::Table))
        );
    }

    #[test]
    fn test_every_filter_has_a_long_prefix() {
        for filter in TypeFilter::ALL {
            assert_eq!(TypeFilter::from_prefix(filter.as_str()), Some(filter));
        }
    }

    #[test]
    fn test_is_match_all() {
        assert!(SearchQuery::parse("").is_match_all());
        assert!(!SearchQuery::parse("!").is_match_all());
        assert!(!SearchQuery::parse("s:").is_match_all());
    }
}
