//! Expansion of exclude patterns against the entries of one directory.

use std::collections::BTreeSet;

use glob::{MatchOptions, Pattern};

/// Glob options for matching within a single directory level.
///
/// Leading dots must be matched literally, as a shell would, so `*.env`
/// does not silently protect hidden files.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Result of expanding an exclude specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Concrete names to exclude
    pub names: BTreeSet<String>,
    /// Wildcard patterns that failed to compile, with the parser message.
    /// They are kept in `names` as literals and therefore exclude nothing
    /// unless an entry carries exactly that name.
    pub invalid: Vec<(String, String)>,
}

/// Whether `pattern` contains a shell wildcard glyph.
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand wildcard `patterns` against `actual` entry names.
///
/// Each wildcard pattern is replaced by the actual names it matches (possibly
/// none). Literal patterns pass through unchanged whether or not an entry of
/// that name exists.
pub fn expand<'a, P, A>(patterns: P, actual: A) -> Expansion
where
    P: IntoIterator<Item = &'a String>,
    A: IntoIterator<Item = &'a String> + Clone,
{
    let mut expansion = Expansion::default();

    for pattern in patterns {
        if !is_wildcard(pattern) {
            expansion.names.insert(pattern.clone());
            continue;
        }

        match Pattern::new(pattern) {
            Ok(glob) => {
                expansion.names.extend(
                    actual
                        .clone()
                        .into_iter()
                        .filter(|name| glob.matches_with(name, MATCH_OPTIONS))
                        .cloned(),
                );
            }
            Err(err) => {
                expansion
                    .invalid
                    .push((pattern.clone(), err.msg.to_string()));
                expansion.names.insert(pattern.clone());
            }
        }
    }

    expansion
}
