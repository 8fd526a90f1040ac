//! Resolution of user-supplied round prefixes to canonical round categories.

use indexmap::IndexMap;

use crate::dao::chat::CategoryInfo;
use crate::services::naming::{has_name_prefix, normalize_round_key};

/// Categories with this name prefix are never offered as rounds.
const ARCHIVE_PREFIX: &str = "archive";

/// Outcome of resolving a user-supplied round prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundMatch {
    /// Exactly one round matched; the canonical round name.
    Resolved(String),
    /// Two or more rounds matched; candidates for the user to disambiguate.
    Ambiguous(Vec<String>),
    /// No round matched the prefix.
    NotFound,
}

/// Derived index from normalized round key to canonical round name.
///
/// Built from a fresh category scan on every use, so a chat-side rename can
/// never leave the index stale. Identical keys during a scan shadow each
/// other (last category wins); new collisions are rejected at round creation
/// instead.
#[derive(Debug, Default)]
pub struct RoundResolver {
    index: IndexMap<String, String>,
}

impl RoundResolver {
    /// Index every category that can act as a round, excluding the
    /// Solved-prefixed chain, archive categories, and the given
    /// infrastructure category names.
    pub fn from_categories(
        categories: &[CategoryInfo],
        solved_prefix: &str,
        excluded_names: &[&str],
    ) -> Self {
        let mut index = IndexMap::new();
        for category in categories {
            if has_name_prefix(&category.name, solved_prefix)
                || has_name_prefix(&category.name, ARCHIVE_PREFIX)
                || excluded_names.iter().any(|name| category.name == *name)
            {
                continue;
            }
            let key = normalize_round_key(&category.name);
            if key.is_empty() {
                continue;
            }
            index.insert(key, category.name.clone());
        }
        Self { index }
    }

    /// Resolve a prefix against the index.
    ///
    /// One hit resolves; several hits are surfaced as ambiguous with the
    /// candidate list; zero hits is NotFound. Ambiguity is always reported,
    /// never broken by a closest-match heuristic.
    pub fn resolve(&self, prefix: &str) -> RoundMatch {
        let needle = normalize_round_key(prefix);
        if needle.is_empty() {
            return RoundMatch::NotFound;
        }

        let mut hits: Vec<String> = self
            .index
            .iter()
            .filter(|(key, _)| key.starts_with(&needle))
            .map(|(_, canonical)| canonical.clone())
            .collect();

        match hits.len() {
            0 => RoundMatch::NotFound,
            1 => RoundMatch::Resolved(hits.remove(0)),
            _ => RoundMatch::Ambiguous(hits),
        }
    }

    /// Whether a round whose key equals this name's key is already indexed.
    pub fn contains_key_of(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_round_key(name))
    }

    /// Number of indexed rounds.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no round is indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(names: &[&str]) -> Vec<CategoryInfo> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| CategoryInfo {
                id: index as u64 + 1,
                name: (*name).to_string(),
            })
            .collect()
    }

    fn resolver(names: &[&str]) -> RoundResolver {
        RoundResolver::from_categories(&categories(names), "Solved", &["Puzzles"])
    }

    #[test]
    fn single_prefix_hit_resolves() {
        let resolver = resolver(&["Ocean", "Outer Space"]);
        assert_eq!(resolver.resolve("Oc"), RoundMatch::Resolved("Ocean".into()));
    }

    #[test]
    fn shared_prefix_is_ambiguous_with_candidates() {
        let resolver = resolver(&["Ocean", "Outer Space"]);
        assert_eq!(
            resolver.resolve("O"),
            RoundMatch::Ambiguous(vec!["Ocean".into(), "Outer Space".into()])
        );
    }

    #[test]
    fn unknown_prefix_is_not_found() {
        let resolver = resolver(&["Ocean", "Outer Space"]);
        assert_eq!(resolver.resolve("Zzz"), RoundMatch::NotFound);
    }

    #[test]
    fn matching_ignores_case_and_punctuation() {
        let resolver = resolver(&["Movies!"]);
        assert_eq!(
            resolver.resolve("movies"),
            RoundMatch::Resolved("Movies!".into())
        );
    }

    #[test]
    fn solved_archive_and_infrastructure_categories_are_not_rounds() {
        let resolver = RoundResolver::from_categories(
            &categories(&["Solved", "Solved 2", "archive 2023", "Puzzles", "Ocean"]),
            "Solved",
            &["Puzzles"],
        );
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve("o"), RoundMatch::Resolved("Ocean".into()));
    }

    #[test]
    fn blank_prefix_never_matches() {
        let resolver = resolver(&["Ocean"]);
        assert_eq!(resolver.resolve("  !!  "), RoundMatch::NotFound);
    }

    #[test]
    fn key_collisions_are_detectable_before_creation() {
        let resolver = resolver(&["Movies!"]);
        assert!(resolver.contains_key_of("movies"));
        assert!(!resolver.contains_key_of("Music"));
    }
}
