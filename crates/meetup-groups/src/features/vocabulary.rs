//! Deterministic trait-name vocabulary.

use crate::types::UserRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Bijection trait name <-> column index, indices assigned in sorted name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitVocabulary {
    index: BTreeMap<String, usize>,
    names: Vec<String>,
}

impl TraitVocabulary {
    /// Build the vocabulary from the union of every record's trait names.
    pub fn build(users: &[UserRecord]) -> Self {
        let all: BTreeSet<&str> = users
            .iter()
            .flat_map(|u| u.traits.keys().map(String::as_str))
            .collect();
        Self::from_names(all)
    }

    /// Build from an arbitrary set of names; duplicates collapse.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        let names: Vec<String> = sorted.into_iter().collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { index, names }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_sorted_names() {
        let users = vec![
            UserRecord::new(1).with_trait("yoga", 0.5).with_trait("chess", 0.2),
            UserRecord::new(2).with_trait("board games", 0.9).with_trait("chess", 0.7),
        ];
        let vocab = TraitVocabulary::build(&users);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.names(), &["board games", "chess", "yoga"]);
        assert_eq!(vocab.index_of("board games"), Some(0));
        assert_eq!(vocab.index_of("yoga"), Some(2));
        assert_eq!(vocab.name_of(1), Some("chess"));
        assert_eq!(vocab.index_of("jazz"), None);
    }

    #[test]
    fn test_reproducible_regardless_of_record_order() {
        let a = UserRecord::new(1).with_trait("b", 1.0);
        let b = UserRecord::new(2).with_trait("a", 1.0);
        let v1 = TraitVocabulary::build(&[a.clone(), b.clone()]);
        let v2 = TraitVocabulary::build(&[b, a]);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_empty_input() {
        let vocab = TraitVocabulary::build(&[]);
        assert!(vocab.is_empty());
        assert_eq!(vocab.name_of(0), None);
    }
}
