//! The corpus capability: one train/test partition per language.

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Role of a text within a language's corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Train,
    Test,
}

impl Role {
    /// Table name for the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

/// A language's corpus split into training and held-out text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub train: String,
    pub test: String,
}

impl Partition {
    /// Split the first `min_words` words into held-out and training text.
    ///
    /// Words past `min_words` are discarded so every language contributes the
    /// same volume. The trailing `train_fraction` share becomes training text
    /// and the leading remainder becomes test text, each re-joined with single
    /// spaces. The split point depends only on the word count and fraction.
    pub fn split<'a, I>(words: I, min_words: usize, train_fraction: f64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let words: Vec<&str> = words.into_iter().take(min_words).collect();
        let n = words.len();
        let train_len = ((n as f64) * train_fraction).round() as usize;
        let split_at = n - train_len.min(n);
        Self {
            test: words[..split_at].join(" "),
            train: words[split_at..].join(" "),
        }
    }

    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Train => &self.train,
            Role::Test => &self.test,
        }
    }

    pub fn train_words(&self) -> usize {
        self.train.split_whitespace().count()
    }

    pub fn test_words(&self) -> usize {
        self.test.split_whitespace().count()
    }
}

/// Storage for per-language train/test partitions.
///
/// Writes replace: after `write_partition` returns, exactly one partition is
/// stored for the language. Writers for different languages never conflict;
/// concurrent writers for the same language race and the last one wins.
pub trait CorpusStore {
    /// Replace the stored partition for `language`.
    fn write_partition(
        &self,
        language: &str,
        training_text: &str,
        test_text: &str,
    ) -> Result<(), StoreError>;

    /// Read the stored partition for `language`.
    ///
    /// Returns [`StoreError::NotFound`] when nothing is stored.
    fn read_partition(&self, language: &str) -> Result<Partition, StoreError>;

    /// Languages with a stored partition, sorted by code.
    fn languages(&self) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{i}")).collect()
    }

    #[test]
    fn split_test_head_train_tail() {
        let words = numbered(10);
        let p = Partition::split(words.iter().map(String::as_str), 10, 0.9);
        assert_eq!(p.test, "w0");
        assert_eq!(p.train, "w1 w2 w3 w4 w5 w6 w7 w8 w9");
    }

    #[test]
    fn split_discards_words_past_budget() {
        let words = numbered(1500);
        let p = Partition::split(words.iter().map(String::as_str), 1000, 0.9);
        assert_eq!(p.train_words(), 900);
        assert_eq!(p.test_words(), 100);
        assert!(p.test.starts_with("w0 w1 "));
        assert!(p.train.starts_with("w100 "));
        assert!(p.train.ends_with(" w999"));
    }

    #[test]
    fn split_is_reproducible() {
        let words = numbered(257);
        let a = Partition::split(words.iter().map(String::as_str), 1000, 0.75);
        let b = Partition::split(words.iter().map(String::as_str), 1000, 0.75);
        assert_eq!(a, b);
        assert_eq!(a.train_words() + a.test_words(), 257);
    }

    #[test]
    fn split_fewer_words_than_budget() {
        let p = Partition::split(["a", "b"], 1000, 0.9);
        assert_eq!(p.test, "");
        assert_eq!(p.train, "a b");
    }

    #[test]
    fn split_empty() {
        let p = Partition::split(std::iter::empty(), 1000, 0.9);
        assert_eq!(p, Partition::default());
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::Train.as_str(), "train");
        assert_eq!(Role::Test.as_str(), "test");
        let p = Partition {
            train: "t".into(),
            test: "h".into(),
        };
        assert_eq!(p.get(Role::Test), "h");
    }
}
