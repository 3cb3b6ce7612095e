//! Magic word tables.
//!
//! A magic word is a fixed keyword identified by a locale-independent id,
//! which users may spell using any of its localised synonyms.
//!
//! <https://www.mediawiki.org/wiki/Manual:Magic_words>

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use unicase::UniCase;

/// A magic word and its synonyms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MagicWord {
    /// The canonical id.
    pub id: String,
    /// Whether synonyms must match case exactly.
    pub case_sensitive: bool,
    /// The localised spellings of the word.
    pub synonyms: Vec<String>,
}

impl MagicWord {
    /// Creates a new magic word.
    pub fn new<I, S>(id: impl Into<String>, case_sensitive: bool, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            case_sensitive,
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends the synonyms of `other` which this word does not already have.
    /// The case flag of this word is kept.
    pub fn merge(&mut self, other: MagicWord) {
        for synonym in other.synonyms {
            if !self.synonyms.contains(&synonym) {
                self.synonyms.push(synonym);
            }
        }
    }

    /// Returns true if the whole of `text` is one of the synonyms of this word.
    pub fn matches(&self, text: &str) -> bool {
        self.synonyms.iter().any(|synonym| {
            if self.case_sensitive {
                synonym == text
            } else {
                UniCase::new(synonym.as_str()) == UniCase::new(text)
            }
        })
    }
}

/// The synonyms of a single magic word in a [`MagicWordArray`].
#[derive(Clone, Debug)]
struct Entry {
    /// Whether synonyms must match case exactly.
    case_sensitive: bool,
    /// The synonyms, in registration order.
    synonyms: IndexSet<String>,
}

/// A set of magic words which can be searched by synonym.
///
/// Adding a word whose id is already present merges its synonyms into the
/// existing entry.
#[derive(Clone, Debug, Default)]
pub struct MagicWordArray {
    /// Entries by id, in registration order.
    words: IndexMap<String, Entry>,
    /// Map from case-sensitive synonym to the index of the first word with
    /// that synonym.
    exact: HashMap<String, usize>,
    /// Map from case-folded synonym to the index of the first word with that
    /// synonym.
    folded: HashMap<UniCase<String>, usize>,
}

impl MagicWordArray {
    /// Creates a new array from the given words.
    pub fn new(words: impl IntoIterator<Item = MagicWord>) -> Self {
        let mut array = Self::default();
        array.add(words);
        array
    }

    /// Adds the given words to the array.
    pub fn add(&mut self, words: impl IntoIterator<Item = MagicWord>) {
        for word in words {
            self.add_word(word);
        }
    }

    /// Adds a single word to the array, merging with any existing entry with
    /// the same id.
    pub fn add_word(&mut self, word: MagicWord) {
        let entry = self.words.entry(word.id);
        let index = entry.index();
        let entry = entry.or_insert_with(|| Entry {
            case_sensitive: word.case_sensitive,
            synonyms: IndexSet::new(),
        });

        if entry.case_sensitive != word.case_sensitive {
            log::debug!(
                "magic word #{index} re-registered with different case sensitivity; keeping {}",
                entry.case_sensitive
            );
        }

        for synonym in word.synonyms {
            if entry.synonyms.contains(&synonym) {
                continue;
            }

            // Merging can add a synonym to an earlier word that a later word
            // already claimed, and the earlier word must win
            if entry.case_sensitive {
                self.exact
                    .entry(synonym.clone())
                    .and_modify(|i| *i = (*i).min(index))
                    .or_insert(index);
            } else {
                self.folded
                    .entry(UniCase::new(synonym.clone()))
                    .and_modify(|i| *i = (*i).min(index))
                    .or_insert(index);
            }
            entry.synonyms.insert(synonym);
        }
    }

    /// Returns true if the array contains a word with the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.words.contains_key(id)
    }

    /// Returns an iterator over the ids in the array, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// Returns true if there are no words in the array.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the number of words in the array.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Finds the id of the first word which has the whole of `text` as one of
    /// its synonyms.
    ///
    /// There is no prefix matching: `"separators"` does not match a word
    /// with the synonym `"separator"`.
    pub fn match_start_to_end(&self, text: &str) -> Option<&str> {
        let exact = self.exact.get(text).copied();
        let folded = if self.folded.is_empty() {
            None
        } else {
            self.folded.get(&UniCase::new(text.to_string())).copied()
        };

        let index = match (exact, folded) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => a.or(b)?,
        };

        self.words.get_index(index).map(|(id, _)| id.as_str())
    }

    /// Returns the synonyms of the word with the given id, in registration
    /// order.
    pub fn synonyms(&self, id: &str) -> Option<impl Iterator<Item = &str>> {
        self.words
            .get(id)
            .map(|entry| entry.synonyms.iter().map(String::as_str))
    }

    /// Returns the word with the given id.
    pub fn word(&self, id: &str) -> Option<MagicWord> {
        self.words.get(id).map(|entry| MagicWord {
            id: id.to_string(),
            case_sensitive: entry.case_sensitive,
            synonyms: entry.synonyms.iter().cloned().collect(),
        })
    }
}

impl FromIterator<MagicWord> for MagicWordArray {
    fn from_iter<T: IntoIterator<Item = MagicWord>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// The long-lived magic word table used by a parser helper.
///
/// The table is meant to be populated once at start-up before anything reads
/// from it, so reading from a table that was never populated is a bug in the
/// caller and panics.
#[derive(Clone, Debug, Default)]
pub struct MagicWords {
    /// The cached words, if any were ever cached.
    array: Option<MagicWordArray>,
}

impl MagicWords {
    /// Adds words to the table.
    pub fn cache(&mut self, words: impl IntoIterator<Item = MagicWord>) {
        if let Some(array) = &mut self.array {
            array.add(words);
        } else {
            self.array = Some(MagicWordArray::new(words));
        }
    }

    /// Returns the populated table.
    ///
    /// # Panics
    ///
    /// Panics if nothing was ever cached.
    #[track_caller]
    pub fn array(&self) -> &MagicWordArray {
        let Some(array) = &self.array else {
            panic!("magic word table read before it was populated");
        };
        array
    }

    /// Finds the id of the word with the given synonym.
    ///
    /// # Panics
    ///
    /// Panics if nothing was ever cached.
    #[track_caller]
    pub fn find(&self, text: &str) -> Option<&str> {
        self.array().match_start_to_end(text)
    }

    /// Returns true if the table has been populated.
    pub fn is_populated(&self) -> bool {
        self.array.is_some()
    }
}
