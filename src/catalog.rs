//! Localised magic word catalogs.
//!
//! The host platform owns the list of localised spellings for every magic
//! word. A [`Catalog`] is the narrow view of that list which this crate needs.

use super::{Error, MagicWord, Result};
use indexmap::IndexMap;
use std::{collections::HashMap, path::Path};

/// Magic word ids used by the parser helper itself.
pub mod ids {
    /// `allowempty=`: whether empty values should be kept.
    pub const ALLOW_EMPTY: &str = "parserhelper-allowempty";
    /// `case=`: the case-sensitivity mode of a comparison.
    pub const CASE: &str = "parserhelper-case";
    /// `debug=`: whether to emit debug output.
    pub const DEBUG: &str = "parserhelper-debug";
    /// `if=`: a condition which must be truthy.
    pub const IF: &str = "parserhelper-if";
    /// `ifnot=`: a condition which must be falsy.
    pub const IF_NOT: &str = "parserhelper-ifnot";
    /// `separator=`: a list separator.
    pub const SEPARATOR: &str = "parserhelper-separator";

    /// The `any` value for `case=`.
    pub const ANY: &str = "parserhelper-any";
    /// The `always` value for `debug=`.
    pub const ALWAYS: &str = "parserhelper-always";

    /// The named argument ids cached by a new parser helper.
    pub const NAMED_ARGS: [&str; 6] = [ALLOW_EMPTY, CASE, DEBUG, IF, IF_NOT, SEPARATOR];
}

/// The default English synonyms for the helper’s magic words. All of them
/// are case-insensitive.
static BUILTIN: phf::Map<&str, &[&str]> = phf::phf_map! {
    "parserhelper-allowempty" => &["allowempty"],
    "parserhelper-always" => &["always"],
    "parserhelper-any" => &["any"],
    "parserhelper-case" => &["case"],
    "parserhelper-debug" => &["debug"],
    "parserhelper-if" => &["if"],
    "parserhelper-ifnot" => &["ifnot"],
    "parserhelper-separator" => &["separator"],
};

/// The language used when a catalog does not have a word in the requested
/// language.
pub const FALLBACK_LANGUAGE: &str = "en";

/// A source of localised magic words.
pub trait Catalog {
    /// Returns the magic word with the given id, if it is known.
    fn magic_word(&self, id: &str) -> Option<MagicWord>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn magic_word(&self, id: &str) -> Option<MagicWord> {
        (**self).magic_word(id)
    }
}

impl<C: Catalog + ?Sized> Catalog for Box<C> {
    fn magic_word(&self, id: &str) -> Option<MagicWord> {
        (**self).magic_word(id)
    }
}

/// Two catalogs layered in order. Synonyms from the second catalog are
/// appended to those from the first.
impl<A: Catalog, B: Catalog> Catalog for (A, B) {
    fn magic_word(&self, id: &str) -> Option<MagicWord> {
        merge(self.0.magic_word(id), self.1.magic_word(id))
    }
}

/// The compiled-in English catalog of the helper’s own magic words.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCatalog;

impl Catalog for BuiltinCatalog {
    fn magic_word(&self, id: &str) -> Option<MagicWord> {
        BUILTIN
            .get_entry(id)
            .map(|(id, synonyms)| MagicWord::new(*id, false, synonyms.iter().copied()))
    }
}

/// The case flag at the start of a catalog entry.
///
/// MediaWiki uses `0` and `1`; booleans are accepted too.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CaseFlag {
    /// A numeric flag, where non-zero means case-sensitive.
    Int(u8),
    /// A boolean flag.
    Bool(bool),
}

/// A magic word catalog loaded from JSON.
///
/// The layout follows the MediaWiki `*.i18n.magic.php` files: an object
/// mapping language codes to objects mapping magic word ids to an array of
/// a case flag followed by the synonyms.
///
/// ```json
/// {
///   "en": { "parserhelper-separator": [0, "separator", "sep"] },
///   "de": { "parserhelper-separator": [0, "trennzeichen"] }
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct JsonCatalog {
    /// The preferred language.
    language: String,
    /// Words by language, then by id.
    words: HashMap<String, HashMap<String, MagicWord>>,
}

impl JsonCatalog {
    /// Parses a catalog from JSON text, preferring words from `language`.
    pub fn from_json(json: &str, language: &str) -> Result<Self> {
        let raw = serde_json::from_str::<
            HashMap<String, IndexMap<String, Vec<serde_json::Value>>>,
        >(json)?;

        let mut words = HashMap::with_capacity(raw.len());
        for (lang, entries) in raw {
            let mut lang_words = HashMap::with_capacity(entries.len());
            for (id, entry) in entries {
                let word = parse_entry(&lang, &id, entry)?;
                lang_words.insert(id, word);
            }
            words.insert(lang, lang_words);
        }

        log::debug!(
            "Loaded magic word catalog with {} languages, preferring '{language}'",
            words.len()
        );

        Ok(Self {
            language: language.to_string(),
            words,
        })
    }

    /// Loads a catalog from a JSON file, preferring words from `language`.
    pub fn from_file(path: impl AsRef<Path>, language: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, language)
    }

    /// Returns the preferred language of the catalog.
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Catalog for JsonCatalog {
    fn magic_word(&self, id: &str) -> Option<MagicWord> {
        let get = |language: &str| {
            self.words
                .get(language)
                .and_then(|words| words.get(id))
                .cloned()
        };

        if self.language == FALLBACK_LANGUAGE {
            get(FALLBACK_LANGUAGE)
        } else {
            merge(get(&self.language), get(FALLBACK_LANGUAGE))
        }
    }
}

/// Merges a localised word with its fallback, so that the fallback spellings
/// keep working in every language.
fn merge(word: Option<MagicWord>, fallback: Option<MagicWord>) -> Option<MagicWord> {
    match (word, fallback) {
        (Some(mut word), Some(fallback)) => {
            word.merge(fallback);
            Some(word)
        }
        (word, fallback) => word.or(fallback),
    }
}

/// Converts a raw `[flag, synonym...]` catalog entry into a magic word.
fn parse_entry(language: &str, id: &str, entry: Vec<serde_json::Value>) -> Result<MagicWord> {
    let error = |reason| Error::CatalogEntry {
        language: language.to_string(),
        id: id.to_string(),
        reason,
    };

    let mut entry = entry.into_iter();
    let flag = entry.next().ok_or_else(|| error("missing case flag"))?;
    let case_sensitive = match serde_json::from_value::<CaseFlag>(flag) {
        Ok(CaseFlag::Int(flag)) => flag != 0,
        Ok(CaseFlag::Bool(flag)) => flag,
        Err(_) => return Err(error("case flag must be 0, 1, or a boolean")),
    };

    let synonyms = entry
        .map(|synonym| match synonym {
            serde_json::Value::String(synonym) => Ok(synonym),
            _ => Err(error("synonyms must be strings")),
        })
        .collect::<Result<Vec<_>>>()?;

    if synonyms.is_empty() {
        return Err(error("no synonyms"));
    }

    Ok(MagicWord {
        id: id.to_string(),
        case_sensitive,
        synonyms,
    })
}
