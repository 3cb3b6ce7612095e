//! The parser helper context.

use super::{
    Arg, Catalog, Frame, MagicArgs, MagicWord, MagicWordArray, MagicWords, Result, Value,
    classify, decode_separator, ids, php,
};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Shared state and common checks for parser function implementations.
///
/// This owns the long-lived magic word table. Build one at start-up, after
/// which it can be shared read-only by every parser function call.
#[derive(Debug)]
pub struct ParserHelper<C> {
    /// The host magic word catalog.
    catalog: C,
    /// Magic words cached for lookups by synonym.
    words: MagicWords,
}

/// The output of a parser function, as it should be returned to the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionOutput {
    /// The output text.
    pub text: String,
    /// If true, the host should not preprocess the output as Wikitext.
    pub noparse: bool,
}

/// How a host should protect tag output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarkerType {
    /// Output is inserted as-is.
    None,
    /// Output is protected from further Wikitext processing.
    Nowiki,
}

/// The output of a tag, as it should be returned to the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagOutput {
    /// The output text.
    pub text: String,
    /// The kind of strip marker the host should wrap the output in.
    pub marker_type: MarkerType,
    /// If true, the host should not preprocess the output as Wikitext.
    pub noparse: bool,
}

impl<C: Catalog> ParserHelper<C> {
    /// Creates a new helper using the given catalog, caching the helper’s own
    /// named arguments.
    pub fn new(catalog: C) -> Self {
        let mut helper = Self {
            catalog,
            words: <_>::default(),
        };
        helper.cache_magic_words(&ids::NAMED_ARGS);
        helper
    }

    /// Adds magic words to the table used by [`Self::find_magic_id`] and
    /// [`Self::transform_args`].
    ///
    /// This should include any named arguments or argument values that need
    /// to be localised which are not otherwise registered with the host.
    pub fn cache_magic_words(&mut self, ids: &[&str]) {
        let words = self.lookup(ids);
        self.words.cache(words);
    }

    /// The catalog used by this helper.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Returns true if the value of `debug=` means debug output should be
    /// emitted.
    ///
    /// When previewing, any truthy value enables debugging; otherwise, the
    /// value must be the `always` magic word.
    pub fn check_debug<N>(&self, is_preview: bool, magic_args: &MagicArgs<'_, N>) -> bool {
        let debug = magic_args.get(ids::DEBUG).unwrap_or_default();
        if is_preview {
            php::is_truthy(debug)
        } else {
            self.catalog
                .magic_word(ids::ALWAYS)
                .is_some_and(|always| always.matches(debug))
        }
    }

    /// Returns true if `case=` is the `any` magic word.
    pub fn check_any_case<N>(&self, magic_args: &MagicArgs<'_, N>) -> bool {
        self.magic_key_equals_value(magic_args, ids::CASE, ids::ANY)
    }

    /// Returns true if both the `if=` and `ifnot=` conditions are satisfied.
    ///
    /// A missing `if=` is satisfied and a missing `ifnot=` is satisfied.
    pub fn check_ifs<N>(&self, magic_args: &MagicArgs<'_, N>) -> bool {
        php::is_truthy(magic_args.get(ids::IF).unwrap_or("1"))
            && !php::is_truthy(magic_args.get(ids::IF_NOT).unwrap_or_default())
    }

    /// Expands every value using the given frame.
    pub fn expand_array<F>(
        &self,
        frame: &F,
        values: &[Value<'_, F::Node>],
        trim: bool,
    ) -> Result<Vec<String>>
    where
        F: Frame + ?Sized,
    {
        values
            .iter()
            .map(|value| {
                let value = value.expand(frame)?;
                Ok(if trim {
                    php::trim(&value).to_string()
                } else {
                    value.into_owned()
                })
            })
            .collect()
    }

    /// Finds the id of the cached magic word with the given synonym, or
    /// `default` if there is none.
    pub fn find_magic_id<'a>(&'a self, value: &str, default: Option<&'a str>) -> Option<&'a str> {
        self.words.find(value).or(default)
    }

    /// Formats parser function output for debugging.
    ///
    /// When `debug` is true and there is output, the output is escaped and
    /// wrapped in `<pre>` so it shows up as source text.
    pub fn format_pf_for_debug(&self, output: String, debug: bool) -> FunctionOutput {
        if debug && !output.is_empty() {
            FunctionOutput {
                text: format!("<pre>{}</pre>", html_escape::encode_quoted_attribute(&output)),
                noparse: false,
            }
        } else {
            FunctionOutput {
                text: output,
                noparse: true,
            }
        }
    }

    /// Formats tag output for debugging.
    ///
    /// When `debug` is true, the output is escaped, wrapped in `<pre>`, and
    /// protected from further processing.
    pub fn format_tag_for_debug(&self, output: String, debug: bool, noparse: bool) -> TagOutput {
        if debug {
            TagOutput {
                text: format!("<pre>{}</pre>", html_escape::encode_quoted_attribute(&output)),
                marker_type: MarkerType::Nowiki,
                noparse,
            }
        } else {
            TagOutput {
                text: output,
                marker_type: MarkerType::None,
                noparse,
            }
        }
    }

    /// Classifies parser function arguments, recognising the named arguments
    /// with the given magic word ids.
    ///
    /// See [`classify`] for details.
    pub fn magic_args<'a, F>(
        &self,
        frame: &F,
        args: &'a [Arg<F::Node>],
        allowed: &[&str],
    ) -> Result<MagicArgs<'a, F::Node>>
    where
        F: Frame + ?Sized,
    {
        if args.is_empty() {
            return Ok(MagicArgs::default());
        }

        let allowed = MagicWordArray::new(self.lookup(allowed));
        classify(frame, args, &allowed)
    }

    /// Returns true if the recognised argument `key` is a synonym of the magic
    /// word `value`.
    pub fn magic_key_equals_value<N>(
        &self,
        magic_args: &MagicArgs<'_, N>,
        key: &str,
        value: &str,
    ) -> bool {
        magic_args.get(key).is_some_and(|arg| {
            self.catalog
                .magic_word(value)
                .is_some_and(|word| word.matches(arg))
        })
    }

    /// Returns the magic word table.
    pub fn magic_words(&self) -> &MagicWordArray {
        self.words.array()
    }

    /// Returns the decoded `separator=` argument, or an empty string.
    pub fn separator<'a, N>(&self, magic_args: &'a MagicArgs<'_, N>) -> Cow<'a, str> {
        decode_separator(magic_args.get(ids::SEPARATOR).unwrap_or_default())
    }

    /// Returns every spelling of a magic word, for hosts which need to
    /// register a tag or function under each of them.
    pub fn synonyms(&self, id: &str) -> Vec<String> {
        self.catalog
            .magic_word(id)
            .map(|word| word.synonyms)
            .unwrap_or_default()
    }

    /// Filters tag attributes down to the ones whose names are cached magic
    /// words, keyed by magic word id instead of the localised name.
    pub fn transform_args<K, V>(&self, args: impl IntoIterator<Item = (K, V)>) -> IndexMap<String, V>
    where
        K: AsRef<str>,
    {
        let mut out = IndexMap::new();
        for (key, value) in args {
            if let Some(id) = self.words.find(key.as_ref()) {
                out.insert(id.to_string(), value);
            }
        }
        out
    }

    /// Gets the magic words for the given ids from the catalog, skipping any
    /// which are unknown.
    fn lookup(&self, ids: &[&str]) -> Vec<MagicWord> {
        ids.iter()
            .filter_map(|id| {
                let word = self.catalog.magic_word(id);
                if word.is_none() {
                    log::warn!("Magic word '{id}' is not in the catalog");
                }
                word
            })
            .collect()
    }
}
