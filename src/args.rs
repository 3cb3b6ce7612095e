//! Parser function argument splitting and classification.

use super::{Frame, MagicWordArray, Result, php};
use indexmap::IndexMap;
use std::borrow::Cow;

/// A raw argument passed to a parser function or tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Arg<N> {
    /// A plain string argument, which is a k-v pair if it contains `=`.
    ///
    /// These come from places where the host has already flattened the
    /// argument, like script calls.
    Text(String),
    /// A host argument node which knows whether it was named.
    ///
    /// ```wikitext
    /// {{#fn:first|name=value|positional}}
    ///             ^^^^^^^^^^ ^^^^^^^^^^
    /// ```
    Part(Part<N>),
    /// Any other host node. This is always positional.
    ///
    /// ```wikitext
    /// {{#fn:first|name=value|positional}}
    ///       ^^^^^
    /// ```
    Node(N),
}

/// A structured argument node, already split by the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part<N> {
    /// The unexpanded name part.
    pub name: N,
    /// The position of the argument if it had no name.
    pub index: Option<usize>,
    /// The unexpanded value part.
    pub value: N,
}

impl<N> Part<N> {
    /// Creates a named argument part.
    pub fn named(name: N, value: N) -> Self {
        Self {
            name,
            index: None,
            value,
        }
    }

    /// Creates a positional argument part. Hosts do not produce a name for
    /// these, so `name` is normally empty.
    pub fn positional(name: N, index: usize, value: N) -> Self {
        Self {
            name,
            index: Some(index),
            value,
        }
    }
}

/// A borrowed, unexpanded argument value.
#[derive(Debug, Eq, PartialEq)]
pub enum Value<'a, N> {
    /// The value part of a plain string k-v pair.
    Text(&'a str),
    /// The value node of an argument part.
    Node(&'a N),
    /// An entire argument, unchanged.
    Arg(&'a Arg<N>),
}

// Derived `Clone` and `Copy` would require `N: Clone`.
impl<N> Clone for Value<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Value<'_, N> {}

impl<'a, N> Value<'a, N> {
    /// Expands the value in the given frame.
    ///
    /// An entire named argument part expands to `name=value`.
    ///
    /// The returned value will include any leading and trailing whitespace
    /// present in the original text.
    pub fn expand<F>(&self, frame: &F) -> Result<Cow<'a, str>>
    where
        F: Frame<Node = N> + ?Sized,
    {
        Ok(match *self {
            Value::Text(text) => Cow::Borrowed(text),
            Value::Arg(Arg::Text(text)) => Cow::Borrowed(text.as_str()),
            Value::Node(node) | Value::Arg(Arg::Node(node)) => Cow::Owned(frame.expand(node)?),
            Value::Arg(Arg::Part(part)) => {
                let value = frame.expand(&part.value)?;
                if part.index.is_some() {
                    Cow::Owned(value)
                } else {
                    let name = frame.expand(&part.name)?;
                    Cow::Owned(format!("{name}={value}"))
                }
            }
        })
    }
}

impl<'a, N> From<&'a Arg<N>> for Value<'a, N> {
    fn from(arg: &'a Arg<N>) -> Self {
        Self::Arg(arg)
    }
}

/// Splits an argument into a raw key and an unexpanded value.
///
/// * A plain string containing `=` is split at the first `=`. Neither side is
///   trimmed.
/// * A named argument part has its name expanded to get the key.
/// * A positional argument part has no key, even if its text contains `=`.
/// * Anything else has no key, and the value is the whole argument.
pub fn split<'a, F>(
    frame: &F,
    arg: &'a Arg<F::Node>,
) -> Result<(Option<String>, Value<'a, F::Node>)>
where
    F: Frame + ?Sized,
{
    Ok(match arg {
        Arg::Part(part) => {
            let key = if part.index.is_none() {
                Some(frame.expand(&part.name)?)
            } else {
                None
            };
            (key, Value::Node(&part.value))
        }
        Arg::Text(text) => {
            if let Some((key, value)) = text.split_once('=') {
                (Some(key.to_string()), Value::Text(value))
            } else {
                (None, Value::Arg(arg))
            }
        }
        Arg::Node(_) => (None, Value::Arg(arg)),
    })
}

/// Parser function arguments sorted by [`classify`].
#[derive(Debug)]
pub struct MagicArgs<'a, N> {
    /// Recognised named arguments, by magic word id. Values are expanded and
    /// trimmed.
    pub recognized: IndexMap<String, String>,
    /// Positional and unrecognised arguments, unexpanded, in their original
    /// order.
    pub leftover: Vec<Value<'a, N>>,
    /// Recognised named arguments which were overridden by a later argument
    /// with the same id, unexpanded, by their raw key.
    pub duplicates: IndexMap<String, Value<'a, N>>,
}

impl<N> Default for MagicArgs<'_, N> {
    fn default() -> Self {
        Self {
            recognized: <_>::default(),
            leftover: <_>::default(),
            duplicates: <_>::default(),
        }
    }
}

impl<N> MagicArgs<'_, N> {
    /// Returns the expanded value of the recognised argument with the given
    /// magic word id.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.recognized.get(id).map(String::as_str)
    }

    /// Returns true if nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.recognized.is_empty() && self.leftover.is_empty() && self.duplicates.is_empty()
    }
}

/// Separates recognised named arguments from everything else.
///
/// Arguments whose trimmed key resolves to a word in `allowed` are expanded,
/// trimmed, and stored in [`MagicArgs::recognized`] under the magic word id.
/// If the same id appears more than once, the last one wins, and the others
/// go into [`MagicArgs::duplicates`] by their raw key so a caller can merge
/// them back in whatever way makes sense for it (e.g. passing them through to
/// a template which has its own `separator` argument). Only the first of
/// these duplicates (counting from the end) is kept for each raw key.
///
/// Everything else goes into [`MagicArgs::leftover`] unexpanded, since it may
/// be conditional code that must not be evaluated yet.
pub fn classify<'a, F>(
    frame: &F,
    args: &'a [Arg<F::Node>],
    allowed: &MagicWordArray,
) -> Result<MagicArgs<'a, F::Node>>
where
    F: Frame + ?Sized,
{
    let mut result = MagicArgs::default();
    if args.is_empty() {
        return Ok(result);
    }

    // Going backwards makes the last value the one that gets expanded
    for arg in args.iter().rev() {
        let (key, value) = split(frame, arg)?;
        let Some(raw_key) = key else {
            result.leftover.push(value);
            continue;
        };

        let Some(id) = allowed.match_start_to_end(php::trim(&raw_key)) else {
            result.leftover.push(Value::Arg(arg));
            continue;
        };

        if result.recognized.contains_key(id) {
            result.duplicates.entry(raw_key).or_insert(value);
        } else {
            let expanded = value.expand(frame)?;
            result
                .recognized
                .insert(id.to_string(), php::trim(&expanded).to_string());
        }
    }

    result.leftover.reverse();

    log::trace!(
        "classified {} args: {} recognized, {} leftover, {} duplicates",
        args.len(),
        result.recognized.len(),
        result.leftover.len(),
        result.duplicates.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, MagicWord, Verbatim};

    fn allowed(words: &[(&str, &[&str])]) -> MagicWordArray {
        words
            .iter()
            .map(|(id, synonyms)| MagicWord::new(*id, false, synonyms.iter().copied()))
            .collect()
    }

    fn text_args(args: &[&str]) -> Vec<Arg<String>> {
        args.iter().map(|arg| Arg::Text((*arg).to_string())).collect()
    }

    fn expand_all(values: &[Value<'_, String>]) -> Vec<String> {
        values
            .iter()
            .map(|value| value.expand(&Verbatim).unwrap().into_owned())
            .collect()
    }

    /// A frame which wraps expanded nodes so tests can tell what was expanded.
    struct Marking;

    impl Frame for Marking {
        type Node = String;

        fn expand(&self, node: &String) -> Result<String> {
            Ok(format!("<{node}>"))
        }
    }

    /// A frame which refuses to expand anything.
    struct Failing;

    impl Frame for Failing {
        type Node = String;

        fn expand(&self, _: &String) -> Result<String> {
            Err(Error::Expand("nope".into()))
        }
    }

    #[test]
    fn split_text() {
        let arg = Arg::Text(" key = a=b ".to_string());
        let (key, value) = split(&Verbatim, &arg).unwrap();
        assert_eq!(key.as_deref(), Some(" key "));
        assert_eq!(value, Value::Text(" a=b "));

        let arg = Arg::Text("=value".to_string());
        let (key, value) = split(&Verbatim, &arg).unwrap();
        assert_eq!(key.as_deref(), Some(""));
        assert_eq!(value, Value::Text("value"));

        let arg = Arg::Text("positional".to_string());
        let (key, value) = split(&Verbatim, &arg).unwrap();
        assert_eq!(key, None);
        assert_eq!(value, Value::Arg(&arg));
    }

    #[test]
    fn split_part() {
        let arg = Arg::Part(Part::named("name".to_string(), "value".to_string()));
        let (key, value) = split(&Marking, &arg).unwrap();
        assert_eq!(key.as_deref(), Some("<name>"));
        assert_eq!(value, Value::Node(&"value".to_string()));

        // A positional part never has a key, even if it looks like a k-v
        let arg = Arg::Part(Part::positional(String::new(), 1, "a=b".to_string()));
        let (key, value) = split(&Marking, &arg).unwrap();
        assert_eq!(key, None);
        assert_eq!(value, Value::Node(&"a=b".to_string()));
    }

    #[test]
    fn split_node() {
        let arg = Arg::Node("a=b".to_string());
        let (key, value) = split(&Marking, &arg).unwrap();
        assert_eq!(key, None);
        assert_eq!(value, Value::Arg(&arg));
    }

    #[test]
    fn value_expand() {
        let named = Arg::Part(Part::named("k".to_string(), "v".to_string()));
        assert_eq!(Value::from(&named).expand(&Marking).unwrap(), "<k>=<v>");
        let positional = Arg::Part(Part::positional(String::new(), 1, "v".to_string()));
        assert_eq!(Value::from(&positional).expand(&Marking).unwrap(), "<v>");
        let node = Arg::Node("n".to_string());
        assert_eq!(Value::from(&node).expand(&Marking).unwrap(), "<n>");
        assert_eq!(Value::<String>::Text("t").expand(&Marking).unwrap(), "t");
    }

    #[test]
    fn empty_input() {
        let result = classify(&Verbatim, &[], &allowed(&[("x", &["x"])])).unwrap();
        assert!(result.is_empty());
        let result = classify(&Verbatim, &[], &MagicWordArray::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn last_wins() {
        let args = text_args(&["x=1", "x=2"]);
        let result = classify(&Verbatim, &args, &allowed(&[("X", &["x"])])).unwrap();
        assert_eq!(result.get("X"), Some("2"));
        assert!(result.leftover.is_empty());
        assert_eq!(result.duplicates.len(), 1);
        assert_eq!(result.duplicates["x"], Value::Text("1"));
    }

    #[test]
    fn unrecognized_key_passthrough() {
        let args = text_args(&["z=5"]);
        let result = classify(&Verbatim, &args, &MagicWordArray::default()).unwrap();
        assert!(result.recognized.is_empty());
        assert!(result.duplicates.is_empty());
        assert_eq!(result.leftover, [Value::Arg(&args[0])]);
        assert_eq!(expand_all(&result.leftover), ["z=5"]);
    }

    #[test]
    fn positional_passthrough() {
        let args = text_args(&["hello"]);
        for words in [allowed(&[]), allowed(&[("hello", &["hello"])])] {
            let result = classify(&Verbatim, &args, &words).unwrap();
            assert!(result.recognized.is_empty());
            assert_eq!(expand_all(&result.leftover), ["hello"]);
        }
    }

    #[test]
    fn leftover_keeps_order() {
        let args = text_args(&["a", "sep=,", "b=1", "c", "sep=;", "d"]);
        let result = classify(&Verbatim, &args, &allowed(&[("sep", &["sep"])])).unwrap();
        assert_eq!(expand_all(&result.leftover), ["a", "b=1", "c", "d"]);
        assert_eq!(result.get("sep"), Some(";"));
    }

    #[test]
    fn keys_are_trimmed_and_resolved() {
        let args = text_args(&[" Separator \t= , ", "SEP=;"]);
        let words = allowed(&[("parserhelper-separator", &["separator", "sep"])]);
        let result = classify(&Verbatim, &args, &words).unwrap();
        assert_eq!(result.get("parserhelper-separator"), Some(";"));
        // The duplicate keeps its raw key and its untrimmed value
        assert_eq!(
            result.duplicates.get(" Separator \t"),
            Some(&Value::Text(" , "))
        );
    }

    #[test]
    fn recognized_values_are_expanded_and_trimmed() {
        let args = vec![
            Arg::Part(Part::named("if".to_string(), " yes ".to_string())),
            Arg::Part(Part::named("other".to_string(), "x".to_string())),
        ];
        let words = allowed(&[("<if>", &["<if>"])]);
        let result = classify(&Marking, &args, &words).unwrap();
        assert_eq!(result.get("<if>"), Some("< yes >"));
        assert_eq!(result.leftover, [Value::Arg(&args[1])]);
    }

    #[test]
    fn first_duplicate_per_raw_key() {
        // Walking backwards, `x=2` is seen before `x=1`, so it is the one kept.
        let args = text_args(&["x=1", "x=2", "X=3", "x=4"]);
        let result = classify(&Verbatim, &args, &allowed(&[("x", &["x"])])).unwrap();
        assert_eq!(result.get("x"), Some("4"));
        assert_eq!(result.duplicates.len(), 2);
        assert_eq!(result.duplicates["x"], Value::Text("2"));
        assert_eq!(result.duplicates["X"], Value::Text("3"));
    }

    #[test]
    fn duplicates_are_not_expanded() {
        let args = vec![
            Arg::Part(Part::named("x".to_string(), "first".to_string())),
            Arg::Part(Part::named("x".to_string(), "second".to_string())),
        ];
        let result = classify(&Marking, &args, &allowed(&[("<x>", &["<x>"])])).unwrap();
        assert_eq!(result.get("<x>"), Some("<second>"));
        assert_eq!(
            result.duplicates.get("<x>"),
            Some(&Value::Node(&"first".to_string()))
        );
    }

    #[test]
    fn every_arg_lands_once() {
        let args = text_args(&["a", "x=1", "y=2", "x=3", "b", "z=4", "y=5", "x=6"]);
        let words = allowed(&[("x", &["x"]), ("y", &["y"])]);
        let result = classify(&Verbatim, &args, &words).unwrap();
        // x appears three times and y twice, but duplicates only keep one per
        // raw key, so count the recognised ids instead of the raw entries
        assert_eq!(result.recognized.len(), 2);
        assert_eq!(result.get("x"), Some("6"));
        assert_eq!(result.get("y"), Some("5"));
        assert_eq!(expand_all(&result.leftover), ["a", "b", "z=4"]);
        assert_eq!(result.duplicates["x"], Value::Text("3"));
        assert_eq!(result.duplicates["y"], Value::Text("2"));
    }

    #[test]
    fn positional_part_with_equals() {
        let args = vec![Arg::Part(Part::positional(String::new(), 1, "x=1".to_string()))];
        let result = classify(&Verbatim, &args, &allowed(&[("x", &["x"])])).unwrap();
        assert!(result.recognized.is_empty());
        assert_eq!(expand_all(&result.leftover), ["x=1"]);
    }

    #[test]
    fn frame_errors_propagate() {
        let args = vec![Arg::Part(Part::named("x".to_string(), "1".to_string()))];
        assert!(matches!(
            classify(&Failing, &args, &allowed(&[("x", &["x"])])),
            Err(Error::Expand(_))
        ));
        // Positional values are never expanded, so nothing can fail
        let args = vec![Arg::Node("1".to_string())];
        assert!(classify(&Failing, &args, &allowed(&[("x", &["x"])])).is_ok());
    }
}
