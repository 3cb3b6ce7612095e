//! List separator decoding.

use crate::php::stripcslashes;
use std::borrow::Cow;

/// Quote characters which may wrap a separator to protect whitespace that
/// would otherwise be trimmed away.
const QUOTES: [u8; 3] = [b'\'', b'`', b'"'];

/// Decodes a separator argument.
///
/// Values of one byte or less are returned unchanged. Anything longer has its
/// C-style escapes decoded, and then, if the result begins and ends with the
/// same quote character, one quote is removed from each end.
///
/// ```wikitext
/// {{#listsplit:a,b|separator=', '}}
///                            ^^^^
/// ```
pub fn decode_separator(separator: &str) -> Cow<'_, str> {
    if separator.len() <= 1 {
        return Cow::Borrowed(separator);
    }

    let separator = stripcslashes(separator);
    let bytes = separator.as_bytes();
    if let (Some(first), Some(last)) = (bytes.first(), bytes.last())
        && first == last
        && QUOTES.contains(first)
    {
        // A lone quote left over from unescaping `\'` strips to nothing.
        return match separator {
            Cow::Borrowed(s) => Cow::Borrowed(s.get(1..s.len() - 1).unwrap_or_default()),
            Cow::Owned(s) => Cow::Owned(s.get(1..s.len() - 1).unwrap_or_default().to_string()),
        };
    }

    separator
}
