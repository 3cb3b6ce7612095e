//! PHP compatible string functions.
//!
//! Wikitext authors rely on the exact behaviour of these, so they are not
//! replaced by the nearest Rust standard library equivalent.

use std::borrow::Cow;

/// The characters removed by [`trim`](https://php.net/trim).
const TRIM_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0b'];

/// Trims whitespace like [`trim`](https://php.net/trim).
///
/// Unlike [`str::trim_ascii`], this removes NUL and vertical tab but not form
/// feed.
pub fn trim(text: &str) -> &str {
    text.trim_matches(TRIM_CHARS)
}

/// Converts a string to a boolean like a PHP `(bool)` cast.
///
/// Only the empty string and `"0"` are false.
pub fn is_truthy(text: &str) -> bool {
    !matches!(text, "" | "0")
}

/// Unescapes C-style escape sequences like
/// [`stripcslashes`](https://php.net/stripcslashes).
///
/// Octal and hex escapes can produce bytes which are not valid UTF-8; these
/// are replaced with U+FFFD.
pub fn stripcslashes(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }

        // A trailing backslash is kept as-is.
        let Some(escape) = iter.next() else {
            out.push(b'\\');
            break;
        };

        match escape {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'v' => out.push(0x0b),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'x' if iter.peek().is_some_and(u8::is_ascii_hexdigit) => {
                let mut value = 0;
                let mut i = 0;
                while i < 2
                    && let Some(digit) = iter.next_if(u8::is_ascii_hexdigit)
                {
                    value = value << 4 | nibble(digit);
                    i += 1;
                }
                out.push(value);
            }
            b'0'..=b'7' => {
                let mut value = u32::from(escape - b'0');
                let mut i = 1;
                while i < 3
                    && let Some(digit) = iter.next_if(|b| (b'0'..=b'7').contains(b))
                {
                    value = value << 3 | u32::from(digit - b'0');
                    i += 1;
                }
                // Clippy: `\777` overflows a byte and PHP truncates it too.
                #[allow(clippy::cast_possible_truncation)]
                out.push(value as u8);
            }
            b => out.push(b),
        }
    }

    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Converts an ASCII hex digit to its value.
#[inline]
fn nibble(b: u8) -> u8 {
    (b & 0xf) + 9 * (b >> 6)
}
