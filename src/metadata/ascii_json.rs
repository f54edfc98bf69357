use std::io::{self, Write};

use serde::Serialize;

/// A compact [`serde_json`] formatter that escapes every non-ASCII character.
///
/// Characters outside the basic multilingual plane are written as a UTF-16 surrogate pair, e.g. `"\ud83d\ude00"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (index, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(&bytes[start..index])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + c.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }
}

/// Serialise `value` as compact JSON with only ASCII bytes.
///
/// # Errors
/// Returns a [`serde_json::Error`] if `value` cannot be serialised.
pub fn to_ascii_json_vec<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
