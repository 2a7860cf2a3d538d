//! Console code pages understood by the runner.
//!
//! The table is fixed: each entry maps the numeric code a console reports
//! (or `chcp` accepts) to the canonical name of its character set and the
//! codec that converts it to and from UTF-8.

use encoding_rs::{EncoderResult, Encoding};
use oem_cp::code_table::{DECODING_TABLE_CP437, ENCODING_TABLE_CP437};

use crate::error::RunnerError;

/// Byte written in place of a character the target charset cannot represent.
const SUBSTITUTE: u8 = b'?';

/// Codec backing a [`Codepage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Ibm866,
    Windows1251,
    Utf8,
    /// Not part of the WHATWG set, so it is served by the OEM tables.
    Cp437,
    Windows1252,
}

impl Charset {
    fn whatwg(self) -> Option<&'static Encoding> {
        match self {
            Self::Ibm866 => Some(encoding_rs::IBM866),
            Self::Windows1251 => Some(encoding_rs::WINDOWS_1251),
            Self::Utf8 => Some(encoding_rs::UTF_8),
            Self::Windows1252 => Some(encoding_rs::WINDOWS_1252),
            Self::Cp437 => None,
        }
    }
}

/// One row of the code page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codepage {
    code: &'static str,
    name: &'static str,
    charset: Charset,
}

/// Every code page the runner can convert, keyed by encoding code.
pub static CODEPAGES: [Codepage; 5] = [
    Codepage::new("866", "CP866", Charset::Ibm866),
    Codepage::new("1251", "CP1251", Charset::Windows1251),
    Codepage::new("65001", "UTF-8", Charset::Utf8),
    Codepage::new("437", "CP437", Charset::Cp437),
    Codepage::new("1252", "CP1252", Charset::Windows1252),
];

impl Codepage {
    const fn new(code: &'static str, name: &'static str, charset: Charset) -> Self {
        Self {
            code,
            name,
            charset,
        }
    }

    /// Looks up the table entry for an encoding code such as `"866"`.
    pub fn lookup(code: &str) -> Result<&'static Self, RunnerError> {
        CODEPAGES
            .iter()
            .find(|page| page.code == code)
            .ok_or_else(|| RunnerError::UnknownEncoding(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Canonical charset name, e.g. `CP1251`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Converts text in this code page to UTF-8. Malformed sequences become
    /// U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.charset.whatwg() {
            Some(encoding) => encoding
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
            None => oem_cp::decode_string_complete_table(bytes, &DECODING_TABLE_CP437),
        }
    }

    /// Converts UTF-8 text into this code page, writing `?` for characters
    /// the code page lacks.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self.charset.whatwg() {
            Some(encoding) => encode_with_substitute(encoding, text),
            None => oem_cp::encode_string_lossy(text, &ENCODING_TABLE_CP437),
        }
    }
}

// encoding_rs would emit HTML numeric character references for unmappable
// characters; console tools expect a plain substitute byte instead.
fn encode_with_substitute(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut output = Vec::with_capacity(text.len());
    let mut remaining = text;

    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(remaining.len())
            .unwrap_or(remaining.len().saturating_add(16));
        output.reserve(needed);

        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut output, true);
        remaining = remaining.get(read..).unwrap_or_default();

        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => output.push(SUBSTITUTE),
        }
    }

    output
}
