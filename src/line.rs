use std::borrow::Cow;
use std::fmt;

/// One line of captured command output.
///
/// Lines hold raw bytes: output produced under a legacy console code page is
/// not UTF-8 until it has been converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Line(Vec<u8>);

impl Line {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the line as text when it is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Line {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Line {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Line {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl PartialEq<str> for Line {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Line {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<[u8]> for Line {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

/// Splits captured bytes into lines the way `exec`-style capture does:
/// `\n` separates lines, a final newline does not start an extra line, and
/// trailing whitespace is dropped from every line. Whitespace is the C
/// locale set: space, `\t`, `\n`, `\x0B`, `\x0C` and `\r`.
pub fn split_lines(bytes: &[u8]) -> Vec<Line> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    if bytes.is_empty() {
        return Vec::new();
    }

    body.split(|byte| *byte == b'\n')
        .map(|line| Line::from(trim_trailing_space(line)))
        .collect()
}

fn trim_trailing_space(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|byte| !(byte.is_ascii_whitespace() || *byte == 0x0B))
        .map_or(0, |last| last + 1);
    line.get(..end).unwrap_or_default()
}
