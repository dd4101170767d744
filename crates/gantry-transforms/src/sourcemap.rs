//! Line-level v3 source maps

use serde::Serialize;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Origin of one generated line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOrigin {
    pub source: usize,
    pub line: usize,
}

/// Source map document
#[derive(Debug, Serialize)]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Build a map where generated line `n` starts at column 0 of `origins[n]`
    pub fn from_lines(file: impl Into<String>, sources: Vec<String>, origins: &[LineOrigin]) -> Self {
        Self {
            version: 3,
            file: file.into(),
            sources,
            names: Vec::new(),
            mappings: encode_mappings(origins),
        }
    }
}

/// Encode one segment per generated line
pub fn encode_mappings(origins: &[LineOrigin]) -> String {
    let mut mappings = String::new();
    let mut prev_source = 0i64;
    let mut prev_line = 0i64;

    for (idx, origin) in origins.iter().enumerate() {
        if idx > 0 {
            mappings.push(';');
        }
        let source = origin.source as i64;
        let line = origin.line as i64;

        // generated column, source index, original line, original column
        encode_vlq(0, &mut mappings);
        encode_vlq(source - prev_source, &mut mappings);
        encode_vlq(line - prev_line, &mut mappings);
        encode_vlq(0, &mut mappings);

        prev_source = source;
        prev_line = line;
    }

    mappings
}

/// Base64 VLQ encoding of a signed value
pub fn encode_vlq(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };

    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}
