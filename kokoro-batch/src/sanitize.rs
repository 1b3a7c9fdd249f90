// Encoding detection and the sanitized copy handed to the launcher

use crate::error::SanitizeError;
use crate::repair::fix_text;
use encoding_rs::WINDOWS_1252;
use std::fs;
use std::path::{Path, PathBuf};

const SANITIZED_SUFFIX: &str = "_sanitized";

/// Encodings tried in order when reading an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Windows1252,
    Latin1,
}

impl SourceEncoding {
    pub const FALLBACK_ORDER: [SourceEncoding; 3] = [
        SourceEncoding::Utf8,
        SourceEncoding::Windows1252,
        SourceEncoding::Latin1,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Windows1252 => "cp1252",
            SourceEncoding::Latin1 => "latin-1",
        }
    }

    /// Strict decode; `None` when the bytes are not valid in this encoding
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            SourceEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            SourceEncoding::Windows1252 => {
                // Bytes with no assigned character in cp1252
                if bytes
                    .iter()
                    .any(|b| matches!(b, 0x81 | 0x8D | 0x8F | 0x90 | 0x9D))
                {
                    return None;
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            SourceEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Decode with the first encoding in [`SourceEncoding::FALLBACK_ORDER`] that accepts the bytes
pub fn decode_with_fallback(bytes: &[u8]) -> Option<(String, SourceEncoding)> {
    SourceEncoding::FALLBACK_ORDER
        .iter()
        .find_map(|encoding| encoding.decode(bytes).map(|text| (text, *encoding)))
}

/// `book.txt` -> `book_sanitized.txt`
pub fn sanitized_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, SANITIZED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, SANITIZED_SUFFIX),
    };
    input.with_file_name(name)
}

/// A repaired UTF-8 copy of an input file
#[derive(Debug, Clone)]
pub struct SanitizedFile {
    pub path: PathBuf,
    pub encoding: SourceEncoding,
}

/// Read `input`, decode it, repair the text and write the sibling
/// `_sanitized` copy as UTF-8.
pub fn sanitize_file(input: &Path) -> Result<SanitizedFile, SanitizeError> {
    let bytes = fs::read(input).map_err(|source| SanitizeError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let (content, encoding) = decode_with_fallback(&bytes).ok_or_else(|| SanitizeError::Decode {
        path: input.to_path_buf(),
    })?;
    log::debug!("Decoded {} as {}", input.display(), encoding.name());

    let fixed = fix_text(&content);

    let path = sanitized_path(input);
    fs::write(&path, fixed).map_err(|source| SanitizeError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(SanitizedFile { path, encoding })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitized_path() {
        assert_eq!(
            sanitized_path(Path::new("/books/a.txt")),
            PathBuf::from("/books/a_sanitized.txt")
        );
        assert_eq!(
            sanitized_path(Path::new("/books/my.novel.epub")),
            PathBuf::from("/books/my.novel_sanitized.epub")
        );
        assert_eq!(
            sanitized_path(Path::new("/books/README")),
            PathBuf::from("/books/README_sanitized")
        );
    }

    #[test]
    fn test_decode_prefers_utf8() {
        let (text, encoding) = decode_with_fallback("naïve".as_bytes()).unwrap();
        assert_eq!(text, "naïve");
        assert_eq!(encoding, SourceEncoding::Utf8);
    }

    #[test]
    fn test_decode_falls_back_to_cp1252() {
        // 0x93/0x94 are curly quotes and 0xE9 is é in cp1252, none valid UTF-8 here
        let bytes = b"\x93caf\xe9\x94";
        let (text, encoding) = decode_with_fallback(bytes).unwrap();
        assert_eq!(text, "\u{201c}caf\u{e9}\u{201d}");
        assert_eq!(encoding, SourceEncoding::Windows1252);
    }

    #[test]
    fn test_decode_falls_back_to_latin1() {
        // 0x81 is unassigned in cp1252
        let bytes = b"\x81caf\xe9";
        let (text, encoding) = decode_with_fallback(bytes).unwrap();
        assert_eq!(text, "\u{81}caf\u{e9}");
        assert_eq!(encoding, SourceEncoding::Latin1);
    }

    #[test]
    fn test_sanitize_file_writes_utf8_copy() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("story.txt");
        fs::write(&input, b"Caf\xe9 \x93ol\xe9\x94\r\n").unwrap();

        let sanitized = sanitize_file(&input).unwrap();

        assert_eq!(sanitized.path, dir.path().join("story_sanitized.txt"));
        assert_eq!(sanitized.encoding, SourceEncoding::Windows1252);
        let content = fs::read_to_string(&sanitized.path).unwrap();
        assert_eq!(content, "Café \"olé\"\n");
        // the original is untouched
        assert_eq!(fs::read(&input).unwrap(), b"Caf\xe9 \x93ol\xe9\x94\r\n");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("mojibake.txt");
        fs::write(&input, "donâ€™t panic, cafÃ©\r\n").unwrap();

        let first = sanitize_file(&input).unwrap();
        let once = fs::read_to_string(&first.path).unwrap();
        let second = sanitize_file(&first.path).unwrap();
        let twice = fs::read_to_string(&second.path).unwrap();

        assert_eq!(once, "don't panic, café\n");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = sanitize_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, SanitizeError::Read { .. }));
    }
}
