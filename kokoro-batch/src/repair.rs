//! Text repair applied to every file before synthesis.
//!
//! Handles the usual damage found in text pulled out of ebooks and web
//! pages: UTF-8 that was decoded as Windows-1252 somewhere along the way
//! ("mojibake"), stray terminal escapes, HTML entities, odd line breaks,
//! control characters, ligatures, full-width forms and curly quotes.
//! The result is NFC-normalized.

use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").unwrap());

/// Repair `text`. Idempotent: repairing the output again changes nothing.
///
/// Passes repeat until the text stops changing. Every changing pass
/// either shortens the text or consumes characters no later pass
/// produces, so the loop ends.
pub fn fix_text(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = fix_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn fix_pass(text: &str) -> String {
    let text = ANSI_ESCAPE.replace_all(text, "");
    let text = if text.contains('<') {
        text.into_owned()
    } else {
        html_escape::decode_html_entities(&text).into_owned()
    };
    let text = fix_mojibake(&text);
    let text: String = text.chars().filter_map(fix_c1_control).collect();
    let text = fix_line_breaks(&text);
    let text: String = text.chars().filter(|c| !is_removable_control(*c)).collect();
    let text = fix_ligatures(&text);
    let text: String = text.chars().map(fix_width).map(uncurl_quote).collect();
    text.nfc().collect()
}

/// Byte this character would have been in Windows-1252, or Latin-1 for
/// the C1 range that Windows-1252 leaves undefined
fn legacy_byte(c: char) -> Option<u8> {
    let cp = c as u32;
    if (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    if cp < 0x80 {
        return None;
    }
    let mut buf = [0u8; 4];
    let (bytes, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    if !unmappable && bytes.len() == 1 && bytes[0] >= 0x80 {
        return Some(bytes[0]);
    }
    if (0x80..=0x9F).contains(&cp) {
        return Some(cp as u8);
    }
    None
}

fn utf8_sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Re-decode runs of characters that are really UTF-8 bytes read as
/// Windows-1252. Each candidate sequence is replaced only when it forms
/// exactly one valid UTF-8 character.
fn fix_mojibake(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if let Some((c, len)) = decode_sequence_at(&chars[i..]) {
            out.push(c);
            i += len;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    out
}

fn decode_sequence_at(chars: &[char]) -> Option<(char, usize)> {
    let lead = legacy_byte(*chars.first()?)?;
    let len = utf8_sequence_len(lead)?;
    if chars.len() < len {
        return None;
    }

    let mut bytes = Vec::with_capacity(len);
    bytes.push(lead);
    for c in &chars[1..len] {
        let byte = legacy_byte(*c)?;
        if !(0x80..=0xBF).contains(&byte) {
            return None;
        }
        bytes.push(byte);
    }

    let decoded = std::str::from_utf8(&bytes).ok()?;
    let mut it = decoded.chars();
    let c = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some((c, len))
}

/// C1 controls are almost always Windows-1252 bytes read as Latin-1;
/// map them to the cp1252 character, dropping the five it leaves undefined
fn fix_c1_control(c: char) -> Option<char> {
    let cp = c as u32;
    if !(0x80..=0x9F).contains(&cp) {
        return Some(c);
    }
    let bytes = [cp as u8];
    let decoded = WINDOWS_1252.decode_without_bom_handling_and_without_replacement(&bytes)?;
    decoded.chars().next().filter(|mapped| *mapped != c)
}

fn fix_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace(['\r', '\u{2028}', '\u{2029}'], "\n")
}

fn is_removable_control(c: char) -> bool {
    match c {
        '\t' | '\n' | '\u{0c}' => false,
        '\u{feff}' => true,
        c => c.is_control() && (c as u32) < 0x80,
    }
}

fn fix_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{fb00}' => out.push_str("ff"),
            '\u{fb01}' => out.push_str("fi"),
            '\u{fb02}' => out.push_str("fl"),
            '\u{fb03}' => out.push_str("ffi"),
            '\u{fb04}' => out.push_str("ffl"),
            '\u{fb05}' | '\u{fb06}' => out.push_str("st"),
            '\u{132}' => out.push_str("IJ"),
            '\u{133}' => out.push_str("ij"),
            c => out.push(c),
        }
    }
    out
}

fn fix_width(c: char) -> char {
    match c as u32 {
        0xFF01..=0xFF5E => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        0x3000 => ' ',
        _ => c,
    }
}

fn uncurl_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' => '\'',
        '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' => '"',
        c => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixes_mojibake() {
        assert_eq!(fix_text("cafÃ©"), "café");
        assert_eq!(fix_text("Ã¼ber naÃ¯ve"), "über naïve");
        assert_eq!(fix_text("donâ€™t"), "don't");
        assert_eq!(fix_text("â€œquotedâ€\u{9d}"), "\"quoted\"");
    }

    #[test]
    fn test_fixes_double_encoded_mojibake() {
        // "é" encoded as UTF-8, misread as cp1252, twice
        assert_eq!(fix_text("cafÃƒÂ©"), "café");
    }

    #[test]
    fn test_leaves_clean_text_alone() {
        let text = "Plain text, with accents: déjà vu, Ñandú, 日本語.\n";
        assert_eq!(fix_text(text), text);
    }

    #[test]
    fn test_latin1_text_not_treated_as_mojibake() {
        assert_eq!(fix_text("Señor «hola» ¿qué?"), "Señor «hola» ¿qué?");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(fix_text("one\r\ntwo\rthree\u{2028}four"), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn test_removes_control_characters_and_bom() {
        assert_eq!(fix_text("\u{feff}start\u{7}\u{0}end\tok"), "startend\tok");
    }

    #[test]
    fn test_strips_terminal_escapes() {
        assert_eq!(fix_text("\x1b[31mred\x1b[0m text"), "red text");
    }

    #[test]
    fn test_unescapes_html_without_tags() {
        assert_eq!(fix_text("Fish &amp; chips &#8212; &#x41;"), "Fish & chips \u{2014} A");
        assert_eq!(fix_text("<b>&amp;</b>"), "<b>&amp;</b>");
        assert_eq!(fix_text("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_unescapes_named_html5_entities() {
        assert_eq!(
            fix_text("&eacute;t&eacute; &mdash; fin&hellip;"),
            "\u{e9}t\u{e9} \u{2014} fin\u{2026}"
        );
    }

    #[test]
    fn test_deeply_nested_entities_settle_in_one_call() {
        let nested = format!("&{}lt;", "amp;".repeat(10));
        let once = fix_text(&nested);
        assert_eq!(once, "<");
        assert_eq!(fix_text(&once), once);
    }

    #[test]
    fn test_c1_controls_mapped_through_cp1252() {
        assert_eq!(fix_text("price \u{80}5"), "price \u{20ac}5");
        assert_eq!(fix_text("wait\u{85}"), "wait\u{2026}");
        assert_eq!(fix_text("\u{99} mark"), "\u{2122} mark");
        assert_eq!(fix_text("\u{96} dash"), "\u{2013} dash");
    }

    #[test]
    fn test_undefined_c1_controls_removed() {
        assert_eq!(fix_text("price \u{80}5 \u{81}x"), "price \u{20ac}5 x");
        assert_eq!(fix_text("a\u{8d}b\u{8f}c\u{90}d\u{9d}e"), "abcde");
        let fixed = fix_text("\u{80}\u{81}\u{8a}\u{9f}");
        assert!(!fixed.chars().any(|c| ('\u{80}'..='\u{9f}').contains(&c)));
    }

    #[test]
    fn test_ligatures_width_and_quotes() {
        assert_eq!(fix_text("\u{fb01}ne \u{fb02}ow"), "fine flow");
        assert_eq!(fix_text("ＡＢＣ\u{3000}１２"), "ABC 12");
        assert_eq!(fix_text("\u{2018}a\u{2019} \u{201c}b\u{201d}"), "'a' \"b\"");
    }

    #[test]
    fn test_nfc_normalization() {
        assert_eq!(fix_text("e\u{301}"), "\u{e9}");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "cafÃƒÂ©",
            "&amp;lt;tag&amp;gt;",
            "â€œQuoteâ€\u{9d} and ï¬\u{81}ne",
            "\u{feff}Ã\r\n¡ mixed \x1b[1mbold",
            "ＡＢＣ &#65313;",
        ];
        for sample in samples {
            let once = fix_text(sample);
            assert_eq!(fix_text(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
