// Voices and languages understood by the Kokoro launcher

/// Voice identifiers accepted by `--voice`
pub const VOICES: &[&str] = &[
    "af_alloy",
    "af_aoede",
    "af_bella",
    "af_heart",
    "af_jessica",
    "af_kore",
    "af_nicole",
    "af_nova",
    "af_river",
    "af_sarah",
    "af_sky",
    "am_adam",
    "am_echo",
    "am_eric",
    "am_fenrir",
    "am_liam",
    "am_michael",
    "am_onyx",
    "am_puck",
    "am_santa",
    "bf_alice",
    "bf_emma",
    "bf_isabella",
    "bf_lily",
    "bm_daniel",
    "bm_fable",
    "bm_george",
    "bm_lewis",
    "ef_dora",
    "em_alex",
    "em_santa",
    "ff_siwis",
    "hf_alpha",
    "hf_beta",
    "hm_omega",
    "hm_psi",
    "if_sara",
    "im_nicola",
    "jf_alpha",
    "jf_gongitsune",
    "jf_nezumi",
    "jf_tebukuro",
    "jm_kumo",
    "pf_dora",
    "pm_alex",
    "pm_santa",
    "zf_xiaobei",
    "zf_xiaoni",
    "zf_xiaoxiao",
    "zf_xiaoyi",
];

/// A language the launcher can phonemize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Code passed to `--lang`
    pub code: &'static str,
    /// Human-readable name
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language {
        code: "en-gb",
        name: "English (British)",
    },
    Language {
        code: "en-us",
        name: "English (American)",
    },
    Language {
        code: "fr-fr",
        name: "French",
    },
    Language {
        code: "it",
        name: "Italian",
    },
    Language {
        code: "ja",
        name: "Japanese",
    },
    Language {
        code: "cmn",
        name: "Mandarin Chinese",
    },
];

pub const DEFAULT_VOICE: &str = "bf_emma";
pub const DEFAULT_LANGUAGE: &str = "en-gb";
pub const DEFAULT_SPEED: f64 = 0.8;

pub fn is_known_voice(voice: &str) -> bool {
    VOICES.contains(&voice)
}

/// Accept either a language code or a display name (case-insensitive)
pub fn resolve_language(input: &str) -> Option<&'static Language> {
    let input = input.trim();
    LANGUAGES.iter().find(|lang| {
        lang.code.eq_ignore_ascii_case(input) || lang.name.eq_ignore_ascii_case(input)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voices_are_unique() {
        let mut sorted = VOICES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), VOICES.len());
    }

    #[test]
    fn test_default_voice_is_known() {
        assert!(is_known_voice(DEFAULT_VOICE));
        assert!(is_known_voice("af_heart"));
        assert!(!is_known_voice("af_nobody"));
    }

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language("fr-fr").map(|l| l.name), Some("French"));
        assert_eq!(resolve_language("japanese").map(|l| l.code), Some("ja"));
        assert_eq!(resolve_language(" EN-US ").map(|l| l.code), Some("en-us"));
        assert_eq!(resolve_language("English (American)").map(|l| l.code), Some("en-us"));
        assert_eq!(resolve_language("Mandarin Chinese").map(|l| l.code), Some("cmn"));
        assert!(resolve_language("de").is_none());
        assert!(resolve_language("Klingon").is_none());
    }
}
