// Practice language catalogue
//
// Each language carries the tag sent to the speech collaborators, a display
// name with flag, and a default pangram used to prefill manual practice.

/// Tag used when nothing else is configured
pub const DEFAULT_LANGUAGE_TAG: &str = "en-US";

/// A supported practice language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub tag: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub default_text: &'static str,
}

impl Language {
    /// Display name as shown in the language picker, e.g. "🇺🇸 English (US)"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.flag, self.name)
    }
}

pub const LANGUAGES: &[Language] = &[
    Language {
        tag: "en-US",
        name: "English (US)",
        flag: "🇺🇸",
        default_text: "The quick brown fox jumps over the lazy dog.",
    },
    Language {
        tag: "en-GB",
        name: "English (UK)",
        flag: "🇬🇧",
        default_text: "The quick brown fox jumps over the lazy dog.",
    },
    Language {
        tag: "es-ES",
        name: "Spanish (Spain)",
        flag: "🇪🇸",
        default_text: "El zorro marrón rápido salta sobre el perro perezoso.",
    },
    Language {
        tag: "es-MX",
        name: "Spanish (Mexico)",
        flag: "🇲🇽",
        default_text: "El zorro marrón rápido salta sobre el perro perezoso.",
    },
    Language {
        tag: "fr-FR",
        name: "French (France)",
        flag: "🇫🇷",
        default_text: "Le renard brun rapide saute par-dessus le chien paresseux.",
    },
    Language {
        tag: "de-DE",
        name: "German (Germany)",
        flag: "🇩🇪",
        default_text: "Der schnelle braune Fuchs springt über den faulen Hund.",
    },
    Language {
        tag: "it-IT",
        name: "Italian (Italy)",
        flag: "🇮🇹",
        default_text: "La volpe marrone veloce salta sopra il cane pigro.",
    },
    Language {
        tag: "pt-BR",
        name: "Portuguese (Brazil)",
        flag: "🇧🇷",
        default_text: "A raposa marrom rápida pula sobre o cão preguiçoso.",
    },
    Language {
        tag: "pt-PT",
        name: "Portuguese (Portugal)",
        flag: "🇵🇹",
        default_text: "A raposa marrom rápida pula sobre o cão preguiçoso.",
    },
    Language {
        tag: "ru-RU",
        name: "Russian (Russia)",
        flag: "🇷🇺",
        default_text: "Быстрая коричневая лиса перепрыгивает через ленивую собаку.",
    },
    Language {
        tag: "ja-JP",
        name: "Japanese (Japan)",
        flag: "🇯🇵",
        default_text: "素早い茶色の狐が怠惰な犬を飛び越える。",
    },
    Language {
        tag: "ko-KR",
        name: "Korean (Korea)",
        flag: "🇰🇷",
        default_text: "빠른 갈색 여우가 게으른 개를 뛰어넘는다.",
    },
    Language {
        tag: "zh-CN",
        name: "Chinese (Mandarin)",
        flag: "🇨🇳",
        default_text: "敏捷的棕色狐狸跳过懒惰的狗。",
    },
    Language {
        tag: "ar-SA",
        name: "Arabic (Saudi Arabia)",
        flag: "🇸🇦",
        default_text: "الثعلب البني السريع يقفز فوق الكلب الكسول.",
    },
    Language {
        tag: "hi-IN",
        name: "Hindi (India)",
        flag: "🇮🇳",
        default_text: "तेज़ भूरी लोमड़ी आलसी कुत्ते के ऊपर कूदती है।",
    },
    Language {
        tag: "pl-PL",
        name: "Polish (Poland)",
        flag: "🇵🇱",
        default_text: "Szybki brązowy lis przeskakuje nad leniwym psem.",
    },
];

/// Look up a language by its tag
pub fn find_language(tag: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|language| language.tag == tag)
}

/// Catalogue entry for the default language
pub fn default_language() -> &'static Language {
    &LANGUAGES[0]
}

/// Display name for a tag, falling back to the default language's
pub fn display_name_for(tag: &str) -> String {
    find_language(tag)
        .unwrap_or_else(default_language)
        .display_name()
}
