//! Static voice catalog
//!
//! Compiled-in list of the voices this crate is known to work with, grouped
//! by language family. Add a voice by appending a row to [`VOICES`]; the
//! per-language counts in [`list_languages`] are derived from it.

use serde::Serialize;

use LanguageFamily::{Chinese, English, Japanese, Korean};
use VoiceGender::{Female, Male};

/// Voice gender classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    /// Male voice
    Male,
    /// Female voice
    Female,
}

/// Language family used to group the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageFamily {
    /// Chinese voices
    Chinese,
    /// English voices
    English,
    /// Japanese voices
    Japanese,
    /// Korean voices
    Korean,
}

impl LanguageFamily {
    /// All families in catalog order
    pub const ALL: [Self; 4] = [Self::Chinese, Self::English, Self::Japanese, Self::Korean];
}

/// A single catalog voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceEntry {
    /// Voice identifier as understood by the Edge service
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Voice gender
    pub gender: VoiceGender,
    /// Language tag
    pub lang: &'static str,
    /// Grouping family
    #[serde(skip)]
    pub family: LanguageFamily,
}

/// Summary row for one supported language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    /// Language tag
    pub code: &'static str,
    /// Display name in the language itself
    pub name: &'static str,
    /// Number of catalog voices speaking this language
    pub voice_count: usize,
}

/// Voices grouped by language family
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceCatalog {
    /// Chinese voices
    pub chinese: Vec<VoiceEntry>,
    /// English voices
    pub english: Vec<VoiceEntry>,
    /// Japanese voices
    pub japanese: Vec<VoiceEntry>,
    /// Korean voices
    pub korean: Vec<VoiceEntry>,
}

impl VoiceCatalog {
    /// Voices of one family
    #[must_use]
    pub fn family(&self, family: LanguageFamily) -> &[VoiceEntry] {
        match family {
            LanguageFamily::Chinese => &self.chinese,
            LanguageFamily::English => &self.english,
            LanguageFamily::Japanese => &self.japanese,
            LanguageFamily::Korean => &self.korean,
        }
    }

    /// Iterate over every voice in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &VoiceEntry> {
        LanguageFamily::ALL
            .into_iter()
            .flat_map(move |family| self.family(family).iter())
    }

    /// Total number of voices
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a voice by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&VoiceEntry> {
        self.iter().find(|voice| voice.id == id)
    }
}

const fn voice(
    id: &'static str,
    name: &'static str,
    gender: VoiceGender,
    lang: &'static str,
    family: LanguageFamily,
) -> VoiceEntry {
    VoiceEntry {
        id,
        name,
        gender,
        lang,
        family,
    }
}

/// Every catalog voice
pub static VOICES: &[VoiceEntry] = &[
    voice("zh-CN-XiaoyiNeural", "晓伊", Female, "zh-CN", Chinese),
    voice("zh-CN-XiaoxiaoNeural", "晓晓", Female, "zh-CN", Chinese),
    voice("zh-CN-YunyangNeural", "云扬", Male, "zh-CN", Chinese),
    voice("zh-CN-YunxiNeural", "云希", Male, "zh-CN", Chinese),
    voice("en-US-MichelleNeural", "Michelle", Female, "en-US", English),
    voice("en-US-GuyNeural", "Guy", Male, "en-US", English),
    voice("en-GB-SoniaNeural", "Sonia", Female, "en-GB", English),
    voice("en-GB-RyanNeural", "Ryan", Male, "en-GB", English),
    voice("ja-JP-NanamiNeural", "七海", Female, "ja-JP", Japanese),
    voice("ja-JP-KeitaNeural", "圭太", Male, "ja-JP", Japanese),
    voice("ko-KR-SunHiNeural", "喜姬", Female, "ko-KR", Korean),
    voice("ko-KR-InJoonNeural", "仁俊", Male, "ko-KR", Korean),
];

/// Supported languages with their display names
static LANGUAGES: &[(&str, &str)] = &[
    ("zh-CN", "中文（简体）"),
    ("en-US", "English (US)"),
    ("en-GB", "English (UK)"),
    ("ja-JP", "日本語"),
    ("ko-KR", "한국어"),
];

/// Voices grouped by language family
#[must_use]
pub fn voice_catalog() -> VoiceCatalog {
    let collect = |family: LanguageFamily| -> Vec<VoiceEntry> {
        VOICES
            .iter()
            .filter(|voice| voice.family == family)
            .copied()
            .collect()
    };

    VoiceCatalog {
        chinese: collect(Chinese),
        english: collect(English),
        japanese: collect(Japanese),
        korean: collect(Korean),
    }
}

/// One summary row per supported language
#[must_use]
pub fn list_languages() -> Vec<LanguageEntry> {
    LANGUAGES
        .iter()
        .map(|&(code, name)| LanguageEntry {
            code,
            name,
            voice_count: VOICES.iter().filter(|voice| voice.lang == code).count(),
        })
        .collect()
}
