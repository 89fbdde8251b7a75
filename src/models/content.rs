//! Content keys and locales.

use serde::{Deserialize, Serialize};

/// Suffix appended to a content key for its Tamil counterpart.
const TAMIL_SUFFIX: &str = "_ta";

/// One logical collection or document of site content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKey {
    Team,
    Events,
    Sermons,
    Services,
    Gallery,
    Categories,
    Prayers,
    About,
    Home,
    Contact,
    Donate,
}

impl ContentKey {
    pub const ALL: [ContentKey; 11] = [
        ContentKey::Team,
        ContentKey::Events,
        ContentKey::Sermons,
        ContentKey::Services,
        ContentKey::Gallery,
        ContentKey::Categories,
        ContentKey::Prayers,
        ContentKey::About,
        ContentKey::Home,
        ContentKey::Contact,
        ContentKey::Donate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKey::Team => "team",
            ContentKey::Events => "events",
            ContentKey::Sermons => "sermons",
            ContentKey::Services => "services",
            ContentKey::Gallery => "gallery",
            ContentKey::Categories => "categories",
            ContentKey::Prayers => "prayers",
            ContentKey::About => "about",
            ContentKey::Home => "home",
            ContentKey::Contact => "contact",
            ContentKey::Donate => "donate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }

    /// Whether the stored value is an ordered list of records (as opposed to a single record).
    pub fn is_list(&self) -> bool {
        !matches!(
            self,
            ContentKey::About | ContentKey::Home | ContentKey::Contact | ContentKey::Donate
        )
    }

    /// The storage key for this content in the given locale.
    pub fn in_locale(self, locale: Locale) -> LocaleKey {
        LocaleKey { base: self, locale }
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported site languages. English is the canonical locale.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ta,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ta => "ta",
        }
    }

    /// Parse a two-letter locale code; anything but `en` or `ta` is rejected.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Locale::En),
            "ta" => Some(Locale::Ta),
            _ => None,
        }
    }
}

/// A content key qualified by locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocaleKey {
    pub base: ContentKey,
    pub locale: Locale,
}

impl LocaleKey {
    /// Name under which this value is persisted in every storage tier.
    pub fn storage_key(&self) -> String {
        storage_key(self.base.as_str(), self.locale)
    }
}

/// Derive the storage key of `base` in `locale`.
pub fn storage_key(base: &str, locale: Locale) -> String {
    match locale {
        Locale::En => base.to_string(),
        Locale::Ta => format!("{}{}", base, TAMIL_SUFFIX),
    }
}
