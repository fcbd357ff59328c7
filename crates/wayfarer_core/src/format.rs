use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};

/// A target plugin configuration the engine knows how to own a part of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Achievements,
    ConditionalEvents,
    Tab,
    MobLeveling,
    LoreBooks,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Achievements,
        Format::ConditionalEvents,
        Format::Tab,
        Format::MobLeveling,
        Format::LoreBooks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Achievements => "achievements",
            Self::ConditionalEvents => "conditional-events",
            Self::Tab => "tab",
            Self::MobLeveling => "mob-leveling",
            Self::LoreBooks => "lore-books",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Achievements => "achievements.yml",
            Self::ConditionalEvents => "conditional-events.yml",
            Self::Tab => "tab.yml",
            Self::MobLeveling => "mob-leveling.yml",
            Self::LoreBooks => "lore-books.yml",
        }
    }

    /// Whether the serialized output carries the server-name and
    /// start-region-command tokens that are resolved after validation.
    pub fn substitutes_tokens(&self) -> bool {
        matches!(self, Self::ConditionalEvents)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        match wanted.as_str() {
            "achievements" | "aach" => Ok(Self::Achievements),
            "conditional-events" | "events" => Ok(Self::ConditionalEvents),
            "tab" | "scoreboard" => Ok(Self::Tab),
            "mob-leveling" | "levelledmobs" => Ok(Self::MobLeveling),
            "lore-books" | "lore" => Ok(Self::LoreBooks),
            _ => Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!(
                    "unknown format '{s}', expected one of: {}",
                    Format::ALL.map(|f| f.as_str()).join(", ")
                ),
            )),
        }
    }
}
