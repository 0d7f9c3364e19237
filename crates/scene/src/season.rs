use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// Single-character title shown by the UI.
    pub fn glyph(self) -> &'static str {
        match self {
            Season::Spring => "春",
            Season::Summer => "夏",
            Season::Autumn => "秋",
            Season::Winter => "冬",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeason(pub String);

impl std::fmt::Display for UnknownSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown season: {:?}", self.0)
    }
}

impl std::error::Error for UnknownSeason {}

impl std::str::FromStr for Season {
    type Err = UnknownSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            _ => Err(UnknownSeason(s.to_string())),
        }
    }
}

/// The composite season / time-of-day state (8 combinations).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeasonalState {
    pub season: Season,
    pub is_night: bool,
}

impl SeasonalState {
    pub fn new(season: Season, is_night: bool) -> Self {
        Self { season, is_night }
    }

    /// Icon name for the day/night toggle.
    pub fn day_night_icon(&self) -> &'static str {
        if self.is_night { "moon" } else { "sun" }
    }
}

#[cfg(test)]
mod tests {
    use super::{Season, SeasonalState, UnknownSeason};

    #[test]
    fn parse_roundtrip() {
        for s in Season::ALL {
            assert_eq!(s.as_str().parse::<Season>(), Ok(s));
        }
        assert_eq!(" Winter ".parse::<Season>(), Ok(Season::Winter));
        assert_eq!(
            "monsoon".parse::<Season>(),
            Err(UnknownSeason("monsoon".to_string()))
        );
    }

    #[test]
    fn glyphs_are_distinct() {
        let glyphs: std::collections::HashSet<_> = Season::ALL.iter().map(|s| s.glyph()).collect();
        assert_eq!(glyphs.len(), 4);
    }

    #[test]
    fn default_state_is_spring_day() {
        let s = SeasonalState::default();
        assert_eq!(s, SeasonalState::new(Season::Spring, false));
        assert_eq!(s.day_night_icon(), "sun");
    }
}
