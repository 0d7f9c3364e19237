use crate::season::Season;

/// Draw flag. Entities that never had one set are drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
}

impl Visibility {
    pub fn visible() -> Self {
        Self { visible: true }
    }

    pub fn hidden() -> Self {
        Self { visible: false }
    }

    /// Shown only while `current` is the season the entity belongs to.
    pub fn in_season(tag: Season, current: Season) -> Self {
        Self {
            visible: tag == current,
        }
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        Self { visible }
    }
}

#[cfg(test)]
mod tests {
    use super::Visibility;
    use crate::season::Season;

    #[test]
    fn seasonal_visibility_matches_only_its_own_season() {
        assert!(Visibility::in_season(Season::Autumn, Season::Autumn).visible);
        assert!(!Visibility::in_season(Season::Autumn, Season::Winter).visible);
        assert_eq!(Visibility::from(false), Visibility::hidden());
    }
}
