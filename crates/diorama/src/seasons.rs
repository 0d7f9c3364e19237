//! Season and day/night transitions.
//!
//! Both commands re-derive every seasonal property from the current
//! [`SeasonalState`], so issuing one with the value already in force is
//! harmless. Colours and light levels are tweened from whatever the scene
//! shows right now; visibility and materials switch at once.

use foundation::color::Rgb;
use foundation::math::Vec3;
use gpu::Renderer;
use layers::LabelSink;
use particles::{Galaxy, StarField};
use runtime::tween::TweenQueue;
use scene::components::{DecorationKind, LightId, Visibility};
use scene::palette;
use scene::{Season, SeasonalState};

use crate::context::Diorama;

/// Scene value driven by a running transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TweenKey {
    Background,
    Ground,
    Light(LightId),
    WindowGlow,
    SmokeOpacity,
}

/// Pending colour and level transitions.
#[derive(Debug, Clone, Default)]
pub struct Transitions {
    pub colors: TweenQueue<TweenKey, Rgb>,
    pub levels: TweenQueue<TweenKey, f32>,
}

impl Transitions {
    pub fn is_idle(&self) -> bool {
        self.colors.is_empty() && self.levels.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Apply {
    /// Write target values directly (startup).
    Instant,
    Animated,
}

impl<R: Renderer, S: LabelSink> Diorama<R, S> {
    pub fn set_season(&mut self, season: Season) {
        let from = self.state.season;
        self.state.season = season;
        if let Some(stars) = &self.fields.stars {
            if stars.season() != season {
                self.fields.stars = Some(StarField::generate(
                    season,
                    self.config.particles.stars,
                    self.config.seed,
                ));
                tracing::debug!(%season, "regenerated star field");
            }
        }
        self.apply_state(Apply::Animated);
        tracing::info!(%from, to = %season, night = self.state.is_night, "season changed");
    }

    pub fn toggle_day_night(&mut self) {
        self.state.is_night = !self.state.is_night;
        self.apply_state(Apply::Animated);
        tracing::info!(
            season = %self.state.season,
            night = self.state.is_night,
            "day/night toggled"
        );
    }

    pub fn state(&self) -> SeasonalState {
        self.state
    }

    pub(crate) fn apply_state(&mut self, mode: Apply) {
        let SeasonalState { season, is_night } = self.state;
        if is_night {
            self.ensure_stars();
        }
        if is_night && season == Season::Summer {
            self.ensure_galaxy();
        }
        self.apply_visibility(season, is_night);
        self.apply_materials(season);
        self.apply_lighting(season, is_night, mode);
        self.labels.set_season(season, &mut self.sink);
    }

    fn ensure_stars(&mut self) {
        if self.fields.stars.is_none() {
            let season = self.state.season;
            let stars = StarField::generate(season, self.config.particles.stars, self.config.seed);
            tracing::debug!(%season, count = stars.len(), "created star field");
            self.fields.stars = Some(stars);
        }
    }

    fn ensure_galaxy(&mut self) {
        if self.fields.galaxy.is_none() {
            let galaxy = Galaxy::generate(self.config.particles.galaxy, self.config.seed);
            self.world.set_transform(self.handles.galaxy, galaxy.transform());
            tracing::debug!(count = galaxy.field().len(), "created galaxy");
            self.fields.galaxy = Some(galaxy);
        }
    }

    fn apply_visibility(&mut self, season: Season, is_night: bool) {
        let winter = season == Season::Winter;
        for (entity, tag) in self.world.season_tagged() {
            self.world
                .set_visibility(entity, Visibility::in_season(tag, season));
        }
        self.world.set_visible(self.handles.snow_roof, winter);
        self.world.set_visible(self.handles.smoke, winter);
        self.world
            .set_visible(self.handles.stars, is_night && self.fields.stars.is_some());
        self.world.set_visible(
            self.handles.galaxy,
            is_night && season == Season::Summer && self.fields.galaxy.is_some(),
        );
        for decoration in &self.handles.decorations {
            let visible = decoration.kind == DecorationKind::Stone || !winter;
            for part in &decoration.parts {
                self.world.set_visible(*part, visible);
            }
        }
    }

    fn apply_materials(&mut self, season: Season) {
        let winter = season == Season::Winter;
        let (surface, roughness) = if winter {
            (palette::SNOW_COVER, palette::SNOW_ROUGHNESS)
        } else {
            (palette::WOOD, palette::WOOD_ROUGHNESS)
        };
        for board in &self.handles.boards {
            if let Some(material) = self.world.material_mut(*board) {
                material.color = surface;
                material.roughness = roughness;
            }
        }

        let (rail_color, rail_roughness, rail_scale) = if winter {
            (palette::SNOW_COVER, palette::SNOW_ROUGHNESS, palette::SNOW_RAILING_SCALE)
        } else {
            (palette::WOOD, palette::RAILING_ROUGHNESS, 1.0)
        };
        for rail in &self.handles.railings {
            if let Some(material) = self.world.material_mut(*rail) {
                material.color = rail_color;
                material.roughness = rail_roughness;
            }
            if let Some(transform) = self.world.transform_mut(*rail) {
                transform.scale = Vec3::new(rail_scale, 1.0, rail_scale);
            }
        }

        for decoration in &self.handles.decorations {
            let (color, parts) = match decoration.kind {
                DecorationKind::Stone => (
                    Some(if winter { palette::SNOW_COVER } else { palette::STONE }),
                    &decoration.parts[..],
                ),
                DecorationKind::Flower => (
                    palette::flower_color(season, decoration.index),
                    decoration.parts.get(1..).unwrap_or_default(),
                ),
                DecorationKind::Grass => (palette::grass_color(season), &decoration.parts[..]),
            };
            let Some(color) = color else { continue };
            for part in parts {
                if let Some(material) = self.world.material_mut(*part) {
                    material.color = color;
                }
            }
        }

        if let Some(material) = self.world.material_mut(self.handles.smoke) {
            material.point_size = palette::SMOKE_POINT_SIZE;
        }
    }

    fn apply_lighting(&mut self, season: Season, is_night: bool, mode: Apply) {
        self.retarget_color(
            TweenKey::Background,
            palette::sky_color(season, is_night),
            palette::COLOR_TRANSITION_S,
            mode,
        );
        self.retarget_color(
            TweenKey::Ground,
            palette::ground_color(season),
            palette::COLOR_TRANSITION_S,
            mode,
        );

        self.retarget_level(
            TweenKey::Light(self.handles.ambient),
            palette::ambient_intensity(is_night),
            palette::COLOR_TRANSITION_S,
            mode,
        );
        let seasonal = self.handles.seasonal_lights.clone();
        for (light_season, id) in seasonal {
            self.retarget_level(
                TweenKey::Light(id),
                palette::seasonal_light_intensity(light_season, season, is_night),
                palette::COLOR_TRANSITION_S,
                mode,
            );
        }

        let (glow, intensity) = palette::window_emissive(is_night);
        for window in &self.handles.windows {
            if let Some(material) = self.world.material_mut(*window) {
                material.emissive = glow;
            }
        }
        self.retarget_level(
            TweenKey::WindowGlow,
            intensity,
            palette::GLOW_TRANSITION_S,
            mode,
        );

        if season == Season::Winter {
            self.retarget_level(
                TweenKey::SmokeOpacity,
                palette::SMOKE_OPACITY,
                palette::COLOR_TRANSITION_S,
                mode,
            );
        } else {
            self.retarget_level(TweenKey::SmokeOpacity, 0.0, 0.0, Apply::Instant);
        }
    }

    fn retarget_color(&mut self, key: TweenKey, to: Rgb, duration_s: f64, mode: Apply) {
        match (mode, self.read_color(key)) {
            (Apply::Animated, Some(from)) => {
                self.transitions
                    .colors
                    .schedule(key, from, to, self.now, duration_s);
            }
            _ => {
                self.transitions.colors.cancel(key);
                self.write_color(key, to);
            }
        }
    }

    fn retarget_level(&mut self, key: TweenKey, to: f32, duration_s: f64, mode: Apply) {
        match (mode, self.read_level(key)) {
            (Apply::Animated, Some(from)) => {
                self.transitions
                    .levels
                    .schedule(key, from, to, self.now, duration_s);
            }
            _ => {
                self.transitions.levels.cancel(key);
                self.write_level(key, to);
            }
        }
    }

    fn read_color(&self, key: TweenKey) -> Option<Rgb> {
        match key {
            TweenKey::Background => Some(self.world.background),
            TweenKey::Ground => self.world.material(self.handles.terrain).map(|m| m.color),
            _ => None,
        }
    }

    fn write_color(&mut self, key: TweenKey, value: Rgb) {
        match key {
            TweenKey::Background => self.world.background = value,
            TweenKey::Ground => {
                if let Some(material) = self.world.material_mut(self.handles.terrain) {
                    material.color = value;
                }
            }
            _ => tracing::debug!(?key, "colour written to a level key"),
        }
    }

    fn read_level(&self, key: TweenKey) -> Option<f32> {
        match key {
            TweenKey::Light(id) => self.world.light(id).map(|light| light.intensity),
            TweenKey::WindowGlow => self
                .handles
                .windows
                .first()
                .and_then(|w| self.world.material(*w))
                .map(|m| m.emissive_intensity),
            TweenKey::SmokeOpacity => self.world.material(self.handles.smoke).map(|m| m.opacity),
            TweenKey::Background | TweenKey::Ground => None,
        }
    }

    fn write_level(&mut self, key: TweenKey, value: f32) {
        match key {
            TweenKey::Light(id) => {
                if let Some(light) = self.world.light_mut(id) {
                    light.intensity = value;
                }
            }
            TweenKey::WindowGlow => {
                for window in &self.handles.windows {
                    if let Some(material) = self.world.material_mut(*window) {
                        material.emissive_intensity = value;
                    }
                }
            }
            TweenKey::SmokeOpacity => {
                if let Some(material) = self.world.material_mut(self.handles.smoke) {
                    material.opacity = value;
                }
            }
            TweenKey::Background | TweenKey::Ground => {
                tracing::debug!(?key, "level written to a colour key")
            }
        }
    }

    /// Applies every running transition at the current frame time.
    pub(crate) fn advance_transitions(&mut self) {
        for (key, value) in self.transitions.colors.advance(self.now) {
            self.write_color(key, value);
        }
        for (key, value) in self.transitions.levels.advance(self.now) {
            self.write_level(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DioramaConfig;
    use crate::context::HeadlessDiorama;
    use pretty_assertions::assert_eq;

    fn config() -> DioramaConfig {
        let mut config = DioramaConfig::default();
        config.particles.petals = 40;
        config.particles.leaves = 40;
        config.particles.snow = 40;
        config.particles.stars = 30;
        config.particles.galaxy = 200;
        config
    }

    fn diorama(config: DioramaConfig) -> HeadlessDiorama {
        let mut d = HeadlessDiorama::headless(config).unwrap();
        d.step(1.0 / 60.0).unwrap();
        d
    }

    fn settle(d: &mut HeadlessDiorama) {
        d.step(2.0).unwrap();
        assert!(d.transitions.is_idle());
    }

    fn light_level(d: &HeadlessDiorama, season: Season) -> f32 {
        let (_, id) = d
            .handles
            .seasonal_lights
            .iter()
            .find(|(s, _)| *s == season)
            .copied()
            .unwrap();
        d.world.light(id).unwrap().intensity
    }

    #[test]
    fn startup_applies_state_without_animation() {
        let d = HeadlessDiorama::headless(config()).unwrap();
        assert!(d.transitions.is_idle());
        assert_eq!(d.world.background, palette::sky_color(Season::Spring, false));
        assert_eq!(light_level(&d, Season::Spring), 1.0);
        assert_eq!(light_level(&d, Season::Winter), 0.0);
        assert!(!d.world.is_visible(d.handles.snow_ground));
        assert!(!d.world.is_visible(d.handles.smoke));
    }

    #[test]
    fn toggle_then_winter_reaches_winter_night() {
        let mut d = diorama(config());
        d.toggle_day_night();
        d.set_season(Season::Winter);
        settle(&mut d);

        assert_eq!(d.state(), SeasonalState::new(Season::Winter, true));
        assert!((light_level(&d, Season::Winter) - 0.3).abs() < 1e-6);
        assert_eq!(light_level(&d, Season::Spring), 0.0);
        assert!(d.world.is_visible(d.handles.smoke));
        assert!(d.world.is_visible(d.handles.snow_ground));
        assert!(d.world.is_visible(d.handles.snow_roof));
        assert!(!d.world.is_visible(d.handles.galaxy));
        assert!(d.world.is_visible(d.handles.stars));
        assert_eq!(d.world.background, palette::sky_color(Season::Winter, true));
        let smoke = d.world.material(d.handles.smoke).unwrap();
        assert_eq!(smoke.opacity, palette::SMOKE_OPACITY);
    }

    #[test]
    fn colours_tween_over_the_transition() {
        let mut d = diorama(config());
        let from = d.world.background;
        let to = palette::sky_color(Season::Autumn, false);
        d.set_season(Season::Autumn);
        assert_eq!(d.world.background, from);

        d.step(0.75).unwrap();
        assert_ne!(d.world.background, from);
        assert_ne!(d.world.background, to);

        d.step(0.75).unwrap();
        assert_eq!(d.world.background, to);
    }

    #[test]
    fn last_scheduled_transition_wins() {
        let mut d = diorama(config());
        d.set_season(Season::Summer);
        d.step(0.3).unwrap();
        d.set_season(Season::Autumn);
        settle(&mut d);
        assert_eq!(d.world.background, palette::sky_color(Season::Autumn, false));
        assert_eq!(light_level(&d, Season::Summer), 0.0);
        assert_eq!(light_level(&d, Season::Autumn), 1.0);
    }

    #[test]
    fn repeating_a_season_is_a_no_op() {
        let mut once = diorama(config());
        once.set_season(Season::Winter);
        settle(&mut once);

        let mut twice = diorama(config());
        twice.set_season(Season::Winter);
        twice.set_season(Season::Winter);
        settle(&mut twice);

        assert_eq!(once.state(), twice.state());
        assert_eq!(once.world, twice.world);
        assert_eq!(once.fields, twice.fields);
    }

    #[test]
    fn winter_dresses_the_path() {
        let mut d = diorama(config());
        d.set_season(Season::Winter);
        for rail in &d.handles.railings {
            let transform = d.world.transform(*rail).unwrap();
            assert_eq!(transform.scale.x, palette::SNOW_RAILING_SCALE);
            assert_eq!(d.world.material(*rail).unwrap().roughness, palette::SNOW_ROUGHNESS);
        }
        for board in &d.handles.boards {
            assert_eq!(d.world.material(*board).unwrap().color, palette::SNOW_COVER);
        }
        for decoration in &d.handles.decorations {
            let visible = d.world.is_visible(decoration.parts[0]);
            assert_eq!(visible, decoration.kind == DecorationKind::Stone);
        }

        d.set_season(Season::Summer);
        for rail in &d.handles.railings {
            assert_eq!(d.world.transform(*rail).unwrap().scale, Vec3::new(1.0, 1.0, 1.0));
            assert_eq!(d.world.material(*rail).unwrap().color, palette::WOOD);
        }
        for decoration in &d.handles.decorations {
            assert!(d.world.is_visible(decoration.parts[0]));
            if decoration.kind == DecorationKind::Flower {
                let head = d.world.material(decoration.parts[1]).unwrap().color;
                assert_eq!(Some(head), palette::flower_color(Season::Summer, decoration.index));
            }
        }
    }

    #[test]
    fn only_the_current_season_objects_are_visible() {
        let mut d = diorama(config());
        d.set_season(Season::Autumn);
        for (entity, tag) in d.world.season_tagged() {
            assert_eq!(d.world.is_visible(entity), tag == Season::Autumn);
        }
        let labels = d.labels.anchors();
        for anchor in labels {
            let displayed = d.sink.displayed.get(&anchor.handle).copied();
            assert_eq!(displayed, Some(anchor.season == Season::Autumn));
        }
    }

    #[test]
    fn sky_fields_are_created_on_demand() {
        let mut config = config();
        config.particles.preload_stars = false;
        let mut d = diorama(config);
        assert!(d.fields.stars.is_none());

        d.toggle_day_night();
        assert_eq!(d.fields.stars.as_ref().map(|s| s.season()), Some(Season::Spring));
        assert!(d.fields.galaxy.is_none());

        d.set_season(Season::Summer);
        assert_eq!(d.fields.stars.as_ref().map(|s| s.season()), Some(Season::Summer));
        assert!(d.fields.galaxy.is_some());
        assert!(d.world.is_visible(d.handles.galaxy));

        d.toggle_day_night();
        assert!(!d.world.is_visible(d.handles.galaxy));
        assert!(!d.world.is_visible(d.handles.stars));
    }

    #[test]
    fn windows_glow_at_night() {
        let mut d = diorama(config());
        d.toggle_day_night();
        settle(&mut d);
        for window in &d.handles.windows {
            let material = d.world.material(*window).unwrap();
            assert_eq!(material.emissive, palette::WINDOW_GLOW);
            assert_eq!(material.emissive_intensity, palette::WINDOW_GLOW_INTENSITY);
        }
    }
}
