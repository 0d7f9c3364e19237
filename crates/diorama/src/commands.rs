//! Serializable input commands and the UI snapshot, so a session can be
//! scripted from JSON and replayed headless.

use foundation::math::Vec2;
use gpu::Renderer;
use layers::{LabelHandle, LabelSink, PointerMode};
use scene::palette;
use scene::Season;
use serde::{Deserialize, Serialize};

use crate::context::Diorama;
use crate::error::DioramaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetSeason { season: Season },
    ToggleDayNight,
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    TouchStart { touches: Vec<[f64; 2]> },
    TouchMove { touches: Vec<[f64; 2]> },
    TouchEnd { remaining: Vec<[f64; 2]> },
    Wheel { delta_y: f64 },
    Resize { width: u32, height: u32, pixel_ratio: f64 },
    Click,
    /// Runs frames at `dt_s` until `seconds` of host time have passed.
    Wait { seconds: f64, dt_s: f64 },
}

impl Command {
    /// Parses a JSON array of commands.
    pub fn script_from_json(text: &str) -> Result<Vec<Command>, DioramaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn apply<R: Renderer, S: LabelSink>(&self, d: &mut Diorama<R, S>) -> Result<(), DioramaError> {
        match self {
            Command::SetSeason { season } => d.set_season(*season),
            Command::ToggleDayNight => d.toggle_day_night(),
            Command::PointerDown { x, y } => d.pointer_down(*x, *y),
            Command::PointerMove { x, y } => d.pointer_move(*x, *y),
            Command::PointerUp => d.pointer_up(),
            Command::TouchStart { touches } => d.touch_start(&points(touches)),
            Command::TouchMove { touches } => d.touch_move(&points(touches)),
            Command::TouchEnd { remaining } => d.touch_end(&points(remaining)),
            Command::Wheel { delta_y } => d.wheel(*delta_y),
            Command::Resize {
                width,
                height,
                pixel_ratio,
            } => d.resize(*width, *height, *pixel_ratio),
            Command::Click => d.click(),
            Command::Wait { seconds, dt_s } => {
                if !dt_s.is_finite() || *dt_s <= 0.0 {
                    return Err(DioramaError::Config("wait step must be positive".into()));
                }
                if !seconds.is_finite() || *seconds < 0.0 {
                    return Err(DioramaError::Config(format!(
                        "wait length must be a finite number of seconds, got {seconds}"
                    )));
                }
                let mut left = *seconds;
                while left > 1e-9 {
                    let dt = dt_s.min(left);
                    d.step(dt)?;
                    left -= dt;
                }
            }
        }
        Ok(())
    }
}

fn points(raw: &[[f64; 2]]) -> Vec<Vec2> {
    raw.iter().map(|[x, y]| Vec2::new(*x, *y)).collect()
}

/// What the page chrome shows: title glyph, toggle icon, accent colour,
/// hint overlay and the labels currently up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub season: Season,
    pub is_night: bool,
    pub glyph: String,
    pub icon: String,
    /// CSS colour for the active season button.
    pub accent: String,
    pub hint_visible: bool,
    pub hint_opacity: f32,
    pub pointer_mode: PointerMode,
    pub visible_labels: Vec<LabelHandle>,
}

/// Camera and scene numbers for headless reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ui: UiState,
    pub time_s: f64,
    pub frames: u64,
    pub camera_position: [f64; 3],
    pub camera_distance: f64,
    pub background: String,
    pub visible_entities: usize,
    pub stars: Option<usize>,
    pub galaxy: Option<usize>,
}

impl<R: Renderer, S: LabelSink> Diorama<R, S> {
    pub fn ui_state(&self) -> UiState {
        let state = self.state;
        UiState {
            season: state.season,
            is_night: state.is_night,
            glyph: state.season.glyph().to_string(),
            icon: state.day_night_icon().to_string(),
            accent: palette::accent_color(state.season).to_css(),
            hint_visible: self.hint.visible,
            hint_opacity: if self.hint.visible {
                self.config.hint.opacity
            } else {
                0.0
            },
            pointer_mode: self.pointer_mode(),
            visible_labels: self.labels.visible_labels(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let p = self.controller.position;
        Snapshot {
            ui: self.ui_state(),
            time_s: self.now().seconds(),
            frames: self.frames_run(),
            camera_position: [p.x, p.y, p.z],
            camera_distance: p.distance(self.controller.target),
            background: self.world.background.to_css(),
            visible_entities: self.world.drawables_3d().len(),
            stars: self.fields.stars.as_ref().map(|s| s.len()),
            galaxy: self.fields.galaxy.as_ref().map(|g| g.field().len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DioramaConfig;
    use crate::context::HeadlessDiorama;
    use pretty_assertions::assert_eq;

    fn small() -> DioramaConfig {
        let mut config = DioramaConfig::default();
        config.particles.petals = 20;
        config.particles.leaves = 20;
        config.particles.snow = 20;
        config.particles.stars = 20;
        config.particles.galaxy = 50;
        config
    }

    #[test]
    fn script_parses_tagged_commands() {
        let script = Command::script_from_json(
            r#"[
                {"type": "set_season", "season": "winter"},
                {"type": "toggle_day_night"},
                {"type": "touch_start", "touches": [[10, 20], [30, 40]]},
                {"type": "wait", "seconds": 0.5, "dt_s": 0.1}
            ]"#,
        )
        .unwrap();
        assert_eq!(script[0], Command::SetSeason { season: Season::Winter });
        assert_eq!(script[1], Command::ToggleDayNight);
        assert_eq!(
            script[2],
            Command::TouchStart {
                touches: vec![[10.0, 20.0], [30.0, 40.0]]
            }
        );
        assert!(Command::script_from_json(r#"[{"type": "teleport"}]"#).is_err());
    }

    #[test]
    fn ui_state_follows_commands() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        let ui = d.ui_state();
        assert_eq!(ui.glyph, "春");
        assert_eq!(ui.icon, "sun");

        for command in [
            Command::ToggleDayNight,
            Command::SetSeason { season: Season::Autumn },
            Command::Wait { seconds: 0.5, dt_s: 0.1 },
        ] {
            command.apply(&mut d).unwrap();
        }
        let ui = d.ui_state();
        assert_eq!(ui.season, Season::Autumn);
        assert_eq!(ui.glyph, "秋");
        assert_eq!(ui.icon, "moon");
        assert_eq!(ui.accent, palette::accent_color(Season::Autumn).to_css());
        assert_eq!(d.frames_run(), 6);
    }

    #[test]
    fn zero_wait_step_is_rejected() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        let err = Command::Wait { seconds: 1.0, dt_s: 0.0 }.apply(&mut d).unwrap_err();
        assert!(matches!(err, DioramaError::Config(_)));
    }

    #[test]
    fn unbounded_waits_are_rejected_without_running_frames() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        for (seconds, dt_s) in [
            (f64::INFINITY, 0.1),
            (f64::NAN, 0.1),
            (-1.0, 0.1),
            (1.0, f64::NAN),
            (1.0, f64::INFINITY),
        ] {
            let err = Command::Wait { seconds, dt_s }.apply(&mut d).unwrap_err();
            assert!(matches!(err, DioramaError::Config(_)), "{seconds} {dt_s}");
        }
        assert_eq!(d.frames_run(), 0);
    }

    #[test]
    fn snapshot_serializes() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.step(0.1).unwrap();
        let json = serde_json::to_value(d.snapshot()).unwrap();
        assert_eq!(json["ui"]["season"], "spring");
        assert_eq!(json["frames"], 2);
        assert!(json["camera_distance"].as_f64().unwrap() > 5.0);
    }
}
