use controls::{OrbitController, PointerSample};
use foundation::math::Vec2;
use foundation::time::Time;
use gpu::{PerspectiveCamera, RecordingRenderer, RenderError, Renderer};
use layers::{LabelSink, LabelsLayer, MemoryLabelSink, PointerMode, diorama_anchors};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use runtime::frame::{Clock, Frame};
use runtime::scheduler::Scheduler;
use runtime::timers::TimerQueue;
use scene::{SeasonalState, World};

use crate::config::DioramaConfig;
use crate::error::DioramaError;
use crate::prefab::{self, Fields, SceneHandles};
use crate::seasons::{Apply, Transitions};
use crate::tick;

/// Diorama with no browser attached, used by tests and the headless runner.
pub type HeadlessDiorama = Diorama<RecordingRenderer, MemoryLabelSink>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum HintEvent {
    Show,
    Hide,
}

/// The "drag to orbit" overlay: appears shortly after start, fades out, and
/// comes back briefly on every click.
#[derive(Debug, Clone, Default)]
pub struct Hint {
    pub visible: bool,
    pub(crate) timers: TimerQueue<HintEvent>,
}

/// Owns the whole diorama: scene, camera rig, seasonal state, particle
/// fields, labels, transitions and the frame loop.
pub struct Diorama<R: Renderer, S: LabelSink> {
    pub config: DioramaConfig,
    pub world: World,
    pub handles: SceneHandles,
    pub fields: Fields,
    pub camera: PerspectiveCamera,
    pub controller: OrbitController,
    pub labels: LabelsLayer,
    pub sink: S,
    pub renderer: R,
    pub transitions: Transitions,
    pub hint: Hint,
    pub(crate) state: SeasonalState,
    /// Elapsed time of the frame being run.
    pub(crate) now: Time,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) render_error: Option<RenderError>,
    pub(crate) frames: u64,
    scheduler: Scheduler<Self>,
    clock: Clock,
    host_s: Option<f64>,
    viewport: [f64; 2],
    pointer_mode: PointerMode,
    user_agent: String,
}

impl<R: Renderer, S: LabelSink> Diorama<R, S> {
    pub fn new(config: DioramaConfig, renderer: R, sink: S) -> Result<Self, DioramaError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut world = World::new();
        let (handles, fields) = prefab::build(&mut world, &config, &mut rng);

        let mut labels = LabelsLayer::new(config.labels, config.season);
        for (position, season, text) in diorama_anchors() {
            labels.add_anchor(position, season, text);
        }

        let controller = OrbitController::new(config.orbit);
        let mut camera = PerspectiveCamera::default();
        camera.look_at(controller.position, controller.target);

        let mut hint = Hint::default();
        hint.timers
            .schedule(HintEvent::Show, Time(config.hint.show_after_s));

        let mut scheduler = Scheduler::new();
        tick::register(&mut scheduler);

        let mut diorama = Self {
            state: SeasonalState::new(config.season, config.night),
            config,
            world,
            handles,
            fields,
            camera,
            controller,
            labels,
            sink,
            renderer,
            transitions: Transitions::default(),
            hint,
            now: Time(0.0),
            rng,
            render_error: None,
            frames: 0,
            scheduler,
            clock: Clock::new(),
            host_s: None,
            viewport: [1.0, 1.0],
            pointer_mode: PointerMode::Desktop,
            user_agent: String::new(),
        };
        diorama.apply_state(Apply::Instant);
        tracing::info!(
            season = %diorama.state.season,
            night = diorama.state.is_night,
            entities = diorama.world.entity_count(),
            "diorama ready"
        );
        Ok(diorama)
    }

    pub fn viewport(&self) -> [f64; 2] {
        self.viewport
    }

    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn frames_run(&self) -> u64 {
        self.frames
    }

    /// Frame jobs in the order they run.
    pub fn job_order(&mut self) -> Vec<&'static str> {
        self.scheduler.order()
    }

    /// Used together with the viewport width to tell touch devices apart.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
        self.detect_pointer_mode();
    }

    fn detect_pointer_mode(&mut self) {
        self.pointer_mode = PointerMode::detect(
            &self.user_agent,
            self.viewport[0],
            self.config.labels.touch_breakpoint_px,
        );
    }

    /// Synchronous and idempotent: camera aspect, renderer size and the
    /// controller's drag scale all follow the new client size.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: f64) {
        self.camera.set_viewport(width, height);
        self.renderer.set_size(width, height);
        self.renderer.set_pixel_ratio(pixel_ratio);
        self.controller.set_viewport(width as f64, height as f64);
        self.viewport = [width as f64, height as f64];
        self.detect_pointer_mode();
        tracing::debug!(width, height, pixel_ratio, "viewport resized");
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.controller
            .on_gesture_start(PointerSample::Mouse(Vec2::new(x, y)));
    }

    /// Drags the camera while a button is held and refreshes hover labels.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let p = Vec2::new(x, y);
        if self.controller.is_interacting() {
            self.controller.on_gesture_move(PointerSample::Mouse(p));
        }
        self.hover(p);
    }

    pub fn pointer_up(&mut self) {
        self.controller.on_gesture_end();
    }

    /// One finger orbits, two fingers pinch; a single tap also hit-tests labels.
    pub fn touch_start(&mut self, touches: &[Vec2]) {
        let Some(sample) = touch_sample(touches) else {
            return;
        };
        self.controller.on_gesture_start(sample);
        if let [tap] = touches {
            self.hit_test_labels(*tap, PointerMode::Touch);
        }
    }

    pub fn touch_move(&mut self, touches: &[Vec2]) {
        match touch_sample(touches) {
            Some(sample) => self.controller.on_gesture_move(sample),
            None => tracing::debug!("touch move without touches"),
        }
    }

    /// Lifting the last finger ends the gesture; lifting one of two leaves
    /// a single-touch orbit that re-baselines on the next move.
    pub fn touch_end(&mut self, remaining: &[Vec2]) {
        match touch_sample(remaining) {
            Some(sample) => self.controller.on_gesture_start(sample),
            None => self.controller.on_gesture_end(),
        }
    }

    /// Positive `delta_y` zooms in, negative zooms out.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y != 0.0 {
            self.controller.on_zoom_delta(delta_y);
        }
    }

    /// Label hover in whatever mode the device was detected as.
    pub fn hover(&mut self, pointer_px: Vec2) {
        self.hit_test_labels(pointer_px, self.pointer_mode);
    }

    fn hit_test_labels(&mut self, pointer_px: Vec2, mode: PointerMode) {
        self.labels.update_on_pointer(
            pointer_px,
            self.viewport,
            mode,
            self.now,
            &self.camera,
            &mut self.sink,
        );
    }

    /// A click brings the orbit hint back for a moment once it has faded.
    /// Clicks before the first reveal or while it is up change nothing.
    pub fn click(&mut self) {
        if self.hint.visible || self.hint.timers.deadline(HintEvent::Show).is_some() {
            return;
        }
        self.hint.visible = true;
        self.hint
            .timers
            .schedule(HintEvent::Hide, self.now.after(self.config.hint.reshow_s));
    }

    pub(crate) fn advance_hint(&mut self) {
        for event in self.hint.timers.pop_due(self.now) {
            match event {
                HintEvent::Show => {
                    self.hint.visible = true;
                    self.hint
                        .timers
                        .schedule(HintEvent::Hide, self.now.after(self.config.hint.visible_s));
                }
                HintEvent::Hide => self.hint.visible = false,
            }
        }
    }

    /// Runs one frame at host timestamp `now_s` (seconds).
    pub fn tick(&mut self, now_s: f64) -> Result<Frame, DioramaError> {
        self.host_s = Some(now_s);
        let frame = self.clock.tick(now_s);
        let mut scheduler = std::mem::take(&mut self.scheduler);
        scheduler.run_frame(self, frame);
        self.scheduler = scheduler;
        self.frames += 1;
        match self.render_error.take() {
            Some(err) => Err(err.into()),
            None => Ok(frame),
        }
    }

    /// Advances by `dt_s` of host time; the first call starts the clock.
    pub fn step(&mut self, dt_s: f64) -> Result<Frame, DioramaError> {
        let base = match self.host_s {
            Some(s) => s,
            None => {
                self.tick(0.0)?;
                0.0
            }
        };
        self.tick(base + dt_s.max(0.0))
    }
}

impl HeadlessDiorama {
    pub fn headless(config: DioramaConfig) -> Result<Self, DioramaError> {
        let mut diorama = Self::new(config, RecordingRenderer::default(), MemoryLabelSink::default())?;
        diorama.resize(1280, 720, 1.0);
        Ok(diorama)
    }
}

fn touch_sample(touches: &[Vec2]) -> Option<PointerSample> {
    match touches {
        [] => None,
        [one] => Some(PointerSample::Touch(*one)),
        [a, b, ..] => Some(PointerSample::Pinch(*a, *b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use controls::GestureKind;
    use pretty_assertions::assert_eq;
    use scene::Season;

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
    fn resize_updates_camera_and_renderer() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.resize(1920, 1080, 2.0);
        d.resize(800, 600, 1.0);
        assert!((d.camera.aspect - 800.0 / 600.0).abs() < 1e-12);
        assert_eq!(d.renderer.size, (800, 600));
        assert_eq!(d.renderer.pixel_ratio, 1.0);
        assert_eq!(d.controller.viewport(), Vec2::new(800.0, 600.0));

        d.resize(800, 600, 1.0);
        assert_eq!(d.renderer.size, (800, 600));
    }

    #[test]
    fn narrow_or_mobile_viewports_use_touch_mode() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        assert_eq!(d.pointer_mode(), PointerMode::Desktop);
        d.resize(600, 800, 2.0);
        assert_eq!(d.pointer_mode(), PointerMode::Touch);
        d.resize(1280, 720, 1.0);
        d.set_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)");
        assert_eq!(d.pointer_mode(), PointerMode::Touch);
    }

    #[test]
    fn dragging_orbits_on_the_next_frame() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        let before = d.controller.position;
        d.pointer_down(100.0, 100.0);
        d.pointer_move(200.0, 100.0);
        assert_eq!(d.controller.position, before);
        d.step(1.0 / 60.0).unwrap();
        assert_ne!(d.controller.position, before);
        assert_eq!(d.camera.position, d.controller.position);
        d.pointer_up();
        assert!(!d.controller.is_interacting());
    }

    #[test]
    fn pinch_then_lift_one_finger_keeps_orbiting() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.touch_start(&[Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0)]);
        d.touch_move(&[Vec2::new(75.0, 100.0), Vec2::new(225.0, 100.0)]);
        assert!((d.controller.zoom_scale - 1.0 / 0.95).abs() < 1e-12);

        d.touch_end(&[Vec2::new(225.0, 100.0)]);
        assert_eq!(
            d.controller.gesture().map(|g| g.kind),
            Some(GestureKind::SingleTouch)
        );
        d.touch_move(&[Vec2::new(230.0, 100.0)]);
        assert!(d.controller.spherical_delta.theta < 0.0);
        d.touch_end(&[]);
        assert!(!d.controller.is_interacting());
    }

    #[test]
    fn wheel_zooms_in_both_directions() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.wheel(-120.0);
        assert!((d.controller.zoom_scale - 1.0 / 0.95).abs() < 1e-12);
        d.step(0.016).unwrap();
        d.wheel(120.0);
        assert!((d.controller.zoom_scale - 0.95).abs() < 1e-12);
        d.wheel(0.0);
        assert!((d.controller.zoom_scale - 0.95).abs() < 1e-12);
    }

    #[test]
    fn hint_shows_then_hides_and_returns_on_click() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.step(1.0).unwrap();
        assert!(!d.hint.visible);
        d.step(1.5).unwrap();
        assert!(d.hint.visible);
        d.step(10.0).unwrap();
        assert!(!d.hint.visible);

        d.click();
        assert!(d.hint.visible);
        d.step(3.5).unwrap();
        assert!(!d.hint.visible);
    }

    #[test]
    fn clicks_leave_a_pending_or_showing_hint_alone() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.step(0.5).unwrap();
        d.click();
        assert!(!d.hint.visible);
        d.step(1.6).unwrap();
        assert!(d.hint.visible);

        // Up since t=2.1; a click at t=2.5 must not shorten the 10 s display.
        d.step(0.4).unwrap();
        d.click();
        d.step(4.0).unwrap();
        assert!(d.hint.visible);
        d.step(6.0).unwrap();
        assert!(!d.hint.visible);
    }

    #[test]
    fn desktop_hover_shows_only_current_season_labels() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.step(0.016).unwrap();
        let anchor = d
            .labels
            .anchors()
            .iter()
            .find(|a| a.season == Season::Spring)
            .cloned()
            .unwrap();
        let ndc = d.camera.project_to_ndc(anchor.world_position).unwrap();
        let [w, h] = d.viewport();
        let px = Vec2::new((ndc.x + 1.0) / 2.0 * w, (1.0 - ndc.y) / 2.0 * h);
        d.pointer_move(px.x, px.y);

        let visible = d.labels.visible_labels();
        assert!(visible.contains(&anchor.handle));
        for handle in visible {
            assert_eq!(d.labels.anchors()[handle.0 as usize].season, Season::Spring);
        }
        assert!(d.sink.shown.contains_key(&anchor.handle));

        d.pointer_move(-5000.0, -5000.0);
        assert!(d.labels.visible_labels().is_empty());
    }

    #[test]
    fn touch_labels_hide_after_their_timer() {
        let mut d = HeadlessDiorama::headless(small()).unwrap();
        d.resize(600, 900, 2.0);
        d.step(0.016).unwrap();
        let anchor = d
            .labels
            .anchors()
            .iter()
            .find(|a| a.season == Season::Spring)
            .cloned()
            .unwrap();
        let ndc = d.camera.project_to_ndc(anchor.world_position).unwrap();
        let [w, h] = d.viewport();
        let tap = Vec2::new((ndc.x + 1.0) / 2.0 * w, (1.0 - ndc.y) / 2.0 * h);
        d.touch_start(&[tap]);
        d.touch_end(&[]);
        assert!(d.labels.visible_labels().contains(&anchor.handle));

        d.step(1.0).unwrap();
        assert!(d.labels.visible_labels().contains(&anchor.handle));
        d.step(2.5).unwrap();
        assert!(!d.labels.visible_labels().contains(&anchor.handle));
    }
}
