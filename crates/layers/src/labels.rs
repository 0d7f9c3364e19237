use std::collections::BTreeMap;

use foundation::math::{Vec2, Vec3};
use foundation::time::Time;
use gpu::camera::PerspectiveCamera;
use runtime::timers::TimerQueue;
use scene::Season;
use serde::{Deserialize, Serialize};

/// Identifies one label element owned by the host page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelHandle(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnchor {
    pub handle: LabelHandle,
    pub world_position: Vec3,
    pub season: Season,
    pub text: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// NDC hit radius for mouse pointers.
    pub hit_radius_desktop: f64,
    /// NDC hit radius for touch input.
    pub hit_radius_touch: f64,
    /// Seconds a tapped label stays up on touch devices.
    pub auto_hide_s: f64,
    pub margin_px: f64,
    /// Used when the host cannot measure a label yet.
    pub fallback_size_px: [f64; 2],
    /// Viewports narrower than this count as touch devices.
    pub touch_breakpoint_px: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            hit_radius_desktop: 0.1,
            hit_radius_touch: 0.2,
            auto_hide_s: 3.0,
            margin_px: 10.0,
            fallback_size_px: [200.0, 50.0],
            touch_breakpoint_px: 768.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerMode {
    #[default]
    Desktop,
    Touch,
}

const MOBILE_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl PointerMode {
    /// Touch when the user agent names a handheld or the viewport is narrow.
    pub fn detect(user_agent: &str, viewport_width: f64, breakpoint_px: f64) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if viewport_width < breakpoint_px || MOBILE_AGENTS.iter().any(|m| ua.contains(m)) {
            PointerMode::Touch
        } else {
            PointerMode::Desktop
        }
    }
}

/// Projects world positions to normalized device coordinates.
pub trait LabelProjector {
    fn project_ndc(&self, world: Vec3) -> Option<Vec2>;
}

impl LabelProjector for PerspectiveCamera {
    fn project_ndc(&self, world: Vec3) -> Option<Vec2> {
        let ndc = self.project_to_ndc(world)?;
        if !ndc.x.is_finite() || !ndc.y.is_finite() {
            return None;
        }
        Some(Vec2::new(ndc.x, ndc.y))
    }
}

/// Host-side label elements.
pub trait LabelSink {
    /// Rendered size of the label, if the host can measure it.
    fn measure(&self, handle: LabelHandle) -> Option<[f64; 2]>;
    fn show_at(&mut self, handle: LabelHandle, position_px: [f64; 2]);
    fn hide(&mut self, handle: LabelHandle);
    /// Whether the element takes part in layout at all (season gating).
    fn set_displayed(&mut self, handle: LabelHandle, displayed: bool);
}

/// In-memory label host for headless runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryLabelSink {
    pub shown: BTreeMap<LabelHandle, [f64; 2]>,
    pub hidden: Vec<LabelHandle>,
    pub displayed: BTreeMap<LabelHandle, bool>,
    /// Reported by `measure`; `None` forces the fallback size.
    pub size: Option<[f64; 2]>,
}

impl LabelSink for MemoryLabelSink {
    fn measure(&self, _handle: LabelHandle) -> Option<[f64; 2]> {
        self.size
    }

    fn show_at(&mut self, handle: LabelHandle, position_px: [f64; 2]) {
        self.shown.insert(handle, position_px);
    }

    fn hide(&mut self, handle: LabelHandle) {
        self.shown.remove(&handle);
        self.hidden.push(handle);
    }

    fn set_displayed(&mut self, handle: LabelHandle, displayed: bool) {
        self.displayed.insert(handle, displayed);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LabelState {
    pub visible: bool,
    pub position_px: [f64; 2],
}

pub fn pointer_to_ndc(pointer_px: Vec2, viewport: [f64; 2]) -> Vec2 {
    let w = viewport[0].max(1.0);
    let h = viewport[1].max(1.0);
    Vec2::new(pointer_px.x / w * 2.0 - 1.0, -(pointer_px.y / h) * 2.0 + 1.0)
}

pub fn ndc_to_pixels(ndc: Vec2, viewport: [f64; 2]) -> [f64; 2] {
    [
        (ndc.x + 1.0) / 2.0 * viewport[0],
        -(ndc.y - 1.0) / 2.0 * viewport[1],
    ]
}

/// Keeps a label of `size` anchored at `pos` (bottom-left) on screen.
pub fn clamp_to_viewport(pos: [f64; 2], size: [f64; 2], viewport: [f64; 2], margin: f64) -> [f64; 2] {
    let [mut x, mut y] = pos;
    if x + size[0] > viewport[0] {
        x = viewport[0] - size[0] - margin;
    }
    if x < 0.0 {
        x = margin;
    }
    if y - size[1] < 0.0 {
        y = size[1] + margin;
    }
    if y > viewport[1] {
        y = viewport[1] - margin;
    }
    [x, y]
}

/// Seasonal hover/tap labels projected from the 3D scene.
#[derive(Debug, Clone)]
pub struct LabelsLayer {
    pub config: LabelConfig,
    season: Season,
    anchors: Vec<LabelAnchor>,
    states: Vec<LabelState>,
    hide_timers: TimerQueue<LabelHandle>,
}

impl LabelsLayer {
    pub fn new(config: LabelConfig, season: Season) -> Self {
        Self {
            config,
            season,
            anchors: Vec::new(),
            states: Vec::new(),
            hide_timers: TimerQueue::new(),
        }
    }

    pub fn add_anchor(
        &mut self,
        world_position: Vec3,
        season: Season,
        text: impl Into<String>,
    ) -> LabelHandle {
        let handle = LabelHandle(self.anchors.len() as u32);
        self.anchors.push(LabelAnchor {
            handle,
            world_position,
            season,
            text: text.into(),
        });
        self.states.push(LabelState::default());
        handle
    }

    pub fn anchors(&self) -> &[LabelAnchor] {
        &self.anchors
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn state(&self, handle: LabelHandle) -> Option<LabelState> {
        self.states.get(handle.0 as usize).copied()
    }

    pub fn visible_labels(&self) -> Vec<LabelHandle> {
        self.anchors
            .iter()
            .zip(&self.states)
            .filter(|(_, s)| s.visible)
            .map(|(a, _)| a.handle)
            .collect()
    }

    pub fn pending_hide(&self, handle: LabelHandle) -> Option<Time> {
        self.hide_timers.deadline(handle)
    }

    pub fn hit_radius(&self, mode: PointerMode) -> f64 {
        match mode {
            PointerMode::Desktop => self.config.hit_radius_desktop,
            PointerMode::Touch => self.config.hit_radius_touch,
        }
    }

    /// Displays only `season`'s anchors and drops any hover state.
    pub fn set_season<S: LabelSink + ?Sized>(&mut self, season: Season, sink: &mut S) {
        self.season = season;
        self.hide_timers.clear();
        for (anchor, state) in self.anchors.iter().zip(self.states.iter_mut()) {
            if state.visible {
                state.visible = false;
                sink.hide(anchor.handle);
            }
            sink.set_displayed(anchor.handle, anchor.season == season);
        }
    }

    /// Shows labels near the pointer and places them on screen.
    ///
    /// Desktop misses hide at once; touch labels stay until their timer fires.
    pub fn update_on_pointer<P, S>(
        &mut self,
        pointer_px: Vec2,
        viewport: [f64; 2],
        mode: PointerMode,
        now: Time,
        projector: &P,
        sink: &mut S,
    ) where
        P: LabelProjector + ?Sized,
        S: LabelSink + ?Sized,
    {
        let pointer = pointer_to_ndc(pointer_px, viewport);
        let radius = self.hit_radius(mode);
        for (anchor, state) in self.anchors.iter().zip(self.states.iter_mut()) {
            if anchor.season != self.season {
                continue;
            }
            let hit = projector
                .project_ndc(anchor.world_position)
                .filter(|ndc| ndc.distance(pointer) < radius);

            match hit {
                Some(ndc) => {
                    let size = sink
                        .measure(anchor.handle)
                        .filter(|s| s[0] > 0.0 && s[1] > 0.0)
                        .unwrap_or(self.config.fallback_size_px);
                    let pos = clamp_to_viewport(
                        ndc_to_pixels(ndc, viewport),
                        size,
                        viewport,
                        self.config.margin_px,
                    );
                    state.visible = true;
                    state.position_px = pos;
                    sink.show_at(anchor.handle, pos);
                    if mode == PointerMode::Touch {
                        self.hide_timers
                            .schedule(anchor.handle, now.after(self.config.auto_hide_s));
                    }
                }
                None if mode == PointerMode::Desktop => {
                    if state.visible {
                        state.visible = false;
                        sink.hide(anchor.handle);
                    }
                }
                None => {}
            }
        }
    }

    /// Fires due auto-hide timers; returns how many labels were hidden.
    pub fn advance_timers<S: LabelSink + ?Sized>(&mut self, now: Time, sink: &mut S) -> usize {
        let due = self.hide_timers.pop_due(now);
        for handle in &due {
            if let Some(state) = self.states.get_mut(handle.0 as usize) {
                state.visible = false;
            }
            sink.hide(*handle);
        }
        due.len()
    }
}

/// Anchors placed by the diorama: one tree and one effect per season, plus
/// the house and the path shown in every season.
pub fn diorama_anchors() -> Vec<(Vec3, Season, &'static str)> {
    let tree = Vec3::new(0.0, 7.0, 0.0);
    let house = Vec3::new(-5.0, 3.5, -3.0);
    let path = Vec3::new(0.0, 1.5, 2.5);
    let mut out = vec![
        (tree, Season::Spring, "樱花树 - 生命活力的象征"),
        (Vec3::new(-4.0, 3.0, 4.0), Season::Spring, "飘落的花瓣 - 生生不息"),
        (tree, Season::Summer, "茂盛的绿树 - 生命的盛放"),
        (Vec3::new(-3.0, 3.5, -2.0), Season::Summer, "蜻蜓 - 夏日的精灵"),
        (tree, Season::Autumn, "金色枫树 - 岁月的收获"),
        (Vec3::new(3.0, 4.0, 3.0), Season::Autumn, "飘落的落叶 - 季节的转换"),
        (tree, Season::Winter, "枯树 - 生命的休眠"),
        (Vec3::new(-3.0, 5.0, 3.0), Season::Winter, "雪花 - 寒冬的礼物"),
        (house, Season::Spring, "温馨小屋 - 四季守望者"),
        (house, Season::Summer, "温馨小屋 - 避暑胜地"),
        (house, Season::Autumn, "温馨小屋 - 秋日归途"),
        (house, Season::Winter, "温馨小屋 - 冬日温暖"),
    ];
    for season in Season::ALL {
        out.push((path, season, "蜿蜒木板路 - 通向温馨小屋"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Maps the x/y of a world position straight to NDC.
    struct FlatProjector;

    impl LabelProjector for FlatProjector {
        fn project_ndc(&self, world: Vec3) -> Option<Vec2> {
            if world.z < 0.0 {
                None
            } else {
                Some(Vec2::new(world.x, world.y))
            }
        }
    }

    type RecordingSink = MemoryLabelSink;

    const VIEWPORT: [f64; 2] = [1000.0, 800.0];

    /// Pointer pixel that maps to the NDC origin.
    fn center() -> Vec2 {
        Vec2::new(500.0, 400.0)
    }

    fn layer_with(anchor: Vec3) -> (LabelsLayer, LabelHandle) {
        let mut layer = LabelsLayer::new(LabelConfig::default(), Season::Spring);
        let handle = layer.add_anchor(anchor, Season::Spring, "tree");
        (layer, handle)
    }

    #[test]
    fn pointer_maps_to_ndc_and_back() {
        let ndc = pointer_to_ndc(center(), VIEWPORT);
        assert_eq!(ndc, Vec2::new(0.0, 0.0));
        let corner = pointer_to_ndc(Vec2::new(0.0, 0.0), VIEWPORT);
        assert_eq!(corner, Vec2::new(-1.0, 1.0));
        assert_eq!(ndc_to_pixels(Vec2::new(-1.0, 1.0), VIEWPORT), [0.0, 0.0]);
        assert_eq!(ndc_to_pixels(Vec2::new(1.0, -1.0), VIEWPORT), [1000.0, 800.0]);
    }

    #[test]
    fn near_anchor_is_visible_for_both_thresholds() {
        for mode in [PointerMode::Desktop, PointerMode::Touch] {
            let (mut layer, handle) = layer_with(Vec3::new(0.05, -0.02, 1.0));
            let mut sink = RecordingSink::default();
            layer.update_on_pointer(center(), VIEWPORT, mode, Time(0.0), &FlatProjector, &mut sink);
            assert!(layer.state(handle).unwrap().visible, "{mode:?}");
            assert!(sink.shown.contains_key(&handle));
        }
    }

    #[test]
    fn far_anchor_is_hidden() {
        let (mut layer, handle) = layer_with(Vec3::new(0.05, -0.02, 1.0));
        let distance = Vec2::new(0.05, -0.02).distance(Vec2::new(0.5, 0.5));
        assert!((distance - 0.6877).abs() < 1e-3);

        let mut sink = RecordingSink::default();
        let pointer = Vec2::new(750.0, 200.0);
        assert_eq!(pointer_to_ndc(pointer, VIEWPORT), Vec2::new(0.5, 0.5));
        for mode in [PointerMode::Desktop, PointerMode::Touch] {
            layer.update_on_pointer(pointer, VIEWPORT, mode, Time(0.0), &FlatProjector, &mut sink);
            assert!(!layer.state(handle).unwrap().visible);
        }
    }

    #[test]
    fn desktop_miss_hides_immediately() {
        let (mut layer, handle) = layer_with(Vec3::new(0.0, 0.0, 1.0));
        let mut sink = RecordingSink::default();
        let mode = PointerMode::Desktop;
        layer.update_on_pointer(center(), VIEWPORT, mode, Time(0.0), &FlatProjector, &mut sink);
        layer.update_on_pointer(Vec2::new(0.0, 0.0), VIEWPORT, mode, Time(0.1), &FlatProjector, &mut sink);
        assert!(!layer.state(handle).unwrap().visible);
        assert_eq!(sink.hidden, vec![handle]);
    }

    #[test]
    fn touch_label_hides_after_latest_timer() {
        let (mut layer, handle) = layer_with(Vec3::new(0.0, 0.0, 1.0));
        let mut sink = RecordingSink::default();
        let mode = PointerMode::Touch;
        layer.update_on_pointer(center(), VIEWPORT, mode, Time(0.0), &FlatProjector, &mut sink);
        layer.update_on_pointer(center(), VIEWPORT, mode, Time(2.0), &FlatProjector, &mut sink);
        assert_eq!(layer.pending_hide(handle), Some(Time(5.0)));

        // A miss on touch leaves the label alone.
        layer.update_on_pointer(Vec2::new(0.0, 0.0), VIEWPORT, mode, Time(2.5), &FlatProjector, &mut sink);
        assert!(layer.state(handle).unwrap().visible);

        assert_eq!(layer.advance_timers(Time(3.5), &mut sink), 0);
        assert!(layer.state(handle).unwrap().visible);
        assert_eq!(layer.advance_timers(Time(5.0), &mut sink), 1);
        assert!(!layer.state(handle).unwrap().visible);
        assert_eq!(layer.pending_hide(handle), None);
    }

    #[test]
    fn other_season_anchors_are_not_evaluated() {
        let mut layer = LabelsLayer::new(LabelConfig::default(), Season::Spring);
        let winter = layer.add_anchor(Vec3::new(0.0, 0.0, 1.0), Season::Winter, "snow");
        let mut sink = RecordingSink::default();
        layer.update_on_pointer(center(), VIEWPORT, PointerMode::Desktop, Time(0.0), &FlatProjector, &mut sink);
        assert!(!layer.state(winter).unwrap().visible);
        assert!(sink.shown.is_empty());
    }

    #[test]
    fn anchors_behind_the_camera_are_skipped() {
        let (mut layer, handle) = layer_with(Vec3::new(0.0, 0.0, -1.0));
        let mut sink = RecordingSink::default();
        layer.update_on_pointer(center(), VIEWPORT, PointerMode::Touch, Time(0.0), &FlatProjector, &mut sink);
        assert!(!layer.state(handle).unwrap().visible);
    }

    #[test]
    fn placement_clamps_to_screen() {
        let viewport = [800.0, 600.0];
        let size = [200.0, 50.0];
        assert_eq!(clamp_to_viewport([700.0, 300.0], size, viewport, 10.0), [590.0, 300.0]);
        assert_eq!(clamp_to_viewport([-5.0, 300.0], size, viewport, 10.0), [10.0, 300.0]);
        assert_eq!(clamp_to_viewport([100.0, 20.0], size, viewport, 10.0), [100.0, 60.0]);
        assert_eq!(clamp_to_viewport([100.0, 650.0], size, viewport, 10.0), [100.0, 590.0]);
    }

    #[test]
    fn unmeasured_labels_use_fallback_size() {
        let (mut layer, handle) = layer_with(Vec3::new(0.95, 0.0, 1.0));
        let mut sink = RecordingSink::default();
        let pointer = Vec2::new(975.0, 400.0);
        layer.update_on_pointer(pointer, VIEWPORT, PointerMode::Desktop, Time(0.0), &FlatProjector, &mut sink);
        assert_eq!(sink.shown.get(&handle), Some(&[790.0, 400.0]));

        sink.size = Some([100.0, 20.0]);
        layer.update_on_pointer(pointer, VIEWPORT, PointerMode::Desktop, Time(0.0), &FlatProjector, &mut sink);
        assert_eq!(sink.shown.get(&handle), Some(&[890.0, 400.0]));
    }

    #[test]
    fn season_change_regates_and_clears_hover() {
        let mut layer = LabelsLayer::new(LabelConfig::default(), Season::Spring);
        let spring = layer.add_anchor(Vec3::new(0.0, 0.0, 1.0), Season::Spring, "a");
        let winter = layer.add_anchor(Vec3::new(0.0, 0.0, 1.0), Season::Winter, "b");
        let mut sink = RecordingSink::default();
        layer.update_on_pointer(center(), VIEWPORT, PointerMode::Touch, Time(0.0), &FlatProjector, &mut sink);
        assert_eq!(layer.visible_labels(), vec![spring]);

        layer.set_season(Season::Winter, &mut sink);
        assert!(layer.visible_labels().is_empty());
        assert_eq!(layer.pending_hide(spring), None);
        assert_eq!(sink.displayed.get(&spring), Some(&false));
        assert_eq!(sink.displayed.get(&winter), Some(&true));
    }

    #[test]
    fn detects_touch_devices() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(PointerMode::detect(iphone, 1200.0, 768.0), PointerMode::Touch);
        assert_eq!(PointerMode::detect("Mozilla/5.0 (X11; Linux)", 600.0, 768.0), PointerMode::Touch);
        assert_eq!(PointerMode::detect("Mozilla/5.0 (X11; Linux)", 1280.0, 768.0), PointerMode::Desktop);
    }

    #[test]
    fn every_season_gets_house_and_path_labels() {
        let anchors = diorama_anchors();
        assert_eq!(anchors.len(), 16);
        for season in Season::ALL {
            assert_eq!(anchors.iter().filter(|(_, s, _)| *s == season).count(), 4);
        }
        for (_, season, text) in &anchors {
            assert!(!text.is_ascii(), "{season}: {text}");
        }
        assert_eq!(anchors[0].2, "樱花树 - 生命活力的象征");
    }
}
