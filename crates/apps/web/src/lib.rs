use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use diorama::{Diorama, DioramaConfig, DioramaError};
use foundation::math::Vec2;
use gpu::{PerspectiveCamera, RenderError, RenderFrame, Renderer};
use layers::{LabelHandle, LabelSink, diorama_anchors};
use scene::Season;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod wgpu;

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();
static LOOP_RUNNING: AtomicBool = AtomicBool::new(false);

const CANVAS_ID: &str = "diorama-canvas";
const HINT_ID: &str = "diorama-hint";
const LABEL_ID_PREFIX: &str = "diorama-label-";

type WebDiorama = Diorama<WebRenderer, DomLabelSink>;

thread_local! {
    static STATE: RefCell<Option<WebDiorama>> = const { RefCell::new(None) };
}

fn with_diorama<F, R>(f: F) -> R
where
    F: FnOnce(&mut WebDiorama) -> R,
    R: Default,
{
    STATE
        .try_with(|state| state.borrow_mut().as_mut().map(f).unwrap_or_default())
        .unwrap_or_default()
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&JsValue::from_str(&info.to_string()));
        }));
    });
}

fn js_error(err: DioramaError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Draws through wgpu once the async device request has finished; frames
/// before that are skipped.
#[derive(Debug, Default)]
struct WebRenderer {
    ctx: Option<wgpu::WgpuContext>,
    size: (u32, u32),
    pixel_ratio: f64,
}

impl WebRenderer {
    fn physical_size(&self) -> (u32, u32) {
        let ratio = if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 };
        (
            (self.size.0 as f64 * ratio).round() as u32,
            (self.size.1 as f64 * ratio).round() as u32,
        )
    }

    fn attach(&mut self, mut ctx: wgpu::WgpuContext) {
        let (width, height) = self.physical_size();
        wgpu::resize_wgpu(&mut ctx, width, height);
        self.ctx = Some(ctx);
    }

    fn sync_surface(&mut self) {
        let (width, height) = self.physical_size();
        if let Some(ctx) = self.ctx.as_mut() {
            wgpu::resize_wgpu(ctx, width, height);
        }
    }
}

impl Renderer for WebRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.sync_surface();
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        self.sync_surface();
    }

    fn render(&mut self, frame: &RenderFrame, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        match self.ctx.as_mut() {
            Some(ctx) => wgpu::render_frame(ctx, frame, camera)
                .map_err(|e| RenderError(format!("{e:?}"))),
            None => Ok(()),
        }
    }
}

/// Hover labels as absolutely positioned elements, one per anchor.
struct DomLabelSink {
    document: web_sys::Document,
}

impl DomLabelSink {
    /// Finds or creates one element per anchor, in anchor order.
    fn attach(document: web_sys::Document) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("body missing"))?;
        for (index, (_, _, text)) in diorama_anchors().into_iter().enumerate() {
            let id = format!("{LABEL_ID_PREFIX}{index}");
            if document.get_element_by_id(&id).is_some() {
                continue;
            }
            let el = document.create_element("div")?;
            el.set_id(&id);
            el.set_class_name("diorama-label");
            el.set_text_content(Some(text));
            body.append_child(&el)?;
        }
        Ok(Self { document })
    }

    fn element(&self, handle: LabelHandle) -> Option<web_sys::HtmlElement> {
        self.document
            .get_element_by_id(&format!("{LABEL_ID_PREFIX}{}", handle.0))
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    }

    fn style(&self, handle: LabelHandle, props: &[(&str, &str)]) {
        let Some(el) = self.element(handle) else {
            return;
        };
        let style = el.style();
        for (name, value) in props {
            let _ = style.set_property(name, value);
        }
    }
}

impl LabelSink for DomLabelSink {
    fn measure(&self, handle: LabelHandle) -> Option<[f64; 2]> {
        let el = self.element(handle)?;
        let (w, h) = (el.offset_width() as f64, el.offset_height() as f64);
        (w > 0.0 && h > 0.0).then_some([w, h])
    }

    fn show_at(&mut self, handle: LabelHandle, position_px: [f64; 2]) {
        let left = format!("{}px", position_px[0]);
        let top = format!("{}px", position_px[1]);
        self.style(handle, &[("left", &left), ("top", &top), ("opacity", "1")]);
    }

    fn hide(&mut self, handle: LabelHandle) {
        self.style(handle, &[("opacity", "0")]);
    }

    fn set_displayed(&mut self, handle: LabelHandle, displayed: bool) {
        self.style(handle, &[("display", if displayed { "block" } else { "none" })]);
    }
}

/// Mirrors the hint overlay state onto its element, if the page has one.
fn sync_hint(d: &WebDiorama) {
    let ui = d.ui_state();
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(el) = document
        .get_element_by_id(HINT_ID)
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return;
    };
    let _ = el
        .style()
        .set_property("opacity", &ui.hint_opacity.to_string());
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    Ok(())
}

/// Builds the diorama on `#diorama-canvas`. `config_json` overrides the
/// defaults; the GPU device is requested in the background.
#[wasm_bindgen]
pub fn init_diorama(config_json: Option<String>) -> Result<(), JsValue> {
    init_panic_hook();
    let config = match config_json.as_deref() {
        Some(text) => DioramaConfig::from_json(text).map_err(js_error)?,
        None => DioramaConfig::default(),
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| js_error(DioramaError::MissingElement(format!("#{CANVAS_ID}"))))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    let sink = DomLabelSink::attach(document)?;
    let mut d = Diorama::new(config, WebRenderer::default(), sink).map_err(js_error)?;
    if let Ok(user_agent) = window.navigator().user_agent() {
        d.set_user_agent(user_agent);
    }
    let width = window.inner_width()?.as_f64().unwrap_or(1.0) as u32;
    let height = window.inner_height()?.as_f64().unwrap_or(1.0) as u32;
    let ratio = window.device_pixel_ratio();
    canvas.set_width((width as f64 * ratio).round() as u32);
    canvas.set_height((height as f64 * ratio).round() as u32);
    d.resize(width, height, ratio);

    STATE
        .try_with(|state| *state.borrow_mut() = Some(d))
        .map_err(|_| JsValue::from_str("state unavailable"))?;

    spawn_local(async move {
        match wgpu::init_wgpu_from_canvas_id(CANVAS_ID).await {
            Ok(ctx) => with_diorama(|d| d.renderer.attach(ctx)),
            Err(err) => log(&format!("wgpu init error: {:?}", err)),
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn set_season(name: &str) -> Result<(), JsValue> {
    let season: Season = name.parse().map_err(|e| js_error(DioramaError::from(e)))?;
    with_diorama(|d| d.set_season(season));
    Ok(())
}

#[wasm_bindgen]
pub fn toggle_day_night() {
    with_diorama(|d| d.toggle_day_night());
}

#[wasm_bindgen]
pub fn pointer_down(x: f64, y: f64) {
    with_diorama(|d| d.pointer_down(x, y));
}

#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) {
    with_diorama(|d| d.pointer_move(x, y));
}

#[wasm_bindgen]
pub fn pointer_up() {
    with_diorama(|d| d.pointer_up());
}

/// Touch coordinates arrive flattened as `[x0, y0, x1, y1, ...]`.
fn touches(flat: &[f64]) -> Vec<Vec2> {
    flat.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])).collect()
}

#[wasm_bindgen]
pub fn touch_start(flat: &[f64]) {
    with_diorama(|d| d.touch_start(&touches(flat)));
}

#[wasm_bindgen]
pub fn touch_move(flat: &[f64]) {
    with_diorama(|d| d.touch_move(&touches(flat)));
}

#[wasm_bindgen]
pub fn touch_end(flat: &[f64]) {
    with_diorama(|d| d.touch_end(&touches(flat)));
}

#[wasm_bindgen]
pub fn wheel(delta_y: f64) {
    with_diorama(|d| d.wheel(delta_y));
}

#[wasm_bindgen]
pub fn resize(width: u32, height: u32, pixel_ratio: f64) {
    with_diorama(|d| d.resize(width, height, pixel_ratio));
}

#[wasm_bindgen]
pub fn click() {
    with_diorama(|d| {
        d.click();
        sync_hint(d);
    });
}

/// Title glyph, toggle icon, accent colour and hint state as JSON.
#[wasm_bindgen]
pub fn get_ui_state() -> Result<JsValue, JsValue> {
    let json = with_diorama(|d| serde_json::to_string(&d.ui_state()).ok());
    let json = json.ok_or_else(|| JsValue::from_str("diorama not initialized"))?;
    js_sys::JSON::parse(&json)
}

/// Advances one frame; for hosts that drive their own loop.
#[wasm_bindgen]
pub fn tick(now_ms: f64) -> Result<(), JsValue> {
    let err = with_diorama(|d| {
        let result = d.tick(now_ms / 1000.0);
        sync_hint(d);
        result.err()
    });
    match err {
        Some(err) => Err(js_error(err)),
        None => Ok(()),
    }
}

/// Drives `tick` from requestAnimationFrame until the page goes away.
#[wasm_bindgen]
pub fn start_loop() -> Result<(), JsValue> {
    if LOOP_RUNNING.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let rearm = callback.clone();
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        if let Err(err) = tick(now_ms) {
            log(&format!("frame error: {:?}", err));
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(cb) = rearm.borrow().as_ref() {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(cb) = callback.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}
