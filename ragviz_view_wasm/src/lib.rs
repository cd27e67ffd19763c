use log::debug;
use ragviz::config::Config;
use ragviz::editor::{CheckApplied, CheckTicket, Editor};
use ragviz::gateway::decode_response;
use ragviz::layout::Viewport;
use ragviz::scene::{Scene, SceneEdge, Shape};
use ragviz::vec2::{Point, Vec2};
use ragviz::{CellRef, Error};
use std::f64;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();

    wasm_logger::init(wasm_logger::Config::new(log::Level::Debug).message_on_new_line());
}

fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_err(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn cell_ref(kind: &str, i: usize, j: usize) -> Result<CellRef, JsValue> {
    Ok(match kind {
        "alloc" => CellRef::Allocation {
            process: i,
            resource: j,
        },
        "max" => CellRef::Maximum {
            process: i,
            resource: j,
        },
        // avail is a single row; `i` is ignored
        "avail" => CellRef::Available { resource: j },
        _ => return Err(JsValue::from_str(&format!("unknown matrix {:?}", kind))),
    })
}

/// A check request for the page to POST. The page hands the response back through
/// `finish_check_body` or `finish_check_failure` along with `token`.
#[wasm_bindgen]
pub struct CheckRequest {
    ticket: CheckTicket,
    body: String,
}

#[wasm_bindgen]
impl CheckRequest {
    /// JS numbers are f64; tokens stay far below 2^53.
    pub fn token(&self) -> f64 {
        self.ticket.token as f64
    }

    pub fn body(&self) -> String {
        self.body.clone()
    }
}

#[wasm_bindgen]
pub struct CanvasApp {
    editor: Editor,
}

#[wasm_bindgen]
pub fn make_app() -> CanvasApp {
    CanvasApp {
        editor: Editor::new(&Config::default()),
    }
}

#[wasm_bindgen]
impl CanvasApp {
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.editor.set_viewport(Viewport::new(width, height));
    }

    pub fn set_dimensions(&mut self, processes: &str, resources: &str) -> bool {
        self.editor.set_dimensions(processes, resources)
    }

    pub fn processes(&self) -> usize {
        self.editor.dims().map_or(0, |d| d.processes())
    }

    pub fn resources(&self) -> usize {
        self.editor.dims().map_or(0, |d| d.resources())
    }

    /// Returns the value actually stored, so the input box can show it.
    pub fn set_cell(&mut self, kind: &str, i: usize, j: usize, raw: &str) -> Result<f64, JsValue> {
        let cell = cell_ref(kind, i, j)?;
        let value = self.editor.set_cell_raw(cell, raw).map_err(js_err)?;
        Ok(value as f64)
    }

    pub fn cell(&self, kind: &str, i: usize, j: usize) -> Result<Option<f64>, JsValue> {
        let cell = cell_ref(kind, i, j)?;
        Ok(self.editor.cell(cell).map(|v| v as f64))
    }

    pub fn load_example(&mut self) -> bool {
        self.editor.load_example().is_some()
    }

    pub fn draw_graph(&mut self) -> bool {
        self.editor.draw_graph().is_some()
    }

    pub fn begin_check(&mut self) -> Result<Option<CheckRequest>, JsValue> {
        let ticket = match self.editor.begin_check() {
            Some(ticket) => ticket,
            None => return Ok(None),
        };
        let body = serde_json::to_string(&ticket.snapshot)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Some(CheckRequest { ticket, body }))
    }

    /// Returns false if a newer check has been started since.
    pub fn finish_check_body(&mut self, token: f64, body: &str) -> bool {
        let outcome = decode_response(body);
        self.editor.finish_check(token as u64, outcome) == CheckApplied::Applied
    }

    /// For when fetch itself failed.
    pub fn finish_check_failure(&mut self, token: f64, message: &str) -> bool {
        let outcome = Err(Error::Transport(message.to_string()));
        self.editor.finish_check(token as u64, outcome) == CheckApplied::Applied
    }

    pub fn safety_text(&self) -> String {
        self.editor.status().safety.badge().text.to_string()
    }

    pub fn safety_class(&self) -> String {
        self.editor.status().safety.badge().tone.css_class().to_string()
    }

    pub fn deadlock_text(&self) -> String {
        self.editor.status().deadlock.badge().text.to_string()
    }

    pub fn deadlock_class(&self) -> String {
        self.editor.status().deadlock.badge().tone.css_class().to_string()
    }

    pub fn summary(&self) -> String {
        self.editor.status().summary()
    }

    pub fn svg(&self) -> Option<String> {
        self.editor.scene().map(Scene::to_svg)
    }
}

const NODE_FILL: &str = "#1e293b";
const PROCESS_STROKE: &str = "#38bdf8";
const RESOURCE_STROKE: &str = "#facc15";
const TEXT_FILL: &str = "#e2e8f0";

const ARROW_LENGTH: f64 = 10.0;
const ARROW_HALF_WIDTH: f64 = 5.0;

/// Paints the current scene, if any, over the whole canvas.
#[wasm_bindgen]
pub fn paint_graph(app: &CanvasApp, context: JsValue) -> Result<(), JsValue> {
    let c = context.dyn_into::<CanvasRenderingContext2d>()?;

    let scene = match app.editor.scene() {
        Some(scene) => scene,
        None => {
            debug!("paint_graph: nothing drawn yet");
            return Ok(());
        }
    };

    c.clear_rect(0.0, 0.0, scene.width, scene.height);
    c.set_line_width(2.0);

    // paint edges first so node bodies cover the line ends
    for edge in scene.edges.iter() {
        paint_edge(&c, edge)?;
    }

    c.set_font("13px sans-serif");
    c.set_text_align("center");
    for node in scene.nodes.iter() {
        c.begin_path();
        let stroke = match node.shape {
            Shape::RoundedRect {
                center,
                half_width,
                half_height,
                corner_radius,
            } => {
                let lx = center.x - half_width; // left x
                let rx = center.x + half_width; // right x
                let ty = center.y - half_height; // top y
                let by = center.y + half_height; // bottom y
                c.move_to(lx + corner_radius, ty);
                c.arc_to(rx, ty, rx, by, corner_radius)?;
                c.arc_to(rx, by, lx, by, corner_radius)?;
                c.arc_to(lx, by, lx, ty, corner_radius)?;
                c.arc_to(lx, ty, rx, ty, corner_radius)?;
                PROCESS_STROKE
            }
            Shape::Circle { center, radius } => {
                c.arc(center.x, center.y, radius, 0.0, f64::consts::PI * 2.0)?;
                RESOURCE_STROKE
            }
        };
        c.close_path();

        c.set_fill_style(&JsValue::from_str(NODE_FILL));
        c.fill();
        c.set_stroke_style(&JsValue::from_str(stroke));
        c.stroke();

        c.set_fill_style(&JsValue::from_str(TEXT_FILL));
        c.fill_text(&node.label, node.label_at.x, node.label_at.y)?;
    }

    Ok(())
}

fn paint_edge(c: &CanvasRenderingContext2d, edge: &SceneEdge) -> Result<(), JsValue> {
    let style = edge.style();
    let color = JsValue::from_str(style.color);
    let from = edge.segment.from;
    let to = edge.segment.to;

    let dash = match edge.kind {
        ragviz::EdgeKind::Allocation => js_sys::Array::new(),
        ragviz::EdgeKind::Request => js_sys::Array::of2(&JsValue::from(6.0), &JsValue::from(4.0)),
    };
    c.set_line_dash(&dash)?;
    c.set_stroke_style(&color);
    c.begin_path();
    c.move_to(from.x, from.y);
    c.line_to(to.x, to.y);
    c.stroke();
    c.set_line_dash(&js_sys::Array::new())?;

    let len = (to - from).len();
    if len == 0.0 {
        return Ok(());
    }
    let dir: Point = (to - from) / len;
    let normal = Vec2::new(-dir.y, dir.x);
    let base = to - dir * ARROW_LENGTH;
    let left = base + normal * ARROW_HALF_WIDTH;
    let right = base - normal * ARROW_HALF_WIDTH;

    c.begin_path();
    c.move_to(to.x, to.y);
    c.line_to(left.x, left.y);
    c.line_to(right.x, right.y);
    c.close_path();
    c.set_fill_style(&color);
    c.fill();
    Ok(())
}
