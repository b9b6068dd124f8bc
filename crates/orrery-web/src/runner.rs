use std::cell::Cell;
use std::rc::Rc;

use orrery_engine::{
    AssetLoadGate, BodyCatalog, BuildError, Orrery, QueuedLoader, SimulationConfig, TextureHandle,
    TextureRequest,
};

const LOAD_TIMER: &str = "orrery textures";

/// Owns one simulation run plus the texture request queue the host drains.
///
/// Each demo keeps an `OrreryRunner` in a `thread_local!` and exports free
/// functions via `#[wasm_bindgen]` (see [`export_orrery!`](crate::export_orrery)).
pub struct OrreryRunner {
    orrery: Orrery,
    loader: QueuedLoader,
    ready: Rc<Cell<bool>>,
}

impl OrreryRunner {
    /// Parse the catalog and config, build the run, and queue every texture request.
    pub fn new(bodies_json: &str, config_json: &str) -> Result<Self, BuildError> {
        let config = if config_json.trim().is_empty() {
            SimulationConfig::default()
        } else {
            SimulationConfig::from_json(config_json)?
        };
        let catalog = BodyCatalog::from_json(bodies_json)?;

        let ready = Rc::new(Cell::new(false));
        let flag = ready.clone();
        let gate = AssetLoadGate::new().with_on_ready(move || {
            flag.set(true);
            web_sys::console::time_end_with_label(LOAD_TIMER);
        });

        web_sys::console::time_with_label(LOAD_TIMER);
        let mut loader = QueuedLoader::new();
        let orrery = Orrery::new(config, &catalog, &mut loader, gate)?;

        Ok(Self {
            orrery,
            loader,
            ready,
        })
    }

    pub fn tick(&mut self, dt: f64) {
        self.orrery.frame(dt);
    }

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    pub fn orrery_mut(&mut self) -> &mut Orrery {
        &mut self.orrery
    }

    // ---- Texture requests ----

    pub fn texture_requests(&self) -> &[TextureRequest] {
        self.loader.requests()
    }

    pub fn clear_texture_requests(&mut self) {
        self.loader.drain();
    }

    /// Returns `true` when this completion opened the gate.
    pub fn texture_loaded(&mut self, handle: u32) -> bool {
        self.orrery.texture_loaded(TextureHandle(handle))
    }

    /// Set once by the gate's ready callback.
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    pub fn teardown(&mut self) {
        self.orrery.teardown();
    }

    // ---- Pointer accessors for host-side buffer reads ----

    pub fn transforms_ptr(&self) -> *const f32 {
        self.orrery.transforms().ptr()
    }

    pub fn transform_count(&self) -> u32 {
        self.orrery.transforms().len() as u32
    }
}
