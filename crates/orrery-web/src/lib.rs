pub mod runner;

pub use runner::OrreryRunner;

/// Generate all `#[wasm_bindgen]` exports for a body catalog.
///
/// Generates:
/// - `thread_local!` storage for the OrreryRunner
/// - `with_runner()` helper that falls back to a neutral value when no runner exists
/// - all wasm-bindgen exports (init, tick, texture plumbing, focus, toggles, buffers)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// orrery_web::export_orrery!(include_str!("../bodies.json"), "solar-system");
/// ```
///
/// # Arguments
///
/// - `$bodies`: expression yielding the catalog JSON as `&'static str`
/// - `$name`: a string literal used in log messages
#[macro_export]
macro_rules! export_orrery {
    ($bodies:expr, $name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::OrreryRunner>> = RefCell::new(None);
        }

        // Late host callbacks may arrive after teardown; they must not panic.
        fn with_runner<R>(fallback: R, f: impl FnOnce(&mut $crate::OrreryRunner) -> R) -> R {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => f(runner),
                None => fallback,
            })
        }

        #[wasm_bindgen]
        pub fn orrery_init(config_json: &str) -> bool {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            match $crate::OrreryRunner::new($bodies, config_json) {
                Ok(runner) => {
                    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
                    log::info!("{}: initialized", $name);
                    true
                }
                Err(e) => {
                    log::error!("{}: {}", $name, e);
                    RUNNER.with(|cell| *cell.borrow_mut() = None);
                    false
                }
            }
        }

        #[wasm_bindgen]
        pub fn orrery_tick(dt: f64) {
            with_runner((), |r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn orrery_teardown() {
            RUNNER.with(|cell| {
                if let Some(mut runner) = cell.borrow_mut().take() {
                    runner.teardown();
                }
            });
        }

        // ---- Texture loading ----

        #[wasm_bindgen]
        pub fn orrery_texture_request_count() -> u32 {
            with_runner(0, |r| r.texture_requests().len() as u32)
        }

        #[wasm_bindgen]
        pub fn orrery_texture_request_path(index: u32) -> Option<String> {
            with_runner(None, |r| {
                r.texture_requests()
                    .get(index as usize)
                    .map(|req| req.path.clone())
            })
        }

        #[wasm_bindgen]
        pub fn orrery_texture_request_handle(index: u32) -> Option<u32> {
            with_runner(None, |r| {
                r.texture_requests().get(index as usize).map(|req| req.handle.0)
            })
        }

        /// All queued texture paths, in request order.
        #[wasm_bindgen]
        pub fn orrery_texture_request_paths() -> $crate::js_sys::Array {
            with_runner($crate::js_sys::Array::new(), |r| {
                r.texture_requests()
                    .iter()
                    .map(|req| wasm_bindgen::JsValue::from_str(&req.path))
                    .collect()
            })
        }

        #[wasm_bindgen]
        pub fn orrery_clear_texture_requests() {
            with_runner((), |r| r.clear_texture_requests());
        }

        #[wasm_bindgen]
        pub fn orrery_texture_loaded(handle: u32) -> bool {
            with_runner(false, |r| r.texture_loaded(handle))
        }

        #[wasm_bindgen]
        pub fn orrery_is_ready() -> bool {
            with_runner(false, |r| r.is_ready())
        }

        #[wasm_bindgen]
        pub fn orrery_progress() -> f64 {
            with_runner(0.0, |r| r.orrery().progress())
        }

        // ---- Time ----

        #[wasm_bindgen]
        pub fn orrery_set_speed(speed: f64) {
            with_runner((), |r| r.orrery_mut().set_speed(speed));
        }

        #[wasm_bindgen]
        pub fn orrery_speed() -> f64 {
            with_runner(0.0, |r| r.orrery().speed())
        }

        /// Returns the new paused state.
        #[wasm_bindgen]
        pub fn orrery_toggle_pause() -> bool {
            with_runner(false, |r| r.orrery_mut().toggle_pause())
        }

        // ---- Camera and focus ----

        #[wasm_bindgen]
        pub fn orrery_set_camera(x: f64, y: f64, z: f64) {
            with_runner((), |r| {
                r.orrery_mut()
                    .set_camera_position($crate::glam::DVec3::new(x, y, z))
            });
        }

        #[wasm_bindgen]
        pub fn orrery_focus_next() -> String {
            with_runner(String::new(), |r| r.orrery_mut().focus_next().to_string())
        }

        #[wasm_bindgen]
        pub fn orrery_focus_previous() -> String {
            with_runner(String::new(), |r| r.orrery_mut().focus_previous().to_string())
        }

        #[wasm_bindgen]
        pub fn orrery_focus_name(name: &str) -> bool {
            with_runner(false, |r| match r.orrery_mut().focus(name) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{}: {}", $name, e);
                    false
                }
            })
        }

        #[wasm_bindgen]
        pub fn orrery_focused() -> String {
            with_runner(String::new(), |r| r.orrery().focused().to_string())
        }

        /// Index of the focused body's node in the transform buffer.
        #[wasm_bindgen]
        pub fn orrery_focused_node() -> Option<u32> {
            with_runner(None, |r| r.orrery().focused_body().ok().map(|b| b.node().0))
        }

        #[wasm_bindgen]
        pub fn orrery_min_distance() -> f64 {
            with_runner(0.0, |r| r.orrery().min_camera_distance())
        }

        // ---- View toggles ----

        #[wasm_bindgen]
        pub fn orrery_show_paths(show: bool) {
            with_runner((), |r| r.orrery_mut().set_show_paths(show));
        }

        #[wasm_bindgen]
        pub fn orrery_show_moons(show: bool) {
            with_runner((), |r| r.orrery_mut().set_show_moons(show));
        }

        #[wasm_bindgen]
        pub fn orrery_show_labels(show: bool) {
            with_runner((), |r| r.orrery_mut().set_show_labels(show));
        }

        // ---- Render export ----

        #[wasm_bindgen]
        pub fn orrery_transforms_ptr() -> *const f32 {
            with_runner(std::ptr::null(), |r| r.transforms_ptr())
        }

        #[wasm_bindgen]
        pub fn orrery_transform_count() -> u32 {
            with_runner(0, |r| r.transform_count())
        }

        #[wasm_bindgen]
        pub fn orrery_transform_stride() -> u32 {
            $crate::NodeTransform::FLOATS as u32
        }
    };
}

#[doc(hidden)]
pub use js_sys;
#[doc(hidden)]
pub use orrery_engine::glam;
pub use orrery_engine::NodeTransform;
