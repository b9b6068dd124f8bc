use wasm_bindgen::prelude::*;

orrery_web::export_orrery!(include_str!("../bodies.json"), "solar-system");
