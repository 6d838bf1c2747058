use wasm_bindgen::JsValue;
use web_sys::console;

/// Component-scoped logging to the browser console
pub struct Logger;

impl Logger {
    pub fn info_with_component(component: &str, message: &str) {
        console::log_1(&Self::line(component, message));
    }

    pub fn warn_with_component(component: &str, message: &str) {
        console::warn_1(&Self::line(component, message));
    }

    pub fn error_with_component(component: &str, message: &str) {
        console::error_1(&Self::line(component, message));
    }

    fn line(component: &str, message: &str) -> JsValue {
        JsValue::from_str(&format!("[{}] {}", component, message))
    }
}
