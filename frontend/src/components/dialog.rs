//! The edit surface. Browsers with the Popover API get the native popover;
//! older ones fall back to toggling an `open` class that the stylesheet
//! uses to show the overlay. The choice is made once, at construction.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use crate::services::logging::Logger;

pub trait Dialog {
    fn show(&self);
    fn hide(&self);
}

/// Uses `showPopover()` / `hidePopover()`
pub struct NativePopover {
    element: HtmlElement,
    show: Function,
    hide: Function,
}

impl NativePopover {
    /// `None` when the element does not expose the Popover API
    pub fn detect(element: &HtmlElement) -> Option<Self> {
        let show = method(element, "showPopover")?;
        let hide = method(element, "hidePopover")?;
        Some(Self {
            element: element.clone(),
            show,
            hide,
        })
    }

    fn call(&self, f: &Function) {
        // Showing an open popover (or hiding a closed one) throws
        if let Err(e) = f.call0(&self.element) {
            Logger::warn_with_component("dialog", &format!("popover call failed: {:?}", e));
        }
    }
}

impl Dialog for NativePopover {
    fn show(&self) {
        self.call(&self.show);
    }

    fn hide(&self) {
        self.call(&self.hide);
    }
}

/// Adds or removes the `open` class
pub struct ClassToggleDialog {
    element: HtmlElement,
}

impl ClassToggleDialog {
    pub fn new(element: &HtmlElement) -> Self {
        Self {
            element: element.clone(),
        }
    }
}

impl Dialog for ClassToggleDialog {
    fn show(&self) {
        let _ = self.element.class_list().add_1("open");
    }

    fn hide(&self) {
        let _ = self.element.class_list().remove_1("open");
    }
}

/// Picks the native popover when available
pub fn dialog_for(element: &HtmlElement) -> Box<dyn Dialog> {
    match NativePopover::detect(element) {
        Some(native) => Box::new(native),
        None => {
            Logger::info_with_component("dialog", "Popover API unavailable, using class toggle");
            Box::new(ClassToggleDialog::new(element))
        }
    }
}

fn method(element: &HtmlElement, name: &str) -> Option<Function> {
    Reflect::get(element, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}
