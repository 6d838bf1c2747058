use std::rc::Rc;

use gloo::events::EventListener;
use shared::FilterBar;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

/// Renders the bar into `container` and calls `on_select` with the clicked
/// button's `data-filter` key.
pub fn mount(
    container: &HtmlElement,
    bar: &FilterBar,
    on_select: Rc<dyn Fn(String)>,
) -> Vec<EventListener> {
    container.set_inner_html(&bar.markup());
    let _ = container.style().remove_property("display");

    buttons(container)
        .into_iter()
        .filter_map(|button| {
            let key = button.get_attribute("data-filter")?;
            let on_select = on_select.clone();
            Some(EventListener::new(&button, "click", move |_| {
                on_select(key.clone())
            }))
        })
        .collect()
}

/// Marks exactly the active option
pub fn mark_active(container: &HtmlElement, bar: &FilterBar) {
    for button in buttons(container) {
        let key = button.get_attribute("data-filter").unwrap_or_default();
        let _ = button
            .class_list()
            .toggle_with_force("active", bar.is_active(&key));
    }
}

fn buttons(container: &HtmlElement) -> Vec<Element> {
    let Ok(nodes) = container.query_selector_all(".filter-btn") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
