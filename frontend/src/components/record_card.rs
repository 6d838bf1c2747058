use std::rc::Rc;

use gloo::events::EventListener;
use shared::render::NO_DATA_HTML;
use shared::{Card, ListView};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// Called with the id of the card whose button was clicked
pub type CardAction = Rc<dyn Fn(String)>;

/// Clears `container` and appends one `.item-card` per card, wiring the
/// edit and delete buttons. The returned listeners must be kept alive for
/// as long as the cards are on screen.
pub fn mount(
    document: &Document,
    container: &HtmlElement,
    view: ListView,
    on_edit: CardAction,
    on_delete: CardAction,
) -> Vec<EventListener> {
    container.set_inner_html("");

    let cards = match view {
        ListView::Empty => {
            container.set_inner_html(NO_DATA_HTML);
            return Vec::new();
        }
        ListView::Cards(cards) => cards,
    };

    let mut listeners = Vec::with_capacity(cards.len() * 2);
    for card in cards {
        let Some(element) = card_element(document, &card) else {
            continue;
        };
        listeners.extend(wire(&element, ".edit-btn", &card.id, on_edit.clone()));
        listeners.extend(wire(&element, ".delete-btn", &card.id, on_delete.clone()));
        let _ = container.append_child(&element);
    }
    listeners
}

fn card_element(document: &Document, card: &Card) -> Option<Element> {
    let element = document.create_element("div").ok()?;
    element.set_class_name("item-card");
    element.set_attribute("data-id", &card.id).ok()?;
    element.set_inner_html(&card.html);
    Some(element)
}

fn wire(card: &Element, selector: &str, id: &str, action: CardAction) -> Option<EventListener> {
    let button = card
        .query_selector(selector)
        .ok()
        .flatten()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let id = id.to_string();
    Some(EventListener::new(&button, "click", move |_| action(id.clone())))
}
