use shared::EntityKind;
use wasm_bindgen_futures::spawn_local;

use crate::components::view::ViewController;
use crate::services::api::ApiClient;
use crate::services::logging::Logger;

mod components;
mod services;

/// Fallback entity from `<body data-entity="...">`; cats when absent or
/// unrecognized.
fn page_entity(document: &web_sys::Document) -> EntityKind {
    let attr = document
        .body()
        .and_then(|body| body.get_attribute("data-entity"));
    match attr.as_deref().map(str::parse::<EntityKind>) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => {
            Logger::warn_with_component("main", &e);
            EntityKind::default()
        }
        None => EntityKind::default(),
    }
}

fn main() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        Logger::error_with_component("main", "No document to attach to");
        return;
    };

    spawn_local(async move {
        // The server's configured entity wins over the page attribute
        let kind = match ApiClient::new().entity().await {
            Ok(info) => info.entity,
            Err(e) => {
                let fallback = page_entity(&document);
                Logger::warn_with_component(
                    "main",
                    &format!("Could not ask the server for its entity ({}), using {}", e, fallback),
                );
                fallback
            }
        };
        Logger::info_with_component("main", &format!("Starting {} view", kind));

        let started = ViewController::new(document, kind.schema()).and_then(|view| view.start());
        if let Err(e) = started {
            Logger::error_with_component("main", &e);
        }
    });
}
