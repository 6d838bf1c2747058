//! Page controller. Owns the DOM handles for the banners, the content area,
//! the form popover and the optional filter bar, and drives the
//! fetch-render cycle. Built once and shared behind an `Rc` by the event
//! listeners it installs.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::dialogs::{alert, confirm};
use gloo::events::EventListener;
use shared::form::form_markup;
use shared::render::render_list;
use shared::{DeleteRequest, EntitySchema, FilterBar, PageState, Record};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlElement, HtmlFormElement};

use super::dialog::{dialog_for, Dialog};
use super::{filter_bar, record_card, record_form};
use crate::services::api::ApiClient;
use crate::services::logging::Logger;

const COMPONENT: &str = "view";

pub struct ViewController {
    schema: &'static EntitySchema,
    api: ApiClient,
    document: Document,
    ready_status: HtmlElement,
    not_ready_status: HtmlElement,
    content_area: HtmlElement,
    create_button: HtmlElement,
    form: HtmlFormElement,
    form_heading: Option<HtmlElement>,
    dialog: Box<dyn Dialog>,
    filter_container: Option<HtmlElement>,
    filter: Option<RefCell<FilterBar>>,
    records: RefCell<Vec<Record>>,
    card_listeners: RefCell<Vec<EventListener>>,
    page_listeners: RefCell<Vec<EventListener>>,
}

impl ViewController {
    /// Looks up every element the page needs; fails with the id of the first
    /// one that is missing.
    pub fn new(document: Document, schema: &'static EntitySchema) -> Result<Rc<Self>, String> {
        let popover = element(&document, "formPopover")?;
        let form = element(&document, "myForm")?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| "#myForm is not a form".to_string())?;
        let form_heading = popover
            .query_selector("h2")
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());

        let filter = FilterBar::for_schema(schema).map(RefCell::new);
        let filter_container = element(&document, "filterBar").ok();

        Ok(Rc::new(Self {
            schema,
            api: ApiClient::new(),
            ready_status: element(&document, "readyStatus")?,
            not_ready_status: element(&document, "notReadyStatus")?,
            content_area: element(&document, "contentArea")?,
            create_button: element(&document, "createButton")?,
            dialog: dialog_for(&popover),
            form,
            form_heading,
            filter_container,
            filter,
            records: RefCell::new(Vec::new()),
            card_listeners: RefCell::new(Vec::new()),
            page_listeners: RefCell::new(Vec::new()),
            document,
        }))
    }

    /// Builds the form, installs the page-level listeners and loads the list
    pub fn start(self: &Rc<Self>) -> Result<(), String> {
        let fields = element(&self.document, "formFields")?;
        fields.set_inner_html(&form_markup(self.schema));
        self.set_heading(self.schema.create_heading);

        let mut listeners = Vec::new();

        let this = self.clone();
        listeners.push(EventListener::new(&self.form, "submit", move |event| {
            event.prevent_default();
            this.submit();
        }));

        let this = self.clone();
        listeners.push(EventListener::new(&self.form, "reset", move |_| {
            this.set_heading(this.schema.create_heading);
        }));

        let this = self.clone();
        listeners.push(EventListener::new(&self.create_button, "click", move |_| {
            record_form::clear(&this.form, this.schema);
            this.dialog.show();
        }));

        if let Ok(cancel) = element(&self.document, "cancelButton") {
            let this = self.clone();
            listeners.push(EventListener::new(&cancel, "click", move |_| {
                this.dialog.hide();
            }));
        }

        if let (Some(container), Some(bar)) = (&self.filter_container, &self.filter) {
            let this = self.clone();
            let on_select = Rc::new(move |key: String| this.select_filter(&key));
            listeners.extend(filter_bar::mount(container, &bar.borrow(), on_select));
        } else if let Some(container) = &self.filter_container {
            hide(container);
        }

        *self.page_listeners.borrow_mut() = listeners;
        self.load();
        Ok(())
    }

    /// Fetches the list and re-renders the content area
    pub fn load(self: &Rc<Self>) {
        let this = self.clone();
        spawn_local(async move {
            let result = this.api.list_records().await;
            this.apply_state(PageState::after_load(&result));
            match result {
                Ok(records) => this.render(records),
                Err(e) => {
                    Logger::error_with_component(COMPONENT, &format!("Failed to load records: {}", e));
                    this.card_listeners.borrow_mut().clear();
                }
            }
        });
    }

    fn render(self: &Rc<Self>, records: Vec<Record>) {
        let view = match &self.filter {
            Some(bar) => render_list(self.schema, bar.borrow().active_filter().apply(&records)),
            None => render_list(self.schema, &records),
        };

        let this = self.clone();
        let on_edit = Rc::new(move |id: String| this.edit(&id));
        let this = self.clone();
        let on_delete = Rc::new(move |id: String| this.delete(id));

        let listeners = record_card::mount(
            &self.document,
            &self.content_area,
            view,
            on_edit,
            on_delete,
        );
        *self.card_listeners.borrow_mut() = listeners;
        *self.records.borrow_mut() = records;
    }

    fn apply_state(&self, state: PageState) {
        set_visible(&self.ready_status, state.ready_banner);
        set_visible(&self.not_ready_status, state.not_ready_banner);
        set_visible(&self.content_area, state.content_area);
        set_visible(&self.create_button, state.create_button);
    }

    fn submit(self: &Rc<Self>) {
        let fields = record_form::read(&self.form);
        if let Err(e) = self.schema.validate(&fields) {
            alert(&e.to_string());
            return;
        }

        let this = self.clone();
        spawn_local(async move {
            match this.api.save_record(&fields).await {
                Ok(saved) => {
                    Logger::info_with_component(COMPONENT, &format!("Saved record {}", saved.id));
                    record_form::clear(&this.form, this.schema);
                    this.dialog.hide();
                    this.load();
                }
                Err(e) => {
                    Logger::error_with_component(COMPONENT, &format!("Save failed: {}", e));
                    alert(&e.save_message());
                }
            }
        });
    }

    fn edit(&self, id: &str) {
        let records = self.records.borrow();
        let Some(record) = records.iter().find(|r| r.id == id) else {
            Logger::warn_with_component(COMPONENT, &format!("No record {} on screen", id));
            return;
        };
        record_form::clear(&self.form, self.schema);
        record_form::fill(&self.form, record);
        self.set_heading(self.schema.edit_heading);
        self.dialog.show();
    }

    fn delete(self: &Rc<Self>, id: String) {
        let Some(request) = DeleteRequest::after_confirm(id, confirm(self.schema.delete_prompt)) else {
            return;
        };

        let this = self.clone();
        spawn_local(async move {
            match this.api.delete_record(&request).await {
                Ok(_) => this.load(),
                Err(e) => {
                    Logger::error_with_component(COMPONENT, &format!("Delete failed: {}", e));
                    alert(&e.delete_message());
                }
            }
        });
    }

    fn select_filter(self: &Rc<Self>, key: &str) {
        let (Some(bar), Some(container)) = (&self.filter, &self.filter_container) else {
            return;
        };
        if bar.borrow_mut().select(key).is_none() {
            return;
        }
        filter_bar::mark_active(container, &bar.borrow());
        self.load();
    }

    fn set_heading(&self, text: &str) {
        if let Some(heading) = &self.form_heading {
            heading.set_text_content(Some(text));
        }
    }
}

fn element(document: &Document, id: &str) -> Result<HtmlElement, String> {
    document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| format!("missing element #{}", id))
}

fn set_visible(element: &HtmlElement, visible: bool) {
    if visible {
        let _ = element.style().remove_property("display");
    } else {
        hide(element);
    }
}

fn hide(element: &HtmlElement) {
    let _ = element.style().set_property("display", "none");
}
