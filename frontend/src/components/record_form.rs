use shared::form::{option_markup, populate, reset_values, serialize_controls};
use shared::{ControlValue, EntitySchema, FieldKind, Fields, FormControl, Record};
use wasm_bindgen::JsCast;
use web_sys::{HtmlFormElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, Node};

/// A named control inside the record form
enum Control {
    Input(HtmlInputElement),
    Select(HtmlSelectElement),
    TextArea(HtmlTextAreaElement),
}

impl Control {
    fn from_node(node: &Node) -> Option<Self> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            let skip = matches!(input.type_().as_str(), "submit" | "button" | "reset" | "image");
            return (!skip).then(|| Control::Input(input.clone()));
        }
        if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            return Some(Control::Select(select.clone()));
        }
        node.dyn_ref::<HtmlTextAreaElement>()
            .map(|textarea| Control::TextArea(textarea.clone()))
    }

    fn name(&self) -> String {
        match self {
            Control::Input(e) => e.name(),
            Control::Select(e) => e.name(),
            Control::TextArea(e) => e.name(),
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Control::Input(e) => FieldKind::from_input_type(&e.type_()),
            Control::Select(_) => FieldKind::Select,
            Control::TextArea(_) => FieldKind::TextArea,
        }
    }

    fn snapshot(&self) -> FormControl {
        match self {
            Control::Input(e) => FormControl {
                name: e.name(),
                kind: self.kind(),
                value: e.value(),
                checked: e.checked(),
            },
            Control::Select(e) => FormControl::new(e.name(), FieldKind::Select, e.value()),
            Control::TextArea(e) => FormControl::new(e.name(), FieldKind::TextArea, e.value()),
        }
    }

    fn set(&self, value: &ControlValue) {
        match (self, value) {
            (Control::Input(e), ControlValue::Checked(checked)) => e.set_checked(*checked),
            (Control::Input(e), ControlValue::Text(text)) => {
                // Hidden inputs reset to their default, not to empty
                if e.type_() == "hidden" {
                    e.set_default_value(text);
                }
                e.set_value(text);
            }
            (Control::Select(e), ControlValue::Text(text)) => {
                e.set_value(text);
                if e.value() != *text {
                    let _ = e.insert_adjacent_html("beforeend", &option_markup(text));
                    e.set_value(text);
                }
            }
            (Control::TextArea(e), ControlValue::Text(text)) => e.set_value(text),
            _ => {}
        }
    }
}

fn controls(form: &HtmlFormElement) -> Vec<Control> {
    let Ok(nodes) = form.query_selector_all("input, select, textarea") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| Control::from_node(&node))
        .collect()
}

/// Reads the form into a typed field mapping
pub fn read(form: &HtmlFormElement) -> Fields {
    let snapshots: Vec<FormControl> = controls(form).iter().map(Control::snapshot).collect();
    serialize_controls(&snapshots)
}

/// Writes a record's values into the matching controls
pub fn fill(form: &HtmlFormElement, record: &Record) {
    let controls = controls(form);
    let find = |name: &str| controls.iter().find(|c| c.name() == name);

    for (name, value) in populate(record, |name| find(name).map(Control::kind)) {
        if let Some(control) = find(&name) {
            control.set(&value);
        }
    }
}

/// Resets the form and blanks every control, including the hidden id
pub fn clear(form: &HtmlFormElement, schema: &EntitySchema) {
    form.reset();
    let controls = controls(form);
    for (name, value) in reset_values(schema) {
        if let Some(control) = controls.iter().find(|c| c.name() == name) {
            control.set(&value);
        }
    }
}
