//! # Card Rendering
//!
//! Turns records into card markup. Record fields are user input, so every
//! card is passed through an allow-list HTML sanitizer before it is handed
//! to the DOM. Optional sections are kept in the markup and hidden with an
//! inline `display:none;` when their field is missing.

use chrono::DateTime;

use crate::schema::{EntityKind, EntitySchema};
use crate::Record;

/// Shown in place of the card list when the collection is empty
pub const NO_DATA_HTML: &str = "<p><i>No data found in the database.</i></p>";

const HIDDEN: &str = "display:none;";

/// Rendered markup for one record
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub html: String,
}

/// What the content area should show for a fetched list
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Empty,
    Cards(Vec<Card>),
}

/// One card per record, in the order given
pub fn render_list<'a, I>(schema: &EntitySchema, records: I) -> ListView
where
    I: IntoIterator<Item = &'a Record>,
{
    let cards: Vec<Card> = records
        .into_iter()
        .map(|record| Card {
            id: record.id.clone(),
            html: render_card(schema, record),
        })
        .collect();

    if cards.is_empty() {
        ListView::Empty
    } else {
        ListView::Cards(cards)
    }
}

/// Sanitized inner markup of a record card, including the edit and delete
/// buttons (`.edit-btn`, `.delete-btn`) that the caller wires up.
pub fn render_card(schema: &EntitySchema, record: &Record) -> String {
    let template = match schema.kind {
        EntityKind::Cats => cat_template(record),
        EntityKind::Recipes => recipe_template(record),
    };
    sanitize(&template)
}

/// Strips scripts, event handlers and any tag or attribute the cards do not use.
pub fn sanitize(html: &str) -> String {
    ammonia::Builder::default()
        .add_tags(["section", "meter", "button", "h4"])
        .add_generic_attributes(["class", "style", "data-id"])
        .add_tag_attributes("meter", ["min", "max", "value"])
        .add_tag_attributes("button", ["type"])
        .clean(html)
        .to_string()
}

/// Escapes text destined for an attribute value
fn attr(value: &str) -> String {
    ammonia::clean_text(value)
}

/// A colour safe to place in a `style` attribute: `#rgb`, `#rrggbb` or a
/// plain colour name. Anything else renders as no colour.
fn css_color(value: &str) -> &str {
    let value = value.trim();
    let valid = match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()),
    };
    if valid {
        value
    } else {
        ""
    }
}

fn hidden_unless(present: bool) -> &'static str {
    if present {
        ""
    } else {
        HIDDEN
    }
}

fn actions() -> &'static str {
    r#"<div class="item-actions">
        <button type="button" class="edit-btn">Edit</button>
        <button type="button" class="delete-btn">Delete</button>
    </div>"#
}

/// Birthday widget with month, day and year in UTC; empty without a date
fn calendar_widget(date: &str) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(date) else {
        return String::new();
    };
    let utc = parsed.naive_utc();
    format!(
        r#"<div class="calendar">
            <div class="born"><img src="./assets/birthday.svg"></div>
            <div class="month">{}</div>
            <div class="day">{}</div>
            <div class="year">{}</div>
        </div>"#,
        utc.format("%b"),
        utc.format("%d"),
        utc.format("%Y")
    )
}

fn cat_template(item: &Record) -> String {
    let microchip = if item.has("microchip") {
        item.text("microchip")
    } else {
        "<i>???</i>".to_string()
    };
    let primary = item.text("primaryColor");
    let secondary = item.text("secondaryColor");
    let food = item.text("food");
    let adopted = item.get("isAdopted").map(crate::value_is_truthy).unwrap_or(false);

    format!(
        r#"<div class="item-heading">
        <h3>{name}</h3>
        <div class="microchip-info">
            <img src="./assets/chip.svg"> {microchip}
        </div>
    </div>
    <div class="item-info">
        <div class="item-icon" style="background: linear-gradient(135deg, {primary} 0%, {primary} 40%, {secondary} 60%, {secondary} 100%);"></div>
        <div class="stats">
            <div class="stat">
                <span>Playfulness</span>
                <meter max="10" min="0" value="{playfulness}"></meter>
            </div>
            <div class="stat">
                <span>Appetite</span>
                <meter max="10" min="0" value="{appetite}"></meter>
            </div>
        </div>
        {calendar}
    </div>
    <div class="item-info">
        <section class="breed" style="{breed_style}">
            <img src="./assets/ribbon.svg"> {breed}
        </section>
        <section class="food" style="{food_style}">
            <img src="./assets/{food_icon}.svg"> <span>{food} food</span>
        </section>
        <section class="adoption">
            <img src="./assets/{adoption_icon}.svg"> {adoption}
        </section>
    </div>
    <section class="description" style="{description_style}">
        <p>{description}</p>
    </section>
    {actions}"#,
        name = item.text("name"),
        microchip = microchip,
        primary = css_color(&primary),
        secondary = css_color(&secondary),
        playfulness = item.number("playfulness").unwrap_or(0.0),
        appetite = item.number("appetite").unwrap_or(0.0),
        calendar = calendar_widget(&item.text("birthDate")),
        breed_style = hidden_unless(item.has("breed")),
        breed = item.text("breed"),
        food_style = hidden_unless(item.has("food")),
        food_icon = attr(&food),
        food = food,
        adoption_icon = if adopted { "adopted" } else { "paw" },
        adoption = if adopted { "Adopted" } else { "Available" },
        description_style = hidden_unless(item.has("description")),
        description = item.text("description"),
        actions = actions(),
    )
}

/// Splits a comma-separated ingredient string, dropping blank entries
pub fn parse_ingredients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn recipe_template(item: &Record) -> String {
    let ingredients: String = parse_ingredients(&item.text("ingredients"))
        .iter()
        .map(|i| format!("<li>{}</li>", i))
        .collect();
    let steps: String = item
        .text("steps")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{}</li>", line))
        .collect();
    let recipe_type = item.text("type");

    format!(
        r#"<div class="item-heading">
        <h3>{title}</h3>
        <span class="recipe-type {type_class}" style="{type_style}">{recipe_type}</span>
    </div>
    <div class="item-info stats">
        <section class="calories" style="{calories_style}">
            <span>Calories</span> <strong>{calories}</strong>
        </section>
        <section class="protein" style="{protein_style}">
            <span>Protein</span> <strong>{protein} g</strong>
        </section>
    </div>
    <section class="ingredients" style="{ingredients_style}">
        <h4>Ingredients</h4>
        <ul>{ingredients}</ul>
    </section>
    <section class="steps" style="{steps_style}">
        <h4>Steps</h4>
        <ol>{steps}</ol>
    </section>
    <section class="description" style="{description_style}">
        <p>{description}</p>
    </section>
    {actions}"#,
        title = item.text("title"),
        type_class = attr(&recipe_type),
        type_style = hidden_unless(item.has("type")),
        recipe_type = recipe_type,
        calories_style = hidden_unless(item.has("calories")),
        calories = item.text("calories"),
        protein_style = hidden_unless(item.has("proteinGrams")),
        protein = item.text("proteinGrams"),
        ingredients_style = hidden_unless(!ingredients.is_empty()),
        ingredients = ingredients,
        steps_style = hidden_unless(!steps.is_empty()),
        steps = steps,
        description_style = hidden_unless(item.has("description")),
        description = item.text("description"),
        actions = actions(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CATS, RECIPES};
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).expect("valid record")
    }

    #[test]
    fn test_cat_card_with_all_fields() {
        let cat = record(json!({
            "id": "c1",
            "name": "Tom",
            "microchip": "985112345678901",
            "primaryColor": "#222222",
            "secondaryColor": "#ffffff",
            "playfulness": 7,
            "appetite": 3,
            "birthDate": "2020-03-05T00:00:00.000Z",
            "breed": "Tabby",
            "food": "wet",
            "isAdopted": true,
            "description": "Loves boxes"
        }));
        let html = render_card(&CATS, &cat);

        assert!(html.contains("<h3>Tom</h3>"));
        assert!(html.contains("985112345678901"));
        assert!(html.contains(r#"value="7""#));
        assert!(html.contains(r#"<div class="month">Mar</div>"#));
        assert!(html.contains(r#"<div class="day">05</div>"#));
        assert!(html.contains(r#"<div class="year">2020</div>"#));
        assert!(html.contains("<span>wet food</span>"));
        assert!(html.contains("./assets/adopted.svg"));
        assert!(html.contains("Adopted"));
        assert!(html.contains(r#"class="edit-btn""#));
        assert!(html.contains(r#"class="delete-btn""#));
        assert!(!html.contains(HIDDEN));
    }

    #[test]
    fn test_cat_card_missing_optional_fields_are_hidden() {
        let cat = record(json!({"id": "c2", "name": "Stray"}));
        let html = render_card(&CATS, &cat);

        assert!(html.contains("<i>???</i>"));
        assert!(html.contains(r#"class="breed" style="display:none;""#));
        assert!(html.contains(r#"class="food" style="display:none;""#));
        assert!(html.contains(r#"class="description" style="display:none;""#));
        assert!(html.contains(r#"value="0""#));
        assert!(html.contains("Available"));
        assert!(!html.contains(r#"class="calendar""#));
    }

    #[test]
    fn test_script_content_is_sanitized() {
        let cat = record(json!({
            "id": "c3",
            "name": "<script>alert('name')</script>Mallory",
            "description": "<img src=x onerror=\"alert(1)\"><b>bold</b>",
            "primaryColor": "red\" onmouseover=\"alert(2)"
        }));
        let html = render_card(&CATS, &cat);

        assert!(!html.contains("<script"));
        assert!(!html.contains("alert('name')"));
        assert!(!html.contains("onerror"));
        assert!(!html.contains("onmouseover=\""));
        assert!(html.contains("Mallory"));
        assert!(html.contains("<b>bold</b>"));
    }

    #[test]
    fn test_colours_cannot_inject_css() {
        let cat = record(json!({
            "id": "c4",
            "name": "Tom",
            "primaryColor": "red); background-image: url(https://evil.example/track.png",
            "secondaryColor": "rebeccapurple"
        }));
        let html = render_card(&CATS, &cat);

        assert!(!html.contains("evil.example"));
        assert!(!html.contains("background-image"));
        assert!(html.contains("rebeccapurple 100%"));

        assert_eq!(css_color("#1a2B3c"), "#1a2B3c");
        assert_eq!(css_color("#fff"), "#fff");
        assert_eq!(css_color("#12345"), "");
        assert_eq!(css_color("red;color:blue"), "");
    }

    #[test]
    fn test_recipe_card_sections() {
        let soup = record(json!({
            "id": "r1",
            "title": "Miso soup",
            "type": "meal",
            "calories": 0,
            "ingredients": "miso, tofu, ,scallions",
            "steps": "Boil water\n\nAdd miso\n",
            "description": null
        }));
        let html = render_card(&RECIPES, &soup);

        assert!(html.contains("<h3>Miso soup</h3>"));
        assert!(html.contains(r#"class="recipe-type meal""#));
        assert!(html.contains("<strong>0</strong>"));
        assert!(html.contains("<ul><li>miso</li><li>tofu</li><li>scallions</li></ul>"));
        assert!(html.contains("<ol><li>Boil water</li><li>Add miso</li></ol>"));
        assert!(html.contains(r#"class="protein" style="display:none;""#));
        assert!(html.contains(r#"class="description" style="display:none;""#));
    }

    #[test]
    fn test_recipe_steps_are_sanitized() {
        let drink = record(json!({
            "id": "r2",
            "title": "Tea",
            "type": "drink",
            "steps": "<script>document.cookie</script>Steep"
        }));
        let html = render_card(&RECIPES, &drink);
        assert!(!html.contains("<script"));
        assert!(!html.contains("document.cookie"));
        assert!(html.contains("Steep"));
    }

    #[test]
    fn test_recipe_without_ingredients_hides_section() {
        let bare = record(json!({"id": "r3", "title": "Water", "type": "drink"}));
        let html = render_card(&RECIPES, &bare);
        assert!(html.contains(r#"class="ingredients" style="display:none;""#));
        assert!(html.contains(r#"class="steps" style="display:none;""#));
    }

    #[test]
    fn test_render_list() {
        assert_eq!(render_list(&CATS, &Vec::<Record>::new()), ListView::Empty);

        let cats = vec![
            record(json!({"id": "b", "name": "Bo"})),
            record(json!({"id": "a", "name": "Al"})),
        ];
        match render_list(&CATS, &cats) {
            ListView::Cards(cards) => {
                let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["b", "a"]);
            }
            ListView::Empty => panic!("expected cards"),
        }
    }

    #[test]
    fn test_parse_ingredients() {
        assert_eq!(parse_ingredients("a, b ,c"), vec!["a", "b", "c"]);
        assert!(parse_ingredients("").is_empty());
        assert!(parse_ingredients(" , ,").is_empty());
    }
}
