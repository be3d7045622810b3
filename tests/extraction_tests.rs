//! Extraction behavior on realistic menu page fragments
use dining_menu_scraper::domain::{DiningLocation, MealType};
use dining_menu_scraper::infrastructure::MenuParser;
use dining_menu_scraper::infrastructure::parsing::ExtractionConfig;
use rstest::rstest;

fn item(name: &str) -> String {
    format!(r#"<li class="lightbox-nutrition"><a data-dish-name="{name}">{name}</a></li>"#)
}

#[rstest]
#[case("lunch-section", MealType::Lunch)]
#[case("dinner-section", MealType::Dinner)]
#[case("breakfast-section", MealType::Unknown)]
#[case("LateNight_Lunch", MealType::Lunch)]
fn meal_type_follows_nearest_section_id(#[case] section_id: &str, #[case] expected: MealType) {
    let html = format!(r#"<div id="{section_id}"><ul>{}</ul></div>"#, item("Pasta"));
    let records = MenuParser::new().unwrap().extract_html(&html, DiningLocation::Worcester);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].meal_type, expected);
}

#[test]
fn nearest_identified_section_wins_even_without_meal_name() {
    let html = format!(
        r#"<div id="dinner_menu"><div id="station-12"><ul>{}</ul></div></div>"#,
        item("Curry")
    );
    let records = MenuParser::new().unwrap().extract_html(&html, DiningLocation::Franklin);
    assert_eq!(records[0].meal_type, MealType::Unknown);
}

#[test]
fn entry_without_section_is_unknown_and_uncategorized() {
    let html = format!("<ul>{}</ul>", item("Apple"));
    let records = MenuParser::new().unwrap().extract_html(&html, DiningLocation::Hampshire);

    assert_eq!(records[0].meal_type, MealType::Unknown);
    assert_eq!(records[0].category, None);
    let json = serde_json::to_value(&records[0]).unwrap();
    assert!(json.get("category").is_none());
    assert_eq!(json["meal_type"], "unknown");
}

#[test]
fn category_comes_from_closest_preceding_heading() {
    let html = format!(
        r#"<div id="lunch_menu">
             <h2 class="menu_category_name"> Deli </h2><ul>{}</ul>
             <h2 class="other_heading">Not a category</h2>
             <h2 class="menu_category_name">Desserts</h2><ul>{}{}</ul>
           </div>"#,
        item("Turkey Club"),
        item("Brownie"),
        item("Cookie")
    );
    let records = MenuParser::new().unwrap().extract_html(&html, DiningLocation::Berkshire);

    let categories: Vec<Option<&str>> = records.iter().map(|r| r.category.as_deref()).collect();
    assert_eq!(categories, [Some("Deli"), Some("Desserts"), Some("Desserts")]);
}

#[test]
fn anchorless_entries_are_skipped_in_order() {
    let html = format!(
        r#"<ul>{}<li class="lightbox-nutrition"><span>No data</span></li>{}</ul>"#,
        item("First"),
        item("Third")
    );
    let records = MenuParser::new().unwrap().extract_html(&html, DiningLocation::Hampshire);

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["First", "Third"]);
}

#[test]
fn extra_scored_field_is_configurable() {
    let config = ExtractionConfig::default().with_extra_field("healthfulness", "data-healthfulness");
    let parser = MenuParser::with_config(config).unwrap();
    let html = r#"<li class="lightbox-nutrition"><a data-dish-name="Salad" data-healthfulness="87">Salad</a></li>"#;

    let records = parser.extract_html(html, DiningLocation::Worcester);
    assert_eq!(records[0].extra.get("healthfulness").map(String::as_str), Some("87"));

    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["healthfulness"], "87");
}
