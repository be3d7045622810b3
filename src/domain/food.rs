//! Food records extracted from menu pages
//!
//! A [`FoodRecord`] keeps every attribute as the string the menu published
//! (minus unit suffixes). Numeric coercion happens on demand through
//! [`coerce_numeric`] and [`NutritionFacts`], so an unreadable value stays
//! distinguishable from a real zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::location::DiningLocation;

/// Meal period an entry belongs to, inferred from the page structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Lunch,
    Dinner,
    #[default]
    Unknown,
}

impl MealType {
    /// Classify a section identifier such as `lunch_menu` or `dinner-section`.
    ///
    /// `lunch` wins over `dinner` when both appear.
    pub fn from_section_id(id: &str) -> Self {
        let id = id.to_lowercase();
        if id.contains("lunch") {
            Self::Lunch
        } else if id.contains("dinner") {
            Self::Dinner
        } else {
            Self::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Unknown => "unknown",
        }
    }
}

/// Unit suffix the menu appends to some quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSuffix {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "mg")]
    Milligrams,
}

impl UnitSuffix {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grams => "g",
            Self::Milligrams => "mg",
        }
    }

    /// Remove the trailing unit, e.g. `"12g"` -> `"12"`. Values without the
    /// suffix come back untouched.
    pub fn strip(self, raw: &str) -> String {
        raw.strip_suffix(self.as_str())
            .map_or(raw, str::trim_end)
            .to_string()
    }
}

/// Named attributes carried by every food record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodField {
    Name,
    ServingSize,
    Calories,
    CaloriesFromFat,
    TotalFatG,
    TotalFatDv,
    SaturatedFatG,
    TransFatG,
    CholesterolMg,
    SodiumMg,
    SodiumDv,
    TotalCarbG,
    TotalCarbDv,
    DietaryFiberG,
    DietaryFiberDv,
    SugarsG,
    ProteinG,
    ProteinDv,
    CarbonRating,
    DietTypes,
    Allergens,
}

impl FoodField {
    /// Every field, in output column order
    pub const ALL: [Self; 21] = [
        Self::Name,
        Self::ServingSize,
        Self::Calories,
        Self::CaloriesFromFat,
        Self::TotalFatG,
        Self::TotalFatDv,
        Self::SaturatedFatG,
        Self::TransFatG,
        Self::CholesterolMg,
        Self::SodiumMg,
        Self::SodiumDv,
        Self::TotalCarbG,
        Self::TotalCarbDv,
        Self::DietaryFiberG,
        Self::DietaryFiberDv,
        Self::SugarsG,
        Self::ProteinG,
        Self::ProteinDv,
        Self::CarbonRating,
        Self::DietTypes,
        Self::Allergens,
    ];

    /// Column / JSON key for this field
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ServingSize => "serving_size",
            Self::Calories => "calories",
            Self::CaloriesFromFat => "calories_from_fat",
            Self::TotalFatG => "total_fat_g",
            Self::TotalFatDv => "total_fat_dv",
            Self::SaturatedFatG => "saturated_fat_g",
            Self::TransFatG => "trans_fat_g",
            Self::CholesterolMg => "cholesterol_mg",
            Self::SodiumMg => "sodium_mg",
            Self::SodiumDv => "sodium_dv",
            Self::TotalCarbG => "total_carb_g",
            Self::TotalCarbDv => "total_carb_dv",
            Self::DietaryFiberG => "dietary_fiber_g",
            Self::DietaryFiberDv => "dietary_fiber_dv",
            Self::SugarsG => "sugars_g",
            Self::ProteinG => "protein_g",
            Self::ProteinDv => "protein_dv",
            Self::CarbonRating => "carbon_rating",
            Self::DietTypes => "diet_types",
            Self::Allergens => "allergens",
        }
    }

    /// Anchor attribute the menu site publishes this field under
    pub const fn default_attribute(self) -> &'static str {
        match self {
            Self::Name => "data-dish-name",
            Self::ServingSize => "data-serving-size",
            Self::Calories => "data-calories",
            Self::CaloriesFromFat => "data-calories-from-fat",
            Self::TotalFatG => "data-total-fat",
            Self::TotalFatDv => "data-total-fat-dv",
            Self::SaturatedFatG => "data-sat-fat",
            Self::TransFatG => "data-trans-fat",
            Self::CholesterolMg => "data-cholesterol",
            Self::SodiumMg => "data-sodium",
            Self::SodiumDv => "data-sodium-dv",
            Self::TotalCarbG => "data-total-carb",
            Self::TotalCarbDv => "data-total-carb-dv",
            Self::DietaryFiberG => "data-dietary-fiber",
            Self::DietaryFiberDv => "data-dietary-fiber-dv",
            Self::SugarsG => "data-sugars",
            Self::ProteinG => "data-protein",
            Self::ProteinDv => "data-protein-dv",
            Self::CarbonRating => "data-carbon-list",
            Self::DietTypes => "data-clean-diet-str",
            Self::Allergens => "data-allergens",
        }
    }

    /// Unit the published value carries, if any
    pub const fn unit(self) -> Option<UnitSuffix> {
        match self {
            Self::TotalFatG
            | Self::SaturatedFatG
            | Self::TransFatG
            | Self::TotalCarbG
            | Self::DietaryFiberG
            | Self::SugarsG
            | Self::ProteinG => Some(UnitSuffix::Grams),
            Self::CholesterolMg | Self::SodiumMg => Some(UnitSuffix::Milligrams),
            _ => None,
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(
            self,
            Self::Name | Self::ServingSize | Self::CarbonRating | Self::DietTypes | Self::Allergens
        )
    }
}

/// One nutrition entry for one menu item at one location and meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub location: DiningLocation,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serving_size: String,
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub calories_from_fat: String,
    #[serde(default)]
    pub total_fat_g: String,
    #[serde(default)]
    pub total_fat_dv: String,
    #[serde(default)]
    pub saturated_fat_g: String,
    #[serde(default)]
    pub trans_fat_g: String,
    #[serde(default)]
    pub cholesterol_mg: String,
    #[serde(default)]
    pub sodium_mg: String,
    #[serde(default)]
    pub sodium_dv: String,
    #[serde(default)]
    pub total_carb_g: String,
    #[serde(default)]
    pub total_carb_dv: String,
    #[serde(default)]
    pub dietary_fiber_g: String,
    #[serde(default)]
    pub dietary_fiber_dv: String,
    #[serde(default)]
    pub sugars_g: String,
    #[serde(default)]
    pub protein_g: String,
    #[serde(default)]
    pub protein_dv: String,
    #[serde(default)]
    pub carbon_rating: String,
    #[serde(default)]
    pub diet_types: String,
    #[serde(default)]
    pub allergens: String,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Additional configured attributes, keyed by output column
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl FoodRecord {
    /// Empty record tagged with its location; meal type starts as unknown
    pub fn new(location: DiningLocation) -> Self {
        Self {
            location,
            name: String::new(),
            serving_size: String::new(),
            calories: String::new(),
            calories_from_fat: String::new(),
            total_fat_g: String::new(),
            total_fat_dv: String::new(),
            saturated_fat_g: String::new(),
            trans_fat_g: String::new(),
            cholesterol_mg: String::new(),
            sodium_mg: String::new(),
            sodium_dv: String::new(),
            total_carb_g: String::new(),
            total_carb_dv: String::new(),
            dietary_fiber_g: String::new(),
            dietary_fiber_dv: String::new(),
            sugars_g: String::new(),
            protein_g: String::new(),
            protein_dv: String::new(),
            carbon_rating: String::new(),
            diet_types: String::new(),
            allergens: String::new(),
            meal_type: MealType::Unknown,
            category: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: FoodField) -> &str {
        match field {
            FoodField::Name => &self.name,
            FoodField::ServingSize => &self.serving_size,
            FoodField::Calories => &self.calories,
            FoodField::CaloriesFromFat => &self.calories_from_fat,
            FoodField::TotalFatG => &self.total_fat_g,
            FoodField::TotalFatDv => &self.total_fat_dv,
            FoodField::SaturatedFatG => &self.saturated_fat_g,
            FoodField::TransFatG => &self.trans_fat_g,
            FoodField::CholesterolMg => &self.cholesterol_mg,
            FoodField::SodiumMg => &self.sodium_mg,
            FoodField::SodiumDv => &self.sodium_dv,
            FoodField::TotalCarbG => &self.total_carb_g,
            FoodField::TotalCarbDv => &self.total_carb_dv,
            FoodField::DietaryFiberG => &self.dietary_fiber_g,
            FoodField::DietaryFiberDv => &self.dietary_fiber_dv,
            FoodField::SugarsG => &self.sugars_g,
            FoodField::ProteinG => &self.protein_g,
            FoodField::ProteinDv => &self.protein_dv,
            FoodField::CarbonRating => &self.carbon_rating,
            FoodField::DietTypes => &self.diet_types,
            FoodField::Allergens => &self.allergens,
        }
    }

    pub fn set(&mut self, field: FoodField, value: String) {
        let slot = match field {
            FoodField::Name => &mut self.name,
            FoodField::ServingSize => &mut self.serving_size,
            FoodField::Calories => &mut self.calories,
            FoodField::CaloriesFromFat => &mut self.calories_from_fat,
            FoodField::TotalFatG => &mut self.total_fat_g,
            FoodField::TotalFatDv => &mut self.total_fat_dv,
            FoodField::SaturatedFatG => &mut self.saturated_fat_g,
            FoodField::TransFatG => &mut self.trans_fat_g,
            FoodField::CholesterolMg => &mut self.cholesterol_mg,
            FoodField::SodiumMg => &mut self.sodium_mg,
            FoodField::SodiumDv => &mut self.sodium_dv,
            FoodField::TotalCarbG => &mut self.total_carb_g,
            FoodField::TotalCarbDv => &mut self.total_carb_dv,
            FoodField::DietaryFiberG => &mut self.dietary_fiber_g,
            FoodField::DietaryFiberDv => &mut self.dietary_fiber_dv,
            FoodField::SugarsG => &mut self.sugars_g,
            FoodField::ProteinG => &mut self.protein_g,
            FoodField::ProteinDv => &mut self.protein_dv,
            FoodField::CarbonRating => &mut self.carbon_rating,
            FoodField::DietTypes => &mut self.diet_types,
            FoodField::Allergens => &mut self.allergens,
        };
        *slot = value;
    }

    /// Numeric view of a field; `None` when the field is textual or unparseable
    pub fn numeric(&self, field: FoodField) -> Option<f64> {
        if field.is_numeric() {
            coerce_numeric(self.get(field))
        } else {
            None
        }
    }
}

/// Parse a published quantity. Blank or unparseable input is absent, not zero.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Numeric nutrition values of a record after coercion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub calories_from_fat: Option<f64>,
    pub total_fat_g: Option<f64>,
    pub total_fat_dv: Option<f64>,
    pub saturated_fat_g: Option<f64>,
    pub trans_fat_g: Option<f64>,
    pub cholesterol_mg: Option<f64>,
    pub sodium_mg: Option<f64>,
    pub sodium_dv: Option<f64>,
    pub total_carb_g: Option<f64>,
    pub total_carb_dv: Option<f64>,
    pub dietary_fiber_g: Option<f64>,
    pub dietary_fiber_dv: Option<f64>,
    pub sugars_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub protein_dv: Option<f64>,
}

impl NutritionFacts {
    pub fn from_record(record: &FoodRecord) -> Self {
        Self {
            calories: coerce_numeric(&record.calories),
            calories_from_fat: coerce_numeric(&record.calories_from_fat),
            total_fat_g: coerce_numeric(&record.total_fat_g),
            total_fat_dv: coerce_numeric(&record.total_fat_dv),
            saturated_fat_g: coerce_numeric(&record.saturated_fat_g),
            trans_fat_g: coerce_numeric(&record.trans_fat_g),
            cholesterol_mg: coerce_numeric(&record.cholesterol_mg),
            sodium_mg: coerce_numeric(&record.sodium_mg),
            sodium_dv: coerce_numeric(&record.sodium_dv),
            total_carb_g: coerce_numeric(&record.total_carb_g),
            total_carb_dv: coerce_numeric(&record.total_carb_dv),
            dietary_fiber_g: coerce_numeric(&record.dietary_fiber_g),
            dietary_fiber_dv: coerce_numeric(&record.dietary_fiber_dv),
            sugars_g: coerce_numeric(&record.sugars_g),
            protein_g: coerce_numeric(&record.protein_g),
            protein_dv: coerce_numeric(&record.protein_dv),
        }
    }

    /// Coerced value of a numeric field; `None` for textual fields
    pub const fn value(&self, field: FoodField) -> Option<f64> {
        match field {
            FoodField::Calories => self.calories,
            FoodField::CaloriesFromFat => self.calories_from_fat,
            FoodField::TotalFatG => self.total_fat_g,
            FoodField::TotalFatDv => self.total_fat_dv,
            FoodField::SaturatedFatG => self.saturated_fat_g,
            FoodField::TransFatG => self.trans_fat_g,
            FoodField::CholesterolMg => self.cholesterol_mg,
            FoodField::SodiumMg => self.sodium_mg,
            FoodField::SodiumDv => self.sodium_dv,
            FoodField::TotalCarbG => self.total_carb_g,
            FoodField::TotalCarbDv => self.total_carb_dv,
            FoodField::DietaryFiberG => self.dietary_fiber_g,
            FoodField::DietaryFiberDv => self.dietary_fiber_dv,
            FoodField::SugarsG => self.sugars_g,
            FoodField::ProteinG => self.protein_g,
            FoodField::ProteinDv => self.protein_dv,
            FoodField::Name
            | FoodField::ServingSize
            | FoodField::CarbonRating
            | FoodField::DietTypes
            | FoodField::Allergens => None,
        }
    }
}
