use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==================================================================================================
// Food catalogue
// ==================================================================================================

/// A named portion of a food (e.g. "1 slice")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    pub id: i64,
    pub name: String,
    pub weight_in_grams: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub calories: f64,
    pub carbohydrates: f64,
    pub proteins: f64,
    pub fats: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub portions: Vec<Portion>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ==================================================================================================
// Meals
// ==================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    #[serde(rename = "Café da manhã")]
    Breakfast,
    #[serde(rename = "Almoço")]
    Lunch,
    #[serde(rename = "Jantar")]
    Dinner,
    #[serde(rename = "Lanche")]
    Snack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub default_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMeal {
    pub name: String,
    pub default_time: NaiveTime,
}

// ==================================================================================================
// Servings (food consumption log)
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serving {
    pub id: i64,
    pub quantity: f64,
    pub meal_type: MealType,
    #[serde(default)]
    pub consumed_at: Option<NaiveDateTime>,
    pub consumed_calories: f64,
    pub food: Food,
    pub portion: Portion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewServing {
    pub quantity: f64,
    pub meal_type: MealType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<NaiveDateTime>,
    pub food_id: i64,
    pub portion_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portion_id: Option<i64>,
}
