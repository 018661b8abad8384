use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==================================================================================================
// Water intake
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntake {
    pub id: i64,
    pub quantity_ml: u32,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWaterIntake {
    pub quantity_ml: u32,
    pub date: NaiveDateTime,
}

// ==================================================================================================
// Exercise
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub calories_per_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: i64,
    /// Hours
    pub duration: f64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub exercise_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExerciseLog {
    pub exercise_id: i64,
    pub duration: f64,
    pub date: NaiveDateTime,
}

// ==================================================================================================
// Daily reports
// ==================================================================================================

/// Calorie and macro progress for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub target_calories: i64,
    pub current_calories: i64,
    pub daily_calories_progress: i64,
    pub carbohydrates: i64,
    pub proteins: i64,
    pub fats: i64,
}

impl DailySummary {
    pub fn remaining_calories(&self) -> i64 {
        self.target_calories - self.current_calories
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub bmr: f64,
    pub tdee: f64,
    pub consumed_calories: f64,
}

/// Generated markdown commentary on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    #[serde(default)]
    pub generated_text: Option<String>,
}

impl DailyReport {
    /// Report text, or `None` when the backend produced nothing
    pub fn text(&self) -> Option<&str> {
        self.generated_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
