use serde::{Deserialize, Serialize};

// ==================================================================================================
// Physiology enums
// ==================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintenance,
    GainMass,
}

/// Activity level, sent over the wire as its TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ActivityLevel {
    Sedentary,
    LightExercise,
    ModerateExercise,
    HardExercise,
    Athlete,
}

impl ActivityLevel {
    const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightExercise,
        ActivityLevel::ModerateExercise,
        ActivityLevel::HardExercise,
        ActivityLevel::Athlete,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightExercise => 1.375,
            ActivityLevel::ModerateExercise => 1.55,
            ActivityLevel::HardExercise => 1.725,
            ActivityLevel::Athlete => 1.9,
        }
    }
}

impl TryFrom<f64> for ActivityLevel {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|level| (level.multiplier() - value).abs() < 1e-6)
            .ok_or_else(|| format!("unknown activity level multiplier: {}", value))
    }
}

impl From<ActivityLevel> for f64 {
    fn from(level: ActivityLevel) -> Self {
        level.multiplier()
    }
}

// ==================================================================================================
// Users
// ==================================================================================================

/// Profile returned by `/users/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub has_provided_info: bool,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u32>,
    /// Centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub goal_type: Option<Goal>,
    #[serde(default)]
    pub bmr: Option<f64>,
    #[serde(default)]
    pub tdee: Option<f64>,
    #[serde(default)]
    pub goal_calories: Option<f64>,
}

/// Onboarding form data, all fields required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Physiology {
    pub gender: Gender,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub activity_level: ActivityLevel,
    pub goal_type: Goal,
}

/// Partial profile update; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<Goal>,
}
