// Data models for the fitness backend

pub mod activity;
pub mod food;
pub mod user;

pub use activity::{DailyReport, DailySummary, DashboardInfo, Exercise, ExerciseLog, NewExerciseLog, NewWaterIntake, WaterIntake};
pub use food::{Food, Meal, MealType, NewMeal, NewServing, Portion, Serving, ServingUpdate};
pub use user::{ActivityLevel, Gender, Goal, Physiology, ProfileUpdate, User};
