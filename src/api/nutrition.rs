use chrono::NaiveDate;
use reqwest::Method;

use super::FitnessApi;
use crate::error::Result;
use crate::models::{DailyReport, DailySummary, DashboardInfo, Food, Meal, NewMeal, NewServing, Serving, ServingUpdate};

impl FitnessApi {
    /// Search the food catalogue; a blank query never hits the network
    pub async fn search_foods(&self, query: &str) -> Result<Vec<Food>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_json("/foods/", &[("q", query.to_string())]).await
    }

    pub async fn meals(&self) -> Result<Vec<Meal>> {
        self.get_json("/users/me/meals", &[]).await
    }

    pub async fn create_meal(&self, meal: &NewMeal) -> Result<Meal> {
        self.send_json(Method::POST, "/meals/", meal).await
    }

    pub async fn delete_meal(&self, id: i64) -> Result<()> {
        self.delete(&format!("/meals/{}", id)).await
    }

    pub async fn log_serving(&self, serving: &NewServing) -> Result<Serving> {
        self.send_json(Method::POST, "/servings", serving).await
    }

    pub async fn update_serving(&self, id: i64, update: &ServingUpdate) -> Result<Serving> {
        self.send_json(Method::PUT, &format!("/servings/{}", id), update)
            .await
    }

    pub async fn delete_serving(&self, id: i64) -> Result<()> {
        self.delete(&format!("/servings/{}", id)).await
    }

    pub async fn daily_overview(&self, date: NaiveDate) -> Result<DailySummary> {
        self.get_json(
            "/users/me/daily-overview",
            &[("date", date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    pub async fn daily_report(&self, date: NaiveDate) -> Result<DailyReport> {
        self.get_json(
            "/users/me/daily-report",
            &[("date", date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    pub async fn dashboard_info(&self, day: NaiveDate) -> Result<DashboardInfo> {
        self.get_json(
            "/dashboard-info",
            &[("day", day.format("%Y-%m-%d").to_string())],
        )
        .await
    }
}
