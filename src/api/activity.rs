use reqwest::Method;

use super::FitnessApi;
use crate::error::Result;
use crate::models::{Exercise, ExerciseLog, NewExerciseLog, NewWaterIntake, WaterIntake};

impl FitnessApi {
    pub async fn log_water(&self, intake: &NewWaterIntake) -> Result<WaterIntake> {
        self.send_json(Method::POST, "/water-intakes/", intake).await
    }

    pub async fn delete_water_intake(&self, id: i64) -> Result<()> {
        self.delete(&format!("/water-intakes/{}", id)).await
    }

    pub async fn exercises(&self) -> Result<Vec<Exercise>> {
        self.get_json("/exercises/", &[]).await
    }

    pub async fn log_exercise(&self, log: &NewExerciseLog) -> Result<ExerciseLog> {
        self.send_json(Method::POST, "/exercise-logs/", log).await
    }

    pub async fn delete_exercise_log(&self, id: i64) -> Result<()> {
        self.delete(&format!("/exercise-logs/{}", id)).await
    }
}
