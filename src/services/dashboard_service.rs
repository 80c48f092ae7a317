use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::DailyOverview;
use crate::services::{GoalService, NotificationService, NutritionService, StepService, WorkoutService};

#[derive(Clone)]
pub struct DashboardService {
    steps: StepService,
    workouts: WorkoutService,
    nutrition: NutritionService,
    goals: GoalService,
    notifications: NotificationService,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self {
            steps: StepService::new(db.clone()),
            workouts: WorkoutService::new(db.clone()),
            nutrition: NutritionService::new(db.clone()),
            goals: GoalService::new(db.clone()),
            notifications: NotificationService::new(db),
        }
    }

    pub async fn daily_overview(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyOverview> {
        let today = Utc::now().date_naive();

        let (steps, workouts, nutrition, active_goals, unread) = tokio::try_join!(
            self.steps.get_day(user_id, date),
            self.workouts.daily_totals(user_id, date),
            self.nutrition.daily_summary(user_id, date),
            self.goals.active_goal_views(user_id, today),
            self.notifications.unread_count(user_id),
        )?;

        Ok(DailyOverview::new(
            date,
            steps,
            workouts,
            nutrition,
            active_goals,
            unread,
        ))
    }
}
