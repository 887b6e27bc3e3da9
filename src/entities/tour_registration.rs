use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guided-visit registration for a (date, slot) pair
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour_registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contact_name: String,
    pub email: String,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    #[sea_orm(nullable)]
    pub country_code: Option<String>,
    #[sea_orm(nullable)]
    pub organisation: Option<String>,
    pub group_type: String,
    pub preferred_date: NaiveDate,
    pub preferred_slot: String,
    pub adults_count: i32,
    pub students_count: i32,
    pub needs_guided_tour: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Total attendees counted against the slot capacity.
    pub fn attendees(&self) -> i32 {
        self.adults_count + self.students_count
    }
}
