use crate::{
    entities::{tour_registration, tour_slot_occupancy},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Registrations listed per admin page.
pub const ADMIN_PAGE_SIZE: u64 = 15;

pub const MORNING_SLOT: &str = "Morning (10:30 AM - 12:00 PM)";
pub const AFTERNOON_SLOT: &str = "Afternoon (02:30 PM - 04:00 PM)";

/// Seats available per slot label. Unknown labels are uncapped.
pub fn slot_capacity(slot: &str) -> Option<i32> {
    match slot {
        MORNING_SLOT => Some(20),
        AFTERNOON_SLOT => Some(15),
        _ => None,
    }
}

/// Tour-slot booking service with per-(date, slot) capacity enforcement.
#[derive(Clone)]
pub struct BookingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl BookingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Remaining capacity for a (date, slot) pair.
    #[instrument(skip(self))]
    pub async fn availability(
        &self,
        date: NaiveDate,
        slot: &str,
    ) -> Result<SlotAvailability, ServiceError> {
        let capacity = slot_capacity(slot).map(i64::from);
        let booked = booked_count(&*self.db, date, slot).await?;

        Ok(SlotAvailability {
            capacity,
            booked,
            remaining: capacity.map(|cap| (cap - booked).max(0)),
        })
    }

    /// Registers a group for a tour slot.
    ///
    /// For capped slots the seats are claimed through a conditional update on
    /// the per-(date, slot) occupancy counter, guarded by
    /// `booked + attendees <= capacity`. A zero-row match means the claim
    /// lost to a concurrent registration and the whole transaction fails, so
    /// racing submissions cannot jointly overbook a slot.
    #[instrument(skip(self, input))]
    pub async fn register(
        &self,
        input: RegisterTourInput,
    ) -> Result<tour_registration::Model, ServiceError> {
        let attendees = input
            .adults_count
            .checked_add(input.students_count)
            .ok_or_else(|| ServiceError::field("adults_count", "Group size is too large."))?;
        if attendees < 1 {
            return Err(ServiceError::field(
                "adults_count",
                "Please provide at least one attendee for the visit.",
            ));
        }

        let txn = self.db.begin().await?;

        if let Some(capacity) = slot_capacity(&input.preferred_slot) {
            claim_slot_seats(
                &txn,
                input.preferred_date,
                &input.preferred_slot,
                capacity,
                attendees,
            )
            .await?;
        }

        let registration_id = Uuid::new_v4();
        let created = tour_registration::ActiveModel {
            id: Set(registration_id),
            contact_name: Set(input.contact_name),
            email: Set(input.email),
            phone: Set(input.phone),
            country_code: Set(input
                .country_code
                .map(|c| c.trim_start_matches('+').to_string())),
            organisation: Set(input.organisation),
            group_type: Set(input.group_type),
            preferred_date: Set(input.preferred_date),
            preferred_slot: Set(input.preferred_slot),
            adults_count: Set(input.adults_count),
            students_count: Set(input.students_count),
            needs_guided_tour: Set(input.needs_guided_tour),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::TourRegistrationCreated(registration_id))
            .await;

        info!(
            "Tour registration {} booked for {} ({} attendees)",
            registration_id, created.preferred_date, attendees
        );
        Ok(created)
    }

    /// Lists registrations newest first for the admin dashboard.
    pub async fn list_registrations(
        &self,
        page: u64,
    ) -> Result<(Vec<tour_registration::Model>, u64), ServiceError> {
        let paginator = tour_registration::Entity::find()
            .order_by_desc(tour_registration::Column::CreatedAt)
            .paginate(&*self.db, ADMIN_PAGE_SIZE);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }
}

/// Claims `attendees` seats on the (date, slot) occupancy counter.
///
/// The counter row is created on first use, then incremented with a
/// `booked + attendees <= capacity` guard; rows_affected == 0 means the slot
/// cannot take the group and the error carries the live remaining count.
async fn claim_slot_seats(
    conn: &impl ConnectionTrait,
    date: NaiveDate,
    slot: &str,
    capacity: i32,
    attendees: i32,
) -> Result<(), ServiceError> {
    tour_slot_occupancy::Entity::insert(tour_slot_occupancy::ActiveModel {
        id: Set(Uuid::new_v4()),
        slot_date: Set(date),
        slot_label: Set(slot.to_string()),
        booked: Set(0),
    })
    .on_conflict(
        OnConflict::columns([
            tour_slot_occupancy::Column::SlotDate,
            tour_slot_occupancy::Column::SlotLabel,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    // booked + attendees <= capacity, written as a bound on the column
    let result = tour_slot_occupancy::Entity::update_many()
        .col_expr(
            tour_slot_occupancy::Column::Booked,
            Expr::col(tour_slot_occupancy::Column::Booked).add(attendees),
        )
        .filter(tour_slot_occupancy::Column::SlotDate.eq(date))
        .filter(tour_slot_occupancy::Column::SlotLabel.eq(slot))
        .filter(tour_slot_occupancy::Column::Booked.lte(capacity.saturating_sub(attendees)))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let booked = tour_slot_occupancy::Entity::find()
            .filter(tour_slot_occupancy::Column::SlotDate.eq(date))
            .filter(tour_slot_occupancy::Column::SlotLabel.eq(slot))
            .one(conn)
            .await?
            .map(|row| row.booked)
            .unwrap_or(0);
        let remaining = (capacity - booked).max(0);

        if remaining == 0 {
            return Err(ServiceError::field(
                "preferred_slot",
                "The selected slot is fully booked for this date. Please choose another day or time.",
            ));
        }
        return Err(ServiceError::field(
            "preferred_slot",
            format!(
                "Only {} spots remain for the selected slot. Please adjust your group size or choose another date.",
                remaining
            ),
        ));
    }

    Ok(())
}

/// Attendees already booked for a (date, slot) pair.
async fn booked_count(
    conn: &impl ConnectionTrait,
    date: NaiveDate,
    slot: &str,
) -> Result<i64, ServiceError> {
    let registrations = tour_registration::Entity::find()
        .filter(tour_registration::Column::PreferredDate.eq(date))
        .filter(tour_registration::Column::PreferredSlot.eq(slot))
        .all(conn)
        .await?;

    Ok(registrations
        .iter()
        .map(|r| i64::from(r.attendees()))
        .sum())
}

/// Input for booking a tour slot
#[derive(Debug)]
pub struct RegisterTourInput {
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country_code: Option<String>,
    pub organisation: Option<String>,
    pub group_type: String,
    pub preferred_date: NaiveDate,
    pub preferred_slot: String,
    pub adults_count: i32,
    pub students_count: i32,
    pub needs_guided_tour: bool,
    pub notes: Option<String>,
}

/// Capacity snapshot for a (date, slot) pair
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotAvailability {
    /// None when the slot label carries no capacity limit
    pub capacity: Option<i64>,
    pub booked: i64,
    pub remaining: Option<i64>,
}
