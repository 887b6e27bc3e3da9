use crate::{
    config::AppConfig,
    entities::{cart, cart_item, order, order_item, product},
    errors::ServiceError,
    events::{Event, EventSender},
    services::cart::CartService,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const ORDER_NUMBER_SUFFIX_LEN: usize = 5;

/// Converts a cart into an immutable order in a single transaction.
///
/// Every line is re-checked against live inventory and the decrement itself is
/// guarded by `inventory_count >= quantity`, so two checkouts racing over the
/// same stock cannot both succeed.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
    carts: CartService,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
        carts: CartService,
    ) -> Self {
        Self {
            db,
            event_sender,
            config,
            carts,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn checkout(
        &self,
        token: Option<String>,
        input: CheckoutInput,
    ) -> Result<OrderWithItems, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = self.carts.resolve_cart(&txn, token.as_deref()).await?;

        let lines = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(&txn)
            .await?;

        if lines.is_empty() {
            return Err(ServiceError::field("cart", "Your cart is empty."));
        }

        // Re-check every line against live stock before touching anything
        let mut products = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = product::Entity::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

            if item.inventory_count < line.quantity {
                return Err(ServiceError::field(
                    "cart",
                    format!(
                        "{} has only {} units left.",
                        item.name, item.inventory_count
                    ),
                ));
            }
            products.push(item);
        }

        let subtotal: Decimal = lines.iter().map(|line| line.line_total).sum();
        let order_number = self.allocate_order_number(&txn).await?;
        let order_id = Uuid::new_v4();

        let created = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            cart_token: Set(Some(cart.token.clone())),
            status: Set(order::OrderStatus::Pending),
            payment_status: Set(order::PaymentStatus::Unpaid),
            currency: Set(cart.currency.clone()),
            subtotal: Set(subtotal),
            tax_total: Set(Decimal::ZERO),
            shipping_total: Set(Decimal::ZERO),
            grand_total: Set(subtotal),
            customer_name: Set(input.customer_name),
            email: Set(input.email),
            phone: Set(input.phone),
            country_code: Set(input.country_code.map(|c| c.trim_start_matches('+').to_string())),
            address_line1: Set(input.address_line1),
            address_line2: Set(input.address_line2),
            city: Set(input.city),
            state: Set(input.state),
            postal_code: Set(input.postal_code),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut order_lines = Vec::with_capacity(lines.len());
        for (line, item) in lines.iter().zip(&products) {
            let frozen = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.id),
                product_name: Set(item.name.clone()),
                sku: Set(item.sku.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_total: Set(line.line_total),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
            order_lines.push(frozen);
        }

        // Conditional decrement; a zero-row match means another checkout won
        // the race and the whole transaction must fail.
        let mut decrements = Vec::with_capacity(lines.len());
        for (line, item) in lines.iter().zip(&products) {
            let result = product::Entity::update_many()
                .col_expr(
                    product::Column::InventoryCount,
                    Expr::col(product::Column::InventoryCount).sub(line.quantity),
                )
                .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(product::Column::Id.eq(item.id))
                .filter(product::Column::InventoryCount.gte(line.quantity))
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                warn!(
                    "Checkout lost inventory race on product {} ({})",
                    item.id, item.name
                );
                let remaining = product::Entity::find_by_id(item.id)
                    .one(&txn)
                    .await?
                    .map(|p| p.inventory_count)
                    .unwrap_or(0);
                return Err(ServiceError::field(
                    "cart",
                    format!("{} has only {} units left.", item.name, remaining),
                ));
            }

            decrements.push((item.id, item.inventory_count - line.quantity));
        }

        // Empty the cart and zero its derived totals
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;

        let mut emptied: cart::ActiveModel = cart.clone().into();
        emptied.items_count = Set(0);
        emptied.subtotal = Set(Decimal::ZERO);
        emptied.updated_at = Set(Utc::now());
        emptied.update(&txn).await?;

        txn.commit().await?;

        self.event_sender.send_or_log(Event::OrderCreated(order_id)).await;
        self.event_sender.send_or_log(Event::CartCleared(cart.id)).await;
        for (product_id, remaining) in decrements {
            self.event_sender
                .send_or_log(Event::InventoryDecremented {
                    product_id,
                    remaining,
                })
                .await;
        }

        info!(
            "Checkout completed: order {} ({}) from cart {}",
            order_number, order_id, cart.id
        );

        Ok(OrderWithItems {
            order: created,
            items: order_lines,
        })
    }

    async fn allocate_order_number(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<String, ServiceError> {
        allocate_order_number_with(conn, self.config.order_number_max_attempts, || {
            order_number_candidate(&self.config.order_number_prefix)
        })
        .await
    }
}

/// Picks the first candidate not already taken by an existing order.
///
/// The retry loop is bounded; exhausting it surfaces a conflict instead of
/// spinning.
async fn allocate_order_number_with<C, F>(
    conn: &C,
    max_attempts: u32,
    mut candidate: F,
) -> Result<String, ServiceError>
where
    C: ConnectionTrait,
    F: FnMut() -> String,
{
    for _ in 0..max_attempts {
        let number = candidate();

        let taken = order::Entity::find()
            .filter(order::Column::OrderNumber.eq(number.clone()))
            .count(conn)
            .await?;

        if taken == 0 {
            return Ok(number);
        }
    }

    Err(ServiceError::Conflict(
        "Could not allocate a unique order number".to_string(),
    ))
}

/// Builds a `PREFIX-YYYYMMDD-XXXXX` candidate with a random uppercase
/// alphanumeric suffix.
fn order_number_candidate(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_NUMBER_SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();

    format!("{}-{}-{}", prefix, Utc::now().format("%Y%m%d"), suffix)
}

/// Checkout shipping and contact details
#[derive(Debug)]
pub struct CheckoutInput {
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country_code: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub notes: Option<serde_json::Value>,
}

/// Order with its frozen lines
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[schema(value_type = Object)]
    pub order: order::Model,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<order_item::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn test_db() -> DatabaseConnection {
        // Single connection so the in-memory schema is shared across queries
        let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_owned());
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        crate::migrator::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_order(db: &DatabaseConnection, number: &str) {
        order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(number.to_string()),
            cart_token: Set(None),
            status: Set(order::OrderStatus::Pending),
            payment_status: Set(order::PaymentStatus::Unpaid),
            currency: Set("INR".to_string()),
            subtotal: Set(Decimal::ZERO),
            tax_total: Set(Decimal::ZERO),
            shipping_total: Set(Decimal::ZERO),
            grand_total: Set(Decimal::ZERO),
            customer_name: Set("Asha Rao".to_string()),
            email: Set("asha@example.com".to_string()),
            phone: Set(None),
            country_code: Set(None),
            address_line1: Set("12 Museum Road".to_string()),
            address_line2: Set(None),
            city: Set("Bengaluru".to_string()),
            state: Set(None),
            postal_code: Set("560001".to_string()),
            notes: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn allocation_retries_past_colliding_candidates() {
        let db = test_db().await;
        seed_order(&db, "VYOM-20260829-TAKEN").await;

        let mut attempts = 0;
        let number = allocate_order_number_with(&db, 10, || {
            attempts += 1;
            if attempts < 3 {
                "VYOM-20260829-TAKEN".to_string()
            } else {
                "VYOM-20260829-FRESH".to_string()
            }
        })
        .await
        .unwrap();

        assert_eq!(number, "VYOM-20260829-FRESH");
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn allocation_surfaces_conflict_when_attempts_run_out() {
        let db = test_db().await;
        seed_order(&db, "VYOM-20260829-TAKEN").await;

        let mut attempts = 0;
        let err = allocate_order_number_with(&db, 5, || {
            attempts += 1;
            "VYOM-20260829-TAKEN".to_string()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(attempts, 5);
    }

    #[test]
    fn order_number_format() {
        let number = order_number_candidate("VYOM");
        let parts: Vec<_> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "VYOM");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn order_number_uses_configured_prefix() {
        let number = order_number_candidate("SHOP");
        assert!(number.starts_with("SHOP-"));
    }
}
