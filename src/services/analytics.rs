use crate::{
    entities::{cart, order, order_item, tour_registration},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

const TOP_PRODUCTS_LIMIT: usize = 5;
const RECENT_ORDERS_LIMIT: u64 = 6;

/// Read-side dashboard aggregations, recomputed per request.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardAnalytics, ServiceError> {
        Ok(DashboardAnalytics {
            cards: self.cards().await?,
            top_products: self.top_products().await?,
            recent_orders: self.recent_orders().await?,
        })
    }

    async fn cards(&self) -> Result<DashboardCards, ServiceError> {
        let db = &*self.db;

        let orders = order::Entity::find().all(db).await?;
        let total_revenue: Decimal = orders.iter().map(|o| o.grand_total).sum();
        let total_orders = orders.len() as u64;
        let pending_orders = orders
            .iter()
            .filter(|o| o.status == order::OrderStatus::Pending)
            .count() as u64;
        let unique_customers = orders
            .iter()
            .map(|o| o.email.to_ascii_lowercase())
            .collect::<HashSet<_>>()
            .len() as u64;

        let active_carts = cart::Entity::find()
            .filter(cart::Column::ItemsCount.gt(0))
            .count(db)
            .await?;

        let total_tour_registrations = tour_registration::Entity::find().count(db).await?;
        let upcoming_tours = tour_registration::Entity::find()
            .filter(tour_registration::Column::PreferredDate.gte(Utc::now().date_naive()))
            .count(db)
            .await?;

        Ok(DashboardCards {
            total_revenue,
            total_orders,
            pending_orders,
            unique_customers,
            active_carts,
            total_tour_registrations,
            upcoming_tours,
        })
    }

    /// Top sellers by total quantity across all order lines.
    async fn top_products(&self) -> Result<Vec<TopProduct>, ServiceError> {
        let lines = order_item::Entity::find().all(&*self.db).await?;

        let mut by_product: HashMap<Uuid, TopProduct> = HashMap::new();
        for line in lines {
            let entry = by_product.entry(line.product_id).or_insert(TopProduct {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                total_quantity: 0,
                total_amount: Decimal::ZERO,
            });
            entry.total_quantity += i64::from(line.quantity);
            entry.total_amount += line.line_total;
        }

        let mut ranked: Vec<_> = by_product.into_values().collect();
        ranked.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
        ranked.truncate(TOP_PRODUCTS_LIMIT);
        Ok(ranked)
    }

    async fn recent_orders(&self) -> Result<Vec<RecentOrder>, ServiceError> {
        let orders = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(RECENT_ORDERS_LIMIT)
            .all(&*self.db)
            .await?;

        Ok(orders
            .into_iter()
            .map(|o| RecentOrder {
                order_number: o.order_number,
                customer_name: o.customer_name,
                status: o.status,
                payment_status: o.payment_status,
                grand_total: o.grand_total,
                created_at: o.created_at,
            })
            .collect())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardAnalytics {
    pub cards: DashboardCards,
    pub top_products: Vec<TopProduct>,
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardCards {
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub unique_customers: u64,
    pub active_carts: u64,
    pub total_tour_registrations: u64,
    pub upcoming_tours: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_quantity: i64,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentOrder {
    pub order_number: String,
    pub customer_name: String,
    #[schema(value_type = String)]
    pub status: order::OrderStatus,
    #[schema(value_type = String)]
    pub payment_status: order::PaymentStatus,
    #[schema(value_type = String)]
    pub grand_total: Decimal,
    pub created_at: DateTime<Utc>,
}
