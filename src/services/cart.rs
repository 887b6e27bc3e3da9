use crate::{
    config::AppConfig,
    entities::{cart, cart_item, product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Token-identified shopping cart service.
///
/// Carts are anonymous; the caller keeps an opaque token and sends it back
/// with every mutation. Totals (`items_count`, `subtotal`) are always
/// re-derived from the full line set before a transaction commits.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl CartService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            event_sender,
            config,
        }
    }

    /// Resolves a cart by token, creating a fresh one when the token is
    /// absent or unknown.
    #[instrument(skip(self))]
    pub async fn ensure_cart(&self, token: Option<String>) -> Result<CartWithItems, ServiceError> {
        if let Some(token) = token.as_deref() {
            if let Some(existing) = self.find_by_token(&*self.db, token).await? {
                let items = existing.find_related(cart_item::Entity).all(&*self.db).await?;
                return Ok(CartWithItems {
                    cart: existing,
                    items,
                });
            }
        }

        let created = self.create_cart(&*self.db).await?;
        Ok(CartWithItems {
            cart: created,
            items: Vec::new(),
        })
    }

    /// Adds a product to the cart identified by `token`, creating the cart
    /// when none exists yet.
    ///
    /// Re-snapshots the unit price on merge and validates the merged quantity
    /// against live inventory inside one transaction.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        token: Option<String>,
        input: AddToCartInput,
    ) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = match token.as_deref() {
            Some(token) => match self.find_by_token(&txn, token).await? {
                Some(cart) => cart,
                None => self.create_cart(&txn).await?,
            },
            None => self.create_cart(&txn).await?,
        };

        let item = product::Entity::find_by_id(input.product_id)
            .filter(product::Column::Status.eq(product::ProductStatus::Active))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let existing = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(input.product_id))
            .one(&txn)
            .await?;

        let merged_quantity = existing.as_ref().map_or(0, |line| line.quantity) + input.quantity;
        assert_inventory(&item, merged_quantity)?;

        if let Some(line) = existing {
            // Merge quantities and re-snapshot the current price
            let mut line: cart_item::ActiveModel = line.into();
            line.quantity = Set(merged_quantity);
            line.unit_price = Set(item.price);
            line.line_total = Set(item.price * Decimal::from(merged_quantity));
            line.updated_at = Set(Utc::now());
            line.update(&txn).await?;
        } else {
            let line = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(item.id),
                quantity: Set(input.quantity),
                unit_price: Set(item.price),
                line_total: Set(item.price * Decimal::from(input.quantity)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            line.insert(&txn).await?;
        }

        let cart_id = cart.id;
        let updated = self.recalculate_cart_totals(&txn, cart_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id,
                product_id: input.product_id,
            })
            .await;

        info!(
            "Added product {} x{} to cart {}",
            input.product_id, input.quantity, cart_id
        );
        Ok(updated)
    }

    /// Updates the quantity of a cart line owned by the token's cart.
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        token: Option<String>,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;
        let cart = self.resolve_cart(&txn, token.as_deref()).await?;

        let line = cart_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".to_string()))?;

        if line.cart_id != cart.id {
            return Err(ServiceError::Forbidden(
                "This item does not belong to your cart".to_string(),
            ));
        }

        let item = product::Entity::find_by_id(line.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        assert_inventory(&item, quantity)?;

        let mut line: cart_item::ActiveModel = line.into();
        line.quantity = Set(quantity);
        line.unit_price = Set(item.price);
        line.line_total = Set(item.price * Decimal::from(quantity));
        line.updated_at = Set(Utc::now());
        line.update(&txn).await?;

        let cart_id = cart.id;
        let updated = self.recalculate_cart_totals(&txn, cart_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemUpdated { cart_id, item_id })
            .await;

        Ok(updated)
    }

    /// Removes a cart line owned by the token's cart.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        token: Option<String>,
        item_id: Uuid,
    ) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;
        let cart = self.resolve_cart(&txn, token.as_deref()).await?;

        let line = cart_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".to_string()))?;

        if line.cart_id != cart.id {
            return Err(ServiceError::Forbidden(
                "This item does not belong to your cart".to_string(),
            ));
        }

        line.delete(&txn).await?;

        let cart_id = cart.id;
        let updated = self.recalculate_cart_totals(&txn, cart_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved { cart_id, item_id })
            .await;

        Ok(updated)
    }

    /// Resolves a cart strictly: missing token is a bad request, unknown
    /// token a not-found.
    pub async fn resolve_cart(
        &self,
        conn: &impl ConnectionTrait,
        token: Option<&str>,
    ) -> Result<cart::Model, ServiceError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::BadRequest("Cart token is required".to_string()))?;

        self.find_by_token(conn, token)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))
    }

    async fn find_by_token(
        &self,
        conn: &impl ConnectionTrait,
        token: &str,
    ) -> Result<Option<cart::Model>, ServiceError> {
        Ok(cart::Entity::find()
            .filter(cart::Column::Token.eq(token))
            .one(conn)
            .await?)
    }

    async fn create_cart(&self, conn: &impl ConnectionTrait) -> Result<cart::Model, ServiceError> {
        let cart_id = Uuid::new_v4();

        let created = cart::ActiveModel {
            id: Set(cart_id),
            token: Set(Uuid::new_v4().to_string()),
            email: Set(None),
            currency: Set(self.config.default_currency.clone()),
            items_count: Set(0),
            subtotal: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;

        self.event_sender.send_or_log(Event::CartCreated(cart_id)).await;

        info!("Created cart: {}", cart_id);
        Ok(created)
    }

    /// Re-derives `items_count` and `subtotal` from the full line set.
    pub async fn recalculate_cart_totals(
        &self,
        conn: &impl ConnectionTrait,
        cart_id: Uuid,
    ) -> Result<CartWithItems, ServiceError> {
        let items = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .all(conn)
            .await?;

        let subtotal: Decimal = items.iter().map(|line| line.line_total).sum();
        let items_count: i32 = items.iter().map(|line| line.quantity).sum();

        let mut active: cart::ActiveModel = cart::Entity::find_by_id(cart_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?
            .into();

        active.items_count = Set(items_count);
        active.subtotal = Set(subtotal);
        active.updated_at = Set(Utc::now());

        let updated = active.update(conn).await?;
        Ok(CartWithItems {
            cart: updated,
            items,
        })
    }
}

/// Rejects quantities the live inventory cannot cover.
fn assert_inventory(item: &product::Model, quantity: i32) -> Result<(), ServiceError> {
    if item.inventory_count < quantity {
        return Err(ServiceError::field(
            "quantity",
            format!("Only {} units available.", item.inventory_count),
        ));
    }
    Ok(())
}

/// Input for adding an item to a cart
#[derive(Debug)]
pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Cart with its lines
#[derive(Debug, Serialize, ToSchema)]
pub struct CartWithItems {
    #[schema(value_type = Object)]
    pub cart: cart::Model,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<cart_item::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_product(inventory: i32, price: Decimal) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            sku: "VY-001".into(),
            name: "Bronze Dancing Girl Replica".into(),
            slug: "bronze-dancing-girl-replica".into(),
            summary: None,
            description: None,
            price,
            compare_at_price: None,
            inventory_count: inventory,
            is_featured: false,
            status: product::ProductStatus::Active,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn inventory_assertion_rejects_shortfall() {
        let item = sample_product(3, dec!(499.00));
        let err = assert_inventory(&item, 4).unwrap_err();
        assert_eq!(err.response_message(), "Only 3 units available.");
    }

    #[test]
    fn inventory_assertion_allows_exact_fit() {
        let item = sample_product(3, dec!(499.00));
        assert!(assert_inventory(&item, 3).is_ok());
    }

    #[test]
    fn line_total_arithmetic() {
        let price = dec!(249.50);
        let line_total = price * Decimal::from(3);
        assert_eq!(line_total, dec!(748.50));
    }
}
