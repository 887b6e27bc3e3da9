use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Inventory level below which the event loop raises a restock warning.
const LOW_INVENTORY_THRESHOLD: i32 = 10;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Event delivery is fire-and-forget; domain mutations never roll back on it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartCreated(Uuid),
    CartItemAdded { cart_id: Uuid, product_id: Uuid },
    CartItemUpdated { cart_id: Uuid, item_id: Uuid },
    CartItemRemoved { cart_id: Uuid, item_id: Uuid },
    CartCleared(Uuid),

    // Order events
    OrderCreated(Uuid),
    InventoryDecremented { product_id: Uuid, remaining: i32 },

    // Tour booking events
    TourRegistrationCreated(Uuid),
}

// Consumes events off the channel and logs them. Runs for the lifetime of the
// process; ends when the last sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::CartCreated(cart_id) => {
                info!("Cart created: {}", cart_id);
            }
            Event::CartItemAdded {
                cart_id,
                product_id,
            } => {
                info!("Cart {} gained product {}", cart_id, product_id);
            }
            Event::CartItemUpdated { cart_id, item_id } => {
                info!("Cart {} item {} updated", cart_id, item_id);
            }
            Event::CartItemRemoved { cart_id, item_id } => {
                info!("Cart {} item {} removed", cart_id, item_id);
            }
            Event::CartCleared(cart_id) => {
                info!("Cart cleared: {}", cart_id);
            }
            Event::OrderCreated(order_id) => {
                info!("Order created: {}", order_id);
            }
            Event::InventoryDecremented {
                product_id,
                remaining,
            } => {
                if remaining < LOW_INVENTORY_THRESHOLD {
                    warn!(
                        "Low inventory alert: product {} has only {} units remaining",
                        product_id, remaining
                    );
                } else {
                    info!(
                        "Inventory decremented: product {} now at {}",
                        product_id, remaining
                    );
                }
            }
            Event::TourRegistrationCreated(registration_id) => {
                info!("Tour registration created: {}", registration_id);
            }
        }
    }

    warn!("Event processing loop has ended");
}
