//! Initial catalog and site-content data for fresh installations.

use crate::entities::{about_content, product, product_image};
use crate::errors::ServiceError;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::info;
use uuid::Uuid;

struct SeedProduct {
    sku: &'static str,
    name: &'static str,
    slug: &'static str,
    summary: &'static str,
    description: &'static str,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    inventory_count: i32,
    is_featured: bool,
    images: &'static [&'static str],
}

fn seed_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            sku: "VYM-0001",
            name: "Brocade Banarasi Wall Panel",
            slug: "brocade-banarasi-wall-panel",
            summary: "Opulent gold-and-indigo Banarasi brocade woven circa 1910 in Varanasi workshops.",
            description: "Antique panel handwoven with real zari and mulberry silk, restored by Vyom Heritage conservators. Includes an archival provenance dossier.",
            price: dec!(18500),
            compare_at_price: Some(dec!(21500)),
            inventory_count: 3,
            is_featured: true,
            images: &[
                "https://images.unsplash.com/photo-1526498460520-4c246339dccb?auto=format&fit=crop&w=900&q=80",
                "https://images.unsplash.com/photo-1582719478250-c89cae4dc85b?auto=format&fit=crop&w=900&q=80",
            ],
        },
        SeedProduct {
            sku: "VYM-0002",
            name: "Kutch Mirrorwork Textile Scroll",
            slug: "kutch-mirrorwork-textile-scroll",
            summary: "Hand-embroidered mirrorwork textile featuring tribal motifs from Kutch, Gujarat.",
            description: "Each mirrored motif is hand-appliqued by Rabari artisans. The scroll is mounted on cotton backing for preservation.",
            price: dec!(14200),
            compare_at_price: None,
            inventory_count: 5,
            is_featured: false,
            images: &[
                "https://images.unsplash.com/photo-1503387762-592deb58ef4e?auto=format&fit=crop&w=900&q=80",
            ],
        },
        SeedProduct {
            sku: "VYM-0003",
            name: "Indigo Ajrakh Shawl",
            slug: "indigo-ajrakh-shawl",
            summary: "Natural indigo Ajrakh shawl block-printed with hand-carved wooden blocks.",
            description: "Crafted in Bhuj using slow multi-stage dyeing with indigo, madder and iron. The shawl arrives in a museum archival box.",
            price: dec!(9800),
            compare_at_price: Some(dec!(11200)),
            inventory_count: 8,
            is_featured: true,
            images: &[
                "https://images.unsplash.com/photo-1542293787938-4d2226c12e79?auto=format&fit=crop&w=900&q=80",
            ],
        },
    ]
}

/// Seeds the catalog and about-page content. Idempotent: tables that already
/// hold rows are left untouched.
pub async fn seed(db: &DatabaseConnection) -> Result<(), ServiceError> {
    seed_catalog(db).await?;
    seed_about_content(db).await?;
    Ok(())
}

async fn seed_catalog(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if product::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let items = seed_products();
    let count = items.len();
    for item in items {
        let product_id = Uuid::new_v4();
        product::ActiveModel {
            id: Set(product_id),
            sku: Set(item.sku.to_string()),
            name: Set(item.name.to_string()),
            slug: Set(item.slug.to_string()),
            summary: Set(Some(item.summary.to_string())),
            description: Set(Some(item.description.to_string())),
            price: Set(item.price),
            compare_at_price: Set(item.compare_at_price),
            inventory_count: Set(item.inventory_count),
            is_featured: Set(item.is_featured),
            status: Set(product::ProductStatus::Active),
            metadata: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        for (position, url) in item.images.iter().enumerate() {
            product_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                url: Set(url.to_string()),
                alt_text: Set(Some(item.name.to_string())),
                sort_order: Set(position as i32),
                created_at: Set(Utc::now()),
            }
            .insert(db)
            .await?;
        }
    }

    info!("Seeded {} catalog products", count);
    Ok(())
}

async fn seed_about_content(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if about_content::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    about_content::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Vyom Heritage Museum".to_string()),
        paragraph_one: Set(
            "Vyom Heritage Museum is a living archive celebrating India's textile legacies. \
             Our curators travel across craft clusters, collecting heirloom pieces, oral \
             histories, and the techniques that have shaped textile artistry for centuries."
                .to_string(),
        ),
        paragraph_two: Set(
            "The museum is nested within a restored haveli in Ahmedabad and houses rotating \
             exhibits of brocade, resist-dyed textiles, and our conservatory lab. Every program \
             is intentionally intimate so guests can experience conservation in action."
                .to_string(),
        ),
        paragraph_three: Set(
            "We collaborate with master artisans, conservation scientists, and design schools \
             to keep the handloom economy vibrant. Whether you are a collector, researcher, or \
             traveller, we welcome you to experience the tapestry of Vyom Heritage."
                .to_string(),
        ),
        image_url: Set(Some(
            "https://images.unsplash.com/photo-1495435229349-e86db7bfa013?ixlib=rb-4.0.3&auto=format&fit=crop&w=1600&q=80"
                .to_string(),
        )),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!("Seeded about-page content");
    Ok(())
}
