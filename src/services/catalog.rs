use crate::{
    entities::{product, product_image},
    errors::ServiceError,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u64 = 50;
pub const DEFAULT_PER_PAGE: u64 = 12;

/// Read-side service for the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists products with their image galleries, newest first.
    ///
    /// Defaults to active products; `status` widens or narrows the filter.
    /// `search` matches name, summary or SKU as a substring.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductListFilter,
    ) -> Result<(Vec<ProductWithImages>, u64), ServiceError> {
        let per_page = filter
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let page = filter.page.unwrap_or(1).max(1);

        let mut query = product::Entity::find()
            .filter(product::Column::Status.eq(filter.status.unwrap_or(product::ProductStatus::Active)));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let needle = search.trim();
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(needle))
                    .add(product::Column::Summary.contains(needle))
                    .add(product::Column::Sku.contains(needle)),
            );
        }

        if let Some(featured) = filter.featured {
            query = query.filter(product::Column::IsFeatured.eq(featured));
        }

        let paginator = query
            .order_by_desc(product::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        let with_images = self.attach_images(products).await?;
        Ok((with_images, total))
    }

    /// Fetches a single product by slug with its ordered image gallery.
    #[instrument(skip(self))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<ProductWithImages, ServiceError> {
        let found = product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let images = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(found.id))
            .order_by_asc(product_image::Column::SortOrder)
            .all(&*self.db)
            .await?;

        Ok(ProductWithImages {
            product: found,
            images,
        })
    }

    /// Loads galleries for a page of products in one query.
    async fn attach_images(
        &self,
        products: Vec<product::Model>,
    ) -> Result<Vec<ProductWithImages>, ServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        let images = product_image::Entity::find()
            .filter(product_image::Column::ProductId.is_in(ids))
            .order_by_asc(product_image::Column::SortOrder)
            .all(&*self.db)
            .await?;

        let mut by_product: HashMap<_, Vec<product_image::Model>> = HashMap::new();
        for image in images {
            by_product.entry(image.product_id).or_default().push(image);
        }

        Ok(products
            .into_iter()
            .map(|p| {
                let images = by_product.remove(&p.id).unwrap_or_default();
                ProductWithImages { product: p, images }
            })
            .collect())
    }
}

/// Query filter for product listings
#[derive(Debug, Default, Deserialize)]
pub struct ProductListFilter {
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<product::ProductStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Product with its ordered image gallery
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithImages {
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub product: product::Model,
    #[schema(value_type = Vec<Object>)]
    pub images: Vec<product_image::Model>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_page_is_clamped() {
        let filter = ProductListFilter {
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(filter.per_page.unwrap().clamp(1, MAX_PER_PAGE), 50);
    }

    #[test]
    fn default_filter_has_no_search() {
        let filter = ProductListFilter::default();
        assert!(filter.search.is_none());
        assert!(filter.featured.is_none());
        assert!(filter.status.is_none());
    }
}
