use crate::{entities::about_content, errors::ServiceError};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

/// Read side for editorial site content.
#[derive(Clone)]
pub struct ContentService {
    db: Arc<DatabaseConnection>,
}

impl ContentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Newest about-page copy, if any has been published.
    #[instrument(skip(self))]
    pub async fn about(&self) -> Result<Option<about_content::Model>, ServiceError> {
        Ok(about_content::Entity::find()
            .order_by_desc(about_content::Column::CreatedAt)
            .one(&*self.db)
            .await?)
    }
}
