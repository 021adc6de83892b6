use async_trait::async_trait;
use derive_new::new;

use kernel::model::{id::PlaygroundId, playground::Playground};
use kernel::repository::playground::PlaygroundRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::playground::PlaygroundRow, ConnectionPool};

#[derive(new)]
pub struct PlaygroundRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl PlaygroundRepository for PlaygroundRepositoryImpl {
    async fn find_all(&self) -> AppResult<Vec<Playground>> {
        let rows: Vec<PlaygroundRow> = sqlx::query_as(
            r#"
            SELECT
                playground_id,
                park_name,
                address,
                district,
                adm_area,
                lat,
                lon,
                lighting,
                fencing,
                elements,
                working_hours,
                photo_id
            FROM playgrounds
            ORDER BY park_name ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Playground::from).collect())
    }

    async fn find_by_id(&self, playground_id: PlaygroundId) -> AppResult<Option<Playground>> {
        let row: Option<PlaygroundRow> = sqlx::query_as(
            r#"
            SELECT
                playground_id,
                park_name,
                address,
                district,
                adm_area,
                lat,
                lon,
                lighting,
                fencing,
                elements,
                working_hours,
                photo_id
            FROM playgrounds
            WHERE playground_id = $1
            "#,
        )
        .bind(playground_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Playground::from))
    }
}
