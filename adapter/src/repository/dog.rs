use async_trait::async_trait;
use derive_new::new;

use kernel::model::{
    dog::{event::CreateDog, Dog},
    id::{DogId, UserId},
};
use kernel::repository::dog::DogRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::dog::DogRow, ConnectionPool};

#[derive(new)]
pub struct DogRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl DogRepository for DogRepositoryImpl {
    async fn create(&self, event: CreateDog) -> AppResult<DogId> {
        let dog_id = DogId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO dogs (dog_id, user_id, name, breed, category)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(dog_id)
        .bind(event.owner_id)
        .bind(&event.name)
        .bind(&event.breed)
        .bind(event.category.as_code())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No dog record has been created".into(),
            ));
        }

        Ok(dog_id)
    }

    async fn find_by_id(&self, dog_id: DogId) -> AppResult<Option<Dog>> {
        let row: Option<DogRow> = sqlx::query_as(
            r#"
            SELECT dog_id, user_id, name, breed, category
            FROM dogs
            WHERE dog_id = $1
            "#,
        )
        .bind(dog_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(Dog::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Dog>> {
        let rows: Vec<DogRow> = sqlx::query_as(
            r#"
            SELECT dog_id, user_id, name, breed, category
            FROM dogs
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Dog::try_from).collect()
    }
}
