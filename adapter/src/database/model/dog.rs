use kernel::model::{
    category::Category,
    dog::Dog,
    id::{DogId, UserId},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct DogRow {
    pub dog_id: DogId,
    pub user_id: UserId,
    pub name: String,
    pub breed: Option<String>,
    pub category: String,
}

impl TryFrom<DogRow> for Dog {
    type Error = AppError;

    fn try_from(value: DogRow) -> Result<Self, Self::Error> {
        let DogRow {
            dog_id,
            user_id,
            name,
            breed,
            category,
        } = value;
        Ok(Dog {
            dog_id,
            owner_id: user_id,
            name,
            breed,
            category: Category::from_code(&category)?,
        })
    }
}
