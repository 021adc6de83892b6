use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    dog::{event::CreateDog, Dog},
    id::{DogId, UserId},
};

#[async_trait]
pub trait DogRepository: Send + Sync {
    async fn create(&self, event: CreateDog) -> AppResult<DogId>;
    async fn find_by_id(&self, dog_id: DogId) -> AppResult<Option<Dog>>;
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Dog>>;
}
