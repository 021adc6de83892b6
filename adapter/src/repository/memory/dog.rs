use async_trait::async_trait;
use dashmap::DashMap;

use kernel::model::{
    dog::{event::CreateDog, Dog},
    id::{DogId, UserId},
};
use kernel::repository::dog::DogRepository;
use shared::error::AppResult;

#[derive(Default)]
pub struct InMemoryDogRepository {
    dogs: DashMap<DogId, Dog>,
}

impl InMemoryDogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DogRepository for InMemoryDogRepository {
    async fn create(&self, event: CreateDog) -> AppResult<DogId> {
        let dog_id = DogId::new();
        let dog = Dog {
            dog_id,
            owner_id: event.owner_id,
            name: event.name,
            breed: event.breed,
            category: event.category,
        };
        self.dogs.insert(dog_id, dog);
        Ok(dog_id)
    }

    async fn find_by_id(&self, dog_id: DogId) -> AppResult<Option<Dog>> {
        Ok(self.dogs.get(&dog_id).map(|e| e.value().clone()))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Dog>> {
        let mut dogs: Vec<Dog> = self
            .dogs
            .iter()
            .filter(|e| e.value().owner_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        dogs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dogs)
    }
}
