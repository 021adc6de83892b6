use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::{
    booking::BookingRepositoryImpl, dog::DogRepositoryImpl,
    playground::PlaygroundRepositoryImpl,
};
use kernel::model::slot::SlotPolicy;
use kernel::repository::booking::BookingRepository;
use kernel::repository::dog::DogRepository;
use kernel::repository::playground::PlaygroundRepository;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    slot_policy: SlotPolicy,
    booking_repository: Arc<dyn BookingRepository>,
    playground_repository: Arc<dyn PlaygroundRepository>,
    dog_repository: Arc<dyn DogRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: AppConfig) -> Self {
        let slot_policy = SlotPolicy::from(app_config.slot);
        let booking_repository = Arc::new(BookingRepositoryImpl::new(pool.clone(), slot_policy));
        let playground_repository = Arc::new(PlaygroundRepositoryImpl::new(pool.clone()));
        let dog_repository = Arc::new(DogRepositoryImpl::new(pool.clone()));
        Self {
            slot_policy,
            booking_repository,
            playground_repository,
            dog_repository,
        }
    }

    // インメモリ実装などを直接組み合わせる場合に使う（主にテスト用）
    pub fn from_parts(
        slot_policy: SlotPolicy,
        booking_repository: Arc<dyn BookingRepository>,
        playground_repository: Arc<dyn PlaygroundRepository>,
        dog_repository: Arc<dyn DogRepository>,
    ) -> Self {
        Self {
            slot_policy,
            booking_repository,
            playground_repository,
            dog_repository,
        }
    }

    pub fn slot_policy(&self) -> SlotPolicy {
        self.slot_policy
    }

    pub fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    pub fn playground_repository(&self) -> Arc<dyn PlaygroundRepository> {
        self.playground_repository.clone()
    }

    pub fn dog_repository(&self) -> Arc<dyn DogRepository> {
        self.dog_repository.clone()
    }
}
