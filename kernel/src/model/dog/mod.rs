use crate::model::{
    category::Category,
    id::{DogId, UserId},
};

pub mod event;

#[derive(Debug, Clone)]
pub struct Dog {
    pub dog_id: DogId,
    pub owner_id: UserId,
    pub name: String,
    pub breed: Option<String>,
    // 予約の観点ではカテゴリは登録時に固定される
    pub category: Category,
}
