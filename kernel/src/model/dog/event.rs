use derive_new::new;

use crate::model::{category::Category, id::UserId};

#[derive(Debug, new)]
pub struct CreateDog {
    pub owner_id: UserId,
    pub name: String,
    pub breed: Option<String>,
    pub category: Category,
}
