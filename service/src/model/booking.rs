use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    booking::Booking,
    category::Category,
    id::{BookingId, DogId, PlaygroundId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotRequest {
    #[garde(skip)]
    pub playground_id: PlaygroundId,
    // 時間帯の範囲チェックは SlotHour::new に一元化している
    #[garde(skip)]
    pub slot_hour: u8,
    #[garde(skip)]
    pub dog_id: DogId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub playground_id: PlaygroundId,
    pub slot_hour: u8,
    pub dog_id: DogId,
    pub category: Category,
    // 利用者向けのカテゴリ表示名
    pub category_label: &'static str,
    pub booked_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            playground_id,
            hour,
            dog_id,
            category,
            booked_by: _,
            booked_at,
            is_active,
        } = value;
        Self {
            booking_id,
            playground_id,
            slot_hour: hour.value(),
            dog_id,
            category,
            category_label: category.label(),
            booked_at,
            is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}
