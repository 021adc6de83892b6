use kernel::model::{
    booking::Booking,
    category::Category,
    id::{BookingId, DogId, PlaygroundId, UserId},
    slot::SlotHour,
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};

// 予約一覧を取得する際に使う型。
// カテゴリは dogs テーブルとの JOIN で引いてくる。
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub playground_id: PlaygroundId,
    pub slot_hour: i32,
    pub dog_id: DogId,
    pub category: String,
    pub user_id: UserId,
    pub booked_at: DateTime<Utc>,
    pub is_active: bool,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(value: BookingRow) -> Result<Self, Self::Error> {
        let BookingRow {
            booking_id,
            playground_id,
            slot_hour,
            dog_id,
            category,
            user_id,
            booked_at,
            is_active,
        } = value;
        Ok(Booking {
            booking_id,
            playground_id,
            hour: SlotHour::try_from(slot_hour)?,
            dog_id,
            category: Category::from_code(&category)?,
            booked_by: user_id,
            booked_at,
            is_active,
        })
    }
}

// コミット時の再判定で占有カテゴリだけを引くための型
#[derive(sqlx::FromRow)]
pub struct SlotOccupantRow {
    pub category: String,
}
