use chrono::{DateTime, Utc};

use crate::model::{
    category::Category,
    id::{BookingId, DogId, PlaygroundId, UserId},
    slot::SlotHour,
};

pub mod event;

// 確定済みの予約。
// 作成後は is_active を false にする以外の変更を行わない。
#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: BookingId,
    pub playground_id: PlaygroundId,
    pub hour: SlotHour,
    pub dog_id: DogId,
    // 占有カテゴリの集計に使うため、予約作成時点の犬のカテゴリを持たせる
    pub category: Category,
    pub booked_by: UserId,
    pub booked_at: DateTime<Utc>,
    pub is_active: bool,
}
