use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    booking::{
        event::{CancelBooking, CreateBooking},
        Booking,
    },
    id::{PlaygroundId, UserId},
    slot::SlotHour,
};

// 予約台帳。上限頭数とカテゴリ相性をコミット時に強制する唯一の書き込み口。
#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約を確定する。
    // 同一の (playground_id, hour) キーに対する reserve 同士は直列化され、
    // それぞれが先行する成功分を見た上で判定される。
    async fn reserve(&self, event: CreateBooking) -> AppResult<Booking>;
    // 予約を取り消す（is_active を false にする。レコードは消さない）
    async fn cancel(&self, event: CancelBooking) -> AppResult<()>;
    // 指定の枠の有効な予約一覧を取得する
    async fn find_active_by_slot(
        &self,
        playground_id: PlaygroundId,
        hour: SlotHour,
    ) -> AppResult<Vec<Booking>>;
    // 指定のドッグランの全時間帯の有効な予約一覧を取得する
    async fn find_active_by_playground(
        &self,
        playground_id: PlaygroundId,
    ) -> AppResult<Vec<Booking>>;
    // ユーザーの予約履歴（取消済みを含む）を取得する
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
}
