use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use kernel::model::{
    booking::{
        event::{CancelBooking, CreateBooking},
        Booking,
    },
    category::Category,
    id::{BookingId, PlaygroundId, UserId},
    slot::{check_admission, SlotHour, SlotPolicy},
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

type SlotKey = (PlaygroundId, SlotHour);
type SlotCell = Arc<Mutex<Vec<Booking>>>;

// 枠キーごとに独立した Mutex を持つ予約台帳。
// 同じキーへの reserve 同士だけが直列化され、別のキーは競合しない。
pub struct InMemoryBookingRepository {
    policy: SlotPolicy,
    slots: DashMap<SlotKey, SlotCell>,
    index: DashMap<BookingId, SlotKey>,
}

impl InMemoryBookingRepository {
    pub fn new(policy: SlotPolicy) -> Self {
        Self {
            policy,
            slots: DashMap::new(),
            index: DashMap::new(),
        }
    }

    fn cell(&self, key: SlotKey) -> SlotCell {
        // DashMap のシャードロックを await をまたいで持たないよう、
        // Arc をクローンしてから枠の Mutex を取る
        self.slots.entry(key).or_default().value().clone()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn reserve(&self, event: CreateBooking) -> AppResult<Booking> {
        let key = (event.playground_id, event.hour);
        let cell = self.cell(key);
        let mut slot = cell.lock().await;

        // ① 重複予約の確認
        if slot
            .iter()
            .any(|b| b.is_active && b.dog_id == event.dog_id)
        {
            return Err(AppError::DuplicateBooking(format!(
                "犬（{}）はこの枠をすでに予約しています。",
                event.dog_id
            )));
        }

        // ② コミット時点の占有カテゴリで再判定する
        let occupants: Vec<Category> = slot
            .iter()
            .filter(|b| b.is_active)
            .map(|b| b.category)
            .collect();
        check_admission(&occupants, event.category, &self.policy)?;

        let booking = Booking {
            booking_id: BookingId::new(),
            playground_id: event.playground_id,
            hour: event.hour,
            dog_id: event.dog_id,
            category: event.category,
            booked_by: event.booked_by,
            booked_at: Utc::now(),
            is_active: true,
        };
        slot.push(booking.clone());
        self.index.insert(booking.booking_id, key);

        Ok(booking)
    }

    async fn cancel(&self, event: CancelBooking) -> AppResult<()> {
        let Some(key) = self.index.get(&event.booking_id).map(|e| *e.value()) else {
            return Err(AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                event.booking_id
            )));
        };

        let cell = self.cell(key);
        let mut slot = cell.lock().await;

        let Some(booking) = slot
            .iter_mut()
            .find(|b| b.booking_id == event.booking_id)
        else {
            return Err(AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                event.booking_id
            )));
        };

        if booking.booked_by != event.requested_user {
            return Err(AppError::Forbidden(
                "この予約を取り消す権限がありません。".into(),
            ));
        }

        if !booking.is_active {
            return Err(AppError::UnprocessableEntity(
                "この予約はすでに取り消されています。".into(),
            ));
        }

        booking.is_active = false;

        Ok(())
    }

    async fn find_active_by_slot(
        &self,
        playground_id: PlaygroundId,
        hour: SlotHour,
    ) -> AppResult<Vec<Booking>> {
        let key = (playground_id, hour);
        let Some(cell) = self.slots.get(&key).map(|e| e.value().clone()) else {
            return Ok(Vec::new());
        };
        let slot = cell.lock().await;
        Ok(slot.iter().filter(|b| b.is_active).cloned().collect())
    }

    async fn find_active_by_playground(
        &self,
        playground_id: PlaygroundId,
    ) -> AppResult<Vec<Booking>> {
        let cells: Vec<SlotCell> = self
            .slots
            .iter()
            .filter(|e| e.key().0 == playground_id)
            .map(|e| e.value().clone())
            .collect();

        let mut bookings = Vec::new();
        for cell in cells {
            let slot = cell.lock().await;
            bookings.extend(slot.iter().filter(|b| b.is_active).cloned());
        }
        bookings.sort_by_key(|b| b.hour.value());
        Ok(bookings)
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let cells: Vec<SlotCell> = self.slots.iter().map(|e| e.value().clone()).collect();

        let mut bookings = Vec::new();
        for cell in cells {
            let slot = cell.lock().await;
            bookings.extend(slot.iter().filter(|b| b.booked_by == user_id).cloned());
        }
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::id::DogId;
    use kernel::model::slot::{snapshot, SlotStatus};

    fn hour(h: u8) -> SlotHour {
        SlotHour::new(h).unwrap()
    }

    fn event(
        playground_id: PlaygroundId,
        h: u8,
        dog_id: DogId,
        category: Category,
        user: UserId,
    ) -> CreateBooking {
        CreateBooking::new(playground_id, hour(h), dog_id, category, user)
    }

    // 空の枠への予約が joinable になり、同じ犬の 2 回目は重複として弾かれる
    #[tokio::test]
    async fn test_reserve_then_duplicate_is_rejected() -> anyhow::Result<()> {
        let policy = SlotPolicy::new(3, 2);
        let repo = InMemoryBookingRepository::new(policy);
        let playground_id = PlaygroundId::new();
        let user = UserId::new();
        let dog = DogId::new();

        let booking = repo
            .reserve(event(playground_id, 10, dog, Category::Small, user))
            .await?;
        assert!(booking.is_active);

        let active = repo.find_active_by_slot(playground_id, hour(10)).await?;
        let occupants: Vec<Category> = active.iter().map(|b| b.category).collect();
        let view = snapshot(hour(10), &occupants, Some(Category::Small), &policy);
        assert_eq!(view.count, 1);
        assert_eq!(view.limit, 3);
        assert_eq!(view.status, SlotStatus::Joinable);

        let err = repo
            .reserve(event(playground_id, 10, dog, Category::Small, user))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateBooking(_)));
        Ok(())
    }

    // SMALL が 2 頭いる枠に HIGH_RISK を入れようとすると相性違反になる
    #[tokio::test]
    async fn test_incompatible_category_is_rejected() -> anyhow::Result<()> {
        let repo = InMemoryBookingRepository::new(SlotPolicy::new(3, 2));
        let playground_id = PlaygroundId::new();
        let user = UserId::new();

        for _ in 0..2 {
            repo.reserve(event(
                playground_id,
                9,
                DogId::new(),
                Category::Small,
                user,
            ))
            .await?;
        }

        let err = repo
            .reserve(event(
                playground_id,
                9,
                DogId::new(),
                Category::HighRisk,
                user,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IncompatibleCategory(_)));

        // 拒否されても件数は変わらない
        let active = repo.find_active_by_slot(playground_id, hour(9)).await?;
        assert_eq!(active.len(), 2);
        Ok(())
    }

    // 上限に達した枠への同カテゴリの予約は CapacityExceeded になる
    #[tokio::test]
    async fn test_capacity_exceeded_at_limit() -> anyhow::Result<()> {
        let repo = InMemoryBookingRepository::new(SlotPolicy::new(3, 2));
        let playground_id = PlaygroundId::new();
        let user = UserId::new();

        for _ in 0..3 {
            repo.reserve(event(
                playground_id,
                8,
                DogId::new(),
                Category::Small,
                user,
            ))
            .await?;
        }

        let err = repo
            .reserve(event(
                playground_id,
                8,
                DogId::new(),
                Category::Small,
                user,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
        Ok(())
    }

    // 同じ枠に 10 件の同時予約が来ても、確定するのは上限の 3 件だけ
    #[tokio::test]
    async fn test_concurrent_reserves_never_exceed_limit() -> anyhow::Result<()> {
        let repo = Arc::new(InMemoryBookingRepository::new(SlotPolicy::new(3, 2)));
        let playground_id = PlaygroundId::new();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.reserve(event(
                    playground_id,
                    12,
                    DogId::new(),
                    Category::Standard,
                    UserId::new(),
                ))
                .await
            }));
        }

        let mut succeeded = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => succeeded += 1,
                Err(AppError::CapacityExceeded(_)) => rejected += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(rejected, 7);

        let active = repo.find_active_by_slot(playground_id, hour(12)).await?;
        assert_eq!(active.len(), 3);
        Ok(())
    }

    // 取消で空いた枠には再び予約できる。所有者以外の取消は拒否される。
    #[tokio::test]
    async fn test_cancel_frees_capacity() -> anyhow::Result<()> {
        let repo = InMemoryBookingRepository::new(SlotPolicy::new(3, 2));
        let playground_id = PlaygroundId::new();
        let owner = UserId::new();

        let mut first = None;
        for _ in 0..3 {
            let booking = repo
                .reserve(event(
                    playground_id,
                    15,
                    DogId::new(),
                    Category::Small,
                    owner,
                ))
                .await?;
            first.get_or_insert(booking);
        }
        let first = first.unwrap();

        // 所有者以外は取り消せない
        let err = repo
            .cancel(CancelBooking::new(first.booking_id, UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let active = repo.find_active_by_slot(playground_id, hour(15)).await?;
        assert_eq!(active.len(), 3);

        repo.cancel(CancelBooking::new(first.booking_id, owner))
            .await?;

        // 空いた分は再予約できる
        repo.reserve(event(
            playground_id,
            15,
            DogId::new(),
            Category::Small,
            owner,
        ))
        .await?;

        // 二重取消は弾かれる
        let err = repo
            .cancel(CancelBooking::new(first.booking_id, owner))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        Ok(())
    }

    // 別のキー（別の時間帯・別のドッグラン）は互いに影響しない
    #[tokio::test]
    async fn test_keys_are_independent() -> anyhow::Result<()> {
        let repo = InMemoryBookingRepository::new(SlotPolicy::new(1, 1));
        let playground_a = PlaygroundId::new();
        let playground_b = PlaygroundId::new();
        let user = UserId::new();
        let dog = DogId::new();

        repo.reserve(event(playground_a, 10, dog, Category::Active, user))
            .await?;
        // 同じ犬でも別の時間帯・別のドッグランなら予約できる
        repo.reserve(event(playground_a, 11, dog, Category::Active, user))
            .await?;
        repo.reserve(event(playground_b, 10, dog, Category::Active, user))
            .await?;

        let day = repo.find_active_by_playground(playground_a).await?;
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].hour.value(), 10);
        assert_eq!(day[1].hour.value(), 11);

        let history = repo.find_by_user(user).await?;
        assert_eq!(history.len(), 3);
        Ok(())
    }
}
