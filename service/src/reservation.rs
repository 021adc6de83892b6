use std::collections::HashMap;

use derive_new::new;
use garde::Validate;

use kernel::model::{
    booking::event::{CancelBooking, CreateBooking},
    category::Category,
    dog::Dog,
    id::{BookingId, DogId, PlaygroundId, UserId},
    playground::Playground,
    slot::{snapshot, SlotHour},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::{
    booking::{BookSlotRequest, BookingResponse, BookingsResponse},
    slot::{DayScheduleResponse, SlotResponse},
};

// 予約のユースケースをまとめたファサード。
// 識別子の検証と所有者チェックを行い、確定の判断は台帳に委ねる。
// このコンポーネント自身は可変の状態を持たない。
#[derive(new, Clone)]
pub struct ReservationService {
    registry: AppRegistry,
}

impl ReservationService {
    pub async fn book(
        &self,
        req: BookSlotRequest,
        acting_user: UserId,
    ) -> AppResult<BookingResponse> {
        req.validate(&())?;

        let hour = SlotHour::new(req.slot_hour).ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "時間帯（{}）は予約枠ではありません。",
                req.slot_hour
            ))
        })?;

        // ① ドッグランの存在確認
        let playground = self.resolve_playground(req.playground_id).await?;

        // ② 犬の存在確認と所有者チェック
        let dog = self.resolve_dog(req.dog_id).await?;
        if dog.owner_id != acting_user {
            return Err(AppError::Forbidden(
                "自分の犬についてのみ予約できます。".into(),
            ));
        }

        // ③ 台帳で確定する。
        // 上限と相性はここではなく、台帳がコミット時点の状態で再判定する。
        let event = CreateBooking::new(
            playground.playground_id,
            hour,
            dog.dog_id,
            dog.category,
            acting_user,
        );
        let booking = self.registry.booking_repository().reserve(event).await?;

        tracing::info!(
            booking_id = %booking.booking_id,
            playground_id = %booking.playground_id,
            hour = %booking.hour,
            category = booking.category.as_code(),
            "予約を確定した"
        );

        Ok(BookingResponse::from(booking))
    }

    pub async fn cancel(&self, booking_id: BookingId, acting_user: UserId) -> AppResult<()> {
        self.registry
            .booking_repository()
            .cancel(CancelBooking::new(booking_id, acting_user))
            .await
    }

    // 単一の枠の表示用ビュー。判定は参考値であり、確定時に台帳が再判定する。
    pub async fn slot_view(
        &self,
        playground_id: PlaygroundId,
        hour: SlotHour,
        dog_id: Option<DogId>,
    ) -> AppResult<SlotResponse> {
        self.resolve_playground(playground_id).await?;
        let candidate = match dog_id {
            Some(id) => Some(self.resolve_dog(id).await?.category),
            None => None,
        };

        let bookings = self
            .registry
            .booking_repository()
            .find_active_by_slot(playground_id, hour)
            .await?;
        let occupants: Vec<Category> = bookings.iter().map(|b| b.category).collect();

        let policy = self.registry.slot_policy();
        Ok(SlotResponse::from(snapshot(
            hour, &occupants, candidate, &policy,
        )))
    }

    // 1 日分（全 24 枠）の表示用ビュー。
    // 候補カテゴリは「指定された犬のカテゴリ → 明示のカテゴリ指定 → なし」の順で決める。
    pub async fn day_schedule(
        &self,
        playground_id: PlaygroundId,
        dog_id: Option<DogId>,
        category: Option<Category>,
    ) -> AppResult<DayScheduleResponse> {
        self.resolve_playground(playground_id).await?;
        let candidate = match dog_id {
            Some(id) => Some(self.resolve_dog(id).await?.category),
            None => category,
        };

        let bookings = self
            .registry
            .booking_repository()
            .find_active_by_playground(playground_id)
            .await?;

        let mut occupants_by_hour: HashMap<u8, Vec<Category>> = HashMap::new();
        for booking in bookings {
            occupants_by_hour
                .entry(booking.hour.value())
                .or_default()
                .push(booking.category);
        }

        let policy = self.registry.slot_policy();
        let slots = SlotHour::all()
            .map(|hour| {
                let occupants = occupants_by_hour
                    .get(&hour.value())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                SlotResponse::from(snapshot(hour, occupants, candidate, &policy))
            })
            .collect();

        Ok(DayScheduleResponse {
            playground_id,
            requested_category: candidate,
            slots,
        })
    }

    // ユーザーの予約履歴（取消済みを含む）
    pub async fn my_bookings(&self, acting_user: UserId) -> AppResult<BookingsResponse> {
        self.registry
            .booking_repository()
            .find_by_user(acting_user)
            .await
            .map(BookingsResponse::from)
    }

    async fn resolve_playground(&self, playground_id: PlaygroundId) -> AppResult<Playground> {
        self.registry
            .playground_repository()
            .find_by_id(playground_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "ドッグラン（{playground_id}）が見つかりませんでした。"
                ))
            })
    }

    async fn resolve_dog(&self, dog_id: DogId) -> AppResult<Dog> {
        self.registry
            .dog_repository()
            .find_by_id(dog_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("犬（{dog_id}）が見つかりませんでした。"))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adapter::repository::memory::{
        booking::InMemoryBookingRepository, dog::InMemoryDogRepository,
        playground::InMemoryPlaygroundRepository,
    };
    use kernel::model::{dog::event::CreateDog, slot::SlotPolicy};
    use kernel::repository::dog::DogRepository;

    use super::*;

    fn fixture_playground() -> Playground {
        Playground {
            playground_id: PlaygroundId::new(),
            park_name: "Парк «50-летия Октября»".into(),
            address: "улица Удальцова, дом 22А".into(),
            district: "Проспект Вернадского".into(),
            adm_area: "Западный административный округ".into(),
            lat: Some(55.6891),
            lon: Some(37.5184),
            lighting: "да".into(),
            fencing: "да".into(),
            elements: "[]".into(),
            working_hours: "круглосуточно".into(),
            photo_id: None,
        }
    }

    // 上限 3 頭のインメモリ構成でサービスを組み立てる
    async fn setup() -> (ReservationService, PlaygroundId, UserId, DogId) {
        let policy = SlotPolicy::new(3, 2);
        let playground_repo = Arc::new(InMemoryPlaygroundRepository::new());
        let playground = fixture_playground();
        let playground_id = playground.playground_id;
        playground_repo.insert(playground);

        let dog_repo = Arc::new(InMemoryDogRepository::new());
        let owner = UserId::new();
        let dog_id = dog_repo
            .create(CreateDog::new(owner, "Рекс".into(), None, Category::Small))
            .await
            .unwrap();

        let registry = AppRegistry::from_parts(
            policy,
            Arc::new(InMemoryBookingRepository::new(policy)),
            playground_repo,
            dog_repo,
        );
        (ReservationService::new(registry), playground_id, owner, dog_id)
    }

    fn request(playground_id: PlaygroundId, hour: u8, dog_id: DogId) -> BookSlotRequest {
        BookSlotRequest {
            playground_id,
            slot_hour: hour,
            dog_id,
        }
    }

    #[tokio::test]
    async fn test_book_and_view_slot() -> anyhow::Result<()> {
        let (service, playground_id, owner, dog_id) = setup().await;

        let confirmation = service
            .book(request(playground_id, 10, dog_id), owner)
            .await?;
        assert_eq!(confirmation.playground_id, playground_id);
        assert_eq!(confirmation.slot_hour, 10);
        assert_eq!(confirmation.dog_id, dog_id);
        assert_eq!(confirmation.category_label, "Декоративные");
        assert!(confirmation.is_active);

        let hour = SlotHour::new(10).unwrap();
        let view = service.slot_view(playground_id, hour, None).await?;
        assert_eq!(view.count, 1);
        assert_eq!(view.limit, 3);
        assert_eq!(view.categories, vec![Category::Small]);

        // 書き込みがなければ読み取りは同じ結果を返す
        let again = service.slot_view(playground_id, hour, None).await?;
        assert_eq!(view, again);
        Ok(())
    }

    // 範囲外の時間帯は存在しない枠として扱う
    #[tokio::test]
    async fn test_book_rejects_out_of_range_hour() -> anyhow::Result<()> {
        let (service, playground_id, owner, dog_id) = setup().await;

        let err = service
            .book(request(playground_id, 24, dog_id), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_book_rejects_unknown_ids_and_foreign_dog() -> anyhow::Result<()> {
        let (service, playground_id, owner, dog_id) = setup().await;

        let err = service
            .book(request(PlaygroundId::new(), 10, dog_id), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));

        let err = service
            .book(request(playground_id, 10, DogId::new()), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));

        // 他人の犬は予約できない
        let err = service
            .book(request(playground_id, 10, dog_id), UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // 拒否された場合は状態が残らない
        let hour = SlotHour::new(10).unwrap();
        let view = service.slot_view(playground_id, hour, None).await?;
        assert_eq!(view.count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_then_rebook() -> anyhow::Result<()> {
        let (service, playground_id, owner, dog_id) = setup().await;

        let confirmation = service
            .book(request(playground_id, 14, dog_id), owner)
            .await?;

        // 所有者以外の取消は拒否され、予約は有効なまま
        let err = service
            .cancel(confirmation.booking_id, UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        service.cancel(confirmation.booking_id, owner).await?;

        // 取消後は同じ犬が同じ枠を再予約できる
        service
            .book(request(playground_id, 14, dog_id), owner)
            .await?;

        let history = service.my_bookings(owner).await?;
        assert_eq!(history.items.len(), 2);
        assert_eq!(
            history.items.iter().filter(|b| b.is_active).count(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_day_schedule_candidate_precedence() -> anyhow::Result<()> {
        let (service, playground_id, owner, dog_id) = setup().await;

        service
            .book(request(playground_id, 9, dog_id), owner)
            .await?;

        // 犬を指定した場合は、明示のカテゴリ指定より犬のカテゴリが優先される
        let schedule = service
            .day_schedule(playground_id, Some(dog_id), Some(Category::HighRisk))
            .await?;
        assert_eq!(schedule.requested_category, Some(Category::Small));
        assert_eq!(schedule.slots.len(), 24);

        let slot9 = &schedule.slots[9];
        assert_eq!(slot9.count, 1);
        assert_eq!(slot9.status, kernel::model::slot::SlotStatus::Joinable);

        // 明示のカテゴリ指定だけの場合はそのまま使われる
        let schedule = service
            .day_schedule(playground_id, None, Some(Category::HighRisk))
            .await?;
        assert_eq!(schedule.requested_category, Some(Category::HighRisk));
        assert_eq!(
            schedule.slots[9].status,
            kernel::model::slot::SlotStatus::Full
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_slot_response_serialization_shape() -> anyhow::Result<()> {
        let (service, playground_id, _owner, _dog_id) = setup().await;

        let hour = SlotHour::new(7).unwrap();
        let view = service.slot_view(playground_id, hour, None).await?;
        let json = serde_json::to_value(&view)?;

        assert_eq!(json["hour"], 7);
        assert_eq!(json["label"], "07:00");
        assert_eq!(json["status"], "free");
        assert_eq!(json["count"], 0);
        assert_eq!(json["limit"], 3);
        Ok(())
    }
}
