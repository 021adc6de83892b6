use std::time::Duration;

use async_trait::async_trait;
use derive_new::new;
use sqlx::types::chrono::Utc;

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

use crate::database::{
    model::booking::{BookingRow, SlotOccupantRow},
    ConnectionPool,
};

// SERIALIZABLE の直列化競合に対するリトライ上限と待ち時間。
// 上限を超えたら TransientConflict として呼び出し側に返す。
const MAX_RESERVE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
    policy: SlotPolicy,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // 予約操作を行う
    async fn reserve(&self, event: CreateBooking) -> AppResult<Booking> {
        let mut attempt = 1;
        loop {
            match self.try_reserve(&event).await {
                Err(e) if is_serialization_failure(&e) => {
                    if attempt >= MAX_RESERVE_ATTEMPTS {
                        tracing::warn!(
                            playground_id = %event.playground_id,
                            hour = %event.hour,
                            attempt,
                            "予約の直列化競合がリトライ上限まで解消されなかった"
                        );
                        return Err(AppError::TransientConflict);
                    }
                    attempt += 1;
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                other => return other,
            }
        }
    }

    // 予約取消操作を行う
    async fn cancel(&self, event: CancelBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 取消前のチェックとして、以下を調べる。
        // - 指定の予約 ID をもつ予約が存在するか
        // - 取消を要求したユーザーが予約したユーザーと同じか
        // - まだ取消されていないか
        {
            let row: Option<(UserId, bool)> = sqlx::query_as(
                r#"
                SELECT user_id, is_active
                FROM bookings
                WHERE booking_id = $1
                "#,
            )
            .bind(event.booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some((booked_by, is_active)) = row else {
                return Err(AppError::EntityNotFound(format!(
                    "予約（{}）が見つかりませんでした。",
                    event.booking_id
                )));
            };

            if booked_by != event.requested_user {
                return Err(AppError::Forbidden(
                    "この予約を取り消す権限がありません。".into(),
                ));
            }

            if !is_active {
                return Err(AppError::UnprocessableEntity(
                    "この予約はすでに取り消されています。".into(),
                ));
            }
        }

        // 履歴を残すため、レコードは削除せず is_active を落とすだけにする。
        // 事前チェックの後に別の取消が先行した場合でも二重取消を通さないよう、
        // WHERE 句でも is_active を条件にする
        let res = sqlx::query(
            r#"
            UPDATE bookings
            SET is_active = FALSE
            WHERE booking_id = $1
              AND is_active
            "#,
        )
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::UnprocessableEntity(
                "この予約はすでに取り消されています。".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn find_active_by_slot(
        &self,
        playground_id: PlaygroundId,
        hour: SlotHour,
    ) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT
                b.booking_id,
                b.playground_id,
                b.slot_hour,
                b.dog_id,
                d.category,
                b.user_id,
                b.booked_at,
                b.is_active
            FROM bookings AS b
            INNER JOIN dogs AS d ON b.dog_id = d.dog_id
            WHERE b.playground_id = $1
              AND b.slot_hour = $2
              AND b.is_active
            "#,
        )
        .bind(playground_id)
        .bind(i32::from(hour.value()))
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn find_active_by_playground(
        &self,
        playground_id: PlaygroundId,
    ) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT
                b.booking_id,
                b.playground_id,
                b.slot_hour,
                b.dog_id,
                d.category,
                b.user_id,
                b.booked_at,
                b.is_active
            FROM bookings AS b
            INNER JOIN dogs AS d ON b.dog_id = d.dog_id
            WHERE b.playground_id = $1
              AND b.is_active
            ORDER BY b.slot_hour ASC
            "#,
        )
        .bind(playground_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    // ユーザーの予約履歴（取消済みを含む）を取得する
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT
                b.booking_id,
                b.playground_id,
                b.slot_hour,
                b.dog_id,
                d.category,
                b.user_id,
                b.booked_at,
                b.is_active
            FROM bookings AS b
            INNER JOIN dogs AS d ON b.dog_id = d.dog_id
            WHERE b.user_id = $1
            ORDER BY b.booked_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

impl BookingRepositoryImpl {
    // reserve の 1 回分の試行。
    // SERIALIZABLE トランザクションの中で、コミット時点の占有状況に対して
    // 重複予約・相性・上限を再判定してから INSERT する。
    async fn try_reserve(&self, event: &CreateBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        let hour = i32::from(event.hour.value());

        // 事前のチェックとして、以下を調べる。
        // - 同じ犬が同じ枠の有効な予約をすでに持っていないか
        // - 現在の占有カテゴリに対して候補の犬を入れてよいか
        //
        // 上記の両方が Yes だった場合、このブロック以降の処理に進む
        {
            //
            // ① 重複予約の確認
            //
            let dup: Option<(BookingId,)> = sqlx::query_as(
                r#"
                SELECT booking_id
                FROM bookings
                WHERE playground_id = $1
                  AND slot_hour = $2
                  AND dog_id = $3
                  AND is_active
                LIMIT 1
                "#,
            )
            .bind(event.playground_id)
            .bind(hour)
            .bind(event.dog_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if dup.is_some() {
                return Err(AppError::DuplicateBooking(format!(
                    "犬（{}）はこの枠をすでに予約しています。",
                    event.dog_id
                )));
            }

            //
            // ② 占有カテゴリを取得し、コミット時点の状態で再判定する
            //
            let occupant_rows: Vec<SlotOccupantRow> = sqlx::query_as(
                r#"
                SELECT d.category
                FROM bookings AS b
                INNER JOIN dogs AS d ON b.dog_id = d.dog_id
                WHERE b.playground_id = $1
                  AND b.slot_hour = $2
                  AND b.is_active
                "#,
            )
            .bind(event.playground_id)
            .bind(hour)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let occupants = occupant_rows
                .into_iter()
                .map(|row| Category::from_code(&row.category))
                .collect::<AppResult<Vec<Category>>>()?;

            check_admission(&occupants, event.category, &self.policy)?;
        }

        // チェックを通過したので予約レコードを追加する
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

        let res = sqlx::query(
            r#"
            INSERT INTO bookings
            (booking_id, playground_id, slot_hour, dog_id, user_id, booked_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.booking_id)
        .bind(booking.playground_id)
        .bind(hour)
        .bind(booking.dog_id)
        .bind(booking.booked_by)
        .bind(booking.booked_at)
        .bind(booking.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // 部分ユニークインデックスに弾かれた場合は重複予約として返す
            if is_unique_violation(&e) {
                AppError::DuplicateBooking(format!(
                    "犬（{}）はこの枠をすでに予約しています。",
                    event.dog_id
                ))
            } else {
                AppError::SpecificOperationError(e)
            }
        })?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking)
    }

    // reserve メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}

// PostgreSQL の直列化競合（SQLSTATE 40001）かどうかを調べる
fn is_serialization_failure(err: &AppError) -> bool {
    const SERIALIZATION_FAILURE: &str = "40001";
    match err {
        AppError::SpecificOperationError(e) | AppError::TransactionError(e) => {
            matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(SERIALIZATION_FAILURE))
        }
        _ => false,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    const UNIQUE_VIOLATION: &str = "23505";
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}
