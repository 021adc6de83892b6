use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    // 枠の上限頭数に達しているため予約できない
    #[error("{0}")]
    CapacityExceeded(String),
    // 同じ枠に相性の悪いカテゴリの犬がいるため予約できない
    #[error("{0}")]
    IncompatibleCategory(String),
    // 同じ犬が同じ枠をすでに予約している
    #[error("{0}")]
    DuplicateBooking(String),
    #[error("{0}")]
    Forbidden(String),
    // リトライ上限まで競合が解消されなかった。呼び出し側は一度だけ再試行してよい。
    #[error("競合が解消されなかったため、予約を確定できませんでした。")]
    TransientConflict,
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    ConversionEntityError(String),
}

pub type AppResult<T> = Result<T, AppError>;
