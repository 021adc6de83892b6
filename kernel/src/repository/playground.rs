use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{id::PlaygroundId, playground::Playground};

// ドッグランのカタログは外部コラボレータが管理する。
// 予約エンジンからは読み取りのみ。
#[async_trait]
pub trait PlaygroundRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Playground>>;
    async fn find_by_id(&self, playground_id: PlaygroundId) -> AppResult<Option<Playground>>;
}
