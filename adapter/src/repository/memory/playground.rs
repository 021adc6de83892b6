use async_trait::async_trait;
use dashmap::DashMap;

use kernel::model::{id::PlaygroundId, playground::Playground};
use kernel::repository::playground::PlaygroundRepository;
use shared::error::AppResult;

// カタログは外部管理のため、このインメモリ実装にはテスト用の
// シード投入メソッドだけを生やしてある。
#[derive(Default)]
pub struct InMemoryPlaygroundRepository {
    playgrounds: DashMap<PlaygroundId, Playground>,
}

impl InMemoryPlaygroundRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, playground: Playground) {
        self.playgrounds
            .insert(playground.playground_id, playground);
    }
}

#[async_trait]
impl PlaygroundRepository for InMemoryPlaygroundRepository {
    async fn find_all(&self) -> AppResult<Vec<Playground>> {
        let mut playgrounds: Vec<Playground> = self
            .playgrounds
            .iter()
            .map(|e| e.value().clone())
            .collect();
        playgrounds.sort_by(|a, b| a.park_name.cmp(&b.park_name));
        Ok(playgrounds)
    }

    async fn find_by_id(&self, playground_id: PlaygroundId) -> AppResult<Option<Playground>> {
        Ok(self
            .playgrounds
            .get(&playground_id)
            .map(|e| e.value().clone()))
    }
}
