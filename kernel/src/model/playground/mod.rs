use crate::model::id::PlaygroundId;

// ドッグラン（遊び場）のカタログ情報。
// 予約エンジンからは読み取り専用で、属性は外部カタログの値をそのまま持ち回す。
#[derive(Debug, Clone)]
pub struct Playground {
    pub playground_id: PlaygroundId,
    pub park_name: String,
    pub address: String,
    pub district: String,
    pub adm_area: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub lighting: String,
    pub fencing: String,
    pub elements: String,
    pub working_hours: String,
    pub photo_id: Option<String>,
}
