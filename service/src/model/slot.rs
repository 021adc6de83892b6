use kernel::model::{
    category::Category,
    id::PlaygroundId,
    slot::{SlotSnapshot, SlotStatus},
};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub hour: u8,
    pub label: String,
    pub count: usize,
    pub limit: u32,
    pub status: SlotStatus,
    pub categories: Vec<Category>,
}

impl From<SlotSnapshot> for SlotResponse {
    fn from(value: SlotSnapshot) -> Self {
        let SlotSnapshot {
            hour,
            occupant_categories,
            count,
            limit,
            status,
        } = value;
        Self {
            hour: hour.value(),
            label: hour.label(),
            count,
            limit,
            status,
            categories: occupant_categories,
        }
    }
}

// 1 日分の枠一覧。旧システムの details レスポンスの slots 部分にあたる。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayScheduleResponse {
    pub playground_id: PlaygroundId,
    pub requested_category: Option<Category>,
    pub slots: Vec<SlotResponse>,
}
