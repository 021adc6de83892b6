use serde::{Deserialize, Serialize};
use shared::{
    config::SlotConfig,
    error::{AppError, AppResult},
};

use crate::model::category::Category;

// 1 日の予約枠は 0 時〜23 時の毎正時で固定
pub const SLOT_HOURS: std::ops::Range<u8> = 0..24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotHour(u8);

impl SlotHour {
    pub fn new(hour: u8) -> Option<Self> {
        SLOT_HOURS.contains(&hour).then_some(Self(hour))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        format!("{:02}:00", self.0)
    }

    pub fn all() -> impl Iterator<Item = SlotHour> {
        SLOT_HOURS.map(SlotHour)
    }
}

impl TryFrom<i32> for SlotHour {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(SlotHour::new)
            .ok_or_else(|| {
                AppError::ConversionEntityError(format!("不正な時間帯です: {value}"))
            })
    }
}

impl std::fmt::Display for SlotHour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Free,
    Joinable,
    Full,
}

// 枠ごとの上限頭数ポリシー。
// HIGH_RISK が絡む枠だけ上限が別に定められている。
#[derive(Debug, Clone, Copy)]
pub struct SlotPolicy {
    base_limit: u32,
    high_risk_limit: u32,
}

impl SlotPolicy {
    pub fn new(base_limit: u32, high_risk_limit: u32) -> Self {
        Self {
            base_limit,
            high_risk_limit,
        }
    }

    pub fn limit_for(&self, category: Category) -> u32 {
        if category.is_high_risk() {
            self.high_risk_limit
        } else {
            self.base_limit
        }
    }

    // 候補の犬がいない場合は、現在の入居カテゴリから上限を導く
    pub fn limit_for_mix(&self, occupants: &[Category]) -> u32 {
        if occupants.iter().any(|c| c.is_high_risk()) {
            self.high_risk_limit
        } else {
            self.base_limit
        }
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        SlotConfig::default().into()
    }
}

impl From<SlotConfig> for SlotPolicy {
    fn from(value: SlotConfig) -> Self {
        Self::new(value.base_limit, value.high_risk_limit)
    }
}

// 候補カテゴリの犬をこの枠に入れてよいかを判定する。
// 表示（読み取り）とコミット時の再検証（書き込み）の両方が
// 必ずこの関数を通ることで、同一の判定が再現される。
pub fn check_admission(
    occupants: &[Category],
    candidate: Category,
    policy: &SlotPolicy,
) -> AppResult<()> {
    if let Some(conflict) = occupants.iter().find(|o| !candidate.compatible_with(**o)) {
        return Err(AppError::IncompatibleCategory(format!(
            "この枠には {} カテゴリの犬がいるため、{} カテゴリは予約できません。",
            conflict.as_code(),
            candidate.as_code()
        )));
    }
    let limit = policy.limit_for(candidate);
    if occupants.len() as u32 >= limit {
        return Err(AppError::CapacityExceeded(format!(
            "この枠は上限（{limit} 頭）に達しています。"
        )));
    }
    Ok(())
}

// 枠の導出ビュー。永続化しない。
// 常にその時点の有効な予約の集合から計算する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub hour: SlotHour,
    pub occupant_categories: Vec<Category>,
    pub count: usize,
    pub limit: u32,
    pub status: SlotStatus,
}

pub fn snapshot(
    hour: SlotHour,
    occupants: &[Category],
    candidate: Option<Category>,
    policy: &SlotPolicy,
) -> SlotSnapshot {
    let count = occupants.len();
    let limit = match candidate {
        Some(c) => policy.limit_for(c),
        None => policy.limit_for_mix(occupants),
    };
    let status = if count == 0 {
        SlotStatus::Free
    } else {
        let joinable = match candidate {
            Some(c) => check_admission(occupants, c, policy).is_ok(),
            None => (count as u32) < limit,
        };
        if joinable {
            SlotStatus::Joinable
        } else {
            SlotStatus::Full
        }
    };
    SlotSnapshot {
        hour,
        occupant_categories: occupants.to_vec(),
        count,
        limit,
        status,
    }
}
