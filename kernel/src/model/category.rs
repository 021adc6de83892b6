use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

// 犬のカテゴリ。登録時に固定され、予約の観点では不変とみなす。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Small,
    Standard,
    Active,
    HighRisk,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Small,
        Category::Standard,
        Category::Active,
        Category::HighRisk,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Category::Small => "SMALL",
            Category::Standard => "STANDARD",
            Category::Active => "ACTIVE",
            Category::HighRisk => "HIGH_RISK",
        }
    }

    pub fn from_code(code: &str) -> AppResult<Self> {
        match code {
            "SMALL" => Ok(Category::Small),
            "STANDARD" => Ok(Category::Standard),
            "ACTIVE" => Ok(Category::Active),
            "HIGH_RISK" => Ok(Category::HighRisk),
            other => Err(AppError::ConversionEntityError(format!(
                "不明なカテゴリコードです: {other}"
            ))),
        }
    }

    // 利用者向けの表示ラベル
    pub fn label(self) -> &'static str {
        match self {
            Category::Small => "Декоративные",
            Category::Standard => "Стандартные",
            Category::Active => "Активные",
            Category::HighRisk => "Служебные / Бойцовские",
        }
    }

    pub fn is_high_risk(self) -> bool {
        matches!(self, Category::HighRisk)
    }

    // 同じ枠を共有できるカテゴリの組み合わせかどうかを返す。
    // 対称・反射的な述語である。
    // - 同じカテゴリ同士は常に共有できる（頭数上限は別途かかる）
    // - STANDARD と ACTIVE は互いに混在できる
    // - SMALL と HIGH_RISK はそれ以外と混在できない
    pub fn compatible_with(self, other: Category) -> bool {
        self == other || (self.mixes_with_peers() && other.mixes_with_peers())
    }

    fn mixes_with_peers(self) -> bool {
        matches!(self, Category::Standard | Category::Active)
    }
}

impl std::str::FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_code(&s.to_ascii_uppercase())
    }
}
