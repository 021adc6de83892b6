use anyhow::Result;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub slot: SlotConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let slot = SlotConfig::from_env()?;
        Ok(Self { database, slot })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

// 1 枠あたりの上限頭数の設定。
// 未設定の場合は旧システムの evaluate_slot に埋め込まれていた値を使う。
#[derive(Debug, Clone, Copy)]
pub struct SlotConfig {
    pub base_limit: u32,
    pub high_risk_limit: u32,
}

impl SlotConfig {
    pub fn from_env() -> Result<Self> {
        let base_limit = match std::env::var("SLOT_BASE_LIMIT") {
            Ok(v) => v.parse()?,
            Err(_) => Self::default().base_limit,
        };
        let high_risk_limit = match std::env::var("SLOT_HIGH_RISK_LIMIT") {
            Ok(v) => v.parse()?,
            Err(_) => Self::default().high_risk_limit,
        };
        Ok(Self {
            base_limit,
            high_risk_limit,
        })
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            base_limit: 8,
            high_risk_limit: 2,
        }
    }
}
