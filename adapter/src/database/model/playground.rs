use kernel::model::{id::PlaygroundId, playground::Playground};

#[derive(sqlx::FromRow)]
pub struct PlaygroundRow {
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

impl From<PlaygroundRow> for Playground {
    fn from(value: PlaygroundRow) -> Self {
        let PlaygroundRow {
            playground_id,
            park_name,
            address,
            district,
            adm_area,
            lat,
            lon,
            lighting,
            fencing,
            elements,
            working_hours,
            photo_id,
        } = value;
        Playground {
            playground_id,
            park_name,
            address,
            district,
            adm_area,
            lat,
            lon,
            lighting,
            fencing,
            elements,
            working_hours,
            photo_id,
        }
    }
}
