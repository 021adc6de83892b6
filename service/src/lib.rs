pub mod model;
pub mod reservation;
