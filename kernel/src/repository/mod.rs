pub mod booking;
pub mod dog;
pub mod playground;
