pub mod booking;
pub mod dog;
pub mod memory;
pub mod playground;
