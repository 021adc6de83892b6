pub mod booking;
pub mod category;
pub mod dog;
pub mod id;
pub mod playground;
pub mod slot;
