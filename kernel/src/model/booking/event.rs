use derive_new::new;

use crate::model::{
    category::Category,
    id::{BookingId, DogId, PlaygroundId, UserId},
    slot::SlotHour,
};

#[derive(Debug, new)]
pub struct CreateBooking {
    pub playground_id: PlaygroundId,
    pub hour: SlotHour,
    pub dog_id: DogId,
    pub category: Category,
    pub booked_by: UserId,
}

#[derive(Debug, new)]
pub struct CancelBooking {
    pub booking_id: BookingId,
    pub requested_user: UserId,
}
