mod availability;
mod booking_service;
mod errors;

pub use availability::is_available;
pub use booking_service::{
    AvailabilitySearch, AvailableCar, BookingDetails, ServiceDependencies, change_status,
    create_booking, list_owner_bookings, list_user_bookings, search_availability,
};
pub use errors::{BookingApplicationError, Result};
