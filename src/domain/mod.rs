pub mod booking;
pub mod commands;
pub mod date_format;
pub mod errors;
pub mod value_objects;

pub use booking::{Booking, BookingPeriod, BookingStatus};
pub use date_format::DateLabels;
pub use errors::*;
pub use value_objects::*;
