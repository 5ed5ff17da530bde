pub mod booking;
pub mod client;
pub mod service;
pub mod slot;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use client::Client;
pub use service::Service;
pub use slot::TimeSlot;
pub use user::User;
