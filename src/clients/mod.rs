pub mod distance_matrix;
pub mod google_calendar;

pub use distance_matrix::{DistanceMatrixClient, DistanceProvider};
pub use google_calendar::{CalendarClient, GoogleCalendarClient};
