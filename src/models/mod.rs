pub mod booking;
pub mod event;
pub mod rules;
pub mod slot;
