pub mod address_parser;
pub mod adjacency_filter;
pub mod booking_service;
pub mod datetime;
pub mod day_filter;
pub mod slot_filter;
pub mod slot_search;
pub mod slot_template;
