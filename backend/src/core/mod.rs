//! Core utilities: calendar time for schedules and episodes.

pub mod time;
