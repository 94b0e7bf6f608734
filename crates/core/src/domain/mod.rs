pub mod calendar;
pub mod conversation;
pub mod credential;
pub mod task;
