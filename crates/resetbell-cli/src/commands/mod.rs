pub mod alert;
pub mod common;
pub mod events;
pub mod project;
pub mod serve;
