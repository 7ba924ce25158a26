pub mod message;
pub mod reply;
