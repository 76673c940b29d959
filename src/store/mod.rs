pub mod conversation;
pub mod listing;
pub mod message;
pub mod user;
