pub mod auth;
pub mod conversation;
pub mod listing;
pub mod message;
