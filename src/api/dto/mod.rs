//! Data Transfer Objects for REST request and response bodies.

pub mod message_dto;
pub mod presence_dto;

pub use message_dto::{SendMessageRequest, SendMessageResponse};
pub use presence_dto::{OnlineUsersResponse, UserStatusResponse};
