// Interfaces layer: 對外的 JSON 形狀與事件分派，HTTP / Lambda 進入點共用

pub mod dto;
pub mod handler;

pub use handler::{ApiEvent, ApiHandler, ApiReply};
