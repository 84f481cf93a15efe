mod message;

pub use message::{
    DeleteMessageRequest, EditMessageTextRequest, SendMessageRequest, TelegramMessage,
    TelegramResponse,
};
