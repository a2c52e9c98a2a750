mod chat_channel;

pub use chat_channel::*;
