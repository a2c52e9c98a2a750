pub mod call;
pub mod chat;
pub mod config;
pub mod error;
pub mod media;
pub mod runtime;
pub mod signaling;

pub use call::*;
pub use chat::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use runtime::*;
pub use signaling::*;
