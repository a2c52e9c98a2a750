mod endpoint;
mod relay;
mod relay_command;

pub use endpoint::*;
pub use relay::*;
pub use relay_command::*;
