mod call_controller;
mod call_event;
mod call_session;
mod call_state;
mod call_update;

pub use call_controller::*;
pub use call_event::*;
pub use call_session::*;
pub use call_state::*;
pub use call_update::*;
