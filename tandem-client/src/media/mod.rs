mod media_backend;
mod webrtc_media;

pub use media_backend::*;
pub use webrtc_media::*;
