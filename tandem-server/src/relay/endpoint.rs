use std::fmt;
use tandem_core::{EndpointId, RoomId};

/// One open connection as the relay sees it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub id: EndpointId,
    pub room: Option<RoomId>,
    pub display_name: Option<String>,
}

impl Endpoint {
    pub fn new(id: EndpointId, display_name: Option<String>) -> Self {
        Self {
            id,
            room: None,
            display_name,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} ({})", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}
