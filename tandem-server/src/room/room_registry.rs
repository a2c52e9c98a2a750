use std::collections::{HashMap, HashSet};
use tandem_core::{EndpointId, RoomId, RoomSummary};

/// Which endpoint sits in which room. Pure bookkeeping, every operation is total.
///
/// An endpoint is a member of at most one room at a time.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, HashSet<EndpointId>>,
    locations: HashMap<EndpointId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the endpoint to `room`, creating the room on first join.
    ///
    /// Returns the room the endpoint was moved out of, if it sat somewhere else.
    pub fn join(&mut self, endpoint_id: EndpointId, room: RoomId) -> Option<RoomId> {
        if self.locations.get(&endpoint_id) == Some(&room) {
            return None;
        }
        let previous = self.remove_endpoint(endpoint_id);

        self.rooms
            .entry(room.clone())
            .or_default()
            .insert(endpoint_id);
        self.locations.insert(endpoint_id, room);

        previous
    }

    /// Returns whether the endpoint was actually a member of `room`.
    pub fn leave(&mut self, endpoint_id: EndpointId, room: &RoomId) -> bool {
        if self.locations.get(&endpoint_id) != Some(room) {
            return false;
        }
        self.remove_endpoint(endpoint_id).is_some()
    }

    /// Drops the endpoint from whatever room it occupies and returns that room.
    pub fn remove_endpoint(&mut self, endpoint_id: EndpointId) -> Option<RoomId> {
        let room = self.locations.remove(&endpoint_id)?;

        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&endpoint_id);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }

        Some(room)
    }

    pub fn members(&self, room: &RoomId) -> HashSet<EndpointId> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    pub fn room_of(&self, endpoint_id: EndpointId) -> Option<&RoomId> {
        self.locations.get(&endpoint_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|(room, members)| RoomSummary {
                room: room.clone(),
                members: members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.room.cmp(&b.room));
        summaries
    }
}
