use crate::model::endpoint::EndpointId;
use crate::model::room::RoomId;
use crate::model::signaling::SignalKind;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("frame is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid field '{field}': {source}")]
    InvalidField {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("room id is empty")]
    EmptyRoom,

    #[error("'{0}' is reserved for the relay")]
    ServerOnly(SignalKind),
}

/// Relay-side view of a frame: the routing header plus payload fields kept as raw JSON text.
///
/// Payload values are never decoded, so a delivered copy carries them byte for byte.
#[derive(Debug)]
pub struct Envelope {
    pub kind: SignalKind,
    pub room: RoomId,
    payload: BTreeMap<String, Box<RawValue>>,
}

impl Envelope {
    /// Envelope without payload, used for notices the relay originates itself.
    pub fn new(kind: SignalKind, room: RoomId) -> Self {
        Self {
            kind,
            room,
            payload: BTreeMap::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let mut fields: BTreeMap<String, Box<RawValue>> = serde_json::from_str(text)?;

        let event = fields
            .remove("event")
            .ok_or(EnvelopeError::MissingField("event"))?;
        let kind: SignalKind =
            serde_json::from_str(event.get()).map_err(|source| EnvelopeError::InvalidField {
                field: "event",
                source,
            })?;
        if !kind.is_client_originated() {
            return Err(EnvelopeError::ServerOnly(kind));
        }

        let room = fields
            .remove("room")
            .ok_or(EnvelopeError::MissingField("room"))?;
        let room: RoomId =
            serde_json::from_str(room.get()).map_err(|source| EnvelopeError::InvalidField {
                field: "room",
                source,
            })?;
        if room.as_str().is_empty() {
            return Err(EnvelopeError::EmptyRoom);
        }

        // The relay stamps the sender itself.
        fields.remove("from");

        if let Some(key) = kind.payload_key() {
            if !fields.contains_key(key) {
                return Err(EnvelopeError::MissingField(key));
            }
        }

        Ok(Self {
            kind,
            room,
            payload: fields,
        })
    }

    pub fn payload(&self, key: &str) -> Option<&RawValue> {
        self.payload.get(key).map(|v| v.as_ref())
    }

    /// Text of the copy handed to every other room member.
    pub fn delivery(&self, from: EndpointId) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Delivery {
            envelope: self,
            from,
        })
    }
}

struct Delivery<'a> {
    envelope: &'a Envelope,
    from: EndpointId,
}

impl Serialize for Delivery<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.envelope.payload.len() + 3))?;
        map.serialize_entry("event", &self.envelope.kind)?;
        map.serialize_entry("room", &self.envelope.room)?;
        for (key, value) in &self.envelope.payload {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("from", &self.from)?;
        map.end()
    }
}
