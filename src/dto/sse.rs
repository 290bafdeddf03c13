use serde::Serialize;
use utoipa::ToSchema;

/// Named SSE message fanned out to every subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerEvent {
    /// Event name, used by clients to pick a listener.
    pub event: &'static str,
    /// JSON-encoded payload.
    pub data: String,
}

impl ServerEvent {
    pub fn new(event: &'static str, data: impl Into<String>) -> Self {
        Self {
            event,
            data: data.into(),
        }
    }

    /// Encode `payload` as JSON under the `event` name.
    pub fn json<T: Serialize>(event: &'static str, payload: &T) -> serde_json::Result<Self> {
        serde_json::to_string(payload).map(|data| Self::new(event, data))
    }
}

/// First message of every stream, addressed to the new subscriber only.
#[derive(Debug, Serialize, ToSchema)]
pub struct Handshake {
    pub message: String,
    /// `true` while no storage backend is reachable.
    pub degraded: bool,
}

/// Payload of `system_status`, sent when storage is lost or restored.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatus {
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_events_carry_the_encoded_payload() {
        let event = ServerEvent::json("system_status", &SystemStatus { degraded: true }).unwrap();
        assert_eq!(event, ServerEvent::new("system_status", r#"{"degraded":true}"#));
    }
}
