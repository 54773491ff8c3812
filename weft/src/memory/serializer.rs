//! Serializer for checkpoint state (state <-> bytes), used by persistent savers.

use crate::memory::checkpointer::CheckpointError;

/// Serializes and deserializes state for checkpoint storage.
///
/// `MemorySaver` keeps `Checkpoint<S>` values directly and does not use one.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON serializer for any `Serialize + DeserializeOwned` state.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::MessagesState;

    /// **Scenario**: conversation state survives JSON serialization, tool calls included.
    #[test]
    fn json_serializer_messages_state() {
        let state = MessagesState::new(vec![
            Message::user("who is on call?"),
            Message::assistant_with_tool_calls(
                "",
                vec![crate::message::ToolCall {
                    id: Some("call_1".into()),
                    name: "employee_lookup".into(),
                    arguments: "{\"query\":\"on call\"}".into(),
                }],
            ),
        ]);
        let bytes = Serializer::<MessagesState>::serialize(&JsonSerializer, &state).unwrap();
        let back: MessagesState = JsonSerializer.deserialize(&bytes).unwrap();
        assert_eq!(back, state);
    }

    /// **Scenario**: invalid bytes produce a Serialization error.
    #[test]
    fn json_serializer_rejects_garbage() {
        let err = Serializer::<MessagesState>::deserialize(&JsonSerializer, b"not json").unwrap_err();
        assert!(matches!(err, CheckpointError::Serialization(_)));
    }
}
