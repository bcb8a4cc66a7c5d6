use serde::{Deserialize, Serialize};

use crate::error::YaadError;

// =============================================================================
// Identifiers
// =============================================================================

/// Platform identifier of the person talking to the skill. Keys the durable tier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one conversation (platform session). Keys the ephemeral tier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Dialogue state
// =============================================================================

/// Where a conversation is in the store / retrieve flows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    #[default]
    Idle,
    /// Store flow started, waiting for the item name.
    CollectingItemName,
    /// Item name captured, waiting for where it was put.
    CollectingItemLocation,
    /// Retrieve flow started, waiting for the item name.
    CollectingItemToRetrieve,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConversationState::Idle => "IDLE",
            ConversationState::CollectingItemName => "COLLECTING_ITEM_NAME",
            ConversationState::CollectingItemLocation => "COLLECTING_ITEM_LOCATION",
            ConversationState::CollectingItemToRetrieve => "COLLECTING_ITEM_TO_RETRIEVE",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ConversationState {
    type Err = YaadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(ConversationState::Idle),
            "COLLECTING_ITEM_NAME" => Ok(ConversationState::CollectingItemName),
            "COLLECTING_ITEM_LOCATION" => Ok(ConversationState::CollectingItemLocation),
            "COLLECTING_ITEM_TO_RETRIEVE" => Ok(ConversationState::CollectingItemToRetrieve),
            other => Err(YaadError::MalformedRequest(format!(
                "unknown conversation state: {}",
                other
            ))),
        }
    }
}

/// Item name captured mid-flow, held until the location arrives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingItem(pub String);

impl PendingItem {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-conversation dialogue state, passed into the controller and returned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueContext {
    pub state: ConversationState,
    pub pending_item: Option<PendingItem>,
}

impl DialogueContext {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn collecting(state: ConversationState) -> Self {
        Self {
            state,
            pending_item: None,
        }
    }

    pub fn awaiting_location(item: impl Into<String>) -> Self {
        Self {
            state: ConversationState::CollectingItemLocation,
            pending_item: Some(PendingItem(item.into())),
        }
    }
}

// =============================================================================
// Items
// =============================================================================

/// One remembered item: normalized name and where it was put.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub location: String,
}

impl ItemRecord {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_state_serde_screaming_snake() {
        let json = serde_json::to_string(&ConversationState::CollectingItemToRetrieve).unwrap();
        assert_eq!(json, "\"COLLECTING_ITEM_TO_RETRIEVE\"");
        let back: ConversationState = serde_json::from_str("\"COLLECTING_ITEM_NAME\"").unwrap();
        assert_eq!(back, ConversationState::CollectingItemName);
    }

    #[test]
    fn test_conversation_state_display_matches_serde() {
        for state in [
            ConversationState::Idle,
            ConversationState::CollectingItemName,
            ConversationState::CollectingItemLocation,
            ConversationState::CollectingItemToRetrieve,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
            assert_eq!(state.to_string().parse::<ConversationState>().unwrap(), state);
        }
    }

    #[test]
    fn test_conversation_state_parse_unknown() {
        let err = "WAITING".parse::<ConversationState>().unwrap_err();
        assert!(matches!(err, YaadError::MalformedRequest(_)));
    }

    #[test]
    fn test_dialogue_context_constructors() {
        assert_eq!(DialogueContext::idle().state, ConversationState::Idle);
        assert!(DialogueContext::idle().pending_item.is_none());

        let ctx = DialogueContext::awaiting_location("चाबी");
        assert_eq!(ctx.state, ConversationState::CollectingItemLocation);
        assert_eq!(ctx.pending_item.unwrap().as_str(), "चाबी");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let user = UserId::new("amzn1.ask.account.X");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"amzn1.ask.account.X\"");
        assert_eq!(user.to_string(), "amzn1.ask.account.X");

        let scope = ConversationId::new("amzn1.echo-api.session.1");
        assert_eq!(
            serde_json::to_string(&scope).unwrap(),
            "\"amzn1.echo-api.session.1\""
        );
        assert_eq!(scope.as_str(), "amzn1.echo-api.session.1");
    }
}
