//! Platform request and reply types, and the closed set of dialogue events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use yaad_core::types::{ConversationId, ConversationState, DialogueContext, PendingItem, UserId};

// =============================================================================
// Intent and slot names
// =============================================================================

pub const STORE_ITEM_INTENT: &str = "StoreItemIntent";
pub const ITEM_NAME_INTENT: &str = "ItemNameIntent";
pub const ITEM_LOCATION_INTENT: &str = "ItemLocationIntent";
pub const RETRIEVE_ITEM_INTENT: &str = "RetrieveItemIntent";
pub const DIRECT_STORE_INTENT: &str = "DirectStoreIntent";
pub const DIRECT_RETRIEVE_INTENT: &str = "DirectRetrieveIntent";
pub const LIST_ITEMS_INTENT: &str = "ListItemsIntent";
pub const CLEAR_ITEMS_INTENT: &str = "ClearItemsIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";

pub const ITEM_NAME_SLOT: &str = "ItemName";
pub const ITEM_LOCATION_SLOT: &str = "ItemLocation";
pub const RAW_VALUE_SLOT: &str = "rawValue";

// =============================================================================
// Wire types
// =============================================================================

/// What the platform is asking for this turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestKind {
    Launch,
    Intent {
        name: String,
        #[serde(default)]
        slots: BTreeMap<String, String>,
    },
    SessionEnded,
}

/// Attributes the platform carries between turns of one conversation.
///
/// Unknown keys are kept and handed back untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeBag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_item: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AttributeBag {
    /// Dialogue context carried by this bag. An unreadable state is treated as Idle.
    pub fn context(&self) -> DialogueContext {
        let state = match self.conversation_state.as_deref() {
            None => ConversationState::Idle,
            Some(raw) => raw.parse::<ConversationState>().unwrap_or_else(|e| {
                warn!(state = raw, error = %e, "Ignoring unreadable conversation state");
                ConversationState::Idle
            }),
        };
        let pending_item = match state {
            ConversationState::CollectingItemLocation => {
                self.pending_item.clone().map(PendingItem)
            }
            _ => None,
        };
        DialogueContext {
            state,
            pending_item,
        }
    }

    /// Replace the dialogue fields with `ctx`, keeping any other attributes.
    pub fn with_context(mut self, ctx: &DialogueContext) -> Self {
        self.conversation_state = match ctx.state {
            ConversationState::Idle => None,
            state => Some(state.to_string()),
        };
        self.pending_item = ctx.pending_item.as_ref().map(|p| p.0.clone());
        self
    }
}

/// One inbound turn from the voice platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillRequest {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub request: RequestKind,
    #[serde(default)]
    pub attributes: AttributeBag,
}

/// The reply for one turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillReply {
    pub speech: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,
    pub attributes: AttributeBag,
}

// =============================================================================
// SkillEvent
// =============================================================================

/// Everything a turn can mean to the dialogue, after classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkillEvent {
    Launch,
    StoreItem,
    RetrieveItem,
    ItemName(Option<String>),
    ItemLocation(Option<String>),
    DirectStore {
        name: Option<String>,
        location: Option<String>,
    },
    DirectRetrieve(Option<String>),
    ListItems,
    ClearItems,
    Help,
    /// Cancel or stop.
    Stop,
    Fallback(Option<String>),
    SessionEnded,
    /// An intent this skill has no handler for.
    Unrecognized {
        intent: String,
        value: Option<String>,
    },
}

impl SkillEvent {
    pub fn from_request(request: &RequestKind) -> Self {
        match request {
            RequestKind::Launch => SkillEvent::Launch,
            RequestKind::SessionEnded => SkillEvent::SessionEnded,
            RequestKind::Intent { name, slots } => match name.as_str() {
                STORE_ITEM_INTENT => SkillEvent::StoreItem,
                RETRIEVE_ITEM_INTENT => SkillEvent::RetrieveItem,
                ITEM_NAME_INTENT => SkillEvent::ItemName(answer_value(slots, ITEM_NAME_SLOT)),
                ITEM_LOCATION_INTENT => {
                    SkillEvent::ItemLocation(answer_value(slots, ITEM_LOCATION_SLOT))
                }
                DIRECT_STORE_INTENT => SkillEvent::DirectStore {
                    name: slot(slots, ITEM_NAME_SLOT),
                    location: slot(slots, ITEM_LOCATION_SLOT),
                },
                DIRECT_RETRIEVE_INTENT => SkillEvent::DirectRetrieve(slot(slots, ITEM_NAME_SLOT)),
                LIST_ITEMS_INTENT => SkillEvent::ListItems,
                CLEAR_ITEMS_INTENT => SkillEvent::ClearItems,
                HELP_INTENT => SkillEvent::Help,
                CANCEL_INTENT | STOP_INTENT => SkillEvent::Stop,
                FALLBACK_INTENT => SkillEvent::Fallback(slot(slots, RAW_VALUE_SLOT)),
                other => SkillEvent::Unrecognized {
                    intent: other.to_string(),
                    value: first_value(slots),
                },
            },
        }
    }

    /// The value this event offers as an answer to a pending question, if it
    /// is the kind of event that can answer one.
    ///
    /// Returns `None` for events that carry their own meaning (store, help,
    /// stop ...). Returns `Some(None)` for an answer with nothing usable in it.
    pub fn answer(&self) -> Option<Option<&str>> {
        match self {
            SkillEvent::ItemName(v) | SkillEvent::ItemLocation(v) | SkillEvent::Fallback(v) => {
                Some(v.as_deref())
            }
            SkillEvent::Unrecognized { value, .. } => Some(value.as_deref()),
            _ => None,
        }
    }
}

fn slot(slots: &BTreeMap<String, String>, name: &str) -> Option<String> {
    slots
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn first_value(slots: &BTreeMap<String, String>) -> Option<String> {
    slots
        .values()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// The named slot, then the raw utterance, then whatever else was filled.
fn answer_value(slots: &BTreeMap<String, String>, preferred: &str) -> Option<String> {
    slot(slots, preferred)
        .or_else(|| slot(slots, RAW_VALUE_SLOT))
        .or_else(|| first_value(slots))
}
