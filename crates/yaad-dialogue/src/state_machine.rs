//! Slot-filling state machine for the store and retrieve flows.
//!
//! Store flow:    Idle -> CollectingItemName -> CollectingItemLocation -> Idle
//! Retrieve flow: Idle -> CollectingItemToRetrieve -> Idle
//! Direct store / retrieve / list / clear complete in one turn from any state.
//!
//! `transition` is pure: it decides the next context and what should happen,
//! the controller performs the effect.

use yaad_core::types::{ConversationState, DialogueContext};

use crate::event::{SkillEvent, ITEM_LOCATION_INTENT, ITEM_NAME_INTENT};

/// Spoken in place of an item name that could not be heard.
pub const ITEM_PLACEHOLDER: &str = "चीज़";
/// Item name used when a one-shot store carries no name.
pub const DIRECT_ITEM_PLACEHOLDER: &str = "कुछ";
/// Spoken in place of a location that could not be heard.
pub const LOCATION_PLACEHOLDER: &str = "कहीं";

/// A reply that needs nothing from the Item Store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Welcome,
    Help,
    Goodbye,
    NotUnderstood,
    AskItemName,
    AskLocation { item: String },
    AskItemToRetrieve,
    /// Direct retrieve arrived without an item name.
    UnclearItem,
    /// Echo of an intent no handler claims.
    Reflect { intent: String },
}

/// What the controller must do to finish the turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Say(Prompt),
    Store { item: String, location: String },
    Retrieve { item: String },
    ListAll,
    ClearAll,
    EndSession,
}

/// Outcome of one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub context: DialogueContext,
    pub effect: Effect,
}

impl Transition {
    fn to(context: DialogueContext, effect: Effect) -> Self {
        Self { context, effect }
    }

    fn stay(context: &DialogueContext, prompt: Prompt) -> Self {
        Self::to(context.clone(), Effect::Say(prompt))
    }

    fn idle(effect: Effect) -> Self {
        Self::to(DialogueContext::idle(), effect)
    }
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}

/// Compute the next context and effect for `event` arriving in `ctx`.
pub fn transition(ctx: &DialogueContext, event: &SkillEvent) -> Transition {
    match (ctx.state, event) {
        // ---- Any state ----
        (_, SkillEvent::Launch) => Transition::stay(ctx, Prompt::Welcome),
        (_, SkillEvent::Help) => Transition::stay(ctx, Prompt::Help),
        (_, SkillEvent::Stop) => Transition::idle(Effect::Say(Prompt::Goodbye)),
        (_, SkillEvent::SessionEnded) => Transition::idle(Effect::EndSession),

        // A new flow intent restarts the flow.
        (_, SkillEvent::StoreItem) => Transition::to(
            DialogueContext::collecting(ConversationState::CollectingItemName),
            Effect::Say(Prompt::AskItemName),
        ),
        (_, SkillEvent::RetrieveItem) => Transition::to(
            DialogueContext::collecting(ConversationState::CollectingItemToRetrieve),
            Effect::Say(Prompt::AskItemToRetrieve),
        ),

        (_, SkillEvent::DirectStore { name, location }) => Transition::idle(Effect::Store {
            item: or_placeholder(name.as_deref(), DIRECT_ITEM_PLACEHOLDER),
            location: or_placeholder(location.as_deref(), LOCATION_PLACEHOLDER),
        }),
        (_, SkillEvent::DirectRetrieve(Some(name))) => {
            Transition::idle(Effect::Retrieve { item: name.clone() })
        }
        (_, SkillEvent::DirectRetrieve(None)) => Transition::to(
            DialogueContext::collecting(ConversationState::CollectingItemToRetrieve),
            Effect::Say(Prompt::UnclearItem),
        ),
        (_, SkillEvent::ListItems) => Transition::idle(Effect::ListAll),
        (_, SkillEvent::ClearItems) => Transition::idle(Effect::ClearAll),

        // ---- Collecting: whatever was said is the answer ----
        (ConversationState::CollectingItemName, e) => {
            let item = or_placeholder(e.answer().flatten(), ITEM_PLACEHOLDER);
            Transition::to(
                DialogueContext::awaiting_location(item.clone()),
                Effect::Say(Prompt::AskLocation { item }),
            )
        }
        (ConversationState::CollectingItemLocation, e) => {
            let item = ctx
                .pending_item
                .as_ref()
                .map(|p| p.0.clone())
                .unwrap_or_else(|| ITEM_PLACEHOLDER.to_string());
            Transition::idle(Effect::Store {
                item,
                location: or_placeholder(e.answer().flatten(), LOCATION_PLACEHOLDER),
            })
        }
        (ConversationState::CollectingItemToRetrieve, e) => Transition::idle(Effect::Retrieve {
            item: or_placeholder(e.answer().flatten(), ITEM_PLACEHOLDER),
        }),

        // ---- Idle: answers with no question pending ----
        (ConversationState::Idle, SkillEvent::Fallback(_)) => {
            Transition::stay(ctx, Prompt::NotUnderstood)
        }
        (ConversationState::Idle, SkillEvent::ItemName(_)) => Transition::stay(
            ctx,
            Prompt::Reflect {
                intent: ITEM_NAME_INTENT.to_string(),
            },
        ),
        (ConversationState::Idle, SkillEvent::ItemLocation(_)) => Transition::stay(
            ctx,
            Prompt::Reflect {
                intent: ITEM_LOCATION_INTENT.to_string(),
            },
        ),
        (ConversationState::Idle, SkillEvent::Unrecognized { intent, .. }) => Transition::stay(
            ctx,
            Prompt::Reflect {
                intent: intent.clone(),
            },
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================
