//! Top-level turn handler.
//!
//! Every request gets an in-character reply: failures inside the turn are
//! logged and answered with a spoken apology, never surfaced to the platform.

use std::sync::Arc;

use tracing::{error, info};

use yaad_core::config::YaadConfig;
use yaad_core::error::Result;
use yaad_core::normalize::NameNormalizer;
use yaad_storage::{DurableBackend, ItemStore};

use crate::controller::DialogueController;
use crate::error::DialogueError;
use crate::event::{AttributeBag, SkillEvent, SkillReply, SkillRequest};
use crate::response::{ResponseComposer, SkillResponse};

pub struct Skill {
    controller: DialogueController,
}

impl Skill {
    pub fn new(controller: DialogueController) -> Self {
        Self { controller }
    }

    /// Wire normalizer, Item Store and composer from configuration.
    pub fn from_config(
        config: &YaadConfig,
        durable: Option<Arc<dyn DurableBackend>>,
    ) -> Result<Self> {
        let normalizer = NameNormalizer::new(&config.vocabulary)?;
        let store = Arc::new(ItemStore::new(normalizer.clone(), durable));
        let composer = ResponseComposer::new(&config.grammar, normalizer);
        Ok(Self::new(DialogueController::new(store, composer)))
    }

    pub fn item_store(&self) -> &Arc<ItemStore> {
        self.controller.store()
    }

    /// Handle one platform turn.
    pub async fn handle(&self, request: SkillRequest) -> SkillReply {
        let SkillRequest {
            user_id,
            conversation_id,
            request,
            attributes,
        } = request;

        let event = SkillEvent::from_request(&request);
        let ctx = attributes.context();
        info!(
            user = %user_id,
            scope = %conversation_id,
            state = %ctx.state,
            event = ?event,
            "Handling turn"
        );

        match self
            .controller
            .handle(&conversation_id, &user_id, &ctx, &event)
            .await
        {
            Ok((next, response)) => reply(response, attributes.with_context(&next)),
            Err(e) => self.failure_reply(attributes, &e),
        }
    }

    /// Apology for a request that could not be read as a turn at all. There is
    /// no context to hand back, so the next turn starts from Idle.
    pub fn malformed_reply(&self) -> SkillReply {
        reply(self.controller.composer().apology(), AttributeBag::default())
    }

    /// Apology for a failed turn. The incoming attributes are handed back as
    /// they were so the user can simply try again.
    fn failure_reply(&self, attributes: AttributeBag, err: &DialogueError) -> SkillReply {
        error!(error = %err, "Turn failed");
        reply(self.controller.composer().apology(), attributes)
    }
}

fn reply(response: SkillResponse, attributes: AttributeBag) -> SkillReply {
    SkillReply {
        speech: response.speech,
        reprompt: response.reprompt,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use yaad_core::types::{ConversationId, ConversationState, UserId};
    use yaad_storage::MemoryBackend;

    use crate::event::RequestKind;

    fn skill() -> Skill {
        Skill::from_config(&YaadConfig::default(), Some(Arc::new(MemoryBackend::new()))).unwrap()
    }

    fn request(kind: RequestKind, attributes: AttributeBag) -> SkillRequest {
        SkillRequest {
            user_id: UserId::new("user-1"),
            conversation_id: ConversationId::new("conv-1"),
            request: kind,
            attributes,
        }
    }

    fn intent(name: &str, slots: &[(&str, &str)]) -> RequestKind {
        RequestKind::Intent {
            name: name.to_string(),
            slots: slots
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn test_store_flow_through_attribute_bag() {
        // Session-only, so the final lookup can only be answered by the ephemeral tier.
        let skill = Skill::from_config(&YaadConfig::default(), None).unwrap();

        let r1 = skill
            .handle(request(intent("StoreItemIntent", &[]), AttributeBag::default()))
            .await;
        assert_eq!(r1.speech, "क्या याद रखना है?");
        assert_eq!(
            r1.attributes.conversation_state.as_deref(),
            Some("COLLECTING_ITEM_NAME")
        );

        let r2 = skill
            .handle(request(
                intent("ItemNameIntent", &[("ItemName", "चाबी")]),
                r1.attributes,
            ))
            .await;
        assert_eq!(r2.attributes.pending_item.as_deref(), Some("चाबी"));

        let r3 = skill
            .handle(request(
                intent("ItemLocationIntent", &[("ItemLocation", "दराज़")]),
                r2.attributes,
            ))
            .await;
        assert_eq!(
            r3.speech,
            "ठीक है, मैंने याद कर लिया है कि चाबी दराज़ में रखी है।"
        );
        assert!(r3.attributes.conversation_state.is_none());
        assert!(r3.attributes.pending_item.is_none());

        let found = skill
            .item_store()
            .retrieve(&ConversationId::new("conv-1"), &UserId::new("user-1"), "चाबी")
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some("दराज़"));

        let remembered = skill
            .item_store()
            .list_all(&ConversationId::new("conv-1"), &UserId::new("user-1"))
            .await
            .unwrap();
        assert_eq!(remembered.len(), 1);
        assert_eq!(remembered[0].name, "चाबी");
    }

    #[tokio::test]
    async fn test_unhandled_intent_is_reflected() {
        let skill = skill();
        let reply = skill
            .handle(request(intent("WeatherIntent", &[]), AttributeBag::default()))
            .await;
        assert_eq!(reply.speech, "आपने WeatherIntent इंटेंट ट्रिगर किया है");
    }

    #[tokio::test]
    async fn test_launch_and_session_end() {
        let skill = skill();

        let launch = skill
            .handle(request(RequestKind::Launch, AttributeBag::default()))
            .await;
        assert!(launch.speech.starts_with("नमस्ते!"));
        assert!(launch.reprompt.is_some());

        let bag = AttributeBag {
            conversation_state: Some(ConversationState::CollectingItemName.to_string()),
            ..AttributeBag::default()
        };
        let ended = skill.handle(request(RequestKind::SessionEnded, bag)).await;
        assert_eq!(ended.speech, "");
        assert!(ended.attributes.conversation_state.is_none());
    }

    #[test]
    fn test_failure_reply_is_apology_with_original_attributes() {
        let skill = skill();
        let bag = AttributeBag {
            conversation_state: Some("COLLECTING_ITEM_NAME".to_string()),
            ..AttributeBag::default()
        };
        let reply = skill.failure_reply(
            bag.clone(),
            &DialogueError::StorageError("lock poisoned".to_string()),
        );
        assert_eq!(
            reply.speech,
            "क्षमा करें, कुछ गड़बड़ हो गई। कृपया बाद में पुनः प्रयास करें।"
        );
        assert!(reply.reprompt.is_some());
        assert_eq!(reply.attributes, bag);
    }

    #[test]
    fn test_malformed_reply_starts_over() {
        let reply = skill().malformed_reply();
        assert_eq!(
            reply.speech,
            "क्षमा करें, कुछ गड़बड़ हो गई। कृपया बाद में पुनः प्रयास करें।"
        );
        assert!(reply.reprompt.is_some());
        assert_eq!(reply.attributes, AttributeBag::default());
    }

    #[test]
    fn test_from_config_without_durable_store() {
        let skill = Skill::from_config(&YaadConfig::default(), None).unwrap();
        assert_eq!(skill.item_store().backend_name(), "none");
    }
}
