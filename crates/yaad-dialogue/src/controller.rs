//! Dialogue controller: runs one transition and carries out its effect.

use std::sync::Arc;

use tracing::debug;

use yaad_core::types::{ConversationId, DialogueContext, UserId};
use yaad_storage::ItemStore;

use crate::error::DialogueError;
use crate::event::SkillEvent;
use crate::response::{ResponseComposer, SkillResponse};
use crate::state_machine::{transition, Effect};

/// Sequences the store and retrieve flows for every conversation.
///
/// Holds no per-conversation state of its own: the context comes in with the
/// event and goes back out with the reply.
pub struct DialogueController {
    store: Arc<ItemStore>,
    composer: ResponseComposer,
}

impl DialogueController {
    pub fn new(store: Arc<ItemStore>, composer: ResponseComposer) -> Self {
        Self { store, composer }
    }

    pub fn store(&self) -> &Arc<ItemStore> {
        &self.store
    }

    pub fn composer(&self) -> &ResponseComposer {
        &self.composer
    }

    /// Handle one event. Returns the next context and the reply to speak.
    pub async fn handle(
        &self,
        scope: &ConversationId,
        user: &UserId,
        ctx: &DialogueContext,
        event: &SkillEvent,
    ) -> Result<(DialogueContext, SkillResponse), DialogueError> {
        let next = transition(ctx, event);
        debug!(
            scope = %scope,
            from = %ctx.state,
            to = %next.context.state,
            "Dialogue transition"
        );

        let response = match &next.effect {
            Effect::Say(prompt) => self.composer.prompt(prompt),
            Effect::Store { item, location } => {
                let record = self.store.store(scope, user, item, location).await?;
                self.composer.stored(item, &record.location)
            }
            Effect::Retrieve { item } => match self.store.retrieve(scope, user, item).await? {
                Some(location) => self.composer.found(item, &location),
                None => self.composer.not_found(item),
            },
            Effect::ListAll => {
                let records = self.store.list_all(scope, user).await?;
                self.composer.listing(&records)
            }
            Effect::ClearAll => {
                self.store.clear_all(scope, user).await?;
                self.composer.cleared()
            }
            Effect::EndSession => {
                self.store.end_session(scope)?;
                SkillResponse::default()
            }
        };

        Ok((next.context, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaad_core::config::{GrammarConfig, VocabularyConfig};
    use yaad_core::normalize::NameNormalizer;
    use yaad_core::types::ConversationState;
    use yaad_storage::MemoryBackend;

    fn controller() -> DialogueController {
        let normalizer = NameNormalizer::new(&VocabularyConfig::default()).unwrap();
        let store = Arc::new(ItemStore::new(
            normalizer.clone(),
            Some(Arc::new(MemoryBackend::new())),
        ));
        DialogueController::new(
            store,
            ResponseComposer::new(&GrammarConfig::default(), normalizer),
        )
    }

    fn ids() -> (ConversationId, UserId) {
        (ConversationId::new("conv-1"), UserId::new("user-1"))
    }

    #[tokio::test]
    async fn test_multi_turn_store_then_direct_retrieve() {
        let c = controller();
        let (scope, user) = ids();

        let (ctx, r) = c
            .handle(&scope, &user, &DialogueContext::idle(), &SkillEvent::StoreItem)
            .await
            .unwrap();
        assert_eq!(ctx.state, ConversationState::CollectingItemName);
        assert_eq!(r.speech, "क्या याद रखना है?");

        let (ctx, r) = c
            .handle(&scope, &user, &ctx, &SkillEvent::ItemName(Some("चाबी".into())))
            .await
            .unwrap();
        assert_eq!(ctx.state, ConversationState::CollectingItemLocation);
        assert_eq!(r.speech, "कहां रखा है चाबी?");

        let (ctx, r) = c
            .handle(&scope, &user, &ctx, &SkillEvent::ItemLocation(Some("दराज़".into())))
            .await
            .unwrap();
        assert_eq!(ctx, DialogueContext::idle());
        assert!(r.speech.contains("चाबी"));
        assert!(r.speech.contains("दराज़"));
        assert!(r.speech.contains("रखी है"));

        let (_, r) = c
            .handle(
                &scope,
                &user,
                &ctx,
                &SkillEvent::DirectRetrieve(Some("मेरी चाबी".into())),
            )
            .await
            .unwrap();
        assert_eq!(r.speech, "आपने मेरी चाबी दराज़ में रखी थी।");
    }

    #[tokio::test]
    async fn test_retrieve_unknown_item() {
        let c = controller();
        let (scope, user) = ids();

        let (ctx, r) = c
            .handle(
                &scope,
                &user,
                &DialogueContext::collecting(ConversationState::CollectingItemToRetrieve),
                &SkillEvent::ItemName(Some("अज्ञातवस्तु".into())),
            )
            .await
            .unwrap();
        assert_eq!(ctx, DialogueContext::idle());
        assert!(r.speech.starts_with("मुझे याद नहीं है कि आपने अज्ञातवस्तु"));
    }

    #[tokio::test]
    async fn test_direct_store_lowercases_location() {
        let c = controller();
        let (scope, user) = ids();

        let (_, r) = c
            .handle(
                &scope,
                &user,
                &DialogueContext::idle(),
                &SkillEvent::DirectStore {
                    name: Some("Phone".into()),
                    location: Some(" Sofa ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(r.speech, "ठीक है, मैंने याद कर लिया है कि Phone sofa में रखा है।");

        let found = c.store().retrieve(&scope, &user, "phone").await.unwrap();
        assert_eq!(found.as_deref(), Some("sofa"));
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let c = controller();
        let (scope, user) = ids();
        let idle = DialogueContext::idle();

        c.store().store(&scope, &user, "चश्मा", "मेज़").await.unwrap();
        c.store().store(&scope, &user, "चाबी", "दराज़").await.unwrap();

        let (_, r) = c
            .handle(&scope, &user, &idle, &SkillEvent::ListItems)
            .await
            .unwrap();
        // Sorted by code point: श (U+0936) before ा (U+093E).
        assert_eq!(r.speech, "मुझे याद है: चश्मा मेज़ में, चाबी दराज़ में।");

        let (_, r) = c
            .handle(&scope, &user, &idle, &SkillEvent::ClearItems)
            .await
            .unwrap();
        assert_eq!(r, c.composer().cleared());
        assert!(c.store().list_all(&scope, &user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_ended_drops_ephemeral_tier() {
        let c = controller();
        let (scope, user) = ids();

        c.store().store(&scope, &user, "पर्स", "कार").await.unwrap();
        let (ctx, r) = c
            .handle(
                &scope,
                &user,
                &DialogueContext::awaiting_location("चाबी"),
                &SkillEvent::SessionEnded,
            )
            .await
            .unwrap();
        assert_eq!(ctx, DialogueContext::idle());
        assert_eq!(r, SkillResponse::default());
        assert_eq!(c.store().active_conversations().unwrap(), 0);

        // Still in the durable tier.
        let found = c.store().retrieve(&scope, &user, "पर्स").await.unwrap();
        assert_eq!(found.as_deref(), Some("कार"));
    }
}
