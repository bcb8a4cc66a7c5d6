//! Hindi reply rendering.
//!
//! Past-participle agreement follows the item's gender class, which comes
//! from the `[grammar]` word list rather than any linguistic analysis.

use yaad_core::config::GrammarConfig;
use yaad_core::normalize::NameNormalizer;
use yaad_core::types::ItemRecord;

use crate::state_machine::Prompt;

const WELCOME: &str = "नमस्ते! मैं आपकी चीज़ें खोजने में मदद कर सकता हूँ। आप मुझसे अपनी चीज़ों को याद रखने के लिए कह सकते हैं, या मुझसे पूछ सकते हैं कि आपने कोई चीज़ कहां रखी थी।";
const HELP: &str = "आप मुझसे अपनी चीज़ें याद रखने के लिए कह सकते हैं, जैसे \"याद रखना\", या आप पूछ सकते हैं \"मेरी चाबी कहां है\"। मैं आपको बताऊंगा कि आपने उन्हें कहां रखा था।";
const GOODBYE: &str = "अलविदा!";
const NOT_UNDERSTOOD: &str = "क्षमा करें, मुझे समझ नहीं आया। आप मुझसे अपनी चीज़ें याद रखने के लिए कह सकते हैं, या पूछ सकते हैं कि आपने कोई चीज़ कहां रखी थी।";
const ASK_ITEM_NAME: &str = "क्या याद रखना है?";
const ASK_ITEM_TO_RETRIEVE: &str = "क्या याद है?";
const WHAT_ARE_YOU_LOOKING_FOR: &str = "आप क्या खोज रहे हैं?";
const UNCLEAR_ITEM: &str = "क्षमा करें, मुझे समझ नहीं आया कि आप किस वस्तु के बारे में पूछ रहे हैं।";
const APOLOGY: &str = "क्षमा करें, कुछ गड़बड़ हो गई। कृपया बाद में पुनः प्रयास करें।";
const NOTHING_REMEMBERED: &str = "अभी मुझे कोई चीज़ याद नहीं है।";
const CLEARED: &str = "ठीक है, मैंने सब कुछ भुला दिया है।";

/// Spoken text for one turn, with an optional reprompt that keeps the
/// conversation open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillResponse {
    pub speech: String,
    pub reprompt: Option<String>,
}

impl SkillResponse {
    pub fn say(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            reprompt: None,
        }
    }

    pub fn ask(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            reprompt: Some(reprompt.into()),
        }
    }

    /// Ask and repeat the same question as the reprompt.
    pub fn ask_again(speech: impl Into<String>) -> Self {
        let speech = speech.into();
        Self {
            reprompt: Some(speech.clone()),
            speech,
        }
    }
}

/// Renders every reply the skill speaks.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    feminine_items: Vec<String>,
    normalizer: NameNormalizer,
}

impl ResponseComposer {
    pub fn new(grammar: &GrammarConfig, normalizer: NameNormalizer) -> Self {
        let feminine_items = grammar
            .feminine_items
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            feminine_items,
            normalizer,
        }
    }

    /// Whether `item` takes feminine agreement. Checked against both the
    /// spoken and the normalized name, so "meri khadi" agrees like "खारी".
    pub fn is_feminine(&self, item: &str) -> bool {
        let spoken = item.trim().to_lowercase();
        let normalized = self.normalizer.normalize(item);
        self.feminine_items
            .iter()
            .any(|w| spoken.contains(w.as_str()) || normalized.contains(w.as_str()))
    }

    pub fn prompt(&self, prompt: &Prompt) -> SkillResponse {
        match prompt {
            Prompt::Welcome => SkillResponse::ask_again(WELCOME),
            Prompt::Help => SkillResponse::ask_again(HELP),
            Prompt::Goodbye => SkillResponse::say(GOODBYE),
            Prompt::NotUnderstood => SkillResponse::ask_again(NOT_UNDERSTOOD),
            Prompt::AskItemName => SkillResponse::ask_again(ASK_ITEM_NAME),
            Prompt::AskLocation { item } => {
                SkillResponse::ask_again(format!("कहां रखा है {}?", item))
            }
            Prompt::AskItemToRetrieve => {
                SkillResponse::ask(ASK_ITEM_TO_RETRIEVE, WHAT_ARE_YOU_LOOKING_FOR)
            }
            Prompt::UnclearItem => SkillResponse::ask(UNCLEAR_ITEM, WHAT_ARE_YOU_LOOKING_FOR),
            Prompt::Reflect { intent } => {
                SkillResponse::say(format!("आपने {} इंटेंट ट्रिगर किया है", intent))
            }
        }
    }

    /// Confirmation after a store.
    pub fn stored(&self, item: &str, location: &str) -> SkillResponse {
        let verb = if self.is_feminine(item) {
            "रखी है"
        } else {
            "रखा है"
        };
        SkillResponse::say(format!(
            "ठीक है, मैंने याद कर लिया है कि {} {} में {}।",
            item, location, verb
        ))
    }

    /// Answer to a retrieve that found the item.
    pub fn found(&self, item: &str, location: &str) -> SkillResponse {
        let verb = if self.is_feminine(item) {
            "रखी थी"
        } else {
            "रखा था"
        };
        SkillResponse::say(format!("आपने {} {} में {}।", item, location, verb))
    }

    pub fn not_found(&self, item: &str) -> SkillResponse {
        SkillResponse::say(format!(
            "मुझे याद नहीं है कि आपने {} कहां रखा था। क्या आप मुझे बताना चाहेंगे?",
            item
        ))
    }

    pub fn listing(&self, records: &[ItemRecord]) -> SkillResponse {
        if records.is_empty() {
            return SkillResponse::say(NOTHING_REMEMBERED);
        }
        let entries: Vec<String> = records
            .iter()
            .map(|r| format!("{} {} में", r.name, r.location))
            .collect();
        SkillResponse::say(format!("मुझे याद है: {}।", entries.join(", ")))
    }

    pub fn cleared(&self) -> SkillResponse {
        SkillResponse::say(CLEARED)
    }

    pub fn apology(&self) -> SkillResponse {
        SkillResponse::ask_again(APOLOGY)
    }
}
