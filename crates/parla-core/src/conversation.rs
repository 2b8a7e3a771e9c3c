//! Scripted tutor conversation.
//!
//! The tutor is driven by a prompt template. When it wraps up, it appends a
//! fenced `json` block with the learner's errors, new phrases and a grammar
//! tip; this module finds and parses that block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Topic, VocabCard};
use crate::traits::ChatMessage;

/// Shown in place of the tutor's reply when the chat call fails.
pub const FALLBACK_REPLY: &str = "Mi dispiace, c'è un problema tecnico. Riproviamo!";

/// Phrase the tutor uses to close a conversation.
pub const WRAP_UP_PHRASE: &str = "Ottimo lavoro! Basta per oggi.";

const REVIEW_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Build the tutor's system prompt for a topic.
pub fn build_system_prompt(topic: &Topic) -> String {
    format!(
        r#"You are Marco, an Italian language tutor from Rome. You're patient but direct, with a good sense of humor. You speak Italian by default and switch to English only when the student is stuck. You ask one question at a time, wait for the response, give a brief correction if needed, then ask the next question. Keep corrections short and encouraging. The student is at A2-B1 level.

Current topic: "{name}"
Start with this question: "{question}"

Rules:
- Speak Italian 80-90% of the time
- Ask ONE question, then wait
- If the student makes an error, give a SHORT correction (1-2 sentences max), then move on
- Be encouraging but honest
- Use vocab from the current topic naturally
- After 6-8 exchanges, wrap up with "{wrap_up}"
- When wrapping up, include a JSON block at the end with this exact format:
```json
{{"done": true, "errors": [{{"original": "...", "corrected": "...", "explanation": "..."}}], "newPhrases": ["phrase1", "phrase2"], "grammarTip": "One grammar tip relevant to today's conversation"}}
```"#,
        name = topic.name,
        question = topic.question,
        wrap_up = WRAP_UP_PHRASE,
    )
}

/// A mistake the tutor corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedError {
    pub original: String,
    pub corrected: String,
    #[serde(default)]
    pub explanation: String,
}

/// The tutor's end-of-conversation summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReview {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub errors: Vec<CorrectedError>,
    #[serde(default)]
    pub new_phrases: Vec<String>,
    #[serde(default)]
    pub grammar_tip: String,
}

/// Byte range of the first closed ```` ```json ```` block: (block start, body start, body end, block end).
fn find_review_block(content: &str) -> Option<(usize, usize, usize, usize)> {
    let start = content.find(REVIEW_FENCE)?;
    let body_start = start + REVIEW_FENCE.len();
    let body_len = content[body_start..].find(FENCE)?;
    let body_end = body_start + body_len;
    Some((start, body_start, body_end, body_end + FENCE.len()))
}

/// Parse the review block from a tutor reply.
///
/// Returns `None` when there is no block or its JSON is malformed.
pub fn extract_review(content: &str) -> Option<ConversationReview> {
    let (_, body_start, body_end, _) = find_review_block(content)?;
    match serde_json::from_str(content[body_start..body_end].trim()) {
        Ok(review) => Some(review),
        Err(e) => {
            tracing::debug!("ignoring malformed review block: {e}");
            None
        }
    }
}

/// The reply as shown to the learner, without the review block.
pub fn strip_review_block(content: &str) -> String {
    match find_review_block(content) {
        Some((start, _, _, end)) => format!("{}{}", &content[..start], &content[end..])
            .trim()
            .to_string(),
        None => content.trim().to_string(),
    }
}

/// A conversation in progress.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub topic: Topic,
    pub messages: Vec<ChatMessage>,
    pub started_at: DateTime<Utc>,
    review: Option<ConversationReview>,
}

impl Conversation {
    pub fn new(topic: Topic, started_at: DateTime<Utc>) -> Self {
        Self {
            topic,
            messages: Vec::new(),
            started_at,
            review: None,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Record a tutor reply; returns the review if the reply closes the conversation.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> Option<&ConversationReview> {
        let content = content.into();
        if let Some(review) = extract_review(&content).filter(|r| r.done) {
            self.review = Some(review);
        }
        self.messages.push(ChatMessage::assistant(content));
        self.review.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.review.is_some()
    }

    pub fn review(&self) -> Option<&ConversationReview> {
        self.review.as_ref()
    }

    /// Number of learner turns so far.
    pub fn exchanges(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == crate::traits::Role::User)
            .count()
    }

    pub fn duration_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }
}

/// Turn a review into new vocabulary cards.
///
/// Corrected errors are tagged `mistakes`; new phrases are tagged `learned`.
pub fn review_to_cards(review: &ConversationReview, now: DateTime<Utc>) -> Vec<VocabCard> {
    let stamp = now.timestamp_millis();

    let errors = review.errors.iter().enumerate().map(|(i, e)| VocabCard {
        id: format!("err-{stamp}-{i}"),
        it: e.corrected.clone(),
        en: e.explanation.clone(),
        ex: e.original.clone(),
        tag: Some("mistakes".into()),
        level: None,
    });

    let phrases = review.new_phrases.iter().enumerate().map(|(i, p)| VocabCard {
        id: format!("phrase-{stamp}-{i}"),
        it: p.clone(),
        en: p.clone(),
        ex: "Learned from Marco during conversation".into(),
        tag: Some("learned".into()),
        level: None,
    });

    errors.chain(phrases).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::find_topic;
    use chrono::TimeZone;

    const WRAP_UP: &str = r#"Bravo! Ottimo lavoro! Basta per oggi.

```json
{"done": true, "errors": [{"original": "io sono andato al mare ieri con mia amici", "corrected": "sono andato al mare ieri con i miei amici", "explanation": "possessive agreement"}], "newPhrases": ["fare il salto di qualità"], "grammarTip": "Il passato prossimo con essere concorda col soggetto."}
```"#;

    #[test]
    fn prompt_mentions_topic_and_format() {
        let topic = find_topic("food").unwrap();
        let prompt = build_system_prompt(&topic);
        assert!(prompt.contains("Current topic: \"Cibo e ristoranti\""));
        assert!(prompt.contains("Qual è il tuo piatto preferito?"));
        assert!(prompt.contains(r#"{"done": true, "errors": [{"original""#));
        assert!(prompt.contains("Ottimo lavoro! Basta per oggi."));
    }

    #[test]
    fn extract_review_from_wrap_up() {
        let review = extract_review(WRAP_UP).unwrap();
        assert!(review.done);
        assert_eq!(review.errors.len(), 1);
        assert_eq!(review.new_phrases, vec!["fare il salto di qualità"]);
        assert!(review.grammar_tip.starts_with("Il passato prossimo"));
    }

    #[test]
    fn extract_review_inline_block() {
        let review = extract_review("Fine ```json {\"done\": true}```").unwrap();
        assert!(review.done);
        assert!(review.errors.is_empty());
    }

    #[test]
    fn malformed_or_missing_block_is_ignored() {
        assert!(extract_review("Come stai?").is_none());
        assert!(extract_review("```json\n{done: yes}\n```").is_none());
        assert!(extract_review("```json\n{\"done\": true}").is_none());
    }

    #[test]
    fn strip_block_for_display() {
        assert_eq!(strip_review_block(WRAP_UP), "Bravo! Ottimo lavoro! Basta per oggi.");
        assert_eq!(strip_review_block("  Ciao!  "), "Ciao!");
    }

    #[test]
    fn conversation_finishes_on_done_review() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let mut convo = Conversation::new(find_topic("sport").unwrap(), now);

        assert!(convo.push_assistant("Chi è il tuo sportivo preferito?").is_none());
        convo.push_user("Mi piace Messi");
        assert!(!convo.is_done());

        let review = convo.push_assistant(WRAP_UP).cloned();
        assert!(review.is_some());
        assert!(convo.is_done());
        assert_eq!(convo.exchanges(), 1);
        assert_eq!(convo.messages.len(), 3);

        let later = Utc.with_ymd_and_hms(2026, 3, 1, 10, 7, 30).unwrap();
        assert_eq!(convo.duration_secs(later), 450);
    }

    #[test]
    fn review_with_done_false_does_not_finish() {
        let now = Utc::now();
        let mut convo = Conversation::new(find_topic("sport").unwrap(), now);
        convo.push_assistant("```json\n{\"done\": false}\n```");
        assert!(!convo.is_done());
    }

    #[test]
    fn review_becomes_cards() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let review = extract_review(WRAP_UP).unwrap();
        let cards = review_to_cards(&review, now);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "err-1700000000000-0");
        assert_eq!(cards[0].it, "sono andato al mare ieri con i miei amici");
        assert_eq!(cards[0].en, "possessive agreement");
        assert_eq!(cards[0].tag.as_deref(), Some("mistakes"));

        assert_eq!(cards[1].id, "phrase-1700000000000-0");
        assert_eq!(cards[1].it, cards[1].en);
        assert_eq!(cards[1].ex, "Learned from Marco during conversation");
        assert_eq!(cards[1].tag.as_deref(), Some("learned"));
    }
}
