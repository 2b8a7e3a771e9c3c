//! Card selection for practice and lesson warm-ups.

use std::collections::HashSet;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Level, Topic, VocabCard};
use crate::srs::{due_cards, Quality, SrsState};

/// Number of warm-up cards in a lesson.
pub const SESSION_SIZE: usize = 12;

const BLANK: &str = "_____";

const ARTICLES: [&str; 10] = [
    "il ", "la ", "lo ", "l'", "i ", "le ", "gli ", "un ", "una ", "uno ",
];

/// Pick the warm-up cards for a lesson on `topic`.
///
/// Due cards tagged for the topic come first, then other due cards, each
/// group shuffled. Short sessions are topped up with random cards that are
/// not yet selected.
pub fn pick_session_cards<R: Rng + ?Sized>(
    vocab: &[VocabCard],
    state: &SrsState,
    topic: &Topic,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<VocabCard> {
    let due = due_cards(state, vocab.iter().map(|v| v.id.as_str()), today);
    let due: HashSet<&str> = due.iter().map(String::as_str).collect();

    let (mut on_topic, mut other): (Vec<&VocabCard>, Vec<&VocabCard>) = vocab
        .iter()
        .filter(|v| due.contains(v.id.as_str()))
        .partition(|v| topic.tag_filter.is_some() && v.tag == topic.tag_filter);

    on_topic.shuffle(rng);
    other.shuffle(rng);

    let mut selected: Vec<&VocabCard> = on_topic.into_iter().chain(other).take(SESSION_SIZE).collect();

    if selected.len() < SESSION_SIZE {
        let chosen: HashSet<&str> = selected.iter().map(|v| v.id.as_str()).collect();
        let mut remaining: Vec<&VocabCard> = vocab
            .iter()
            .filter(|v| !chosen.contains(v.id.as_str()))
            .collect();
        remaining.shuffle(rng);
        let missing = SESSION_SIZE - selected.len();
        selected.extend(remaining.into_iter().take(missing));
    }

    selected.into_iter().cloned().collect()
}

/// Due cards for flashcard practice, optionally limited to one level, shuffled.
pub fn practice_queue<R: Rng + ?Sized>(
    vocab: &[VocabCard],
    state: &SrsState,
    level: Option<Level>,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<VocabCard> {
    let filtered: Vec<&VocabCard> = vocab
        .iter()
        .filter(|v| level.map_or(true, |l| v.level == Some(l)))
        .collect();
    let due: HashSet<String> = due_cards(state, filtered.iter().map(|v| v.id.as_str()), today)
        .into_iter()
        .collect();

    let mut queue: Vec<VocabCard> = filtered
        .into_iter()
        .filter(|v| due.contains(&v.id))
        .cloned()
        .collect();
    queue.shuffle(rng);
    queue
}

/// A fill-in-the-blank prompt built from a card's example sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cloze {
    /// Example sentence with the word replaced by a blank.
    pub sentence: String,
    /// The blanked text, as written in the example.
    pub answer: String,
}

/// Blank out the card's word in its example sentence.
///
/// A leading article is dropped before searching, and matching ignores
/// case. Returns `None` when the example does not contain the word.
pub fn cloze(card: &VocabCard) -> Option<Cloze> {
    let lowered = card.it.to_lowercase();
    let word = ARTICLES
        .iter()
        .find_map(|article| lowered.strip_prefix(article))
        .unwrap_or(&lowered);
    if word.is_empty() {
        return None;
    }

    let example_lower = card.ex.to_lowercase();
    // Offsets are only comparable when lowercasing kept byte lengths.
    if example_lower.len() != card.ex.len() {
        return None;
    }
    let start = example_lower.find(word)?;
    let end = start + word.len();
    if !card.ex.is_char_boundary(start) || !card.ex.is_char_boundary(end) {
        return None;
    }

    Some(Cloze {
        sentence: format!("{}{}{}", &card.ex[..start], BLANK, &card.ex[end..]),
        answer: card.ex[start..end].to_string(),
    })
}

/// Cloze prompt with the translation fallback used when the example lacks the word.
pub fn cloze_or_fallback(card: &VocabCard) -> Cloze {
    cloze(card).unwrap_or_else(|| Cloze {
        sentence: format!("{BLANK} = {}", card.en),
        answer: card.it.clone(),
    })
}

/// Running totals for a practice run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeSummary {
    pub reviewed: u32,
    pub total_quality: u32,
}

impl PracticeSummary {
    pub fn record(&mut self, quality: Quality) {
        self.reviewed += 1;
        self.total_quality += u32::from(quality.value());
    }

    pub fn average_quality(&self) -> f64 {
        if self.reviewed == 0 {
            0.0
        } else {
            f64::from(self.total_quality) / f64::from(self.reviewed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::SrsCard;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(id: &str, tag: &str, level: Level) -> VocabCard {
        VocabCard {
            id: id.into(),
            it: format!("parola {id}"),
            en: format!("word {id}"),
            ex: String::new(),
            tag: Some(tag.into()),
            level: Some(level),
        }
    }

    fn topic(tag: &str) -> Topic {
        Topic {
            id: "t".into(),
            name: "Tema".into(),
            question: "Domanda?".into(),
            tag_filter: Some(tag.into()),
        }
    }

    fn today() -> NaiveDate {
        "2026-06-01".parse().unwrap()
    }

    fn not_due(state: &mut SrsState, id: &str) {
        let mut c = SrsCard::new(id, today());
        c.next_review = "2026-06-10".parse().unwrap();
        state.insert(id.into(), c);
    }

    #[test]
    fn session_prefers_topic_cards() {
        let mut vocab: Vec<VocabCard> = (0..20).map(|i| card(&format!("o{i}"), "other", Level::A1)).collect();
        vocab.extend((0..3).map(|i| card(&format!("s{i}"), "sport", Level::B1)));
        let mut rng = StdRng::seed_from_u64(7);

        let picked = pick_session_cards(&vocab, &SrsState::new(), &topic("sport"), today(), &mut rng);
        assert_eq!(picked.len(), SESSION_SIZE);
        assert!(picked[..3].iter().all(|c| c.tag.as_deref() == Some("sport")));
        assert!(picked[3..].iter().all(|c| c.tag.as_deref() == Some("other")));
    }

    #[test]
    fn session_tops_up_with_non_due_cards() {
        let vocab: Vec<VocabCard> = (0..15).map(|i| card(&i.to_string(), "x", Level::A2)).collect();
        let mut state = SrsState::new();
        for i in 0..13 {
            not_due(&mut state, &i.to_string());
        }
        let mut rng = StdRng::seed_from_u64(1);

        let picked = pick_session_cards(&vocab, &state, &topic("sport"), today(), &mut rng);
        assert_eq!(picked.len(), SESSION_SIZE);
        // The two due cards lead the session.
        let lead: HashSet<&str> = picked[..2].iter().map(|c| c.id.as_str()).collect();
        assert_eq!(lead, HashSet::from(["13", "14"]));
        let unique: HashSet<&str> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(unique.len(), SESSION_SIZE);
    }

    #[test]
    fn session_with_small_vocab() {
        let vocab: Vec<VocabCard> = (0..4).map(|i| card(&i.to_string(), "x", Level::A2)).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let picked = pick_session_cards(&vocab, &SrsState::new(), &topic("x"), today(), &mut rng);
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn practice_queue_filters_level_and_due() {
        let vocab = vec![
            card("a", "x", Level::A1),
            card("b", "x", Level::B1),
            card("c", "x", Level::B1),
        ];
        let mut state = SrsState::new();
        not_due(&mut state, "c");
        let mut rng = StdRng::seed_from_u64(9);

        let all = practice_queue(&vocab, &state, None, today(), &mut rng);
        assert_eq!(all.len(), 2);

        let b1 = practice_queue(&vocab, &state, Some(Level::B1), today(), &mut rng);
        assert_eq!(b1.len(), 1);
        assert_eq!(b1[0].id, "b");
    }

    #[test]
    fn practice_queue_is_reproducible_with_seed() {
        let vocab: Vec<VocabCard> = (0..30).map(|i| card(&i.to_string(), "x", Level::A1)).collect();
        let a = practice_queue(&vocab, &SrsState::new(), None, today(), &mut StdRng::seed_from_u64(5));
        let b = practice_queue(&vocab, &SrsState::new(), None, today(), &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    fn cloze_card(it: &str, ex: &str) -> VocabCard {
        VocabCard {
            id: "c".into(),
            it: it.into(),
            en: "english".into(),
            ex: ex.into(),
            tag: None,
            level: None,
        }
    }

    #[test]
    fn cloze_strips_article_and_keeps_case() {
        let c = cloze(&cloze_card("la disciplina", "La disciplina è la chiave del successo.")).unwrap();
        assert_eq!(c.sentence, "La _____ è la chiave del successo.");
        assert_eq!(c.answer, "disciplina");

        let c = cloze(&cloze_card("il talento naturale", "Il talento naturale non basta.")).unwrap();
        assert_eq!(c.sentence, "Il _____ non basta.");
    }

    #[test]
    fn cloze_matches_case_insensitively() {
        let c = cloze(&cloze_card("l'allenamento", "L'allenamento di oggi.")).unwrap();
        assert_eq!(c.answer, "allenamento");

        let c = cloze(&cloze_card("Investire", "Preferisco investire a lungo termine.")).unwrap();
        assert_eq!(c.answer, "investire");
    }

    #[test]
    fn cloze_missing_word_falls_back() {
        let card = cloze_card("allenarsi duramente", "Si allena duramente ogni giorno.");
        assert!(cloze(&card).is_none());
        let fallback = cloze_or_fallback(&card);
        assert_eq!(fallback.sentence, "_____ = english");
        assert_eq!(fallback.answer, "allenarsi duramente");
    }

    #[test]
    fn practice_summary_average() {
        let mut summary = PracticeSummary::default();
        assert_eq!(summary.average_quality(), 0.0);
        summary.record(Quality::new(5).unwrap());
        summary.record(Quality::new(2).unwrap());
        assert_eq!(summary.reviewed, 2);
        assert!((summary.average_quality() - 3.5).abs() < f64::EPSILON);
    }
}
