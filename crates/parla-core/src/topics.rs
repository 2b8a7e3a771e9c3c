//! Conversation topics and topic rotation.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::Topic;
use crate::srs::Feedback;

const TOPICS: [(&str, &str, &str, &str); 8] = [
    (
        "sport",
        "Sport e fuoriclasse",
        "Chi è il tuo sportivo preferito e perché lo consideri un fuoriclasse?",
        "sport",
    ),
    (
        "routine",
        "La vita quotidiana",
        "Raccontami della tua giornata tipica. Cosa fai dalla mattina alla sera?",
        "routine",
    ),
    (
        "food",
        "Cibo e ristoranti",
        "Qual è il tuo piatto preferito? Ti piace cucinare o preferisci andare al ristorante?",
        "food",
    ),
    (
        "travel",
        "Viaggi e vacanze",
        "Qual è il viaggio più bello che hai fatto? Dove vorresti andare?",
        "travel",
    ),
    (
        "work",
        "Lavoro e carriera",
        "Cosa fai per lavoro? Come ti trovi? Cosa ti piace del tuo lavoro?",
        "work",
    ),
    (
        "tech",
        "Tecnologia e futuro",
        "Come pensi che la tecnologia cambierà la nostra vita nei prossimi anni?",
        "tech",
    ),
    (
        "health",
        "Salute e benessere",
        "Cosa fai per mantenerti in forma? Quanto è importante la salute per te?",
        "fitness",
    ),
    (
        "culture",
        "Cultura italiana",
        "Cosa ti affascina della cultura italiana? Hai un film o libro italiano preferito?",
        "idioms",
    ),
];

/// All conversation topics, in display order.
pub fn all_topics() -> Vec<Topic> {
    TOPICS
        .iter()
        .map(|(id, name, question, tag)| Topic {
            id: (*id).to_string(),
            name: (*name).to_string(),
            question: (*question).to_string(),
            tag_filter: Some((*tag).to_string()),
        })
        .collect()
}

pub fn find_topic(id: &str) -> Option<Topic> {
    all_topics().into_iter().find(|t| t.id == id)
}

/// Topic for `id`, or the first topic when the id is unknown.
pub fn topic_or_default(id: &str) -> Topic {
    let mut topics = all_topics();
    match topics.iter().position(|t| t.id == id) {
        Some(pos) => topics.swap_remove(pos),
        None => topics.swap_remove(0),
    }
}

/// Choose the next lesson topic.
///
/// A topic rated hard last time is repeated; otherwise a different topic
/// from the last one is picked at random.
pub fn pick_topic<R: Rng + ?Sized>(
    last_topic: Option<&str>,
    last_feedback: Option<(&str, Feedback)>,
    rng: &mut R,
) -> Topic {
    let topics = all_topics();

    if let Some((topic_id, Feedback::Hard)) = last_feedback {
        if let Some(same) = topics.iter().find(|t| t.id == topic_id) {
            return same.clone();
        }
    }

    let available: Vec<&Topic> = match last_topic {
        Some(last) => topics.iter().filter(|t| t.id != last).collect(),
        None => topics.iter().collect(),
    };

    available
        .choose(rng)
        .map(|t| (*t).clone())
        .unwrap_or_else(|| topics[0].clone())
}
