//! The `parla lesson` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::Utc;

use parla_core::conversation::{review_to_cards, Conversation, ConversationReview};
use parla_core::engine::{TutorEngine, TutorTurn};
use parla_core::model::{Topic, VocabCard};
use parla_core::session::pick_session_cards;
use parla_core::srs::Feedback;
use parla_core::store::SessionRecord;
use parla_core::topics::{all_topics, find_topic, pick_topic};
use parla_providers::create_provider;

use super::{prompt_line, rng, today, Context};

const QUIT_COMMAND: &str = "/quit";

pub struct LessonOptions {
    pub topic: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub seed: Option<u64>,
    pub vocab: Option<PathBuf>,
}

fn choose_topic<R: rand::Rng>(ctx: &Context, requested: Option<&str>, rng: &mut R) -> Result<Topic> {
    if let Some(id) = requested {
        return find_topic(id).with_context(|| {
            let ids: Vec<String> = all_topics().into_iter().map(|t| t.id).collect();
            format!("unknown topic '{id}' (available: {})", ids.join(", "))
        });
    }
    let last_topic = ctx.store.load_last_topic()?;
    let last_feedback = ctx.store.load_last_feedback()?;
    Ok(pick_topic(
        last_topic.as_deref(),
        last_feedback.as_ref().map(|f| (f.topic.as_str(), f.feedback)),
        rng,
    ))
}

fn build_engine(ctx: &Context, options: &LessonOptions) -> Result<TutorEngine> {
    let (name, provider_config) = ctx.config.provider_config(options.provider.as_deref())?;
    let provider = Arc::from(create_provider(name, provider_config)?);
    let mut engine_config = ctx.config.engine_config();
    if let Some(model) = &options.model {
        engine_config.model = model.clone();
    }
    tracing::debug!(provider = name, model = %engine_config.model, "tutor ready");
    Ok(TutorEngine::new(provider, engine_config))
}

/// Ask y/n for each card. Returns (card id, knew it) for the answered cards.
fn warm_up<R: BufRead, W: Write>(
    cards: &[VocabCard],
    input: &mut R,
    out: &mut W,
) -> Result<Vec<(String, bool)>> {
    writeln!(out, "Warm-up: {} cards. Do you know it? y/n (s skips the rest)\n", cards.len())?;
    let mut results = Vec::new();

    for (i, card) in cards.iter().enumerate() {
        writeln!(out, "[{}/{}] {}", i + 1, cards.len(), card.it)?;
        let knew = loop {
            match prompt_line(input, out, "  y/n> ")?.map(|l| l.to_lowercase()) {
                None => return Ok(results),
                Some(answer) => match answer.as_str() {
                    "y" | "yes" | "s\u{ec}" | "si" => break true,
                    "n" | "no" => break false,
                    "s" | "skip" => return Ok(results),
                    _ => writeln!(out, "  Please answer y or n.")?,
                },
            }
        };
        writeln!(out, "  = {}", card.en)?;
        results.push((card.id.clone(), knew));
    }

    Ok(results)
}

fn show_turn<W: Write>(out: &mut W, turn: &TutorTurn) -> Result<()> {
    writeln!(out, "\nMarco: {}\n", turn.display_text)?;
    Ok(())
}

async fn converse<R: BufRead, W: Write>(
    engine: &TutorEngine,
    conversation: &mut Conversation,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "\nTopic: {}\n\"{}\"\nType {QUIT_COMMAND} to end the conversation.",
        conversation.topic.name, conversation.topic.question
    )?;

    let opening = engine.respond(conversation).await;
    show_turn(out, &opening)?;

    while !conversation.is_done() {
        let Some(line) = prompt_line(input, out, "Tu> ")? else {
            break;
        };
        if line == QUIT_COMMAND {
            break;
        }
        if line.is_empty() {
            continue;
        }
        conversation.push_user(line);
        let turn = engine.respond(conversation).await;
        show_turn(out, &turn)?;
    }

    Ok(())
}

fn show_review<W: Write>(out: &mut W, review: &ConversationReview) -> Result<()> {
    writeln!(out, "Review")?;
    if review.errors.is_empty() {
        writeln!(out, "  No errors. Perfetto!")?;
    }
    for error in &review.errors {
        writeln!(out, "  x {}", error.original)?;
        writeln!(out, "  > {}", error.corrected)?;
        if !error.explanation.is_empty() {
            writeln!(out, "    {}", error.explanation)?;
        }
    }
    if !review.new_phrases.is_empty() {
        writeln!(out, "  New phrases: {}", review.new_phrases.join(", "))?;
    }
    if !review.grammar_tip.is_empty() {
        writeln!(out, "  Grammar tip: {}", review.grammar_tip)?;
    }
    Ok(())
}

fn ask_feedback<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Feedback> {
    loop {
        match prompt_line(input, out, "\nHow was this lesson? easy/good/hard> ")? {
            None => return Ok(Feedback::Good),
            Some(answer) => match answer.parse::<Feedback>() {
                Ok(feedback) => return Ok(feedback),
                Err(_) => writeln!(out, "Please answer easy, good or hard.")?,
            },
        }
    }
}

pub async fn execute<R: BufRead, W: Write>(
    ctx: &Context,
    options: LessonOptions,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let today = today();
    let mut rng = rng(options.seed);

    let engine = build_engine(ctx, &options)?;
    let topic = choose_topic(ctx, options.topic.as_deref(), &mut rng)?;

    let vocab = ctx.vocab(options.vocab.as_deref())?;
    let state = ctx.store.load_srs()?;
    let cards = pick_session_cards(&vocab, &state, &topic, today, &mut rng);

    // Warm-up
    let results = warm_up(&cards, input, out)?;
    ctx.store.apply_recall_results(&results, today)?;
    let known = results.iter().filter(|(_, knew)| *knew).count();
    writeln!(out, "\nWarm-up done: {known}/{} known.", results.len())?;

    // Conversation
    let mut conversation = Conversation::new(topic.clone(), Utc::now());
    converse(&engine, &mut conversation, input, out).await?;
    let duration_secs = conversation.duration_secs(Utc::now());

    // Review
    let review = conversation.review().cloned().unwrap_or_default();
    if conversation.is_done() {
        show_review(out, &review)?;
        let new_cards = review_to_cards(&review, Utc::now());
        let added = ctx.store.add_user_vocab(&new_cards)?;
        if added > 0 {
            writeln!(out, "  {added} new card(s) added to your vocabulary.")?;
        }
    } else {
        writeln!(out, "Conversation ended before the tutor's review.")?;
    }

    // Feedback
    let feedback = ask_feedback(input, out)?;
    ctx.store.save_last_feedback(&topic.id, feedback)?;
    ctx.store.save_last_topic(&topic.id)?;
    ctx.store.save_session(&SessionRecord {
        date: today,
        topic: topic.name.clone(),
        cards_reviewed: cards.len() as u32,
        errors_count: review.errors.len() as u32,
        new_phrases_count: review.new_phrases.len() as u32,
        feedback,
        duration_secs,
    })?;

    let streak = ctx.store.streak(today)?;
    writeln!(out, "\nSession saved. Streak: {streak} day(s). A presto!")?;
    tracing::info!(topic = %topic.id, %feedback, exchanges = conversation.exchanges(), "lesson finished");
    Ok(())
}
