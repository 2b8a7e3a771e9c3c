//! The `parla practice` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use parla_core::model::{Level, PracticeMode, VocabCard};
use parla_core::session::{cloze_or_fallback, practice_queue, PracticeSummary};
use parla_core::srs::{format_interval, get_or_create_card, preview_intervals, Feedback, Quality};

use super::{goal_line, prompt_line, rng, today, Context};

pub struct PracticeOptions {
    pub level: Option<Level>,
    pub mode: Option<PracticeMode>,
    pub seed: Option<u64>,
    pub vocab: Option<PathBuf>,
}

enum Answer {
    Rate(Quality),
    Quit,
}

fn parse_answer(input: &str) -> Option<Answer> {
    if input.eq_ignore_ascii_case("q") {
        return Some(Answer::Quit);
    }
    if let Ok(feedback) = input.parse::<Feedback>() {
        return Some(Answer::Rate(feedback.quality()));
    }
    input
        .parse::<u8>()
        .ok()
        .and_then(|v| Quality::new(v).ok())
        .map(Answer::Rate)
}

/// Letters hidden, spacing and punctuation kept: "l'anno" -> "_'____".
fn mask_word(word: &str) -> String {
    word.chars()
        .map(|c| if c.is_alphabetic() { '_' } else { c })
        .collect()
}

/// Front and back of a card in the given mode.
fn card_faces(card: &VocabCard, mode: PracticeMode) -> (String, String) {
    let example = if card.ex.is_empty() {
        String::new()
    } else {
        format!("\n    {}", card.ex)
    };
    match mode {
        PracticeMode::Classic => (card.it.clone(), format!("{}{example}", card.en)),
        PracticeMode::Reverse => (card.en.clone(), format!("{}{example}", card.it)),
        PracticeMode::Listening => (
            format!("(ascolta) {}", mask_word(&card.it)),
            format!("{} = {}{example}", card.it, card.en),
        ),
        PracticeMode::Cloze => {
            let cloze = cloze_or_fallback(card);
            (cloze.sentence, format!("{} ({})", cloze.answer, card.en))
        }
    }
}

pub fn execute<R: BufRead, W: Write>(
    ctx: &Context,
    options: PracticeOptions,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let today = today();
    let settings = ctx.store.load_settings()?;
    let mode = options.mode.unwrap_or(settings.preferred_mode);
    let vocab = ctx.vocab(options.vocab.as_deref())?;
    let state = ctx.store.load_srs()?;

    let queue = practice_queue(&vocab, &state, options.level, today, &mut rng(options.seed));
    if queue.is_empty() {
        writeln!(out, "Nessuna carta da ripassare! No cards due today.")?;
        writeln!(
            out,
            "{}",
            goal_line(ctx.store.today_reviewed(today)?, settings.daily_goal)
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "{} cards due ({mode} mode). Rate each card e(asy)/g(ood)/h(ard) or 0-5; q quits.\n",
        queue.len()
    )?;

    let mut summary = PracticeSummary::default();
    let total = queue.len();

    'cards: for (i, card) in queue.iter().enumerate() {
        let (front, back) = card_faces(card, mode);
        writeln!(out, "[{}/{total}] {front}", i + 1)?;

        match prompt_line(input, out, "  (Enter to reveal) ")? {
            Some(line) if line.eq_ignore_ascii_case("q") => break,
            None => break,
            Some(_) => {}
        }
        writeln!(out, "  = {back}")?;

        let current = get_or_create_card(&state, &card.id, today);
        let preview = preview_intervals(&current, today)
            .iter()
            .map(|(fb, days)| format!("{fb} {}", format_interval(*days)))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "  {preview}")?;

        let quality = loop {
            match prompt_line(input, out, "  rating> ")? {
                None => break 'cards,
                Some(line) => match parse_answer(&line) {
                    Some(Answer::Quit) => break 'cards,
                    Some(Answer::Rate(q)) => break q,
                    None => writeln!(out, "  Please answer e, g, h, 0-5 or q.")?,
                },
            }
        };

        let updated = ctx.store.review_card(&card.id, quality, today)?;
        summary.record(quality);
        writeln!(
            out,
            "  next review in {}\n",
            format_interval(updated.interval)
        )?;
    }

    writeln!(out, "Reviewed {} card(s).", summary.reviewed)?;
    if summary.reviewed > 0 {
        writeln!(out, "Average quality: {:.1}", summary.average_quality())?;
    }
    writeln!(
        out,
        "{}",
        goal_line(ctx.store.today_reviewed(today)?, settings.daily_goal)
    )?;
    tracing::debug!(reviewed = summary.reviewed, "practice finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(it: &str, en: &str, ex: &str) -> VocabCard {
        VocabCard {
            id: "x".into(),
            it: it.into(),
            en: en.into(),
            ex: ex.into(),
            tag: None,
            level: None,
        }
    }

    #[test]
    fn answers() {
        assert!(matches!(parse_answer("q"), Some(Answer::Quit)));
        assert!(matches!(parse_answer("E"), Some(Answer::Rate(q)) if q.value() == 5));
        assert!(matches!(parse_answer("hard"), Some(Answer::Rate(q)) if q.value() == 1));
        assert!(matches!(parse_answer("2"), Some(Answer::Rate(q)) if q.value() == 2));
        assert!(parse_answer("6").is_none());
        assert!(parse_answer("maybe").is_none());
    }

    #[test]
    fn faces_per_mode() {
        let c = card("la disciplina", "discipline", "La disciplina è tutto.");
        assert_eq!(card_faces(&c, PracticeMode::Classic).0, "la disciplina");
        assert_eq!(card_faces(&c, PracticeMode::Reverse).0, "discipline");
        assert!(card_faces(&c, PracticeMode::Reverse).1.starts_with("la disciplina"));

        let (front, back) = card_faces(&c, PracticeMode::Cloze);
        assert_eq!(front, "La _____ è tutto.");
        assert_eq!(back, "disciplina (discipline)");

        let (front, back) = card_faces(&c, PracticeMode::Listening);
        assert_eq!(front, "(ascolta) __ __________");
        assert!(!front.contains("disciplina"));
        assert!(back.starts_with("la disciplina = discipline"));

        let bare = card("allenarsi", "to train", "");
        assert_eq!(card_faces(&bare, PracticeMode::Cloze).0, "_____ = to train");
        assert_eq!(card_faces(&bare, PracticeMode::Classic).1, "to train");
    }

    #[test]
    fn masking_keeps_shape() {
        assert_eq!(mask_word("l'anno prossimo"), "_'____ ________");
        assert_eq!(mask_word("perché"), "______");
    }
}
