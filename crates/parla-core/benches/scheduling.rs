use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use parla_core::deck::builtin_deck;
use parla_core::session::pick_session_cards;
use parla_core::srs::{due_cards, sm2, Quality, SrsCard, SrsState};
use parla_core::topics::find_topic;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

fn bench_sm2(c: &mut Criterion) {
    let card = SrsCard::new("bench", today());
    let quality = Quality::new(4).unwrap();

    c.bench_function("sm2_ten_reviews", |b| {
        b.iter(|| {
            let mut card = card.clone();
            for _ in 0..10 {
                card = sm2(black_box(&card), quality, today());
            }
            card
        })
    });
}

fn reviewed_state(ids: &[String]) -> SrsState {
    ids.iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 0)
        .map(|(_, id)| (id.clone(), sm2(&SrsCard::new(id.as_str(), today()), Quality::new(5).unwrap(), today())))
        .collect()
}

fn bench_due_cards(c: &mut Criterion) {
    let ids: Vec<String> = (0..5000).map(|i| format!("card-{i}")).collect();
    let state = reviewed_state(&ids);

    c.bench_function("due_cards_5000", |b| {
        b.iter(|| due_cards(black_box(&state), ids.iter().map(String::as_str), today()))
    });
}

fn bench_pick_session(c: &mut Criterion) {
    let vocab = builtin_deck().unwrap().cards;
    let ids: Vec<String> = vocab.iter().map(|v| v.id.clone()).collect();
    let state = reviewed_state(&ids);
    let topic = find_topic("food").unwrap();

    c.bench_function("pick_session_cards_builtin", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| pick_session_cards(black_box(&vocab), &state, &topic, today(), &mut rng))
    });
}

criterion_group!(benches, bench_sm2, bench_due_cards, bench_pick_session);
criterion_main!(benches);
