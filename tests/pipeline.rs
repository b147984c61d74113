//! Word sourcing pipeline tests
//!
//! Drives the pipeline with scripted word sources and canned dictionary
//! entries against an in-memory lexicon

use std::sync::atomic::Ordering;

use vocab_tutor::Error;
use vocab_tutor::db::LexiconStore;

mod common;
use common::{Harness, entry_without_spoken_clip};

#[tokio::test]
async fn skips_words_the_chat_has_seen() {
    let harness = Harness::new(&["cat", "cat", "dog"], &["cat", "dog"]);
    harness.lexicon.commit_skipped(42, "cat").unwrap();

    let candidate = harness.pipeline().source(42).await.unwrap();

    assert_eq!(candidate.word, "dog");
    assert_eq!(harness.words.calls(), 3);
    // Seen words are rejected before any dictionary call
    assert_eq!(harness.dictionary.lookups(), vec!["dog"]);
}

#[tokio::test]
async fn candidate_is_fully_enriched() {
    let harness = Harness::new(&["dog"], &["dog"]);

    let candidate = harness.pipeline().source(7).await.unwrap();

    assert_eq!(candidate.word, "dog");
    assert_eq!(candidate.definition, "definition of dog");
    assert_eq!(candidate.transcription, "dog");
    assert_eq!(candidate.audio_url, "https://audio.test/dog.mp3");
    assert_eq!(candidate.image_url.as_deref(), Some("https://img.test/dog.jpg"));
    assert_eq!(candidate.translated_word, "tr-dog");
    assert_eq!(candidate.caption(), "dog [dog] - tr-dog\n\ndefinition of dog");
}

#[tokio::test]
async fn missing_spoken_clip_retries_silently() {
    let harness = Harness::new(&["apple", "pear"], &["pear"]);
    harness
        .dictionary
        .insert("apple", entry_without_spoken_clip("apple"));

    let candidate = harness.pipeline().source(1).await.unwrap();

    assert_eq!(candidate.word, "pear");
    assert_eq!(harness.dictionary.lookups(), vec!["apple", "pear"]);
    assert!(harness.channel.sent().is_empty());
}

#[tokio::test]
async fn normalizes_source_tokens() {
    let harness = Harness::new(&["  Dog "], &["dog"]);

    let candidate = harness.pipeline().source(1).await.unwrap();
    assert_eq!(candidate.word, "dog");
}

#[tokio::test]
async fn terminates_after_long_run_of_invalid_words() {
    let harness = Harness::new(&[], &["dog"]);
    for i in 0..500 {
        match i % 4 {
            0 => harness.words.push_empty(),
            1 => harness.words.push("fall in love"),
            2 => harness.words.push("x1"),
            _ => harness.words.push("unknownword"),
        }
    }
    harness.words.push("dog");

    let valid = harness.pipeline().find_valid_word(1).await.unwrap();

    assert_eq!(valid.word, "dog");
    assert_eq!(harness.words.calls(), 501);
}

#[tokio::test]
async fn source_transport_failure_reaches_caller() {
    // Script is empty: the source errors on first call
    let harness = Harness::new(&[], &[]);

    let err = harness.pipeline().source(1).await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn enrichment_failure_leaves_word_unrecorded() {
    let harness = Harness::new(&["dog"], &["dog"]);
    harness.translator.fail.store(true, Ordering::SeqCst);

    let err = harness.pipeline().source(42).await.unwrap_err();

    match err {
        Error::Enrichment { word, .. } => assert_eq!(word, "dog"),
        other => panic!("expected enrichment failure, got {other:?}"),
    }
    assert!(!harness.lexicon.is_seen(42, "dog").unwrap());
    assert!(harness.lexicon.list_learned(42).unwrap().is_empty());
}

#[tokio::test]
async fn image_failure_is_enrichment_failure() {
    let harness = Harness::new(&["dog"], &["dog"]);
    harness.images.fail.store(true, Ordering::SeqCst);

    let err = harness.pipeline().source(42).await.unwrap_err();
    assert!(matches!(err, Error::Enrichment { .. }));
}

#[tokio::test]
async fn dedup_is_per_chat() {
    let harness = Harness::new(&["dog"], &["dog"]);
    let candidate = harness.pipeline().source(1).await.unwrap();
    harness.lexicon.commit_learned(1, &candidate).unwrap();

    // Another chat may still be offered the same word
    harness.words.push("dog");
    let other = harness.pipeline().source(2).await.unwrap();
    assert_eq!(other.word, "dog");
}
