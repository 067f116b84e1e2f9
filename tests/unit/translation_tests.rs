/*!
 * Tests for batch partitioning and model-output reconciliation
 */

use std::sync::Arc;

use sublate::providers::mock::MockProvider;
use sublate::subtitle_processor::SubtitleEntry;
use sublate::translation::batch::{
    BATCH_SIZE, BatchTranslator, SEGMENT_MARKER, split_model_output,
};

fn entries(count: usize) -> Vec<SubtitleEntry> {
    (0..count)
        .map(|i| {
            SubtitleEntry::new(
                i + 1,
                (i as u64) * 2000,
                (i as u64) * 2000 + 1500,
                format!("Cue text {}", i + 1),
            )
        })
        .collect()
}

fn joined(texts: &[&str]) -> String {
    texts.join(&format!("\n{}\n", SEGMENT_MARKER))
}

#[test]
fn test_split_withMatchingMarkerCount_shouldAlignOneToOne() {
    let output = joined(&["uno", "dos", "tres"]);

    let segments = split_model_output(&output, 3).unwrap();
    assert_eq!(segments, vec!["uno", "dos", "tres"]);
}

#[test]
fn test_split_withSloppyMarkerSpacing_shouldStillAlign() {
    let output = format!("uno {m}dos{m}  tres ", m = SEGMENT_MARKER);

    let segments = split_model_output(&output, 3).unwrap();
    assert_eq!(segments, vec!["uno", "dos", "tres"]);
}

#[test]
fn test_split_withMissingMarkers_shouldFallBackToNewlines() {
    let output = "uno\ndos\ntres\n";

    let segments = split_model_output(output, 3).unwrap();
    assert_eq!(segments, vec!["uno", "dos", "tres"]);
}

#[test]
fn test_split_withExtraNewlineSegments_shouldTakeFirstN() {
    let output = "uno\ndos\ntres\ncuatro\ncinco";

    let segments = split_model_output(output, 3).unwrap();
    assert_eq!(segments, vec!["uno", "dos", "tres"]);
}

#[test]
fn test_split_withTooFewSegments_shouldReturnNone() {
    assert!(split_model_output("uno\ndos", 3).is_none());
    assert!(split_model_output("", 3).is_none());
    assert!(split_model_output("nonsense", 2).is_none());
}

#[test]
fn test_split_withEmptyMarkerSegment_shouldNotAcceptBlankText() {
    // Marker count matches but one segment is blank; the newline fallback
    // cannot reach three lines either, so the batch keeps its original text
    let output = joined(&["uno", "", "tres"]);
    assert!(split_model_output(&output, 3).is_none());
}

#[test]
fn test_batch_size_isTenCues() {
    assert_eq!(BATCH_SIZE, 10);
}

#[tokio::test]
async fn test_translate_batches_withWorkingProvider_shouldKeepOrderAndCounts() {
    let cues = entries(12);
    let batches: Vec<&[SubtitleEntry]> = cues.chunks(BATCH_SIZE).collect();
    assert_eq!(batches.len(), 2);

    let translator = BatchTranslator::new(Arc::new(MockProvider::working()), 2, 0.2, 4096);
    let outcomes = translator
        .translate_batches(&batches, "English", "Greek", |_, _| {})
        .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].texts.len(), 10);
    assert_eq!(outcomes[1].texts.len(), 2);
    assert!(!outcomes[0].hard_failure);

    // The echo provider hands every cue its own text back, in order
    let all_texts: Vec<&str> = outcomes
        .iter()
        .flat_map(|o| o.texts.iter().map(String::as_str))
        .collect();
    for (i, text) in all_texts.iter().enumerate() {
        assert_eq!(*text, format!("Cue text {}", i + 1));
    }
}

#[tokio::test]
async fn test_translate_batches_withFailingProvider_shouldKeepOriginalsAndFlag() {
    let cues = entries(5);
    let batches: Vec<&[SubtitleEntry]> = cues.chunks(BATCH_SIZE).collect();

    let translator = BatchTranslator::new(Arc::new(MockProvider::failing()), 2, 0.2, 4096);
    let outcomes = translator
        .translate_batches(&batches, "English", "Greek", |_, _| {})
        .await;

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].hard_failure);
    assert_eq!(outcomes[0].texts, vec![
        "Cue text 1", "Cue text 2", "Cue text 3", "Cue text 4", "Cue text 5",
    ]);
}

#[tokio::test]
async fn test_translate_batches_withMismatchedProvider_shouldKeepOriginalsWithoutFlag() {
    let cues = entries(3);
    let batches: Vec<&[SubtitleEntry]> = cues.chunks(BATCH_SIZE).collect();

    let translator = BatchTranslator::new(Arc::new(MockProvider::mismatched()), 1, 0.2, 4096);
    let outcomes = translator
        .translate_batches(&batches, "English", "Greek", |_, _| {})
        .await;

    // Alignment failure is a degraded outcome, not a hard failure
    assert!(!outcomes[0].hard_failure);
    assert_eq!(outcomes[0].texts, vec!["Cue text 1", "Cue text 2", "Cue text 3"]);
}

#[tokio::test]
async fn test_translate_batches_shouldReportProgress() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let cues = entries(25);
    let batches: Vec<&[SubtitleEntry]> = cues.chunks(BATCH_SIZE).collect();
    assert_eq!(batches.len(), 3);

    let seen = Arc::new(AtomicUsize::new(0));
    let seen_in_callback = seen.clone();

    let translator = BatchTranslator::new(Arc::new(MockProvider::working()), 2, 0.2, 4096);
    let _ = translator
        .translate_batches(&batches, "English", "Greek", move |done, total| {
            assert_eq!(total, 3);
            seen_in_callback.fetch_max(done, Ordering::SeqCst);
        })
        .await;

    assert_eq!(seen.load(Ordering::SeqCst), 3);
}
