/*!
 * End-to-end translation pipeline tests
 *
 * These drive TranslationService with mock providers and assert the
 * contract of the public entry point: usable subtitle text out, no matter
 * what the model does.
 */

use std::sync::Arc;
use std::time::Duration;

use sublate::app_config::TranslationConfig;
use sublate::providers::CompletionRequest;
use sublate::providers::mock::MockProvider;
use sublate::subtitle_processor::SubtitleDocument;
use sublate::translation::{SEGMENT_MARKER, TranslationCache, TranslationService};

use crate::common::{self, ManualClock};

const HELLO_VTT: &str = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:05.000\nHello";

fn service_with(mock: MockProvider) -> (TranslationService, MockProvider) {
    let counter_handle = mock.clone();
    let service = TranslationService::with_provider(TranslationConfig::default(), Arc::new(mock));
    (service, counter_handle)
}

/// Translate each segment by tagging it, keeping marker alignment intact
fn tagging_responder(request: &CompletionRequest) -> String {
    request
        .prompt
        .split(SEGMENT_MARKER)
        .map(|segment| format!("{} (translated)", segment.trim()))
        .collect::<Vec<_>>()
        .join(&format!("\n{}\n", SEGMENT_MARKER))
}

/// Garble the batch containing cue eleven, translate everything else
fn selective_responder(request: &CompletionRequest) -> String {
    if request.prompt.contains("Line number 11") {
        "nonsense".to_string()
    } else {
        tagging_responder(request)
    }
}

#[tokio::test]
async fn test_translate_withSingleCueVtt_shouldMatchExpectedOutput() {
    common::init_test_logging();

    let mock = MockProvider::working().with_custom_response(|_| "Γεια".to_string());
    let (service, _) = service_with(mock);

    let translated = service.translate_document(HELLO_VTT, "en", "el").await;

    assert_eq!(
        translated,
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:05.000\nΓεια\n\n"
    );
}

#[tokio::test]
async fn test_translate_withThrowingModel_shouldReturnInputVerbatim() {
    let (service, _) = service_with(MockProvider::failing());

    let translated = service.translate_document(HELLO_VTT, "en", "el").await;

    assert_eq!(translated, HELLO_VTT);
    // A failed translation must never be written to the cache
    assert!(service.cache.is_empty());
}

#[tokio::test]
async fn test_translate_withIdenticalRequests_shouldInvokeModelAtMostOnce() {
    let (service, counter) = service_with(MockProvider::working());
    let content = common::sample_srt();

    let first = service.translate_document(content, "en", "el").await;
    let second = service.translate_document(content, "en", "el").await;

    assert_eq!(first, second);
    assert_eq!(counter.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withExpiredCacheEntry_shouldInvokeModelAgain() {
    let clock = ManualClock::new();
    let cache = TranslationCache::with_clock(true, Duration::from_secs(24 * 60 * 60), clock.clone());

    let mock = MockProvider::working();
    let counter = mock.clone();
    let service = TranslationService::with_provider_and_cache(
        TranslationConfig::default(),
        Arc::new(mock),
        cache,
    );

    let content = common::sample_srt();
    let _ = service.translate_document(content, "en", "el").await;
    clock.advance(Duration::from_secs(25 * 60 * 60));
    let _ = service.translate_document(content, "en", "el").await;

    assert_eq!(counter.request_count(), 2);
}

#[tokio::test]
async fn test_translate_shouldPreserveCueCountOrderAndTiming() {
    let mock = MockProvider::working().with_custom_response(tagging_responder);
    let (service, _) = service_with(mock);

    let content = common::numbered_srt(15);
    let translated = service.translate_document(&content, "en", "el").await;

    let source = SubtitleDocument::parse(&content, None).unwrap();
    let result = SubtitleDocument::parse(&translated, None).unwrap();

    assert_eq!(result.len(), source.len());
    for (before, after) in source.entries.iter().zip(&result.entries) {
        assert_eq!(before.start_time_ms, after.start_time_ms);
        assert_eq!(before.end_time_ms, after.end_time_ms);
        assert_eq!(after.text, format!("{} (translated)", before.text));
    }
}

#[tokio::test]
async fn test_translate_withOneGarbledBatch_shouldFallBackForThatBatchOnly() {
    let mock = MockProvider::working().with_custom_response(selective_responder);
    let (service, _) = service_with(mock);

    // 15 cues split into batches of 10 and 5; the second batch is garbled
    let content = common::numbered_srt(15);
    let translated = service.translate_document(&content, "en", "el").await;
    let result = SubtitleDocument::parse(&translated, None).unwrap();

    assert_eq!(result.len(), 15);
    for (i, entry) in result.entries.iter().enumerate() {
        if i < 10 {
            assert_eq!(entry.text, format!("Line number {} (translated)", i + 1));
        } else {
            assert_eq!(entry.text, format!("Line number {}", i + 1));
        }
    }
}

#[tokio::test]
async fn test_translate_withMalformedInput_shouldReturnInputUnchanged() {
    let (service, counter) = service_with(MockProvider::working());

    for garbage in ["", "\u{0}\u{1}\u{2} binary garbage", "a single line, no timing"] {
        let translated = service.translate_document(garbage, "en", "el").await;
        assert_eq!(translated, garbage);
    }

    // Nothing decodable means the model is never consulted and nothing is
    // cached
    assert_eq!(counter.request_count(), 0);
    assert!(service.cache.is_empty());
}

#[tokio::test]
async fn test_translate_withDifferentTargetLanguages_shouldNotShareCacheEntries() {
    let (service, counter) = service_with(MockProvider::working());
    let content = common::sample_srt();

    let _ = service.translate_document(content, "en", "el").await;
    let _ = service.translate_document(content, "en", "de").await;

    assert_eq!(counter.request_count(), 2);
    assert_eq!(service.cache.len(), 2);
}

#[tokio::test]
async fn test_translate_withSrtInput_shouldKeepSrtFormat() {
    let (service, _) = service_with(MockProvider::working());

    let translated = service
        .translate_document(common::sample_srt(), "en", "el")
        .await;

    assert!(!translated.contains("WEBVTT"));
    assert_eq!(
        SubtitleDocument::detect_format(&translated),
        sublate::subtitle_processor::SubtitleFormat::Srt
    );
}
