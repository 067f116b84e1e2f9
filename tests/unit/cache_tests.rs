/*!
 * Tests for translation cache functionality
 */

use std::time::Duration;

use sublate::translation::TranslationCache;

use crate::common::ManualClock;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[test]
fn test_key_withIdenticalInputs_shouldBeStable() {
    let a = TranslationCache::key("WEBVTT\n\ncontent", "en", "el");
    let b = TranslationCache::key("WEBVTT\n\ncontent", "en", "el");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
}

#[test]
fn test_key_withDifferentContentOrLanguages_shouldDiffer() {
    let base = TranslationCache::key("content", "en", "el");

    assert_ne!(base, TranslationCache::key("content!", "en", "el"));
    assert_ne!(base, TranslationCache::key("content", "fr", "el"));
    assert_ne!(base, TranslationCache::key("content", "en", "de"));
}

#[test]
fn test_cache_put_withEnabledCache_shouldStoreDocument() {
    let cache = TranslationCache::new(true);
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    assert_eq!(cache.get(&key), Some("bonjour".to_string()));
}

#[test]
fn test_cache_get_withMissingKey_shouldReturnNone() {
    let cache = TranslationCache::new(true);
    assert!(cache.get("nonexistent").is_none());
}

#[test]
fn test_cache_withDisabled_shouldBePassThroughMiss() {
    let cache = TranslationCache::new(false);
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    assert!(cache.get(&key).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_cache_put_withSameKey_shouldOverwrite() {
    let cache = TranslationCache::new(true);
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    cache.put(&key, "salut");
    assert_eq!(cache.get(&key), Some("salut".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_clone_shouldShareStorage() {
    let cache1 = TranslationCache::new(true);
    let cache2 = cache1.clone();
    let key = TranslationCache::key("hello", "en", "fr");

    cache1.put(&key, "bonjour");
    assert_eq!(cache2.get(&key), Some("bonjour".to_string()));
}

#[test]
fn test_cache_get_withEntryInsideTtl_shouldHit() {
    let clock = ManualClock::new();
    let cache = TranslationCache::with_clock(true, DAY, clock.clone());
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    clock.advance(DAY - Duration::from_secs(1));

    assert_eq!(cache.get(&key), Some("bonjour".to_string()));
}

#[test]
fn test_cache_get_withExpiredEntry_shouldMissAndEvict() {
    let clock = ManualClock::new();
    let cache = TranslationCache::with_clock(true, DAY, clock.clone());
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    clock.advance(DAY + Duration::from_secs(1));

    assert!(cache.get(&key).is_none());
    // Lazy eviction removed the stale entry on lookup
    assert!(cache.is_empty());
}

#[test]
fn test_cache_put_afterExpiry_shouldRestartTtl() {
    let clock = ManualClock::new();
    let cache = TranslationCache::with_clock(true, DAY, clock.clone());
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    clock.advance(DAY * 2);
    assert!(cache.get(&key).is_none());

    cache.put(&key, "salut");
    clock.advance(Duration::from_secs(3600));
    assert_eq!(cache.get(&key), Some("salut".to_string()));
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let cache = TranslationCache::new(true);
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    let _ = cache.get(&key);
    let _ = cache.get("missing");

    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 1);
    assert_eq!(misses, 1);
    assert!((hit_rate - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_cache_clear_shouldDropEntriesAndCounters() {
    let cache = TranslationCache::new(true);
    let key = TranslationCache::key("hello", "en", "fr");

    cache.put(&key, "bonjour");
    let _ = cache.get(&key);
    cache.clear();

    assert!(cache.is_empty());
    let (hits, misses, _) = cache.stats();
    assert_eq!(hits + misses, 0);
}

#[test]
fn test_cache_withUnicodeContent_shouldHandleCorrectly() {
    let cache = TranslationCache::new(true);
    let key = TranslationCache::key("こんにちは", "ja", "el");

    cache.put(&key, "Γεια σας 你好");
    assert_eq!(cache.get(&key), Some("Γεια σας 你好".to_string()));
}
