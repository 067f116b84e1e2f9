/*!
 * Batch translation processing.
 *
 * A document's cues are partitioned into fixed-size batches, each batch is
 * translated in a single model call, and the model output is reconciled
 * back onto the cues. Reconciliation is deliberately forgiving: an aligned
 * split on the segment marker, then a plain newline split, then keeping the
 * batch's original text. A misbehaving model can degrade one batch but
 * never break the document.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::stream::{self, StreamExt};
use log::{debug, warn};

use crate::providers::{CompletionRequest, Provider};
use crate::subtitle_processor::SubtitleEntry;

/// Number of cues translated per model call
pub const BATCH_SIZE: usize = 10;

/// Marker joined between batch segments in the prompt and expected back in
/// the model output. Chosen so it never occurs in ordinary subtitle text.
pub const SEGMENT_MARKER: &str = "<<<>>>";

/// Outcome of translating one batch
#[derive(Debug)]
pub struct BatchOutcome {
    /// One text per cue in the batch, translated or original
    pub texts: Vec<String>,

    /// Whether the model call itself failed (as opposed to a recoverable
    /// alignment mismatch)
    pub hard_failure: bool,
}

/// Batch translator for processing cue batches through a provider
pub struct BatchTranslator {
    /// The provider to send completions to
    provider: Arc<dyn Provider>,

    /// Maximum number of in-flight batch requests
    max_concurrent_batches: usize,

    /// Sampling temperature, kept low to favor determinism
    temperature: f32,

    /// Output-length ceiling per batch request
    max_tokens: u32,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(
        provider: Arc<dyn Provider>,
        max_concurrent_batches: usize,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            max_concurrent_batches: max_concurrent_batches.max(1),
            temperature,
            max_tokens,
        }
    }

    /// Translate all batches concurrently, preserving batch order
    ///
    /// Every outcome holds exactly as many texts as its batch holds cues;
    /// a batch whose model call failed keeps its original texts and is
    /// flagged as a hard failure.
    pub async fn translate_batches(
        &self,
        batches: &[&[SubtitleEntry]],
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Vec<BatchOutcome> {
        let total_batches = batches.len();
        let processed_batches = Arc::new(AtomicUsize::new(0));

        let mut results = stream::iter(batches.iter().enumerate())
            .map(|(batch_index, batch)| {
                let processed_batches = processed_batches.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    let start_time = Instant::now();
                    let outcome = self
                        .translate_batch(batch, source_language, target_language)
                        .await;
                    debug!(
                        "Batch {} of {} done in {:?}",
                        batch_index + 1,
                        total_batches,
                        start_time.elapsed()
                    );

                    let current = processed_batches.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_batches);

                    (batch_index, outcome)
                }
            })
            .buffer_unordered(self.max_concurrent_batches)
            .collect::<Vec<_>>()
            .await;

        // Restore original batch order after concurrent completion
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Translate a single batch of cues in one model call
    async fn translate_batch(
        &self,
        batch: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
    ) -> BatchOutcome {
        let originals: Vec<String> = batch.iter().map(|entry| entry.text.clone()).collect();
        if originals.is_empty() {
            return BatchOutcome {
                texts: originals,
                hard_failure: false,
            };
        }

        let prompt = originals.join(&format!("\n{}\n", SEGMENT_MARKER));
        let request = CompletionRequest::new(prompt)
            .system(translation_system_prompt(source_language, target_language))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        match self.provider.complete(request).await {
            Ok(output) => match split_model_output(&output, originals.len()) {
                Some(texts) => BatchOutcome {
                    texts,
                    hard_failure: false,
                },
                None => {
                    warn!(
                        "Could not align model output to {} cues, keeping original text for the batch",
                        originals.len()
                    );
                    BatchOutcome {
                        texts: originals,
                        hard_failure: false,
                    }
                }
            },
            Err(e) => {
                warn!(
                    "Model call failed for a batch of {} cues: {}; keeping original text",
                    originals.len(),
                    e
                );
                BatchOutcome {
                    texts: originals,
                    hard_failure: true,
                }
            }
        }
    }
}

/// System prompt sent with every batch request
fn translation_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional subtitle translator. Translate subtitle text from {source} to {target}.\n\
         The user message contains several segments separated by the marker {marker} on its own line.\n\
         Translate every segment, keep the segments in their original order, and reproduce the marker \
         between them exactly as given.\n\
         Keep translations natural and concise; subtitles have limited display time.\n\
         Return only the translated segments and markers, with no extra commentary.",
        source = source_language,
        target = target_language,
        marker = SEGMENT_MARKER,
    )
}

/// Reconcile raw model output with the expected segment count
///
/// Primary split is on the segment marker; when the counts disagree, a
/// secondary split on plain newlines is attempted and the first N non-empty
/// lines are taken if at least N exist. Anything else returns `None`,
/// meaning the caller must keep the batch's original text. Counts must
/// match exactly or exceed; there is no partial splicing.
pub fn split_model_output(output: &str, expected: usize) -> Option<Vec<String>> {
    let segments: Vec<String> = output
        .split(SEGMENT_MARKER)
        .map(|segment| segment.trim().to_string())
        .collect();

    if segments.len() == expected && segments.iter().all(|segment| !segment.is_empty()) {
        return Some(segments);
    }

    let lines: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != SEGMENT_MARKER)
        .map(String::from)
        .collect();

    if lines.len() >= expected {
        return Some(lines[..expected].to_vec());
    }

    None
}
