/*!
 * Bidirectional conversion between the two supported subtitle syntaxes.
 *
 * Conversion goes through the cue codec, so the millisecond separator flips,
 * the WebVTT banner appears or disappears, and annotation blocks are
 * stripped when leaving VTT. Cue order and text survive untouched.
 */

use crate::errors::SubtitleError;
use crate::subtitle_processor::{SubtitleDocument, SubtitleFormat};

/// Rewrite subtitle text into the counterpart format
pub fn convert_to_other(content: &str) -> Result<String, SubtitleError> {
    let document = SubtitleDocument::parse(content, None)?;
    let target = document.format.other();
    Ok(document.render_as(target))
}

/// Rewrite subtitle text as WebVTT, normalizing it if it already is
pub fn to_vtt(content: &str) -> Result<String, SubtitleError> {
    let document = SubtitleDocument::parse(content, None)?;
    Ok(document.render_as(SubtitleFormat::Vtt))
}

/// Rewrite subtitle text as SubRip, normalizing it if it already is
pub fn to_srt(content: &str) -> Result<String, SubtitleError> {
    let document = SubtitleDocument::parse(content, None)?;
    Ok(document.render_as(SubtitleFormat::Srt))
}
