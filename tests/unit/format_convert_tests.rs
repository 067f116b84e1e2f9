/*!
 * Tests for the SRT <-> WebVTT format bridge
 */

use sublate::format_convert;
use sublate::subtitle_processor::{SubtitleDocument, SubtitleFormat};

use crate::common;

#[test]
fn test_convert_withSrtInput_shouldProduceVtt() {
    let converted = format_convert::convert_to_other(common::sample_srt()).unwrap();

    assert!(converted.starts_with("WEBVTT\n\n"));
    assert!(converted.contains("00:00:01.000 --> 00:00:04.000"));
    assert!(!converted.contains("00:00:01,000"));

    let document = SubtitleDocument::parse(&converted, None).unwrap();
    assert_eq!(document.format, SubtitleFormat::Vtt);
    assert_eq!(document.len(), 3);
}

#[test]
fn test_convert_withVttInput_shouldProduceSrt() {
    let converted = format_convert::convert_to_other(common::sample_vtt()).unwrap();

    assert!(!converted.contains("WEBVTT"));
    assert!(converted.contains("00:00:01,000 --> 00:00:04,000"));

    let document = SubtitleDocument::parse(&converted, None).unwrap();
    assert_eq!(document.format, SubtitleFormat::Srt);
    assert_eq!(document.len(), 3);
}

#[test]
fn test_convert_withNoteBlocks_shouldStripThemFromSrt() {
    let content = "WEBVTT\n\n\
                   NOTE This comment must not survive conversion\n\n\
                   1\n\
                   00:00:01.000 --> 00:00:02.000\n\
                   Dialog\n\n";

    let converted = format_convert::convert_to_other(content).unwrap();
    assert!(!converted.contains("NOTE"));
    assert!(converted.contains("Dialog"));
}

#[test]
fn test_convert_thereAndBackAgain_shouldReproduceOriginalText() {
    // VTT -> SRT -> VTT reproduces timestamps and text exactly
    let srt = format_convert::convert_to_other(common::sample_vtt()).unwrap();
    let vtt = format_convert::convert_to_other(&srt).unwrap();

    assert_eq!(vtt, common::sample_vtt());
}

#[test]
fn test_convert_thereAndBackAgain_shouldPreserveMilliseconds() {
    let content = "1\n\
                   00:12:34,567 --> 00:12:36,789\n\
                   Precise timing\n\n";

    let vtt = format_convert::convert_to_other(content).unwrap();
    assert!(vtt.contains("00:12:34.567 --> 00:12:36.789"));

    let back = format_convert::convert_to_other(&vtt).unwrap();
    assert_eq!(back, content);
}

#[test]
fn test_convert_withUnparseableInput_shouldFail() {
    assert!(format_convert::convert_to_other("no cues here").is_err());
}

#[test]
fn test_to_vtt_withVttInput_shouldNormalize() {
    let vtt = format_convert::to_vtt(common::sample_vtt()).unwrap();
    assert_eq!(vtt, common::sample_vtt());
}

#[test]
fn test_to_srt_withSrtInput_shouldNormalize() {
    let srt = format_convert::to_srt(common::sample_srt()).unwrap();
    assert_eq!(srt, common::sample_srt());
}
