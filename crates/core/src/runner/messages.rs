//! User-facing message texts.

use crate::gate::{AdmissionRejected, RateScope};
use crate::job::{CompressionSummary, JobError, MediaKind};
use crate::preset::PresetProfile;
use crate::transcoder::EncodeMode;

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count with two decimals, e.g. `1.50 MB`.
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

fn kind_title(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Audio => "Audio",
        MediaKind::Video => "Video",
    }
}

/// Sent when a job starts running.
pub fn processing(kind: MediaKind, file_name: &str, size_bytes: u64, requested_preset: &str) -> String {
    format!(
        "Processing {}: {}\nSize: {}\nQuality: {}\nPlease wait...",
        kind, file_name, format_file_size(size_bytes), requested_preset
    )
}

/// Caption delivered with the compressed file.
pub fn result(kind: MediaKind, profile: &PresetProfile, summary: &CompressionSummary, mode: EncodeMode) -> String {
    let mut text = match mode {
        EncodeMode::Encoded => format!("{} compressed successfully!\n\n", kind_title(kind)),
        EncodeMode::PassthroughCopy => format!(
            "{} returned without compression (encoder unavailable).\n\n",
            kind_title(kind)
        ),
    };
    text.push_str(&format!(
        "Original: {}\nCompressed: {}\nSpace saved: {} ({:.1}%)\n\nQuality: {} ({})",
        format_file_size(summary.original_size),
        format_file_size(summary.compressed_size),
        format_file_size(summary.space_saved),
        summary.ratio_percent,
        profile.level.title(),
        profile.describe(),
    ));
    text
}

/// Sent when a job fails or is cancelled.
pub fn failure(error: &JobError) -> String {
    format!("Could not process your file.\n{}", error.user_message())
}

/// Sent when a file is turned away at admission.
pub fn rejection(rejected: &AdmissionRejected) -> String {
    match rejected {
        AdmissionRejected::TooLarge {
            kind,
            size_bytes,
            max_bytes,
        } => format!(
            "File too large!\nMax {} size: {}\nYour file: {}",
            kind,
            format_file_size(*max_bytes),
            format_file_size(*size_bytes)
        ),
        AdmissionRejected::TooSmall {
            size_bytes,
            min_bytes,
        } => format!(
            "File too small!\nMinimum size: {}\nYour file: {}",
            format_file_size(*min_bytes),
            format_file_size(*size_bytes)
        ),
        AdmissionRejected::RateLimited { scope, limit, .. } => {
            let period = match scope {
                RateScope::Hourly => "hour",
                RateScope::Daily => "day",
            };
            format!(
                "Limit reached: {} files per {}.\nPlease try again later.",
                limit, period
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{PresetLevel, PresetTable};
    use crate::transcoder::TranscodeError;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048.00 GB");
    }

    #[test]
    fn test_result_text() {
        let profile = PresetTable::builtin()
            .get(MediaKind::Audio, PresetLevel::High)
            .unwrap()
            .clone();
        let summary = CompressionSummary::new(1_000_000, 250_000);
        let text = result(MediaKind::Audio, &profile, &summary, EncodeMode::Encoded);

        assert!(text.starts_with("Audio compressed successfully!"));
        assert!(text.contains("(75.0%)"));
        assert!(text.contains("Quality: High (96kbps, Stereo)"));
    }

    #[test]
    fn test_passthrough_result_is_explicit() {
        let profile = PresetTable::builtin()
            .get(MediaKind::Audio, PresetLevel::Low)
            .unwrap()
            .clone();
        let summary = CompressionSummary::new(1000, 1000);
        let text = result(MediaKind::Audio, &profile, &summary, EncodeMode::PassthroughCopy);
        assert!(text.contains("without compression"));
    }

    #[test]
    fn test_rejection_text() {
        let text = rejection(&AdmissionRejected::TooLarge {
            kind: MediaKind::Video,
            size_bytes: 1000 * 1024 * 1024,
            max_bytes: 900 * 1024 * 1024,
        });
        assert!(text.contains("Max video size: 900.00 MB"));

        let text = rejection(&AdmissionRejected::RateLimited {
            scope: RateScope::Hourly,
            count: 10,
            limit: 10,
        });
        assert!(text.contains("10 files per hour"));
    }

    #[test]
    fn test_failure_hides_diagnostics() {
        let err = JobError::from(TranscodeError::NonZeroExit {
            code: Some(1),
            diagnostics: "moov atom not found".to_string(),
        });
        let text = failure(&err);
        assert!(!text.contains("moov"));
    }
}
