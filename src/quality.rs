//! Bitrate classification and human-readable size/duration labels.

/// Map a variant bitrate to the label shown in the quality picker.
/// A bitrate of 0 means the upstream did not report one.
pub fn label_for_bitrate(bitrate: u64) -> &'static str {
    if bitrate == 0 {
        "Unknown"
    } else if bitrate >= 2_000_000 {
        "1080p"
    } else if bitrate >= 1_000_000 {
        "720p"
    } else if bitrate >= 500_000 {
        "480p"
    } else if bitrate >= 250_000 {
        "360p"
    } else {
        "Low"
    }
}

/// Estimate the size of a 10-second clip at the given bitrate.
pub fn estimated_size_label(bitrate: u64) -> String {
    let bytes = bitrate * 10 / 8;
    if bytes >= 1_000_000 {
        format!("~{:.1} MB/10s", bytes as f64 / 1_000_000.0)
    } else {
        format!("~{} KB/10s", bytes / 1000)
    }
}

/// Format a millisecond duration as `M:SS`.
pub fn format_duration(millis: u64) -> String {
    let seconds = millis / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds() {
        assert_eq!(label_for_bitrate(0), "Unknown");
        assert_eq!(label_for_bitrate(1), "Low");
        assert_eq!(label_for_bitrate(249_999), "Low");
        assert_eq!(label_for_bitrate(250_000), "360p");
        assert_eq!(label_for_bitrate(499_999), "360p");
        assert_eq!(label_for_bitrate(500_000), "480p");
        assert_eq!(label_for_bitrate(999_999), "480p");
        assert_eq!(label_for_bitrate(1_000_000), "720p");
        assert_eq!(label_for_bitrate(1_999_999), "720p");
        assert_eq!(label_for_bitrate(2_000_000), "1080p");
        assert_eq!(label_for_bitrate(u64::MAX / 16), "1080p");
    }

    #[test]
    fn label_is_monotonic() {
        let order = ["Unknown", "Low", "360p", "480p", "720p", "1080p"];
        let rank = |label: &str| order.iter().position(|l| *l == label).unwrap();

        let mut previous = 0;
        for bitrate in [0, 1, 250_000, 500_000, 1_000_000, 2_000_000, 50_000_000] {
            let current = rank(label_for_bitrate(bitrate));
            assert!(current >= previous, "label rank dropped at {bitrate}");
            previous = current;
        }
    }

    #[test]
    fn size_labels() {
        assert_eq!(estimated_size_label(8_000_000), "~10.0 MB/10s");
        assert_eq!(estimated_size_label(400_000), "~500 KB/10s");
        assert_eq!(estimated_size_label(832_000), "~1.0 MB/10s");
        assert_eq!(estimated_size_label(0), "~0 KB/10s");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(999), "0:00");
        assert_eq!(format_duration(4_500), "0:04");
        assert_eq!(format_duration(83_000), "1:23");
        assert_eq!(format_duration(3_605_000), "60:05");
    }
}
