use crate::config::AdviceConfig;
use crate::models::AdviceBucket;

/// Maps a ratio to a bucket with half-open ranges:
/// `[0, low)` LOW, `[low, medium)` MEDIUM, `[medium, 100]` HIGH
pub fn classify(ratio: f64, advice: &AdviceConfig) -> AdviceBucket {
    if ratio < advice.low_below {
        AdviceBucket::Low
    } else if ratio < advice.medium_below {
        AdviceBucket::Medium
    } else {
        AdviceBucket::High
    }
}

pub fn advice_text(bucket: AdviceBucket, advice: &AdviceConfig) -> &str {
    match bucket {
        AdviceBucket::Low => &advice.low_text,
        AdviceBucket::Medium => &advice.medium_text,
        AdviceBucket::High => &advice.high_text,
    }
}
