use chrono::{Duration, NaiveDateTime};

/// Flag burst members in a timestamp sequence sorted ascending.
///
/// An entry is part of a burst when the gap to its predecessor is strictly
/// below `threshold`, or the gap to its successor is, so both endpoints of a
/// close pair are flagged. The first entry has no predecessor and the last no
/// successor.
pub fn flag_bursts(times: &[NaiveDateTime], threshold: Duration) -> Vec<bool> {
    let close: Vec<bool> = times
        .windows(2)
        .map(|w| w[1] - w[0] < threshold)
        .collect();

    (0..times.len())
        .map(|i| {
            let close_to_prev = i > 0 && close[i - 1];
            let close_to_next = i < close.len() && close[i];
            close_to_prev || close_to_next
        })
        .collect()
}

/// Result of a burst-tagging pass.
#[derive(Debug, Clone)]
pub struct BurstReport {
    /// Images with a usable modification time.
    pub examined: usize,
    /// Image ids flagged as burst members.
    pub flagged: Vec<i64>,
    /// Tag links newly created (0 on a dry run; re-tagging is idempotent).
    pub tagged: usize,
}
