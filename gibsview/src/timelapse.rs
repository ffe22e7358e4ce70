//! Time-lapse playback: a fixed number of daily frames stepping backward
//! from a start date.
//!
//! The animation runs for a fixed total duration at a fixed interval and
//! then self-cancels; the frame count is simply `duration / interval`. The
//! modules here only compute the frame dates, sleeping between frames is the
//! caller's business.

use std::time::Duration;

use chrono::NaiveDate;

/// Playback timing of a time-lapse run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timelapse {
    /// Delay between consecutive frames.
    pub interval: Duration,
    /// Total running time; playback stops once it is used up.
    pub duration: Duration,
}

impl Timelapse {
    #[must_use]
    pub fn new(interval: Duration, duration: Duration) -> Self {
        Self { interval, duration }
    }

    /// How many frames fit into the total duration. A zero interval yields
    /// no frames rather than an endless animation.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        if self.interval.is_zero() {
            return 0;
        }
        usize::try_from(self.duration.as_millis() / self.interval.as_millis()).unwrap_or(usize::MAX)
    }

    /// The frame dates, one calendar day backward per frame starting at
    /// `from`.
    #[must_use]
    pub fn frames(&self, from: NaiveDate) -> Frames {
        Frames {
            next: Some(from),
            remaining: self.frame_count(),
        }
    }
}

impl Default for Timelapse {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            duration: Duration::from_secs(10),
        }
    }
}

/// Iterator over the dates of a time-lapse run, newest first.
#[derive(Clone, Debug)]
pub struct Frames {
    next: Option<NaiveDate>,
    remaining: usize,
}

impl Iterator for Frames {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = current.pred_opt();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Frames {}
