// ABOUTME: Consensus timestamp parsing for record-stream lookups.
// ABOUTME: Accepts seconds.nanos or seconds-nanos and reduces them to milliseconds.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid timestamp string. Accepted formats are: 0000000000.000000000 and 0000000000-000000000"
)]
pub struct InvalidTimestamp;

/// A consensus timestamp of exactly ten second digits and nine nanosecond
/// digits, separated by `.` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConsensusTimestamp {
    seconds: u64,
    nanos: u32,
}

impl ConsensusTimestamp {
    /// Milliseconds since the epoch: the first 13 digits of the joined
    /// seconds and nanoseconds.
    pub fn as_millis(&self) -> i64 {
        (self.seconds as i64) * 1000 + i64::from(self.nanos / 1_000_000)
    }
}

impl FromStr for ConsensusTimestamp {
    type Err = InvalidTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 20 || !matches!(bytes[10], b'.' | b'-') {
            return Err(InvalidTimestamp);
        }
        let (seconds, nanos) = (&s[..10], &s[11..]);
        if !seconds.bytes().chain(nanos.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(InvalidTimestamp);
        }
        Ok(Self {
            seconds: seconds.parse().map_err(|_| InvalidTimestamp)?,
            nanos: nanos.parse().map_err(|_| InvalidTimestamp)?,
        })
    }
}

impl fmt::Display for ConsensusTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}.{:09}", self.seconds, self.nanos)
    }
}
