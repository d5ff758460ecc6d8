use serde::{Deserialize, Serialize};
use std::fmt;

/// A driving-time cutoff in seconds, naming one isochrone request
///
/// The configured set of thresholds is fixed for the duration of a run
/// (default 900/1800/2700 seconds, i.e. 15/30/45 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeThreshold(pub u32);

impl TimeThreshold {
    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn minutes(&self) -> u32 {
        self.0 / 60
    }
}

impl From<u32> for TimeThreshold {
    fn from(seconds: u32) -> Self {
        Self(seconds)
    }
}

impl fmt::Display for TimeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_minutes() {
        assert_eq!(TimeThreshold(900).minutes(), 15);
        assert_eq!(TimeThreshold(2700).minutes(), 45);
        assert_eq!(TimeThreshold(900).to_string(), "15 min");
    }

    #[test]
    fn test_threshold_ordering() {
        let mut thresholds = vec![TimeThreshold(2700), TimeThreshold(900), TimeThreshold(1800)];
        thresholds.sort();
        assert_eq!(thresholds, vec![TimeThreshold(900), TimeThreshold(1800), TimeThreshold(2700)]);
    }
}
