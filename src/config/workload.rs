//! Experiment selector types shared by the CLI and the config file

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which random byte generator backs an experiment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Operating system CSPRNG
    Secure,
    /// Seeded xoshiro256++
    Pseudo,
}

impl Default for SourceKind {
    fn default() -> Self {
        Self::Secure
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secure => write!(f, "secure"),
            Self::Pseudo => write!(f, "pseudo"),
        }
    }
}

/// How random tokens reach the parallel consumers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FeedStrategy {
    /// Each consumer reads its own 16 bytes from the OS generator
    Baseline,
    /// One feeder thread, one bounded channel
    Channel,
    /// Each consumer slices 16 bytes out of its own 256-byte block
    Amortized,
    /// One amortized feeder thread, one bounded channel
    ChannelAmortized,
    /// Many feeders, one channel each; consumers rotate between them
    RoundRobin,
    /// Many feeders sharing one channel
    ManyWriters,
    /// Many amortized feeders sharing one channel
    AmortizedManyWriters,
}

impl FeedStrategy {
    pub const ALL: [FeedStrategy; 7] = [
        Self::Baseline,
        Self::Channel,
        Self::Amortized,
        Self::ChannelAmortized,
        Self::RoundRobin,
        Self::ManyWriters,
        Self::AmortizedManyWriters,
    ];

    /// True if tokens are produced by dedicated feeder threads
    pub fn uses_feeders(self) -> bool {
        !matches!(self, Self::Baseline | Self::Amortized)
    }

    /// True if token bytes come out of a 256-byte amortized block
    pub fn is_amortized(self) -> bool {
        matches!(
            self,
            Self::Amortized | Self::ChannelAmortized | Self::AmortizedManyWriters
        )
    }
}

impl fmt::Display for FeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Baseline => "baseline",
            Self::Channel => "channel",
            Self::Amortized => "amortized",
            Self::ChannelAmortized => "channel-amortized",
            Self::RoundRobin => "round-robin",
            Self::ManyWriters => "many-writers",
            Self::AmortizedManyWriters => "amortized-many-writers",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feeder_strategies() {
        let feeders: Vec<_> = FeedStrategy::ALL.iter().filter(|s| s.uses_feeders()).collect();
        assert_eq!(feeders.len(), 5);
        assert!(!FeedStrategy::Baseline.uses_feeders());
        assert!(FeedStrategy::AmortizedManyWriters.is_amortized());
        assert!(!FeedStrategy::RoundRobin.is_amortized());
    }

    #[test]
    fn test_display_matches_serde_names() {
        for strategy in FeedStrategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy));
        }
        assert_eq!(serde_json::to_string(&SourceKind::Pseudo).unwrap(), "\"pseudo\"");
    }
}
