//! Configuration validation

use super::*;
use anyhow::Result;

/// Largest dense verification range accepted
pub const MAX_RANGE_END: u64 = 1 << 32;

/// Largest read size for the speed test (64 MiB)
pub const MAX_CHUNK: usize = 64 * 1024 * 1024;

/// Largest secure payload length bound (16 MiB)
pub const MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_verify(&config.verify)?;
    validate_speed(&config.speed)?;
    validate_pipeline(&config.pipeline)?;
    validate_feed(&config.feed)?;

    Ok(())
}

/// Validate verification settings
pub fn validate_verify(verify: &VerifyConfig) -> Result<()> {
    if verify.range_end > MAX_RANGE_END {
        anyhow::bail!(
            "range_end must be at most 2^32 ({}), got {}",
            MAX_RANGE_END,
            verify.range_end
        );
    }

    Ok(())
}

/// Validate read throughput settings
pub fn validate_speed(speed: &SpeedConfig) -> Result<()> {
    if speed.seconds == 0 {
        anyhow::bail!("speed duration must be at least 1 second");
    }
    if speed.chunk == 0 {
        anyhow::bail!("chunk must be at least 1 byte");
    }
    if speed.chunk > MAX_CHUNK {
        anyhow::bail!("chunk must be at most 64 MiB ({}), got {}", MAX_CHUNK, speed.chunk);
    }

    Ok(())
}

/// Validate pipeline settings
pub fn validate_pipeline(pipeline: &PipelineConfig) -> Result<()> {
    if pipeline.producers == 0 {
        anyhow::bail!("producers must be at least 1");
    }
    if pipeline.max_len == 0 {
        anyhow::bail!("max_len must be at least 1");
    }
    if pipeline.max_len > MAX_PAYLOAD_LEN {
        anyhow::bail!(
            "max_len must be at most 16 MiB ({}), got {}",
            MAX_PAYLOAD_LEN,
            pipeline.max_len
        );
    }
    if pipeline.runs == 0 {
        anyhow::bail!("runs must be at least 1");
    }

    Ok(())
}

/// Validate token feeding settings
pub fn validate_feed(feed: &FeedConfig) -> Result<()> {
    if feed.threads == 0 {
        anyhow::bail!("threads must be at least 1");
    }
    if feed.capacity == 0 {
        anyhow::bail!("capacity must be at least 1");
    }
    if feed.strategies.is_empty() {
        anyhow::bail!("at least one feed strategy is required");
    }

    let needs_feeders = feed.strategies.iter().any(|s| {
        matches!(
            s,
            FeedStrategy::RoundRobin
                | FeedStrategy::ManyWriters
                | FeedStrategy::AmortizedManyWriters
        )
    });
    if needs_feeders && feed.feeders == 0 {
        anyhow::bail!("feeders must be at least 1 for many-writer and round-robin strategies");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_range_end_limit() {
        let mut config = Config::default();
        config.verify.range_end = MAX_RANGE_END;
        assert!(validate_config(&config).is_ok());

        config.verify.range_end = MAX_RANGE_END + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_pipeline_limits() {
        let mut config = Config::default();
        config.pipeline.max_len = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.pipeline.runs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_feeders_only_required_when_used() {
        let mut config = Config::default();
        config.feed.feeders = 0;
        assert!(validate_config(&config).is_err());

        config.feed.strategies = vec![FeedStrategy::Baseline, FeedStrategy::Channel];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_size_limits() {
        let mut config = Config::default();
        config.speed.chunk = MAX_CHUNK;
        config.pipeline.max_len = MAX_PAYLOAD_LEN;
        assert!(validate_config(&config).is_ok());

        config.speed.chunk = MAX_CHUNK + 1;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("chunk must be at most"));

        let mut config = Config::default();
        config.pipeline.max_len = MAX_PAYLOAD_LEN + 1;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_len must be at most"));
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let mut config = Config::default();
        config.speed.chunk = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("chunk"));
    }
}
