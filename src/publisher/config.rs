use crate::{Error, Result, DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Chunk size announced after the handshake
    pub chunk_size: u32,

    /// Capacity of the outbound write queue
    pub queue_capacity: usize,

    /// Consecutive decode failures tolerated before the connection is
    /// treated as broken
    pub max_decode_failures: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        PublisherConfig {
            connect_timeout: Duration::from_secs(10),
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_capacity: 64,
            max_decode_failures: 8,
        }
    }
}

impl PublisherConfig {
    /// Create config builder
    pub fn builder() -> PublisherConfigBuilder {
        PublisherConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(Error::config("Chunk size must be at least 128"));
        }

        if self.chunk_size > 65536 {
            return Err(Error::config("Chunk size must not exceed 65536"));
        }

        if self.queue_capacity == 0 {
            return Err(Error::config("Queue capacity must be non-zero"));
        }

        if self.max_decode_failures == 0 {
            return Err(Error::config("Decode failure threshold must be non-zero"));
        }

        Ok(())
    }
}

/// Builder for PublisherConfig
pub struct PublisherConfigBuilder {
    config: PublisherConfig,
}

impl PublisherConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        PublisherConfigBuilder {
            config: PublisherConfig::default(),
        }
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set announced chunk size
    pub fn chunk_size(mut self, size: u32) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set outbound queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set decode failure threshold
    pub fn max_decode_failures(mut self, count: u32) -> Self {
        self.config.max_decode_failures = count;
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<PublisherConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for PublisherConfigBuilder {
    fn default() -> Self {
        PublisherConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(PublisherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_chunk_size() {
        assert!(PublisherConfig::builder().chunk_size(64).build().is_err());
        assert!(PublisherConfig::builder().chunk_size(100_000).build().is_err());
        assert!(PublisherConfig::builder().chunk_size(4096).build().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = PublisherConfig::builder()
            .connect_timeout(Duration::from_secs(3))
            .queue_capacity(16)
            .build()
            .unwrap();

        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.queue_capacity, 16);
    }
}
