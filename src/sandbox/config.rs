//! Sandbox configuration with builder pattern.

use std::time::Duration;

/// Configuration for one sandbox instance.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum wall-clock execution time before the run is abandoned.
    pub timeout: Duration,
    /// Maximum captured stdout/stderr size in bytes; output beyond the cap
    /// is discarded.
    pub max_output_bytes: usize,
    /// Source name used in compile errors and tracebacks.
    pub source_name: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_output_bytes: 1024 * 1024, // 1MiB
            source_name: "<candidate>".to_string(),
        }
    }
}

impl SandboxConfig {
    /// Create a new builder for SandboxConfig.
    pub fn builder() -> SandboxConfigBuilder {
        SandboxConfigBuilder::default()
    }
}

/// Builder for creating SandboxConfig instances.
#[derive(Debug, Clone, Default)]
pub struct SandboxConfigBuilder {
    timeout: Option<Duration>,
    max_output_bytes: Option<usize>,
    source_name: Option<String>,
}

impl SandboxConfigBuilder {
    /// Set the maximum execution timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the captured-output byte cap.
    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = Some(bytes);
        self
    }

    /// Set the source name shown in tracebacks.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Build the SandboxConfig.
    pub fn build(self) -> SandboxConfig {
        let default = SandboxConfig::default();
        SandboxConfig {
            timeout: self.timeout.unwrap_or(default.timeout),
            max_output_bytes: self.max_output_bytes.unwrap_or(default.max_output_bytes),
            source_name: self.source_name.unwrap_or(default.source_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SandboxConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_output_bytes, 1024 * 1024);
        assert_eq!(config.source_name, "<candidate>");
    }

    #[test]
    fn test_builder() {
        let config = SandboxConfig::builder()
            .timeout(Duration::from_secs(5))
            .max_output_bytes(64 * 1024)
            .source_name("<generated>")
            .build();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_output_bytes, 64 * 1024);
        assert_eq!(config.source_name, "<generated>");
    }
}
