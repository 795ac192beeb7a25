//! Server configuration

use crate::{SERVER_NAME, SERVER_VERSION};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name reported in `serverInfo`
    pub name: String,
    /// Version reported in `serverInfo`
    pub version: String,
    /// Usage hints sent to the client during `initialize`
    pub instructions: Option<String>,
}

impl ServerConfig {
    /// Create a new configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
            instructions: None,
        }
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    name: Option<String>,
    version: Option<String>,
    instructions: Option<String>,
}

impl ServerConfigBuilder {
    /// Set the server name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the reported version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set client instructions; blank text is treated as none
    pub fn instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions.filter(|text| !text.trim().is_empty());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            name: self.name.unwrap_or_else(|| SERVER_NAME.to_string()),
            version: self.version.unwrap_or_else(|| SERVER_VERSION.to_string()),
            instructions: self.instructions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::builder().build();
        assert_eq!(config.name, "weather-server");
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert!(config.instructions.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::builder()
            .name("forecasts")
            .version("9.9.9")
            .instructions(Some("Call get_weather first".to_string()))
            .build();
        assert_eq!(config.name, "forecasts");
        assert_eq!(config.version, "9.9.9");
        assert_eq!(config.instructions.as_deref(), Some("Call get_weather first"));
    }

    #[test]
    fn test_blank_instructions_dropped() {
        let config = ServerConfig::builder().instructions(Some("   ".to_string())).build();
        assert!(config.instructions.is_none());
    }
}
