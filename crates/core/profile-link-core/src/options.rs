use std::collections::HashMap;

/// Read access to the host's options store.
///
/// The linking flow reads `domain`, `client_id` and `client_secret`.
pub trait OptionsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Options fixed at startup, usually from the service configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    values: HashMap<String, String>,
}

impl StaticOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl OptionsStore for StaticOptions {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
