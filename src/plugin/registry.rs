//! The command table.
//!
//! Tokens are unique.  Registering a token that is already present replaces the
//! earlier plugin and logs a warning: the last registration wins.  Keeping the
//! first registration instead would be an equally valid policy; callers that
//! need it can check [`CommandRegistry::lookup`] before registering.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::observability::{REGISTRY_DUPLICATES, REGISTRY_REJECTED};
use crate::plugin::Plugin;

/// A registered plugin and the token it answers to.
pub struct PluginDescriptor {
    command: String,
    handler: Box<dyn Plugin>,
}

impl PluginDescriptor {
    /// The trigger token.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The plugin itself.
    pub fn handler(&self) -> &dyn Plugin {
        self.handler.as_ref()
    }
}

/// Mapping from command token to plugin.
#[derive(Default)]
pub struct CommandRegistry {
    plugins: HashMap<String, PluginDescriptor>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from candidate plugins.
    ///
    /// Malformed candidates are logged and skipped; duplicates follow the
    /// last-registered-wins policy.  Discovery never fails.
    pub fn discover(candidates: impl IntoIterator<Item = Box<dyn Plugin>>) -> Self {
        let mut registry = Self::new();
        for candidate in candidates {
            if let Err(err) = registry.register(candidate) {
                warn!(error = %err, "skipping plugin");
            }
        }
        debug!(plugins = registry.len(), "command registry built");
        registry
    }

    /// Registers a plugin under its command token.
    ///
    /// Returns the plugin previously registered under the same token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPlugin`] if the token is empty or contains
    /// whitespace.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<Option<Box<dyn Plugin>>> {
        let command = plugin.command().to_string();
        validate_command(&command).inspect_err(|_| REGISTRY_REJECTED.click())?;

        let descriptor = PluginDescriptor {
            command: command.clone(),
            handler: plugin,
        };
        let displaced = self.plugins.insert(command.clone(), descriptor);
        if displaced.is_some() {
            REGISTRY_DUPLICATES.click();
            let err = Error::duplicate_command(&command);
            warn!(command = %command, error = %err, "replacing previously registered plugin");
        }
        Ok(displaced.map(|descriptor| descriptor.handler))
    }

    /// Finds the plugin registered for `token`.
    ///
    /// Matching is exact and case-sensitive.
    pub fn lookup(&self, token: &str) -> Option<&dyn Plugin> {
        self.plugins.get(token).map(PluginDescriptor::handler)
    }

    /// Returns the registered tokens in sorted order.
    pub fn commands(&self) -> Vec<&str> {
        let mut commands = self
            .plugins
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        commands.sort_unstable();
        commands
    }

    /// Iterates over registered plugins in sorted token order.
    pub fn descriptors(&self) -> Vec<&PluginDescriptor> {
        let mut descriptors = self.plugins.values().collect::<Vec<_>>();
        descriptors.sort_unstable_by(|a, b| a.command.cmp(&b.command));
        descriptors
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

fn validate_command(command: &str) -> Result<()> {
    if command.is_empty() {
        return Err(Error::malformed_plugin("empty command token", None));
    }
    if command.chars().any(char::is_whitespace) {
        return Err(Error::malformed_plugin(
            "command token contains whitespace",
            Some(command.to_string()),
        ));
    }
    Ok(())
}
