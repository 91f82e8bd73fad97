//! Hook abstraction - per-element handlers for server signals

use ahash::AHashMap;
use serde_json::Value;
use tracing::{debug, error};

use lg_core::{BridgeError, ElementId, Result, Signal};

/// Base trait for hooks mounted on page elements
pub trait Hook: Send {
    /// Registered hook name
    fn name(&self) -> &'static str;

    /// Whether this hook handles the given signal
    fn accepts(&self, signal: &Signal) -> bool;

    /// Handle one signal
    fn handle_signal(&mut self, signal: Signal) -> Result<()>;

    /// Called when the element is removed from the page
    fn destroyed(&mut self);
}

type HookConstructor = Box<dyn Fn(ElementId) -> Box<dyn Hook> + Send + Sync>;

/// Named hook constructors plus the hooks currently mounted
#[derive(Default)]
pub struct HookRegistry {
    constructors: AHashMap<String, HookConstructor>,
    mounted: AHashMap<ElementId, Box<dyn Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook constructor under a name
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(ElementId) -> Box<dyn Hook> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Mount the named hook on an element, replacing any hook already there
    pub fn mount(&mut self, element: impl Into<ElementId>, hook_name: &str) -> Result<()> {
        let element = element.into();
        let constructor = self
            .constructors
            .get(hook_name)
            .ok_or_else(|| BridgeError::UnknownHook(hook_name.to_string()))?;

        let hook = constructor(element.clone());
        if let Some(mut previous) = self.mounted.insert(element.clone(), hook) {
            previous.destroyed();
        }

        debug!("Mounted {} on {}", hook_name, element);
        Ok(())
    }

    /// Remove an element's hook, destroying its widget
    pub fn unmount(&mut self, element: &str) -> bool {
        match self.mounted.remove(element) {
            Some(mut hook) => {
                hook.destroyed();
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self, element: &str) -> bool {
        self.mounted.contains_key(element)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Deliver a server signal to every mounted hook that handles it.
    ///
    /// Returns how many hooks received it. A failing hook does not stop
    /// delivery to the others; the first error is returned afterwards.
    pub fn broadcast(&mut self, name: &str, payload: Value) -> Result<usize> {
        let signal = Signal::decode(name, payload)?;
        let mut delivered = 0;
        let mut first_error = None;

        for (element, hook) in self.mounted.iter_mut() {
            if !hook.accepts(&signal) {
                continue;
            }
            delivered += 1;
            if let Err(e) = hook.handle_signal(signal.clone()) {
                error!("{} on {} failed to handle {}: {}", hook.name(), element, name, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(delivered),
        }
    }

    /// Deliver a server signal to the hook on one element
    pub fn dispatch(&mut self, element: &str, name: &str, payload: Value) -> Result<()> {
        let signal = Signal::decode(name, payload)?;
        let hook = self
            .mounted
            .get_mut(element)
            .ok_or_else(|| BridgeError::UnknownElement(element.to_string()))?;

        if !hook.accepts(&signal) {
            debug!("{} on {} does not handle {}", hook.name(), element, name);
            return Ok(());
        }
        hook.handle_signal(signal)
    }

    /// Tear down every mounted hook
    pub fn unmount_all(&mut self) {
        for (_, mut hook) in self.mounted.drain() {
            hook.destroyed();
        }
    }
}
