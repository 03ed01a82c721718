//! Lazy collaborator slots.
//!
//! Collaborators are built on first use, so a credential that is only
//! needed by an unused stage never blocks a run.

use std::cell::Cell;

use once_cell::unsync::OnceCell;

use super::errors::{StageError, StepResult};
use super::{
    AudioRenderer, MetadataGenerator, Notifier, Publisher, ScriptGenerator, ThumbnailRenderer,
    VideoRenderer,
};

type Factory<T> = Box<dyn FnOnce() -> StepResult<Box<T>>>;

/// A collaborator that is either ready or built on first access.
pub struct Provider<T: ?Sized> {
    instance: OnceCell<Box<T>>,
    factory: Cell<Option<Factory<T>>>,
    failure: OnceCell<String>,
}

impl<T: ?Sized> Provider<T> {
    /// Wrap an already built collaborator.
    pub fn ready(instance: Box<T>) -> Self {
        Self {
            instance: OnceCell::with_value(instance),
            factory: Cell::new(None),
            failure: OnceCell::new(),
        }
    }

    /// Defer construction until the first `get`.
    pub fn lazy<F>(factory: F) -> Self
    where
        F: FnOnce() -> StepResult<Box<T>> + 'static,
    {
        Self {
            instance: OnceCell::new(),
            factory: Cell::new(Some(Box::new(factory))),
            failure: OnceCell::new(),
        }
    }

    /// Get the collaborator, building it if needed.
    ///
    /// A failed construction is remembered; later calls return the same
    /// configuration error without retrying.
    pub fn get(&self) -> StepResult<&T> {
        if let Some(instance) = self.instance.get() {
            return Ok(instance.as_ref());
        }
        if let Some(message) = self.failure.get() {
            return Err(StageError::configuration(message.clone()));
        }

        let factory = self
            .factory
            .take()
            .ok_or_else(|| StageError::configuration("collaborator not configured"))?;

        match factory() {
            Ok(instance) => Ok(self.instance.get_or_init(|| instance).as_ref()),
            Err(e) => {
                let message = match e {
                    StageError::Configuration(message) => message,
                    other => other.to_string(),
                };
                let _ = self.failure.set(message.clone());
                Err(StageError::Configuration(message))
            }
        }
    }

    /// Whether the collaborator has been built.
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

/// The seven collaborators a pipeline drives.
pub struct Collaborators {
    pub script: Provider<dyn ScriptGenerator>,
    pub metadata: Provider<dyn MetadataGenerator>,
    pub thumbnail: Provider<dyn ThumbnailRenderer>,
    pub audio: Provider<dyn AudioRenderer>,
    pub video: Provider<dyn VideoRenderer>,
    pub publisher: Provider<dyn Publisher>,
    pub notifier: Provider<dyn Notifier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct Hello;

    impl Greeter for Hello {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn ready_provider_returns_instance() {
        let provider: Provider<dyn Greeter> = Provider::ready(Box::new(Hello));
        assert!(provider.is_initialized());
        assert_eq!(provider.get().unwrap().greet(), "hello");
    }

    #[test]
    fn lazy_provider_builds_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let provider: Provider<dyn Greeter> = Provider::lazy(move || {
            counter.set(counter.get() + 1);
            Ok(Box::new(Hello) as Box<dyn Greeter>)
        });

        assert!(!provider.is_initialized());
        provider.get().unwrap();
        provider.get().unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unused_lazy_provider_never_builds() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _provider: Provider<dyn Greeter> = Provider::lazy(move || {
            counter.set(counter.get() + 1);
            Err(StageError::configuration("SMTP_PASSWORD not set"))
        });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn factory_failure_is_configuration_error() {
        let provider: Provider<dyn Greeter> =
            Provider::lazy(|| Err(StageError::configuration("OPENAI_API_KEY not set")));

        let first = provider.get().err().unwrap();
        assert!(matches!(first, StageError::Configuration(ref m) if m == "OPENAI_API_KEY not set"));

        let second = provider.get().err().unwrap();
        assert!(matches!(second, StageError::Configuration(ref m) if m == "OPENAI_API_KEY not set"));
    }
}
