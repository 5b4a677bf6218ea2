// ABOUTME: Explicit registry of shared collaborators, built once at startup.
// ABOUTME: Typed keys name each service; lookups fail on unknown names or wrong types.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("service '{0}' is already registered")]
    AlreadyRegistered(&'static str),

    #[error("service '{0}' is not registered")]
    NotRegistered(&'static str),

    #[error("service '{0}' is registered with a different type")]
    TypeMismatch(&'static str),
}

/// Name of a service together with the type it is stored as. `T` is usually
/// a trait object such as `dyn DockerOps`.
pub struct ServiceKey<T: ?Sized> {
    name: &'static str,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized> ServiceKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> Clone for ServiceKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ServiceKey<T> {}

impl<T: ?Sized> fmt::Debug for ServiceKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceKey").field(&self.name).finish()
    }
}

/// Process-lifetime service registry. Populated serially during bootstrap and
/// read-only afterwards, so it is shared as `Arc<ServiceLocator>` without locking.
#[derive(Default)]
pub struct ServiceLocator {
    services: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, key: ServiceKey<T>, service: Arc<T>) -> Result<(), LocatorError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if self.services.contains_key(key.name) {
            return Err(LocatorError::AlreadyRegistered(key.name));
        }
        self.services.insert(key.name, Box::new(service));
        Ok(())
    }

    pub fn get<T>(&self, key: ServiceKey<T>) -> Result<Arc<T>, LocatorError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let entry = self
            .services
            .get(key.name)
            .ok_or(LocatorError::NotRegistered(key.name))?;
        entry
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(LocatorError::TypeMismatch(key.name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

impl fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.services.keys().collect();
        names.sort();
        f.debug_struct("ServiceLocator")
            .field("services", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    const GREETER: ServiceKey<dyn Greeter> = ServiceKey::new("Greeter");

    fn english() -> Arc<dyn Greeter> {
        Arc::new(English)
    }

    #[test]
    fn resolves_trait_objects() {
        let mut locator = ServiceLocator::new();
        locator.register(GREETER, english()).unwrap();
        assert_eq!(locator.get(GREETER).unwrap().greet(), "hello");
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut locator = ServiceLocator::new();
        locator.register(GREETER, english()).unwrap();
        let err = locator.register(GREETER, english()).unwrap_err();
        assert_eq!(err, LocatorError::AlreadyRegistered("Greeter"));
    }

    #[test]
    fn unknown_name_fails() {
        let locator = ServiceLocator::new();
        assert_eq!(
            locator.get(GREETER).err(),
            Some(LocatorError::NotRegistered("Greeter"))
        );
    }

    #[test]
    fn wrong_type_under_same_name_fails() {
        let mut locator = ServiceLocator::new();
        locator
            .register(ServiceKey::<String>::new("Greeter"), Arc::new("x".to_string()))
            .unwrap();
        assert_eq!(
            locator.get(GREETER).err(),
            Some(LocatorError::TypeMismatch("Greeter"))
        );
    }
}
