//! Mapping operation refs to host apps

use std::collections::HashMap;
use std::fmt;
use txflow_types::AppHandle;

/// Host hook consulted when a ref was never registered up front.
pub trait RefResolver {
    fn resolve(&self, reference: &str) -> Option<AppHandle>;
}

impl<F> RefResolver for F
where
    F: Fn(&str) -> Option<AppHandle>,
{
    fn resolve(&self, reference: &str) -> Option<AppHandle> {
        self(reference)
    }
}

/// Resolver for hosts that register every app before running
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl RefResolver for NoFallback {
    fn resolve(&self, _reference: &str) -> Option<AppHandle> {
        None
    }
}

/// Ref to app cache owned by one transaction.
///
/// Lookups hit the cache first; on a miss the fallback resolver is asked and
/// any app it returns is remembered under the exact ref string, so the
/// fallback is consulted at most once per ref that it can resolve.
pub struct RefCache {
    apps: HashMap<String, AppHandle>,
    fallback: Box<dyn RefResolver>,
}

impl RefCache {
    #[must_use]
    pub fn new(fallback: Box<dyn RefResolver>) -> Self {
        Self {
            apps: HashMap::new(),
            fallback,
        }
    }

    /// Register an app under its own ref, replacing any earlier entry.
    pub fn insert(&mut self, app: AppHandle) {
        self.apps.insert(app.reference().to_string(), app);
    }

    /// Cache-only lookup
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<AppHandle> {
        self.apps.get(reference).cloned()
    }

    pub fn resolve(&mut self, reference: &str) -> Option<AppHandle> {
        if let Some(app) = self.apps.get(reference) {
            return Some(app.clone());
        }
        let app = self.fallback.resolve(reference)?;
        self.apps.insert(reference.to_string(), app.clone());
        Some(app)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl Default for RefCache {
    fn default() -> Self {
        Self::new(Box::new(NoFallback))
    }
}

impl fmt::Debug for RefCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefCache")
            .field("apps", &self.apps.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use txflow_types::App;

    #[test]
    fn fallback_result_is_memoized() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut cache = RefCache::new(Box::new(move |reference: &str| {
            counter.set(counter.get() + 1);
            Some(App::new(reference).into_handle())
        }));

        let first = cache.resolve("app/org.example.App/x86_64/stable").unwrap();
        let second = cache.resolve("app/org.example.App/x86_64/stable").unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn misses_are_not_cached() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut cache = RefCache::new(Box::new(move |_: &str| {
            counter.set(counter.get() + 1);
            None
        }));

        assert!(cache.resolve("unknown").is_none());
        assert!(cache.resolve("unknown").is_none());
        assert_eq!(calls.get(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn registered_apps_win_over_fallback() {
        let registered = App::new("runtime/org.example.Platform/x86_64/1").into_handle();
        let mut cache = RefCache::new(Box::new(|reference: &str| {
            Some(App::new(reference).into_handle())
        }));
        cache.insert(registered.clone());

        let resolved = cache.resolve("runtime/org.example.Platform/x86_64/1").unwrap();
        assert!(Rc::ptr_eq(&resolved, &registered));
        assert!(cache.get("other").is_none());
    }
}
