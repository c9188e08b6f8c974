use std::{
    any::{type_name, Any},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::errors::ResolveError;

/// Error type fallible factories may return
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution happens on a single thread of control, so resolved values only
/// need to be cloneable and have a static lifetime.
///
/// Values which must keep their identity across `get` calls should be wrapped
/// in an `Rc`.
pub trait Service: Clone + 'static {}
impl<T: Clone + 'static> Service for T {}

/// Resolved value as stored in a container cache
pub(crate) type Instance = Rc<dyn Any>;

pub(crate) fn downcast_instance<T: Service>(
    instance: Option<&Instance>,
) -> Result<T, ResolveError> {
    instance
        .and_then(|instance| instance.downcast_ref::<T>())
        .cloned()
        .ok_or(ResolveError::DowncastFailed {
            required_type: type_name::<T>(),
        })
}

/// Process-unique identity of a token, declaration or container reference.
///
/// Two identifiers are the same iff their keys are equal, no matter their names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u64);

impl Key {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw key value, mostly useful in logs
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_never_reused() {
        let a = Key::next();
        let b = Key::next();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn downcast_checks_the_stored_type() {
        let instance: Instance = Rc::new(5_u32);
        assert_eq!(downcast_instance::<u32>(Some(&instance)).unwrap(), 5);

        let err = downcast_instance::<String>(Some(&instance)).unwrap_err();
        assert!(matches!(err, ResolveError::DowncastFailed { .. }));

        let err = downcast_instance::<u32>(None).unwrap_err();
        assert!(matches!(err, ResolveError::DowncastFailed { .. }));
    }
}
