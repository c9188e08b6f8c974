use std::sync::Arc;

use thiserror::Error;

use crate::{identifier::Identifier, name::chain_name, types::DynError};

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors while registering or resolving services
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Nothing in the container or its ancestors provides the identifier
    #[error("Provider for \"{0}\" not found")]
    ProviderNotFound(String),

    /// The identifier depends on itself
    #[error("Cyclic dependency: {}", chain_name(.chain))]
    CyclicDependency { chain: Vec<String> },

    /// A factory tried to use the container it was handed as a dependency
    #[error("Using container.{operation}() from factory function is not allowed.")]
    IllegalContainerAccess { operation: &'static str },

    /// An injected container handle outlived its container
    #[error("Container was dropped, the injected handle can no longer be used.")]
    ContainerDropped,

    #[error("Failed to downcast, required: '{required_type}'")]
    DowncastFailed { required_type: &'static str },

    /// A named factory asked for a dependency it never declared
    #[error("Dependency '{0}' was not declared")]
    UnknownDependency(String),

    /// A fallible factory returned an error
    #[error("Factory for '{service}' failed - error: {error}")]
    FactoryFailed {
        service: String,
        error: Arc<DynError>,
    },
}

impl ResolveError {
    pub(crate) fn provider_not_found(identifier: &Identifier) -> Self {
        Self::ProviderNotFound(identifier.to_string())
    }

    pub(crate) fn cyclic(chain: &[Identifier], revisited: &Identifier) -> Self {
        Self::CyclicDependency {
            chain: chain
                .iter()
                .chain(std::iter::once(revisited))
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Wraps a factory error, passing resolution errors through untouched
    pub(crate) fn from_factory(service: &Identifier, error: DynError) -> Self {
        match error.downcast::<ResolveError>() {
            Ok(resolve_error) => *resolve_error,
            Err(error) => Self::FactoryFailed {
                service: service.to_string(),
                error: Arc::new(error),
            },
        }
    }
}
