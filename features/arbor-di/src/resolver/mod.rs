use crate::{errors::ResolveError, identifier::Identifier, types::Instance};

pub mod named;
mod tuple;

/// An ordered list of dependencies, resolved into a typed value for the factory
///
/// Implemented for `()` and tuples of up to twelve [Injectable](crate::Injectable)s.
/// The factory receives a tuple of the resolved values in the same order.
pub trait Dependencies {
    type Resolved;

    /// Identifiers in declared order
    fn identifiers(&self) -> Vec<Identifier>;

    /// Rebuilds the typed values from instances resolved in declared order
    fn unpack(instances: Vec<Instance>) -> Result<Self::Resolved, ResolveError>;
}
