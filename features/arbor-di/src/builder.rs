use std::rc::Rc;

use crate::{
    container::Container,
    declaration::{declare_value, Declaration, RawDeclaration},
    identifier::{Identifier, Injectable},
    types::Service,
};

/// Collects registrations up front, then builds the container in one go
///
/// ```
/// use arbor_di::{create_token, declare_service_raw, ContainerBuilder};
///
/// let port = create_token::<u16>("port");
/// let address = create_token::<String>("address");
///
/// let container = ContainerBuilder::new()
///     .add_instance(&port, 8080)
///     .add_declaration(
///         &address,
///         declare_service_raw(|(port,): (u16,)| format!("127.0.0.1:{port}"), (port.clone(),)),
///     )
///     .build();
///
/// assert_eq!(container.get(&address).unwrap(), "127.0.0.1:8080");
/// ```
pub struct ContainerBuilder {
    parent: Option<Container>,
    /// Registrations in the order they were added - later ones win
    registrations: Vec<(Identifier, Rc<RawDeclaration>)>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Builder for a root container
    pub fn new() -> Self {
        ContainerBuilder {
            parent: None,
            registrations: Vec::new(),
        }
    }

    /// Builder for a child of `parent`
    pub fn child_of(parent: &Container) -> Self {
        ContainerBuilder {
            parent: Some(parent.clone()),
            registrations: Vec::new(),
        }
    }
}

impl ContainerBuilder {
    pub fn add_declaration<I: Injectable>(
        mut self,
        id: &I,
        declaration: Declaration<I::Output>,
    ) -> Self {
        self.registrations
            .push((id.identifier(), declaration.raw().clone()));
        self
    }

    /// Register a declaration using itself as the key
    pub fn add_service<T: Service>(self, declaration: &Declaration<T>) -> Self {
        self.add_declaration(declaration, declaration.clone())
    }

    /// Register an already built value
    pub fn add_instance<I: Injectable>(self, id: &I, instance: I::Output) -> Self {
        self.add_declaration(id, declare_value(instance))
    }

    pub fn build(self) -> Container {
        let container = match &self.parent {
            Some(parent) => Container::with_parent(parent),
            None => Container::new(),
        };

        tracing::debug!(
            "Building container with {} registrations",
            self.registrations.len()
        );
        for (identifier, declaration) in self.registrations {
            container.insert_provider(identifier, declaration);
        }

        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_token, declare_service_raw};

    #[test]
    fn later_registrations_win() {
        let token = create_token::<u8>("t");
        let container = ContainerBuilder::new()
            .add_instance(&token, 1)
            .add_instance(&token, 2)
            .build();

        assert_eq!(container.get(&token).unwrap(), 2);
    }

    #[test]
    fn builds_children() {
        let base = create_token::<u8>("base");
        let doubled = create_token::<u8>("doubled");
        let root = ContainerBuilder::new()
            .add_instance(&base, 2)
            .add_declaration(
                &doubled,
                declare_service_raw(|(base,): (u8,)| base * 2, (base.clone(),)),
            )
            .build();
        let child = ContainerBuilder::child_of(&root)
            .add_instance(&base, 5)
            .build();

        assert_eq!(child.parent(), Some(&root));
        assert_eq!(root.get(&doubled).unwrap(), 4);
        assert_eq!(child.get(&doubled).unwrap(), 10);
    }

    #[test]
    fn self_keyed_services() {
        let svc = declare_service_raw(|()| "svc", ());
        let container = ContainerBuilder::new().add_service(&svc).build();

        assert!(container.is_registered(&svc));
        assert_eq!(container.get(&svc).unwrap(), "svc");
    }
}
