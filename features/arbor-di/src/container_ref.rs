use std::rc::Rc;

use crate::{
    container::WeakContainer,
    identifier::{Identifier, IdentifierKind, Injectable},
    name::container_ref_name,
    resolver::Dependencies,
    types::Key,
};

/// Special identifier resolving to the container doing the resolving
///
/// The carried dependencies must be available in the container which is handed
/// out. A service depending on a `ContainerRef` is therefore rebuilt in a child
/// container as soon as the child overrides any of them.
///
/// Every call to [container_ref] creates a new identity, even with equal deps.
#[derive(Clone)]
pub struct ContainerRef {
    key: Key,
    name: Rc<str>,
    deps: Rc<[Identifier]>,
}

/// Create a special identifier to allow the container to be injected
///
/// The container handed to a factory is sealed while that factory runs: calling
/// `get` or `register` on it fails with
/// [IllegalContainerAccess](crate::ResolveError::IllegalContainerAccess).
/// Factories may keep the handle and use it once they have returned.
///
/// The handle is a [WeakContainer]: keeping it does not extend the container's
/// lifetime. Once every [Container](crate::Container) handle is dropped, the
/// container and its cache are freed and the kept handle fails with
/// [ContainerDropped](crate::ResolveError::ContainerDropped).
pub fn container_ref<D: Dependencies>(deps: D) -> ContainerRef {
    let deps: Rc<[Identifier]> = deps.identifiers().into();
    ContainerRef {
        key: Key::next(),
        name: Rc::from(container_ref_name(&deps)),
        deps,
    }
}

impl ContainerRef {
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn deps(&self) -> &[Identifier] {
        &self.deps
    }
}

impl Injectable for ContainerRef {
    type Output = WeakContainer;

    fn identifier(&self) -> Identifier {
        Identifier::new(
            self.key,
            Some(self.name.clone()),
            IdentifierKind::Container(self.deps.clone()),
        )
    }
}

impl std::fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContainerRef").field(&self.name).finish()
    }
}
