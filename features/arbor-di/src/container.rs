use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    fmt::Debug,
    iter,
    ptr,
    rc::{Rc, Weak},
};

use crate::{
    declaration::{declare_value, Declaration, RawDeclaration},
    dependency_graph::DependencyWalk,
    errors::{ResolveError, Result},
    identifier::{Identifier, Injectable},
    name::token_name,
    types::{downcast_instance, Instance, Key, Service},
};

/// Hierarchical dependency injection container
///
/// A container maps identifiers to declarations, and caches every instance it
/// builds for its whole lifetime. Child containers see their ancestors'
/// registrations and reuse their instances, unless the child overrides the
/// requested identifier or anything it transitively depends on.
///
/// `Container` is a cheap handle - clones refer to the same container and keep
/// it alive. Resolution is synchronous and single threaded, so the handle is
/// not `Send`.
#[derive(Clone)]
pub struct Container(Rc<ContainerInner>);

/// Non-owning handle to a [Container], handed to factories depending on a
/// [ContainerRef](crate::ContainerRef)
///
/// Services are cached inside the container they were built in, so an owning
/// handle kept by a service would keep its own container alive forever.
/// Every operation fails with [ContainerDropped](ResolveError::ContainerDropped)
/// once the last [Container] handle is gone.
#[derive(Clone)]
pub struct WeakContainer(Weak<ContainerInner>);

struct ContainerInner {
    parent: Option<Container>,
    providers: RefCell<HashMap<Key, Provider>>,
    cache: RefCell<HashMap<Key, Instance>>,
    /// Number of running factories this container was handed to
    seals: Cell<usize>,
}

struct Provider {
    identifier: Identifier,
    declaration: Rc<RawDeclaration>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Create a root container
    pub fn new() -> Self {
        Self::from_parent(None)
    }

    /// Create a container below `parent`
    pub fn with_parent(parent: &Container) -> Self {
        Self::from_parent(Some(parent.clone()))
    }

    fn from_parent(parent: Option<Container>) -> Self {
        Self(Rc::new(ContainerInner {
            parent,
            providers: RefCell::new(HashMap::new()),
            cache: RefCell::new(HashMap::new()),
            seals: Cell::new(0),
        }))
    }

    /// Create child container using this as parent
    pub fn create_child(&self) -> Container {
        Self::with_parent(self)
    }

    pub fn parent(&self) -> Option<&Container> {
        self.0.parent.as_ref()
    }

    /// The topmost ancestor, or this container if it has no parent
    pub fn root(&self) -> &Container {
        let mut container = self;
        while let Some(parent) = container.parent() {
            container = parent;
        }
        container
    }

    /// Non-owning handle to this container
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer(Rc::downgrade(&self.0))
    }

    /// This container followed by all of its ancestors
    pub(crate) fn lineage(&self) -> impl Iterator<Item = &Container> {
        iter::successors(Some(self), |container| container.parent())
    }
}

// Registration
impl Container {
    /// Register `declaration` under `id` on this container
    ///
    /// Replaces an earlier registration of `id` on this container. Ancestors
    /// are untouched, which is how a child overrides its parent.
    pub fn register<I: Injectable>(
        &self,
        id: &I,
        declaration: Declaration<I::Output>,
    ) -> Result<()> {
        self.ensure_unsealed("register")?;
        self.insert_provider(id.identifier(), declaration.raw().clone());
        Ok(())
    }

    /// Register a declaration using itself as the key
    pub fn register_declaration<T: Service>(&self, declaration: &Declaration<T>) -> Result<()> {
        self.register(declaration, declaration.clone())
    }

    /// Register an already built value under `id`
    pub fn register_value<I: Injectable>(&self, id: &I, value: I::Output) -> Result<()> {
        self.register(id, declare_value(value))
    }

    pub(crate) fn insert_provider(&self, identifier: Identifier, declaration: Rc<RawDeclaration>) {
        self.0.providers.borrow_mut().insert(
            identifier.key(),
            Provider {
                identifier,
                declaration,
            },
        );
    }

    /// Declarations used as their own key get a single home: the first
    /// container up the lineage registering them, or else the root.
    pub(crate) fn ensure_registered(&self, identifier: &Identifier) {
        let Some(declaration) = identifier.as_declaration() else {
            return;
        };
        if self.lineage_provides(identifier.key()) {
            return;
        }

        tracing::debug!("Registering {identifier} in the root container");
        self.root()
            .insert_provider(identifier.clone(), declaration.clone());
    }

    /// Whether `id` is registered on this container, ignoring ancestors
    pub fn is_registered<I: Injectable>(&self, id: &I) -> bool {
        self.0
            .providers
            .borrow()
            .contains_key(&id.identifier().key())
    }

    /// Whether this container holds an instance for `id`, ignoring ancestors
    pub fn is_cached<I: Injectable>(&self, id: &I) -> bool {
        self.0.cache.borrow().contains_key(&id.identifier().key())
    }

    pub(crate) fn own_provider(&self, key: Key) -> Option<Rc<RawDeclaration>> {
        self.0
            .providers
            .borrow()
            .get(&key)
            .map(|provider| provider.declaration.clone())
    }

    pub(crate) fn lineage_provides(&self, key: Key) -> bool {
        self.lineage()
            .any(|container| container.0.providers.borrow().contains_key(&key))
    }
}

// Resolution
impl Container {
    /// Get the service for `id`, building it and its dependencies if needed
    ///
    /// Fails if a provider is missing, if the dependencies form a cycle, or if
    /// called from a factory which was handed this container.
    pub fn get<I: Injectable>(&self, id: &I) -> Result<I::Output> {
        let identifier = id.identifier();
        let instance = self.resolve(&identifier)?;
        downcast_instance(Some(&instance))
    }

    /// All identifiers `id` transitively depends on, in first seen order
    pub fn dependencies<I: Injectable>(&self, id: &I) -> Result<Vec<Identifier>> {
        self.ensure_unsealed("dependencies")?;
        let identifier = id.identifier();
        self.ensure_registered(&identifier);

        let mut seen = HashSet::new();
        let found = DependencyWalk::new(self).collect(&identifier)?;
        Ok(found
            .into_iter()
            .filter(|dependency| seen.insert(dependency.key()))
            .collect())
    }

    fn resolve(&self, identifier: &Identifier) -> Result<Instance> {
        self.ensure_unsealed("get")?;

        if identifier.is_container_ref() {
            return Ok(Rc::new(self.downgrade()) as Instance);
        }

        if let Some(instance) = self.cached(identifier.key()) {
            tracing::trace!("Using cached instance of {identifier}");
            return Ok(instance);
        }

        self.ensure_registered(identifier);

        let dependencies: HashSet<Key> = DependencyWalk::new(self)
            .collect(identifier)?
            .iter()
            .map(Identifier::key)
            .collect();

        match self.parent() {
            Some(parent) if !self.overrides(identifier, &dependencies) => {
                tracing::debug!("Delegating {identifier} to the parent container");
                parent.resolve(identifier)
            }
            _ => self.instantiate(identifier),
        }
    }

    /// Whether this container provides the identifier itself, or any of its dependencies
    fn overrides(&self, identifier: &Identifier, dependencies: &HashSet<Key>) -> bool {
        let providers = self.0.providers.borrow();
        providers.contains_key(&identifier.key())
            || providers.keys().any(|key| dependencies.contains(key))
    }

    fn instantiate(&self, identifier: &Identifier) -> Result<Instance> {
        let declaration = self
            .find_declaration(identifier)
            .ok_or_else(|| ResolveError::provider_not_found(identifier))?;

        let instances = declaration
            .deps
            .iter()
            .map(|dependency| self.resolve(dependency))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Constructing {identifier}");
        let constructed = {
            // Factories must not use a container they got injected while they run
            let _seals: Vec<SealGuard> = instances
                .iter()
                .filter_map(|instance| instance.downcast_ref::<WeakContainer>())
                .filter_map(WeakContainer::upgrade)
                .map(|container| SealGuard::new(&container))
                .collect();

            (declaration.factory)(instances)
        };
        let instance =
            constructed.map_err(|error| ResolveError::from_factory(identifier, error))?;

        // A factory may have cached the same identifier through another handle - first one wins
        let cached = self
            .0
            .cache
            .borrow_mut()
            .entry(identifier.key())
            .or_insert(instance)
            .clone();
        Ok(cached)
    }

    /// Most specific declaration for `identifier`, walking up the lineage
    fn find_declaration(&self, identifier: &Identifier) -> Option<Rc<RawDeclaration>> {
        self.lineage()
            .find_map(|container| container.own_provider(identifier.key()))
            .or_else(|| identifier.as_declaration().cloned())
    }

    fn cached(&self, key: Key) -> Option<Instance> {
        self.0.cache.borrow().get(&key).cloned()
    }

    fn ensure_unsealed(&self, operation: &'static str) -> Result<()> {
        if self.0.seals.get() > 0 {
            return Err(ResolveError::IllegalContainerAccess { operation });
        }
        Ok(())
    }
}

/// Seals a container for as long as the guard lives
struct SealGuard {
    container: Container,
}

impl SealGuard {
    fn new(container: &Container) -> Self {
        let seals = &container.0.seals;
        seals.set(seals.get() + 1);
        Self {
            container: container.clone(),
        }
    }
}

impl Drop for SealGuard {
    fn drop(&mut self) {
        let seals = &self.container.0.seals;
        seals.set(seals.get() - 1);
    }
}

impl WeakContainer {
    /// The container, if it is still alive
    pub fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(Container)
    }

    /// See [Container::get]
    pub fn get<I: Injectable>(&self, id: &I) -> Result<I::Output> {
        self.container()?.get(id)
    }

    /// See [Container::register]
    pub fn register<I: Injectable>(
        &self,
        id: &I,
        declaration: Declaration<I::Output>,
    ) -> Result<()> {
        self.container()?.register(id, declaration)
    }

    /// See [Container::register_value]
    pub fn register_value<I: Injectable>(&self, id: &I, value: I::Output) -> Result<()> {
        self.container()?.register_value(id, value)
    }

    /// See [Container::create_child]
    pub fn create_child(&self) -> Result<Container> {
        Ok(self.container()?.create_child())
    }

    fn container(&self) -> Result<Container> {
        self.upgrade().ok_or(ResolveError::ContainerDropped)
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Container {}

impl PartialEq for WeakContainer {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq<Container> for WeakContainer {
    fn eq(&self, other: &Container) -> bool {
        ptr::eq(self.0.as_ptr(), Rc::as_ptr(&other.0))
    }
}

impl PartialEq<WeakContainer> for Container {
    fn eq(&self, other: &WeakContainer) -> bool {
        other == self
    }
}

impl Debug for WeakContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(container) => f.debug_tuple("WeakContainer").field(&container).finish(),
            None => f.write_str("WeakContainer(dropped)"),
        }
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers = self.0.providers.borrow();
        let cache = self.0.cache.borrow();
        let mut map = f.debug_struct("Container");
        for (key, provider) in providers.iter() {
            let state = if cache.contains_key(key) {
                "cached"
            } else {
                "registered"
            };
            map.field(token_name(&provider.identifier), &state);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use super::*;
    use crate::{container_ref, create_token, declare_service_raw};

    #[test]
    fn seal_guards_nest() {
        let container = Container::new();
        let token = create_token::<u8>("t");

        let outer = SealGuard::new(&container);
        let inner = SealGuard::new(&container);
        drop(inner);
        assert!(matches!(
            container.register_value(&token, 1),
            Err(ResolveError::IllegalContainerAccess {
                operation: "register"
            })
        ));
        drop(outer);

        container.register_value(&token, 1).unwrap();
        assert_eq!(container.get(&token).unwrap(), 1);
    }

    #[test]
    fn panicking_factories_unseal() {
        let root = Container::new();
        let explodes = declare_service_raw(
            |(_c,): (WeakContainer,)| -> u8 { panic!("boom") },
            (container_ref(()),),
        );

        let result = catch_unwind(AssertUnwindSafe(|| root.get(&explodes)));
        assert!(result.is_err());

        let token = create_token::<u8>("t");
        root.register_value(&token, 7).unwrap();
        assert_eq!(root.get(&token).unwrap(), 7);
        assert!(!root.is_cached(&explodes));
    }

    #[test]
    fn injected_handles_do_not_keep_containers_alive() {
        let root = Container::new();
        let child = root.create_child();
        let token = create_token::<u8>("t");
        let keeper = declare_service_raw(|(c,): (WeakContainer,)| c, (container_ref(()),));
        child.register_declaration(&keeper).unwrap();
        child.register_value(&token, 1).unwrap();

        let handle = child.get(&keeper).unwrap();
        assert_eq!(handle, child);
        assert_eq!(handle.get(&token).unwrap(), 1);

        let weak = Rc::downgrade(&child.0);
        drop(child);
        assert!(weak.upgrade().is_none());
        assert!(handle.upgrade().is_none());
        assert!(matches!(
            handle.get(&token),
            Err(ResolveError::ContainerDropped)
        ));
        assert!(matches!(
            handle.register_value(&token, 2),
            Err(ResolveError::ContainerDropped)
        ));
        assert_eq!(format!("{handle:?}"), "WeakContainer(dropped)");
    }

    #[test]
    fn registration_is_local_to_the_container() {
        let token = create_token::<u8>("t");
        let root = Container::new();
        let child = root.create_child();

        child.register_value(&token, 1).unwrap();
        assert!(child.is_registered(&token));
        assert!(!root.is_registered(&token));
        assert_eq!(child.root(), &root);
        assert_eq!(child.parent(), Some(&root));
        assert_eq!(root.lineage().count(), 1);
        assert_eq!(child.lineage().count(), 2);
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let ten = create_token::<i32>("10");
        let eleven = create_token::<i32>("11");
        let sum = declare_service_raw(|(a, b): (i32, i32)| a + b, (ten.clone(), eleven.clone()));

        let root = Container::new();
        root.register_value(&ten, 10).unwrap();
        root.register(&eleven, declare_service_raw(|(ten,): (i32,)| ten + 1, (ten.clone(),)))
            .unwrap();

        let deps = root.dependencies(&sum).unwrap();
        assert_eq!(deps, vec![ten.identifier(), eleven.identifier()]);
        assert!(root.is_registered(&sum));
    }

    #[test]
    fn debug_lists_provider_state() {
        let one = create_token::<u8>("one");
        let two = create_token::<u8>("two");
        let root = Container::new();
        root.register_value(&one, 1).unwrap();
        root.register_value(&two, 2).unwrap();
        root.get(&one).unwrap();

        let debug = format!("{root:?}");
        assert!(debug.contains("one: \"cached\""));
        assert!(debug.contains("two: \"registered\""));
    }
}
