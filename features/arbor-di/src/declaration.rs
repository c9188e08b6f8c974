use std::{any::type_name, marker::PhantomData, rc::Rc};

use crate::{
    identifier::{Identifier, IdentifierKind, Injectable},
    resolver::{
        named::{NamedDependencies, ResolvedDependencies},
        Dependencies,
    },
    types::{DynError, Instance, Key, Service},
};

/// Factory with its dependency types erased
pub(crate) type ErasedFactory = Rc<dyn Fn(Vec<Instance>) -> Result<Instance, DynError>>;

/// Type-erased declaration, as stored in a container's provider table
#[derive(Clone)]
pub(crate) struct RawDeclaration {
    pub(crate) name: Rc<str>,
    pub(crate) deps: Vec<Identifier>,
    pub(crate) factory: ErasedFactory,
}

/// A factory bound to an ordered list of dependencies, producing a `T`
///
/// A declaration can be registered under a [Token](crate::Token), or be used as
/// its own key. Declarations are compared by identity, like tokens.
pub struct Declaration<T> {
    key: Key,
    raw: Rc<RawDeclaration>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Service> Declaration<T> {
    fn from_parts<F>(deps: Vec<Identifier>, factory: F) -> Self
    where
        F: Fn(Vec<Instance>) -> Result<Instance, DynError> + 'static,
    {
        Declaration {
            key: Key::next(),
            raw: Rc::new(RawDeclaration {
                name: Rc::from(type_name::<T>()),
                deps,
                factory: Rc::new(factory),
            }),
            _marker: PhantomData,
        }
    }

    /// Replace the debug name, keeping the identity of the declaration
    pub fn named(self, name: impl Into<String>) -> Self {
        let mut raw = (*self.raw).clone();
        raw.name = Rc::from(name.into());
        Declaration {
            key: self.key,
            raw: Rc::new(raw),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.raw.name
    }

    /// Dependencies in declared order
    pub fn deps(&self) -> &[Identifier] {
        &self.raw.deps
    }

    pub(crate) fn raw(&self) -> &Rc<RawDeclaration> {
        &self.raw
    }
}

impl<T: Service> Injectable for Declaration<T> {
    type Output = T;

    fn identifier(&self) -> Identifier {
        Identifier::new(
            self.key,
            Some(self.raw.name.clone()),
            IdentifierKind::Declaration(self.raw.clone()),
        )
    }
}

impl<T> Clone for Declaration<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Declaration<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &self.raw.name)
            .field("key", &self.key)
            .field("deps", &self.raw.deps)
            .finish()
    }
}

/// Declare a service, specifying its dependencies positionally
///
/// The factory receives a tuple with the resolved dependencies, in the same order.
///
/// ```
/// use arbor_di::{create_token, declare_service_raw, Container};
///
/// let ten = create_token::<i32>("10");
/// let eleven = create_token::<i32>("11");
///
/// let container = Container::new();
/// container.register(&ten, declare_service_raw(|()| 10, ())).unwrap();
/// container
///     .register(&eleven, declare_service_raw(|(ten,): (i32,)| ten + 1, (ten.clone(),)))
///     .unwrap();
///
/// assert_eq!(container.get(&eleven).unwrap(), 11);
/// ```
pub fn declare_service_raw<T, D, F>(factory: F, deps: D) -> Declaration<T>
where
    T: Service,
    D: Dependencies + 'static,
    F: Fn(D::Resolved) -> T + 'static,
{
    let identifiers = deps.identifiers();
    Declaration::from_parts(
        identifiers,
        move |instances| {
            let resolved = D::unpack(instances)?;
            Ok(Rc::new(factory(resolved)) as Instance)
        },
    )
}

/// Like [declare_service_raw], for factories which can fail
///
/// A factory error aborts the whole `get` call and nothing is cached.
pub fn declare_service_try<T, E, D, F>(factory: F, deps: D) -> Declaration<T>
where
    T: Service,
    E: Into<DynError>,
    D: Dependencies + 'static,
    F: Fn(D::Resolved) -> Result<T, E> + 'static,
{
    let identifiers = deps.identifiers();
    Declaration::from_parts(
        identifiers,
        move |instances| {
            let resolved = D::unpack(instances)?;
            let service = factory(resolved).map_err(Into::<DynError>::into)?;
            Ok(Rc::new(service) as Instance)
        },
    )
}

/// Declare a service, specifying its dependencies by name
///
/// ```
/// use arbor_di::{create_token, declare_service, declare_value, Container, NamedDependencies};
///
/// let host = create_token::<String>("host");
/// let port = create_token::<u16>("port");
///
/// let address = declare_service(
///     NamedDependencies::new().with("host", host.clone()).with("port", port.clone()),
///     |deps| format!("{}:{}", deps.get::<String>("host"), deps.get::<u16>("port")),
/// );
///
/// let container = Container::new();
/// container.register(&host, declare_value("localhost".to_string())).unwrap();
/// container.register(&port, declare_value(8080_u16)).unwrap();
///
/// assert_eq!(container.get(&address).unwrap(), "localhost:8080");
/// ```
pub fn declare_service<T, F>(deps: NamedDependencies, factory: F) -> Declaration<T>
where
    T: Service,
    F: Fn(ResolvedDependencies) -> T + 'static,
{
    let (names, identifiers) = deps.into_parts();
    Declaration::from_parts(
        identifiers,
        move |instances| {
            let resolved = ResolvedDependencies::new(&names, instances);
            Ok(Rc::new(factory(resolved)) as Instance)
        },
    )
}

/// Declare a service which always resolves to a clone of `value`
pub fn declare_value<T: Service>(value: T) -> Declaration<T> {
    declare_service_raw(move |()| value.clone(), ())
}
