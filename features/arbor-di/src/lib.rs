//! Hierarchical dependency injection containers.
//!
//! Services are identified by [Token]s, or by their [Declaration]s directly, and
//! built lazily from factories with explicitly declared dependencies.
//! Containers form a tree: a child sees everything its ancestors provide and
//! shares their instances, unless it overrides the requested service or one of
//! its transitive dependencies - then the child builds and caches its own.
//!
//! arbor-di consists of the following parts:
//! 1. [Token] and [Declaration] - what can be requested, and how it is built
//! 2. [ContainerRef] - a dependency resolving to a [WeakContainer] handle of the
//!    container doing the resolving
//! 3. [Container] - registration, resolution and caching
//! 4. [ContainerBuilder] - registering everything up front
//!
//! ```
//! use std::rc::Rc;
//! use arbor_di::{create_token, declare_service_raw, Container};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let greeting = create_token::<String>("greeting");
//! let greeter = create_token::<Rc<Greeter>>("greeter");
//!
//! let root = Container::new();
//! root.register_value(&greeting, "hello".to_string()).unwrap();
//! root.register(
//!     &greeter,
//!     declare_service_raw(
//!         |(greeting,): (String,)| Rc::new(Greeter { greeting }),
//!         (greeting.clone(),),
//!     ),
//! )
//! .unwrap();
//!
//! // The child overrides a dependency, so it gets its own greeter
//! let child = root.create_child();
//! child.register_value(&greeting, "hi".to_string()).unwrap();
//!
//! assert_eq!(root.get(&greeter).unwrap().greeting, "hello");
//! assert_eq!(child.get(&greeter).unwrap().greeting, "hi");
//! ```

pub mod builder;
pub mod container;
pub mod container_ref;
pub mod declaration;
mod dependency_graph;
pub mod errors;
pub mod identifier;
pub mod name;
pub mod resolver;
pub mod token;
pub mod types;

pub use builder::ContainerBuilder;
pub use container::{Container, WeakContainer};
pub use container_ref::{container_ref, ContainerRef};
pub use declaration::{
    declare_service, declare_service_raw, declare_service_try, declare_value, Declaration,
};
pub use errors::{ResolveError, Result};
pub use identifier::{Identifier, Injectable};
pub use name::token_name;
pub use resolver::{
    named::{NamedDependencies, ResolvedDependencies},
    Dependencies,
};
pub use token::{create_token, Token};
pub use types::{DynError, Key, Service};
