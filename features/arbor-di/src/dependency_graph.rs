use std::collections::HashSet;

use crate::{
    container::Container,
    errors::{ResolveError, Result},
    identifier::{Identifier, IdentifierKind},
    types::Key,
};

/// Depth first walk over everything an identifier transitively depends on
///
/// Used to detect cycles, and to find out whether a container overrides any
/// dependency of a requested identifier.
/// Providers are always looked up starting from the container the walk began
/// on, so overrides are judged against the caller's provider table.
pub(crate) struct DependencyWalk<'a> {
    start: &'a Container,
}

impl<'a> DependencyWalk<'a> {
    pub(crate) fn new(start: &'a Container) -> Self {
        Self { start }
    }

    /// Returns all transitive dependencies - can contain duplicates
    pub(crate) fn collect(&self, identifier: &Identifier) -> Result<Vec<Identifier>> {
        let mut found = Vec::new();
        self.visit(self.start, identifier, &[], &HashSet::new(), &mut found)?;
        Ok(found)
    }

    fn visit(
        &self,
        container: &Container,
        identifier: &Identifier,
        chain: &[Identifier],
        excludes: &HashSet<Key>,
        found: &mut Vec<Identifier>,
    ) -> Result<()> {
        // Circular Dependency Check
        if chain.contains(identifier) {
            let err = ResolveError::cyclic(chain, identifier);
            tracing::debug!("{err}");
            return Err(err);
        }

        // Container refs always resolve to the container itself, providers
        // registered under them are never used.
        // The chain restarts here. The service which asked for the container
        // may be required by the container's deps without forming a cycle.
        if let IdentifierKind::Container(deps) = identifier.kind() {
            let mut excludes = excludes.clone();
            excludes.extend(chain.last().map(Identifier::key));
            return self.visit_all(deps, &[], &excludes, found);
        }

        if let Some(declaration) = container.own_provider(identifier.key()) {
            let chain = extend(chain, identifier);
            return self.visit_all(&declaration.deps, &chain, excludes, found);
        }

        // Anonymous declaration nobody registered yet - it will live in the root
        if let IdentifierKind::Declaration(declaration) = identifier.kind() {
            if !container.lineage_provides(identifier.key()) {
                container.ensure_registered(identifier);
                let chain = extend(chain, identifier);
                return self.visit_all(&declaration.deps, &chain, excludes, found);
            }
        }

        match container.parent() {
            Some(parent) => self.visit(parent, identifier, chain, excludes, found),
            None => {
                tracing::error!("Tried to resolve an unregistered identifier: {identifier}");
                Err(ResolveError::provider_not_found(identifier))
            }
        }
    }

    fn visit_all(
        &self,
        deps: &[Identifier],
        chain: &[Identifier],
        excludes: &HashSet<Key>,
        found: &mut Vec<Identifier>,
    ) -> Result<()> {
        for dependency in deps {
            if excludes.contains(&dependency.key()) {
                continue;
            }
            found.push(dependency.clone());
            self.visit(self.start, dependency, chain, excludes, found)?;
        }
        Ok(())
    }
}

fn extend(chain: &[Identifier], link: &Identifier) -> Vec<Identifier> {
    let mut extended = chain.to_vec();
    extended.push(link.clone());
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        container::WeakContainer, container_ref, create_token, declare_service_raw, declare_value,
        Injectable,
    };

    fn names(found: &[Identifier]) -> Vec<String> {
        found.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn lists_transitive_dependencies_with_duplicates() {
        let ten = create_token::<i32>("10");
        let eleven = create_token::<i32>("11");
        let twenty_one = create_token::<i32>("21");

        let root = Container::new();
        root.register(&ten, declare_value(10)).unwrap();
        root.register(&eleven, declare_service_raw(|(ten,): (i32,)| ten + 1, (ten.clone(),)))
            .unwrap();
        root.register(
            &twenty_one,
            declare_service_raw(|(a, b): (i32, i32)| a + b, (ten.clone(), eleven.clone())),
        )
        .unwrap();

        let found = DependencyWalk::new(&root)
            .collect(&twenty_one.identifier())
            .unwrap();
        assert_eq!(names(&found), vec!["10", "11", "10"]);
    }

    #[test]
    fn reports_the_full_chain_on_cycles() {
        let a = create_token::<i32>("a");
        let b = create_token::<i32>("b");
        let c = create_token::<i32>("c");

        let root = Container::new();
        root.register(&a, declare_service_raw(|(b,): (i32,)| b, (b.clone(),)))
            .unwrap();
        root.register(&b, declare_service_raw(|(c,): (i32,)| c, (c.clone(),)))
            .unwrap();
        root.register(&c, declare_service_raw(|(b,): (i32,)| b, (b.clone(),)))
            .unwrap();

        let err = DependencyWalk::new(&root).collect(&a.identifier()).unwrap_err();
        match err {
            ResolveError::CyclicDependency { chain } => {
                assert_eq!(chain, vec!["a", "b", "c", "b"]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn container_refs_exclude_the_service_asking_for_them() {
        let other = create_token::<i32>("other");
        let uses_container = declare_service_raw(
            |(_c,): (WeakContainer,)| 1,
            (container_ref((other.clone(),)),),
        )
        .named("uses_container");

        let root = Container::new();
        root.register(
            &other,
            declare_service_raw(|(n,): (i32,)| n, (uses_container.clone(),)),
        )
        .unwrap();

        let found = DependencyWalk::new(&root)
            .collect(&uses_container.identifier())
            .unwrap();
        assert_eq!(names(&found), vec!["Container(other)", "other"]);
    }

    #[test]
    fn providers_under_container_refs_are_ignored() {
        let missing = create_token::<u8>("missing");
        let self_ref = container_ref(());
        let uses_container =
            declare_service_raw(|(c,): (WeakContainer,)| c, (self_ref.clone(),));

        let root = Container::new();
        root.register(
            &self_ref,
            declare_service_raw(
                |(_,): (u8,)| -> WeakContainer { panic!("never built") },
                (missing.clone(),),
            ),
        )
        .unwrap();

        let found = DependencyWalk::new(&root)
            .collect(&uses_container.identifier())
            .unwrap();
        assert_eq!(found, vec![self_ref.identifier()]);
        assert_eq!(root.get(&uses_container).unwrap(), root);
    }

    #[test]
    fn unknown_identifiers_fail_at_the_root() {
        let missing = create_token::<i32>("missing");
        let root = Container::new();
        let child = root.create_child();

        let err = DependencyWalk::new(&child)
            .collect(&missing.identifier())
            .unwrap_err();
        assert_eq!(err.to_string(), "Provider for \"missing\" not found");
    }
}
