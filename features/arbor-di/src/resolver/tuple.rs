use crate::{
    errors::ResolveError,
    identifier::{Identifier, Injectable},
    resolver::Dependencies,
    types::{downcast_instance, Instance},
};

macro_rules! impl_dependencies {
    ($($dep:ident),*) => {
        impl<$($dep: Injectable),*> Dependencies for ($($dep,)*) {
            type Resolved = ($(<$dep as Injectable>::Output,)*);

            #[allow(non_snake_case)]
            fn identifiers(&self) -> Vec<Identifier> {
                let ($($dep,)*) = self;
                vec![$($dep.identifier()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn unpack(instances: Vec<Instance>) -> Result<Self::Resolved, ResolveError> {
                let mut instances = instances.iter();
                Ok(($(downcast_instance::<<$dep as Injectable>::Output>(instances.next())?,)*))
            }
        }
    };
}

impl_dependencies!();
impl_dependencies!(D1);
impl_dependencies!(D1, D2);
impl_dependencies!(D1, D2, D3);
impl_dependencies!(D1, D2, D3, D4);
impl_dependencies!(D1, D2, D3, D4, D5);
impl_dependencies!(D1, D2, D3, D4, D5, D6);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12);

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::create_token;

    #[test]
    fn keeps_declared_order() {
        let a = create_token::<u8>("a");
        let b = create_token::<String>("b");
        let ids = (a.clone(), b.clone()).identifiers();
        assert_eq!(ids, vec![a.identifier(), b.identifier()]);
        assert!(().identifiers().is_empty());
    }

    #[test]
    fn unpacks_positionally() {
        let instances: Vec<Instance> = vec![Rc::new(1_u8) as Instance, Rc::new("two".to_string())];
        let (one, two) = <(crate::Token<u8>, crate::Token<String>)>::unpack(instances).unwrap();
        assert_eq!(one, 1);
        assert_eq!(two, "two");
    }

    #[test]
    fn rejects_mismatched_instances() {
        let instances: Vec<Instance> = vec![Rc::new("not a number") as Instance];
        let err = <(crate::Token<u8>,)>::unpack(instances).unwrap_err();
        assert!(matches!(err, ResolveError::DowncastFailed { .. }));
    }
}
