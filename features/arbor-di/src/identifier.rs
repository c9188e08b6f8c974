use std::{
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    rc::Rc,
};

use crate::{
    declaration::RawDeclaration,
    name::token_name,
    types::{Key, Service},
};

/// Anything a container can be asked for: a [Token](crate::Token), a
/// [Declaration](crate::Declaration) or a [ContainerRef](crate::ContainerRef)
pub trait Injectable {
    /// Type of the resolved value
    type Output: Service;

    /// The type-erased identity of this injectable
    fn identifier(&self) -> Identifier;
}

/// Type-erased identifier
///
/// Equality and hashing only look at the [Key], so two identifiers are equal
/// iff they were cloned from the same token, declaration or container reference.
#[derive(Clone)]
pub struct Identifier {
    key: Key,
    name: Option<Rc<str>>,
    kind: IdentifierKind,
}

#[derive(Clone)]
pub(crate) enum IdentifierKind {
    Token,
    /// A declaration which can act as its own registration key
    Declaration(Rc<RawDeclaration>),
    /// Resolves to the container doing the resolving
    Container(Rc<[Identifier]>),
}

impl Identifier {
    pub(crate) fn new(key: Key, name: Option<Rc<str>>, kind: IdentifierKind) -> Self {
        Self { key, name, kind }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Debug name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_container_ref(&self) -> bool {
        matches!(self.kind, IdentifierKind::Container(_))
    }

    pub(crate) fn kind(&self) -> &IdentifierKind {
        &self.kind
    }

    pub(crate) fn as_declaration(&self) -> Option<&Rc<RawDeclaration>> {
        match &self.kind {
            IdentifierKind::Declaration(declaration) => Some(declaration),
            _ => None,
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(token_name(self))
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            IdentifierKind::Token => "Token",
            IdentifierKind::Declaration(_) => "Declaration",
            IdentifierKind::Container(_) => "ContainerRef",
        };
        f.debug_tuple(kind)
            .field(&token_name(self))
            .field(&self.key)
            .finish()
    }
}
