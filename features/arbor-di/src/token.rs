use std::{marker::PhantomData, rc::Rc};

use crate::{
    identifier::{Identifier, IdentifierKind, Injectable},
    types::{Key, Service},
};

/// Abstract key for a service of type `T`
///
/// Tokens are compared by identity: two tokens created with the same name are
/// still different tokens. Clones share the identity of the original.
pub struct Token<T> {
    key: Key,
    name: Option<Rc<str>>,
    _marker: PhantomData<fn() -> T>,
}

/// Create a token for referencing a service in a [Container](crate::Container)
///
/// The name is only used for debugging and error messages.
pub fn create_token<T: Service>(name: impl Into<String>) -> Token<T> {
    Token::new(Some(Rc::from(name.into())))
}

impl<T: Service> Token<T> {
    /// A token without a debug name
    pub fn unnamed() -> Self {
        Self::new(None)
    }

    fn new(name: Option<Rc<str>>) -> Self {
        Token {
            key: Key::next(),
            name,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<T: Service> Injectable for Token<T> {
    type Output = T;

    fn identifier(&self) -> Identifier {
        Identifier::new(self.key, self.name.clone(), IdentifierKind::Token)
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish()
    }
}

impl<T> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl<T> Eq for Token<T> {}
