//! Heterogeneous row storage.
//!
//! A section stores rows of different concrete types side by side. Each row
//! lives behind an [`Item`], a cheap clonable handle to a type-erased
//! [`Content`]. Views recover the concrete type with [`Item::downcast_ref`]
//! or look up a render recipe by the item's [`ContentType`].
//!
//! # Example
//!
//! ```
//! use tableflow::model::{ContentType, Item};
//!
//! #[derive(Debug, PartialEq)]
//! struct Person {
//!     name: String,
//! }
//!
//! let rows = vec![
//!     Item::new("Header text"),
//!     Item::new(Person { name: "Ada".into() }),
//!     Item::new(42u32),
//! ];
//!
//! assert!(rows[0].is::<&str>());
//! assert_eq!(rows[1].downcast_ref::<Person>().map(|p| p.name.as_str()), Some("Ada"));
//! assert_eq!(rows[2].content_type(), ContentType::of::<u32>());
//! assert_eq!(rows[2], Item::new(42u32));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Content that can occupy a row, header or footer.
///
/// Implemented automatically for every `PartialEq + Debug + Send + Sync`
/// type. Equality is needed to find rows by value; rows of different types
/// never compare equal.
pub trait Content: Any + fmt::Debug + Send + Sync {
    /// Compares with another content of possibly different type.
    fn dyn_eq(&self, other: &dyn Content) -> bool;

    /// Returns this content as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the stable type tag of this content.
    fn content_type(&self) -> ContentType;
}

impl<T> Content for T
where
    T: Any + PartialEq + fmt::Debug + Send + Sync,
{
    fn dyn_eq(&self, other: &dyn Content) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn content_type(&self) -> ContentType {
        ContentType::of::<T>()
    }
}

/// A stable type tag for content.
///
/// Two tags are equal when they describe the same Rust type. The type name is
/// kept for diagnostics only and never used for lookups.
#[derive(Clone, Copy)]
pub struct ContentType {
    id: TypeId,
    name: &'static str,
}

impl ContentType {
    /// Returns the tag for `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the full type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContentType {}

impl Hash for ContentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentType({})", self.name)
    }
}

/// A shared handle to one piece of row content.
///
/// Cloning an item clones the handle, not the content.
#[derive(Clone)]
pub struct Item(Arc<dyn Content>);

impl Item {
    /// Wraps a value.
    ///
    /// Wrapping an `Item` returns a clone of it instead of nesting.
    pub fn new<T: Content>(value: T) -> Self {
        if let Some(item) = (&value as &dyn Any).downcast_ref::<Item>() {
            return item.clone();
        }
        Self(Arc::new(value))
    }

    /// Attempts to downcast the content to the specified type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the content is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Returns the content's type tag.
    pub fn content_type(&self) -> ContentType {
        self.0.content_type()
    }

    /// Returns the content as a string slice if it is a `String` or `&str`.
    pub fn as_str(&self) -> Option<&str> {
        self.downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| self.downcast_ref::<&'static str>().copied())
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Item) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the type-erased content.
    pub fn content(&self) -> &dyn Content {
        self.0.as_ref()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.dyn_eq(other.0.as_ref())
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Login {
        email: String,
    }

    #[test]
    fn test_equality_by_value_and_type() {
        assert_eq!(Item::new(1u8), Item::new(1u8));
        assert_ne!(Item::new(1u8), Item::new(2u8));
        assert_ne!(Item::new(1u8), Item::new(1u16));
        assert_eq!(
            Item::new(Login { email: "a@b.c".into() }),
            Item::new(Login { email: "a@b.c".into() })
        );
    }

    #[test]
    fn test_downcast() {
        let item = Item::new(Login { email: "x".into() });
        assert!(item.is::<Login>());
        assert!(!item.is::<String>());
        assert_eq!(item.downcast_ref::<Login>().map(|l| l.email.as_str()), Some("x"));
        assert!(item.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_wrapping_item_does_not_nest() {
        let inner = Item::new("hello");
        let outer = Item::new(inner.clone());
        assert!(outer.ptr_eq(&inner));
        assert!(outer.is::<&str>());
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Item::new("a").as_str(), Some("a"));
        assert_eq!(Item::new(String::from("b")).as_str(), Some("b"));
        assert_eq!(Item::new(3i32).as_str(), None);
    }

    #[test]
    fn test_content_type_names() {
        let tag = ContentType::of::<Login>();
        assert_eq!(tag.short_name(), "Login");
        assert_eq!(Item::new(Login { email: String::new() }).content_type(), tag);
        assert_ne!(tag, ContentType::of::<String>());
        assert_eq!(ContentType::of::<Vec<u8>>().short_name(), "Vec");
    }
}
