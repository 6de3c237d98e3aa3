//! Render recipes keyed by content type.
//!
//! A [`RenderRegistry`] maps a [`ContentType`] to a recipe: the reuse
//! identifier of the view that shows that content, and a function filling
//! such a view with it. Lookups go by type tag, never by type name.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::{ContentType, Item};

type Assemble<V> = Arc<dyn Fn(&mut V, &Item) + Send + Sync>;

struct Recipe<V> {
    reuse_identifier: String,
    assemble: Assemble<V>,
}

/// Recipes for filling views of type `V` with content.
pub struct RenderRegistry<V> {
    recipes: HashMap<ContentType, Recipe<V>>,
}

impl<V> Default for RenderRegistry<V> {
    fn default() -> Self {
        Self {
            recipes: HashMap::new(),
        }
    }
}

impl<V: 'static> RenderRegistry<V> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recipe for content of type `T` under the type's short
    /// name as reuse identifier.
    pub fn register<T, F>(&mut self, assemble: F)
    where
        T: Any,
        F: Fn(&mut V, &T) + Send + Sync + 'static,
    {
        let reuse_identifier = ContentType::of::<T>().short_name();
        self.register_as::<T, F>(reuse_identifier, assemble);
    }

    /// Registers a recipe for content of type `T` under `reuse_identifier`.
    ///
    /// Replaces any recipe previously registered for `T`.
    pub fn register_as<T, F>(&mut self, reuse_identifier: impl Into<String>, assemble: F)
    where
        T: Any,
        F: Fn(&mut V, &T) + Send + Sync + 'static,
    {
        let assemble: Assemble<V> = Arc::new(move |view: &mut V, item: &Item| {
            if let Some(content) = item.downcast_ref::<T>() {
                assemble(view, content);
            }
        });
        self.recipes.insert(
            ContentType::of::<T>(),
            Recipe {
                reuse_identifier: reuse_identifier.into(),
                assemble,
            },
        );
    }

    /// Removes the recipe for `T`. Returns `true` if one existed.
    pub fn unregister<T: Any>(&mut self) -> bool {
        self.recipes.remove(&ContentType::of::<T>()).is_some()
    }

    /// Returns `true` if a recipe for `T` exists.
    pub fn contains<T: Any>(&self) -> bool {
        self.recipes.contains_key(&ContentType::of::<T>())
    }

    /// Returns the reuse identifier for the content of `item`.
    pub fn reuse_identifier_for(&self, item: &Item) -> Option<&str> {
        self.recipes
            .get(&item.content_type())
            .map(|recipe| recipe.reuse_identifier.as_str())
    }

    /// Fills `view` with `item`. Returns `false` if no recipe matches.
    pub fn assemble(&self, view: &mut V, item: &Item) -> bool {
        match self.recipes.get(&item.content_type()) {
            Some(recipe) => {
                (recipe.assemble)(view, item);
                true
            }
            None => false,
        }
    }

    /// Number of registered recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl<V> fmt::Debug for RenderRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.recipes
                    .iter()
                    .map(|(content_type, recipe)| {
                        (content_type.short_name(), &recipe.reuse_identifier)
                    }),
            )
            .finish()
    }
}
