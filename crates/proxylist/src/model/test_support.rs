//! Entity type shared by the unit tests of the model module.

use std::sync::{Arc, OnceLock};

use proxylist_core::Property;

use super::entity::{Entity, EntityBase, PropertyMap};
use super::value::Value;

#[derive(Debug)]
pub(crate) struct Word {
    base: EntityBase,
    text: Property<String>,
    rank: Property<i64>,
}

impl Word {
    pub(crate) fn new(text: &str, rank: i64) -> Self {
        Self {
            base: EntityBase::new(),
            text: Property::new(text.to_string()),
            rank: Property::new(rank),
        }
    }

    pub(crate) fn shared(text: &str, rank: i64) -> Arc<Self> {
        Arc::new(Self::new(text, rank))
    }

    pub(crate) fn text(&self) -> String {
        self.text.get()
    }

    pub(crate) fn set_text(&self, text: &str) {
        self.base.set_property(&self.text, text.to_string(), "Text");
    }

    pub(crate) fn set_rank(&self, rank: i64) {
        self.base.set_property(&self.rank, rank, "Rank");
    }
}

impl Entity for Word {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn property_map() -> &'static PropertyMap<Self> {
        static MAP: OnceLock<PropertyMap<Word>> = OnceLock::new();
        MAP.get_or_init(|| {
            PropertyMap::new()
                .with("Text", |w: &Word| Value::from(w.text.get()))
                .with("Rank", |w: &Word| Value::from(w.rank.get()))
        })
    }
}

pub(crate) fn texts<'a>(items: impl IntoIterator<Item = &'a Arc<Word>>) -> Vec<String> {
    items.into_iter().map(|w| w.text()).collect()
}
