//! Shared entity type for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use proxylist::Property;
use proxylist::model::{Entity, EntityBase, PropertyMap, SourceList, Value};

/// A string with a derived length and a year tag.
#[derive(Debug)]
pub struct StringValue {
    base: EntityBase,
    value: Property<String>,
    count: Property<i64>,
    year: Property<String>,
}

impl StringValue {
    pub fn new(s: &str) -> Self {
        Self {
            base: EntityBase::new(),
            value: Property::new(s.to_string()),
            count: Property::new(s.len() as i64),
            year: Property::new("2019".to_string()),
        }
    }

    pub fn shared(s: &str) -> Arc<Self> {
        Arc::new(Self::new(s))
    }

    pub fn value(&self) -> String {
        self.value.get()
    }

    pub fn set_value(&self, value: &str) {
        self.base.set_property(&self.value, value.to_string(), "Value");
    }

    pub fn count(&self) -> i64 {
        self.count.get()
    }

    pub fn set_count(&self, count: i64) {
        self.base.set_property(&self.count, count, "Count");
    }

    pub fn set_year(&self, year: &str) {
        self.base.set_property(&self.year, year.to_string(), "Year");
    }

    pub fn contains(&self, s: &str) -> bool {
        self.value.with(|value| value.contains(s))
    }
}

impl Entity for StringValue {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn property_map() -> &'static PropertyMap<Self> {
        static MAP: OnceLock<PropertyMap<StringValue>> = OnceLock::new();
        MAP.get_or_init(|| {
            PropertyMap::new()
                .with("Value", |s: &StringValue| Value::from(s.value.get()))
                .with("Count", |s: &StringValue| Value::from(s.count.get()))
                .with("Year", |s: &StringValue| Value::from(s.year.get()))
        })
    }
}

pub fn source_of(values: &[&str]) -> Arc<SourceList<StringValue>> {
    Arc::new(values.iter().map(|s| StringValue::shared(s)).collect())
}

pub fn values<'a>(items: impl IntoIterator<Item = &'a Arc<StringValue>>) -> Vec<String> {
    items.into_iter().map(|s| s.value()).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
