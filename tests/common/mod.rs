//! Test fixtures: concrete models implementing the store's model
//! contract.

use serde_json::Value as Json;
use std::cell::RefCell;
use std::collections::BTreeMap;
use vantage::{Model, Value};

/// A model with a declared field layout, the usual shape of a validated
/// domain contract. Path-addressed writes go through the default
/// recursive mutator.
pub struct SchemaModel {
    schema: Vec<String>,
    fields: RefCell<BTreeMap<String, Value>>,
}

impl SchemaModel {
    pub fn new(schema: &[&str]) -> Self {
        Self {
            schema: schema.iter().map(|field| field.to_string()).collect(),
            fields: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn seeded(schema: &[&str], initial: Json) -> Self {
        let model = Self::new(schema);
        model.assign(Value::from_json(initial));
        model
    }
}

impl Model for SchemaModel {
    fn assign(&self, patch: Value) {
        if let Value::Mapping(entries) = patch {
            for (key, value) in entries.borrow().iter() {
                self.fields.borrow_mut().insert(key.clone(), value.clone());
            }
        }
    }

    fn is_valid(&self, scope: Option<&str>) -> bool {
        let fields = self.fields.borrow();
        match scope {
            Some(field) => fields.contains_key(field),
            None => self.schema.iter().all(|field| fields.contains_key(field)),
        }
    }

    fn schema_fields(&self) -> Option<Vec<String>> {
        Some(self.schema.clone())
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.fields.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> bool {
        self.fields.borrow_mut().insert(key.to_string(), value);
        true
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.fields.borrow_mut().remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }
}

/// A model without a path mutator: the store treats it as a
/// plain-mapping candidate and skips instrumentation.
pub struct AdHocModel {
    fields: RefCell<BTreeMap<String, Value>>,
}

impl AdHocModel {
    pub fn seeded(initial: Json) -> Self {
        let model = Self {
            fields: RefCell::new(BTreeMap::new()),
        };
        model.assign(Value::from_json(initial));
        model
    }
}

impl Model for AdHocModel {
    fn assign(&self, patch: Value) {
        if let Value::Mapping(entries) = patch {
            for (key, value) in entries.borrow().iter() {
                self.fields.borrow_mut().insert(key.clone(), value.clone());
            }
        }
    }

    fn is_valid(&self, _scope: Option<&str>) -> bool {
        true
    }

    fn has_path_mutator(&self) -> bool {
        false
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.fields.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> bool {
        self.fields.borrow_mut().insert(key.to_string(), value);
        true
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.fields.borrow_mut().remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }
}

/// Root model value with a declared `schema` and seeded fields.
pub fn schema_model(schema: &[&str], initial: Json) -> Value {
    Value::model(SchemaModel::seeded(schema, initial))
}
