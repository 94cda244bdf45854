//! Resource registry: every resource the API serves, as data.
//!
//! Built once at process start and passed by reference into handlers; nothing
//! here is lazily constructed or globally mutable.

use crate::case::to_camel_case;
use crate::error::ConfigError;
use crate::schema::{loader, FieldSchema, ResourceConfig};
use std::collections::HashMap;
use std::path::Path;

/// A resource's config paired with its validation schema.
#[derive(Clone, Debug)]
pub struct ResourceSpec {
    pub config: ResourceConfig,
    pub schema: FieldSchema,
}

impl ResourceSpec {
    /// camelCase keys a POST binds and therefore must be present
    /// (insert columns minus a generated pk).
    pub fn insert_required_keys(&self) -> Vec<String> {
        self.config
            .insertable
            .iter()
            .filter(|c| !(self.config.pk_generated && **c == self.config.pk))
            .map(|c| to_camel_case(c))
            .collect()
    }

    /// camelCase keys a PUT binds: updatable columns plus the pk.
    pub fn update_required_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .updatable
            .iter()
            .map(|c| to_camel_case(c))
            .collect();
        keys.push(to_camel_case(&self.config.pk));
        keys
    }
}

pub struct Registry {
    resources: Vec<ResourceSpec>,
    by_path: HashMap<String, usize>,
}

impl Registry {
    pub fn new(resources: Vec<ResourceSpec>) -> Result<Self, ConfigError> {
        let mut by_path = HashMap::new();
        for (i, spec) in resources.iter().enumerate() {
            if by_path.insert(spec.config.path.clone(), i).is_some() {
                return Err(ConfigError::DuplicatePath(spec.config.path.clone()));
            }
        }
        Ok(Registry { resources, by_path })
    }

    /// Registry over the built-in e-commerce resources.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(crate::resources::builtin_specs())
    }

    pub fn get(&self, path: &str) -> Option<&ResourceSpec> {
        self.by_path.get(path).map(|i| &self.resources[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceSpec> {
        self.resources.iter()
    }

    /// Replace schemas from `validate-<path>-fields.json` files found in `dir`.
    /// Returns how many resources were overridden.
    pub fn load_rule_overrides(&mut self, dir: &Path) -> Result<usize, ConfigError> {
        let mut count = 0;
        for spec in &mut self.resources {
            if let Some(schema) = loader::load_rules_for(dir, &spec.config.path)? {
                spec.schema = schema;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_resolves_all_paths() {
        let reg = Registry::builtin().unwrap();
        for path in [
            "user",
            "user-address",
            "store",
            "store-address",
            "store-document",
            "store-staff",
            "product",
            "product-image",
            "order",
            "order-item",
        ] {
            assert!(reg.get(path).is_some(), "missing resource {path}");
        }
        assert!(reg.get("unknown").is_none());
    }

    #[test]
    fn duplicate_paths_rejected() {
        let reg = Registry::builtin().unwrap();
        let mut specs: Vec<ResourceSpec> = reg.iter().cloned().collect();
        specs.push(specs[0].clone());
        assert!(matches!(
            Registry::new(specs),
            Err(ConfigError::DuplicatePath(_))
        ));
    }

    #[test]
    fn required_keys_skip_generated_pk() {
        let reg = Registry::builtin().unwrap();
        let product = reg.get("product").unwrap();
        let keys = product.insert_required_keys();
        assert!(!keys.contains(&"id".to_string()));
        assert!(keys.contains(&"name".to_string()));

        // user_address pk is caller-supplied, so it stays required
        let ua = reg.get("user-address").unwrap();
        assert!(ua.insert_required_keys().contains(&"userId".to_string()));

        let put_keys = product.update_required_keys();
        assert!(put_keys.contains(&"id".to_string()));
        assert!(put_keys.contains(&"price".to_string()));
    }
}
