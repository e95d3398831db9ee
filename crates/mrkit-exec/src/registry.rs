//! Producer registry: stable name → producer instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ExecError, Result};
use crate::producer::Producer;
use crate::producers::{AlwaysFailProducer, EmailDomainProducer, UppercaseProducer};

#[derive(Clone, Default)]
pub struct Registry {
    producers: BTreeMap<String, Arc<dyn Producer>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every producer shipped with mrkit.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register(EmailDomainProducer);
        reg.register(UppercaseProducer);
        reg.register(AlwaysFailProducer);
        reg
    }

    /// Register under the producer's own name, replacing any previous entry.
    pub fn register<P: Producer>(&mut self, producer: P) -> &mut Self {
        self.producers
            .insert(producer.name().to_string(), Arc::new(producer));
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Producer>> {
        self.producers
            .get(name)
            .cloned()
            .ok_or_else(|| ExecError::UnknownProducer(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.producers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names() {
        let reg = Registry::builtin();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, ["always-fail", "email-domain", "uppercase"]);
        assert_eq!(reg.get("email-domain").unwrap().output_column(), "derived:domain");
        assert!(matches!(
            reg.get("nope"),
            Err(ExecError::UnknownProducer(n)) if n == "nope"
        ));
    }
}
