//! Process-wide codec registry.
//!
//! Registration happens at startup; afterwards the table is read from every
//! session concurrently. Both phases go through the same `RwLock`, so a late
//! registration is safe, it just shows up in the log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::codec::{register_builtins, PropertyCodec};

#[derive(Default)]
struct RegistryTables {
    by_tag: HashMap<String, Arc<dyn PropertyCodec>>,
    by_type: HashMap<String, Arc<dyn PropertyCodec>>,
}

/// Type tag / runtime type key → codec. Last registration for a key wins.
#[derive(Default)]
pub struct CodecRegistry {
    tables: RwLock<RegistryTables>,
    sealed: AtomicBool,
}

impl CodecRegistry {
    /// A registry with no codecs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the scalar and composite codecs.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        register_builtins(&registry);
        registry
    }

    /// Shared registry used when callers do not supply their own.
    pub fn global() -> &'static CodecRegistry {
        static GLOBAL: OnceLock<CodecRegistry> = OnceLock::new();
        GLOBAL.get_or_init(CodecRegistry::with_builtins)
    }

    /// Register a codec for an explicit type tag.
    pub fn register(&self, tag: &str, codec: Arc<dyn PropertyCodec>) {
        self.warn_if_sealed(tag);
        let replaced = self
            .tables
            .write()
            .by_tag
            .insert(tag.to_string(), codec)
            .is_some();
        tracing::trace!(tag = %tag, replaced, "Registered codec by tag");
    }

    /// Register a codec for a runtime type key.
    pub fn register_by_runtime_type(&self, type_key: &str, codec: Arc<dyn PropertyCodec>) {
        self.warn_if_sealed(type_key);
        let replaced = self
            .tables
            .write()
            .by_type
            .insert(type_key.to_string(), codec)
            .is_some();
        tracing::trace!(type_key = %type_key, replaced, "Registered codec by runtime type");
    }

    /// Register under the codec's own tag and under `type_key`.
    pub fn register_both(&self, type_key: &str, codec: Arc<dyn PropertyCodec>) {
        let tag = codec.type_tag().to_string();
        self.register(&tag, Arc::clone(&codec));
        self.register_by_runtime_type(type_key, codec);
    }

    pub fn resolve(&self, tag: &str) -> Option<Arc<dyn PropertyCodec>> {
        self.tables.read().by_tag.get(tag).cloned()
    }

    pub fn resolve_by_type(&self, type_key: &str) -> Option<Arc<dyn PropertyCodec>> {
        self.tables.read().by_type.get(type_key).cloned()
    }

    /// End the registration phase.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::SeqCst);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    fn warn_if_sealed(&self, key: &str) {
        if self.is_sealed() {
            tracing::warn!(key = %key, "Codec registered after registry was sealed");
        }
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        let mut tags: Vec<_> = tables.by_tag.keys().collect();
        tags.sort();
        let mut types: Vec<_> = tables.by_type.keys().collect();
        types.sort();
        f.debug_struct("CodecRegistry")
            .field("tags", &tags)
            .field("types", &types)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, PropertyLoader, PropertyWriter};
    use crate::property::PropertyValue;
    use crate::wire::Element;

    struct FixedCodec(&'static str);

    impl PropertyCodec for FixedCodec {
        fn type_tag(&self) -> &str {
            "fixed"
        }

        fn decode(
            &self,
            _loader: &PropertyLoader<'_>,
            _property: &Element,
        ) -> Result<PropertyValue, CodecError> {
            Ok(PropertyValue::from(self.0))
        }

        fn encode(
            &self,
            _writer: &PropertyWriter<'_>,
            _value: &PropertyValue,
            property: &mut Element,
        ) -> Result<(), CodecError> {
            property.set_text(self.0);
            Ok(())
        }
    }

    #[test]
    fn last_registration_wins() {
        let registry = CodecRegistry::empty();
        registry.register("fixed", Arc::new(FixedCodec("first")));
        registry.register("fixed", Arc::new(FixedCodec("second")));

        let codec = registry.resolve("fixed").expect("codec");
        let loader = PropertyLoader::new(&registry);
        let value = codec.decode(&loader, &Element::new("p")).unwrap();
        assert_eq!(value, PropertyValue::from("second"));
    }

    #[test]
    fn tag_and_type_tables_are_independent() {
        let registry = CodecRegistry::empty();
        registry.register_by_runtime_type("Gradient", Arc::new(FixedCodec("g")));

        assert!(registry.resolve("Gradient").is_none());
        assert!(registry.resolve_by_type("Gradient").is_some());
    }

    #[test]
    fn builtins_cover_composites_and_scalars() {
        let registry = CodecRegistry::with_builtins();
        for tag in ["b", "i", "n", "s", "Alignment", "Border", "Font", "Date", "Map"] {
            assert!(registry.resolve(tag).is_some(), "missing codec for {}", tag);
        }
        assert!(registry.resolve_by_type("Insets").is_some());
        assert!(registry.resolve("zzz").is_none());
    }

    #[test]
    fn sealed_registry_still_accepts_registration() {
        let registry = CodecRegistry::empty();
        registry.seal();
        registry.register("fixed", Arc::new(FixedCodec("late")));
        assert!(registry.is_sealed());
        assert!(registry.resolve("fixed").is_some());
    }
}
