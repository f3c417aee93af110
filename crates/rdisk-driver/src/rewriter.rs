//! ModelRewriter - the hook installed on the target's `Model` key

use rdisk_props::{dlog, PropertyValue, Symbol};

/// Adds the configured prefix to a model string
///
/// Installed as the context of the `Model` hook, so it lives exactly as long
/// as some hookable map still holds that hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRewriter {
    prefix: String,
    owner: String,
}

impl ModelRewriter {
    /// Rewriter for `prefix`, logging under `owner`
    #[must_use]
    pub fn new(prefix: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            owner: owner.into(),
        }
    }

    /// Compute the value to store for `key`
    ///
    /// Strings that do not already start with the prefix (byte-exact) become
    /// `"<prefix> (<original>)"`. Everything else, including non-string
    /// values, is returned unchanged.
    #[must_use]
    pub fn rewrite(&self, key: &Symbol, value: PropertyValue) -> PropertyValue {
        match value {
            PropertyValue::String(model) => PropertyValue::String(self.prefixed(key, model)),
            other => {
                tracing::warn!(
                    "{}::rewrite - {key} value is {}, not a string ... cannot update",
                    self.owner,
                    other.type_name()
                );
                other
            }
        }
    }

    fn prefixed(&self, key: &Symbol, model: String) -> String {
        if model.as_bytes().starts_with(self.prefix.as_bytes()) {
            dlog!("{}::rewrite - prefix found ... not updating", self.owner);
            return model;
        }

        let required = self.prefix.len() + model.len() + " ()".len();
        let mut buffer = String::new();
        if buffer.try_reserve_exact(required).is_err() {
            tracing::error!(
                "{}::rewrite - failed to allocate {required} bytes for new {key}",
                self.owner
            );
            return model;
        }
        buffer.push_str(&self.prefix);
        buffer.push_str(" (");
        buffer.push_str(&model);
        buffer.push(')');

        dlog!(
            "{}::rewrite - changing '{key}' from '{model}' to '{buffer}'",
            self.owner
        );
        buffer
    }
}

/// Plain-function form of [`ModelRewriter::rewrite`], for
/// [`HookableMap::add_hook`](rdisk_props::HookableMap::add_hook)
pub fn fix_model(rewriter: &ModelRewriter, key: &Symbol, value: PropertyValue) -> PropertyValue {
    rewriter.rewrite(key, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rewriter() -> ModelRewriter {
        ModelRewriter::new("APPLE SSD", "NewIOBlockStorageDriver")
    }

    fn model() -> Symbol {
        Symbol::from("Model")
    }

    #[test]
    fn adds_prefix() {
        let out = rewriter().rewrite(&model(), PropertyValue::from("ST1000"));
        assert_eq!(out, PropertyValue::from("APPLE SSD (ST1000)"));
    }

    #[test]
    fn already_prefixed_is_unchanged() {
        let out = rewriter().rewrite(&model(), PropertyValue::from("APPLE SSD SM256E"));
        assert_eq!(out, PropertyValue::from("APPLE SSD SM256E"));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let out = rewriter().rewrite(&model(), PropertyValue::from("apple ssd x"));
        assert_eq!(out, PropertyValue::from("APPLE SSD (apple ssd x)"));
    }

    #[test]
    fn shorter_than_prefix() {
        let out = rewriter().rewrite(&model(), PropertyValue::from("APPLE"));
        assert_eq!(out, PropertyValue::from("APPLE SSD (APPLE)"));
    }

    #[test]
    fn empty_model() {
        let out = rewriter().rewrite(&model(), PropertyValue::from(""));
        assert_eq!(out, PropertyValue::from("APPLE SSD ()"));
    }

    #[test]
    fn non_string_passes_through() {
        let out = rewriter().rewrite(&model(), PropertyValue::from(42u64));
        assert_eq!(out, PropertyValue::from(42u64));

        let data = PropertyValue::from(vec![0x53u8, 0x54]);
        assert_eq!(rewriter().rewrite(&model(), data.clone()), data);
    }

    #[test]
    fn fix_model_matches_rewrite() {
        let r = rewriter();
        assert_eq!(
            fix_model(&r, &model(), PropertyValue::from("WDC WD10")),
            r.rewrite(&model(), PropertyValue::from("WDC WD10"))
        );
    }

    proptest! {
        #[test]
        fn rewrite_is_idempotent(s in ".{0,40}") {
            let r = rewriter();
            let once = r.rewrite(&model(), PropertyValue::from(s.as_str()));
            let twice = r.rewrite(&model(), once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn unprefixed_strings_are_wrapped(s in "[A-Za-z0-9 -]{0,40}") {
            prop_assume!(!s.starts_with("APPLE SSD"));
            let out = rewriter().rewrite(&model(), PropertyValue::from(s.as_str()));
            prop_assert_eq!(out, PropertyValue::from(format!("APPLE SSD ({s})")));
        }
    }
}
