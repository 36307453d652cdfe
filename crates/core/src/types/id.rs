//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<&str>` and `From<String>` implementations
///
/// Catalog identifiers are opaque strings such as `"ank-012"`, stable across
/// sessions, so the wrapper never interprets their contents.
///
/// # Example
///
/// ```rust
/// # use aioko_core::define_id;
/// define_id!(DesignId);
/// define_id!(CategoryKey);
///
/// let design = DesignId::new("ank-001");
/// let category = CategoryKey::new("ank-001");
///
/// assert_eq!(design.as_str(), category.as_str());
/// // These are different types, so this won't compile:
/// // let _: DesignId = category;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_serializes_as_plain_string() {
        let id = ProductId::new("ank-001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ank-001\"");

        let parsed: ProductId = serde_json::from_str("\"lace-7\"").unwrap();
        assert_eq!(parsed, ProductId::from("lace-7"));
    }

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::new("a").to_string(), "a");
        assert_eq!(ProductId::from(String::from("b")).into_inner(), "b");
    }
}
