//! Color facets derived from heterogeneous product color data.
//!
//! Products describe their colors as a `colorTags` list, a `colors` list, or
//! a single `color` string such as `"Blue/White"`. Products with none of
//! these fall back to scanning their name for common color words. Every
//! product reduces to a *combination key*: its normalized colors sorted and
//! joined with `" & "` (e.g. `"blue & white"`), and facets are tallied per key.
//!
//! Facet matching is deliberately loose. A facet matches any product whose
//! combination key contains the facet's colors, so the `blue` facet also
//! lists `blue & white` products.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::Product;

/// Facet id that matches every product.
pub const ALL_FACET_ID: &str = "all";

/// Facet id for products with no detectable color.
pub const OTHER_FACET_ID: &str = "other";

/// Label of the synthetic all-products facet.
pub const ALL_COLORS_LABEL: &str = "All Colors";

/// Color words recognised in product names.
pub const COLOR_KEYWORDS: [&str; 31] = [
    "red", "blue", "green", "yellow", "black", "white", "purple", "pink", "orange", "brown",
    "grey", "gray", "gold", "silver", "navy", "maroon", "teal", "turquoise", "violet", "indigo",
    "magenta", "cyan", "beige", "cream", "khaki", "olive", "lime", "mint", "lavender", "coral",
    "peach",
];

/// Swatch used when a color has no entry in the swatch table.
pub const DEFAULT_SWATCH: &str = "#7D3CFF";

const SWATCHES: [(&str, &str); 10] = [
    ("blue", "#2563eb"),
    ("red", "#dc2626"),
    ("green", "#16a34a"),
    ("yellow", "#ca8a04"),
    ("purple", "#7c3aed"),
    ("pink", "#db2777"),
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("brown", "#92400e"),
    ("orange", "#ea580c"),
];

const COMBINATION_SEPARATOR: &str = " & ";

static ID_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[& ]+").expect("Invalid regex"));
static ID_INVALID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z\-]").expect("Invalid regex"));

/// A selectable color filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorFacet {
    /// URL/DOM-safe token, e.g. `blue-white`.
    pub id: String,
    /// Label, e.g. `Blue & white`.
    pub display_name: String,
    /// Products in the collection grouped under this facet.
    pub count: usize,
}

impl ColorFacet {
    /// Swatch for the facet's leading color.
    ///
    /// Combinations take the first color of the label (`Blue & white` is
    /// blue). `all` and `other` get the default swatch.
    #[must_use]
    pub fn swatch(&self) -> &'static str {
        if self.id == ALL_FACET_ID || self.id == OTHER_FACET_ID {
            return DEFAULT_SWATCH;
        }
        self.display_name
            .split(COMBINATION_SEPARATOR)
            .next()
            .map_or(DEFAULT_SWATCH, |color| swatch(color.trim()))
    }
}

/// Colors as declared by the product, before normalization.
///
/// Precedence: `colorTags`, then `colors`, then the `color` string split on
/// `,` `/` `&`, then color words found in the name.
#[must_use]
pub fn raw_colors(product: &Product) -> Vec<String> {
    if let Some(tags) = &product.color_tags {
        return tags.clone();
    }
    if let Some(colors) = &product.colors {
        return colors.clone();
    }
    if let Some(color) = product.color.as_deref().filter(|c| !c.is_empty()) {
        return color
            .split([',', '/', '&'])
            .map(|part| part.trim().to_owned())
            .collect();
    }
    colors_in_name(&product.name)
}

/// Color keywords appearing anywhere in `name`, in vocabulary order.
#[must_use]
pub fn colors_in_name(name: &str) -> Vec<String> {
    let name = name.to_lowercase();
    COLOR_KEYWORDS
        .iter()
        .filter(|keyword| name.contains(*keyword))
        .map(|keyword| (*keyword).to_owned())
        .collect()
}

/// Lowercase, keep only letters, whitespace and `&`, then trim.
#[must_use]
pub fn normalize_color(color: &str) -> String {
    color
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace() || *c == '&')
        .collect::<String>()
        .trim()
        .to_owned()
}

/// The product's normalized, non-empty color tokens.
#[must_use]
pub fn color_tokens(product: &Product) -> Vec<String> {
    raw_colors(product)
        .iter()
        .map(|color| normalize_color(color))
        .filter(|color| !color.is_empty())
        .collect()
}

/// Sorted tokens joined with `" & "`, or `None` when there are no tokens.
#[must_use]
pub fn combination_key(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    let mut sorted = tokens.to_vec();
    sorted.sort();
    Some(sorted.join(COMBINATION_SEPARATOR))
}

/// Facet id for a combination key: `"blue & white"` becomes `blue-white`.
#[must_use]
pub fn facet_id(key: &str) -> String {
    let lower = key.to_lowercase();
    let hyphenated = ID_SEPARATOR_RE.replace_all(&lower, "-");
    ID_INVALID_RE.replace_all(&hyphenated, "").into_owned()
}

fn display_name(key: &str) -> String {
    let mut chars = key.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Derive the ranked facet list for a product collection.
///
/// Facets are sorted by count descending, then label ascending, and are
/// preceded by the synthetic [`ALL_FACET_ID`] facet counting every product.
/// The result does not depend on the order of `products`.
pub fn derive_facets<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<ColorFacet> {
    let mut tally: HashMap<String, usize> = HashMap::new();
    let mut total = 0;

    for product in products {
        total += 1;
        let key = combination_key(&color_tokens(product))
            .unwrap_or_else(|| OTHER_FACET_ID.to_owned());
        *tally.entry(key).or_insert(0) += 1;
    }

    let mut facets: Vec<ColorFacet> = tally
        .into_iter()
        .map(|(key, count)| ColorFacet {
            id: facet_id(&key),
            display_name: display_name(&key),
            count,
        })
        .collect();

    facets.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    facets.insert(
        0,
        ColorFacet {
            id: ALL_FACET_ID.to_owned(),
            display_name: ALL_COLORS_LABEL.to_owned(),
            count: total,
        },
    );

    tracing::debug!(products = total, facets = facets.len(), "Derived color facets");
    facets
}

/// Whether `product` belongs under the facet `facet_id`.
///
/// `all` matches everything and `other` matches products without any color
/// signal. Any other id matches when the product's combination key contains
/// the facet's colors, or when a single color token contains them.
#[must_use]
pub fn matches(product: &Product, facet_id: &str) -> bool {
    if facet_id == ALL_FACET_ID {
        return true;
    }

    let tokens = color_tokens(product);
    if facet_id == OTHER_FACET_ID {
        return tokens.is_empty();
    }

    let needle = facet_id.replace('-', COMBINATION_SEPARATOR);
    if combination_key(&tokens).is_some_and(|key| key.contains(&needle)) {
        return true;
    }

    // Multi-word colors ("navy blue") become "navy-blue" ids.
    let token_needle = needle.replacen(COMBINATION_SEPARATOR, " ", 1);
    tokens.iter().any(|token| token.contains(&token_needle))
}

/// Hex swatch for a single color name.
#[must_use]
pub fn swatch(color: &str) -> &'static str {
    let color = color.to_lowercase();
    SWATCHES
        .iter()
        .find(|(name, _)| *name == color)
        .map_or(DEFAULT_SWATCH, |(_, hex)| *hex)
}
