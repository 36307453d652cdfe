//! Integration tests for browsing: category, color filter, sort and paging.

#![allow(clippy::unwrap_used)]

use aioko_integration_tests::TestStore;
use aioko_storefront::browse::SortKey;
use aioko_storefront::colors::ALL_FACET_ID;

fn ids(products: &[&aioko_storefront::catalog::Product]) -> Vec<String> {
    products.iter().map(|p| p.id.to_string()).collect()
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_catalog_keeps_category_order() {
    let ctx = TestStore::new();
    let names: Vec<&str> = ctx
        .store
        .catalog()
        .categories()
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    assert_eq!(names, ["lace", "ankara"]);
    assert_eq!(ctx.store.catalog().len(), 17);
    assert_eq!(ctx.store.catalog().featured().len(), 1);
}

#[test]
fn test_products_take_category_from_collection() {
    let ctx = TestStore::new();
    let ankara = ctx.store.catalog().category("ankara").unwrap();
    assert!(ankara.iter().all(|p| p.category == "ankara"));
}

// ============================================================================
// Paging Tests
// ============================================================================

#[test]
fn test_category_pages_until_exhausted() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_category("lace").unwrap();

    assert_eq!(session.next_page().len(), 12);
    assert!(session.has_more());
    assert_eq!(session.next_page().len(), 2);
    assert!(!session.has_more());
    assert!(session.next_page().is_empty());
    assert_eq!(session.visible_count(), 14);
    assert_eq!(session.pages_loaded(), 2);
}

#[test]
fn test_first_page_keeps_catalog_order() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_category("lace").unwrap();
    let page = session.next_page();

    assert_eq!(ids(&page[..3]), ["l01", "l02", "l03"]);
}

// ============================================================================
// Color Facet Tests
// ============================================================================

#[test]
fn test_lace_facets_ranked_by_count_then_label() {
    let ctx = TestStore::new();
    let session = ctx.store.browse_category("lace").unwrap();
    let facets: Vec<(String, usize)> = session
        .facets()
        .into_iter()
        .map(|f| (f.id, f.count))
        .collect();

    assert_eq!(
        facets,
        [
            ("all".to_owned(), 14),
            ("blue".to_owned(), 3),
            ("blue-white".to_owned(), 3),
            ("gold".to_owned(), 2),
            ("other".to_owned(), 2),
            ("blue-navy".to_owned(), 1),
            ("purple".to_owned(), 1),
            ("red".to_owned(), 1),
            ("white".to_owned(), 1),
        ]
    );
}

#[test]
fn test_single_color_filter_is_permissive() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_category("lace").unwrap();

    // Facet count is 3, but every combination containing blue matches.
    session.set_facet("blue");
    assert_eq!(session.total_count(), 7);

    session.set_facet("blue-white");
    assert_eq!(session.total_count(), 3);

    session.set_facet("other");
    assert_eq!(ids(&session.next_page()), ["l06", "l09"]);

    session.set_facet("teal");
    assert_eq!(session.total_count(), 0);
    assert!(session.next_page().is_empty());
}

#[test]
fn test_filter_then_sort_by_price() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_category("lace").unwrap();

    session.set_facet("blue");
    session.set_sort(SortKey::PriceLow);

    assert_eq!(
        ids(&session.next_page()),
        ["l04", "l14", "l01", "l07", "l12", "l03", "l10"]
    );
}

#[test]
fn test_sort_survives_facet_change() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_category("lace").unwrap();

    session.set_sort(SortKey::PriceHigh);
    session.set_facet("gold");

    assert_eq!(session.sort_key(), SortKey::PriceHigh);
    assert_eq!(ids(&session.next_page()), ["l02", "l08"]);
}

#[test]
fn test_category_change_resets_filter_and_sort() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_category("lace").unwrap();
    session.set_facet("gold");
    session.set_sort(SortKey::PriceLow);
    let _ = session.next_page();

    let ankara = ctx.store.catalog().category("ankara").unwrap();
    session.set_category(ankara.iter().cloned());

    assert_eq!(session.active_facet(), ALL_FACET_ID);
    assert_eq!(session.pages_loaded(), 0);
    assert_eq!(ids(&session.next_page()), ["a01", "a02", "a03"]);
}

#[test]
fn test_name_sort_ignores_case() {
    let json = r#"{"misc": [
        {"id": "m1", "name": "zebra Print", "price": 100},
        {"id": "m2", "name": "Aso Oke", "price": 100},
        {"id": "m3", "name": "adire", "price": 100}
    ]}"#;
    let ctx = TestStore::with_catalog(json);
    let mut session = ctx.store.browse_category("misc").unwrap();
    session.set_sort(SortKey::Name);

    assert_eq!(ids(&session.next_page()), ["m3", "m2", "m1"]);
}

// ============================================================================
// Search Tests
// ============================================================================

#[test]
fn test_search_matches_category_and_caps_results() {
    let ctx = TestStore::new();
    let catalog = ctx.store.catalog();

    assert_eq!(catalog.search("ankara").len(), 3);
    assert_eq!(catalog.search("LACE").len(), 10);
    assert_eq!(catalog.search_all("lace").len(), 14);
    assert!(catalog.search("a").is_empty());
}

#[test]
fn test_search_session_spans_categories() {
    let ctx = TestStore::new();
    let mut session = ctx.store.browse_search("blue");

    // Only names, categories and descriptions are searched, not color fields.
    assert_eq!(ids(&session.next_page()), ["l14", "a02"]);
}
