//! Property-based tests using proptest
//!
//! These tests check pagination, JSON extraction defaults, query building
//! and client-side filters with randomized inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::cell::RefCell;
use waf_provider::adapter::extract::{bool_or, i64_or, list_or_empty, str_or};
use waf_provider::adapter::{apply_filters, paginate_offset, RequestDescriptor, ResourceFilter};
use waf_provider::error::WafError;

/// Generate a rule-like item
fn arb_rule() -> impl Strategy<Value = Value> {
    (
        "[a-z0-9]{8}",
        prop_oneof![Just(0i64), Just(1i64)],
        "[a-z][a-z0-9.-]{0,30}",
    )
        .prop_map(|(id, status, hostname)| {
            json!({
                "id": id,
                "status": status,
                "hostname": hostname
            })
        })
}

/// Generate a list of non-empty pages
fn arb_pages() -> impl Strategy<Value = Vec<Vec<Value>>> {
    prop::collection::vec(prop::collection::vec(arb_rule(), 1..10), 0..8)
}

/// Query values including characters that need escaping
fn arb_query_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 &=?/%+#-]{1,20}"
}

proptest! {
    /// Pagination returns every page concatenated in order and stops at the empty page
    #[test]
    fn test_pagination_concatenates_pages(pages in arb_pages()) {
        let expected: Vec<Value> = pages.iter().flatten().cloned().collect();
        let requested = RefCell::new(Vec::new());

        let result = tokio_test::block_on(paginate_offset(1000, |offset| {
            requested.borrow_mut().push(offset);
            let index = requested.borrow().len() - 1;
            let page = pages.get(index).cloned().unwrap_or_default();
            async move { Ok(page) }
        }));

        prop_assert_eq!(result.unwrap(), expected);

        // one request per page plus the terminating empty page, offsets advance by page size
        let requested = requested.into_inner();
        prop_assert_eq!(requested.len(), pages.len() + 1);
        let mut offset = 0;
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(requested[i], offset);
            offset += page.len();
        }
        prop_assert_eq!(requested[pages.len()], offset);
    }

    /// A page bound below the number of pages always aborts
    #[test]
    fn test_pagination_bound(pages in arb_pages(), bound in 1usize..8) {
        let calls = RefCell::new(0usize);
        let result = tokio_test::block_on(paginate_offset(bound, |_| {
            let index = *calls.borrow();
            *calls.borrow_mut() += 1;
            let page = pages.get(index).cloned().unwrap_or_default();
            async move { Ok(page) }
        }));

        if pages.len() > bound {
            let is_limit = matches!(result, Err(WafError::PaginationLimit { pages: p, .. }) if p == bound);
            prop_assert!(is_limit);
        } else {
            prop_assert_eq!(result.unwrap().len(), pages.iter().map(Vec::len).sum::<usize>());
        }
    }

    /// Missing keys yield the declared defaults, present keys their value
    #[test]
    fn test_missing_keys_yield_defaults(
        key in "k[a-z]{0,9}",
        other in "[A-Z]{1,10}",
        value in any::<i64>(),
    ) {
        let doc = json!({ key.clone(): value, "nested": { key.clone(): value } });

        prop_assert_eq!(i64_or(&doc, &key, -1), value);
        prop_assert_eq!(i64_or(&doc, &format!("nested.{}", key), -1), value);
        prop_assert_eq!(i64_or(&doc, &other, -1), -1);
        prop_assert_eq!(str_or(&doc, &other, "default"), "default");
        let nested_other = format!("nested.{}", other);
        let other_key = format!("{}.{}", other, key);
        prop_assert!(bool_or(&doc, &nested_other, true));
        prop_assert!(list_or_empty(&doc, &other_key).is_empty());
    }

    /// Absent optional parameters never appear; present ones appear once, escaped
    #[test]
    fn test_query_includes_only_present_params(
        name in prop::option::of(arb_query_value()),
        status in prop::option::of(0i64..3),
        eps in prop::option::of(arb_query_value()),
    ) {
        let request = RequestDescriptor::get("/v1/{project_id}/waf/policy")
            .query("name", name.as_deref())
            .query("status", status)
            .query("enterprise_project_id", eps.as_deref());
        let url = request.path_and_query("p").unwrap();

        let expected = [
            ("name", name.clone()),
            ("status", status.map(|s| s.to_string())),
            ("enterprise_project_id", eps.clone()),
        ];
        for (key, value) in expected {
            let occurrences = url.matches(&format!("{}=", key)).count();
            match value {
                Some(v) => {
                    prop_assert_eq!(occurrences, 1);
                    let encoded = format!("{}={}", key, urlencoding::encode(&v));
                    prop_assert!(url.contains(&encoded), "{} missing from {}", encoded, url);
                }
                None => prop_assert_eq!(occurrences, 0),
            }
        }
        prop_assert_eq!(url.contains('?'), name.is_some() || status.is_some() || eps.is_some());
        prop_assert!(url.matches('?').count() <= 1);
    }

    /// Filtering keeps exactly the matching items, in order
    #[test]
    fn test_status_filter(rules in prop::collection::vec(arb_rule(), 0..50), status in 0i64..2) {
        let filtered = apply_filters(rules.clone(), &[ResourceFilter::new("status", Some(status))]);
        let expected: Vec<Value> = rules.into_iter().filter(|r| r["status"] == status).collect();
        prop_assert_eq!(filtered, expected);
    }

    /// A filter without a value keeps everything
    #[test]
    fn test_empty_filter_is_identity(rules in prop::collection::vec(arb_rule(), 0..50)) {
        let filters = [ResourceFilter::new("id", None::<&str>), ResourceFilter::new("id", Some(""))];
        prop_assert_eq!(apply_filters(rules.clone(), &filters), rules);
    }
}
