//! Tests for pagination types.

use super::{PageRequest, PageResponse};

#[test]
fn test_default_page_request() {
    let req = PageRequest::default();
    assert_eq!(req.page, 1);
    assert_eq!(req.per_page, 50);
    assert_eq!(req.offset(), 0);
    assert_eq!(req.limit(), 50);
}

#[test]
fn test_offset_calculation() {
    let req = PageRequest {
        page: 3,
        per_page: 25,
    };
    assert_eq!(req.offset(), 50);
    assert_eq!(req.limit(), 25);
}

#[test]
fn test_page_zero_clamps_offset() {
    let req = PageRequest {
        page: 0,
        per_page: 20,
    };
    assert_eq!(req.offset(), 0);
}

#[test]
fn test_total_pages_rounds_up() {
    let resp: PageResponse<i32> = PageResponse::new(vec![], 1, 20, 41);
    assert_eq!(resp.meta.total_pages, 3);

    let exact: PageResponse<i32> = PageResponse::new(vec![], 1, 20, 40);
    assert_eq!(exact.meta.total_pages, 2);
}

#[test]
fn test_empty_total_is_one_page() {
    let resp: PageResponse<i32> = PageResponse::new(vec![], 1, 20, 0);
    assert_eq!(resp.meta.total_pages, 1);
}
