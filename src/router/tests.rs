use http::Method;

use super::pattern::PathPattern;
use super::{MethodFilter, RouteTable};
use crate::pipeline::{Context, RouterRequest, RouterResponse};
use std::sync::Arc;

fn ok_handler(
    _req: &RouterRequest,
    _ctx: &mut Context,
) -> Result<RouterResponse, anyhow::Error> {
    Ok(RouterResponse::json(200, serde_json::Value::Null))
}

#[test]
fn root_pattern_matches_only_root() {
    let pattern = PathPattern::compile("/");
    assert!(pattern.match_path("/").is_some());
    assert!(pattern.match_path("/x").is_none());
    assert!(pattern.param_names().is_empty());
}

#[test]
fn parameterized_pattern_binds_segment() {
    let pattern = PathPattern::compile("/users/:id");
    let params = pattern.match_path("/users/123").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].0.as_ref(), "id");
    assert_eq!(params[0].1, "123");

    assert!(pattern.match_path("/posts/123").is_none());
}

#[test]
fn params_never_span_slashes() {
    let pattern = PathPattern::compile("/users/:id");
    assert!(pattern.match_path("/users/1/posts").is_none());
    assert!(pattern.match_path("/users/").is_none());
    assert!(pattern.match_path("/users").is_none());
}

#[test]
fn segment_counts_must_match_exactly() {
    let pattern = PathPattern::compile("/a/:b/c");
    assert!(pattern.match_path("/a/1/c").is_some());
    assert!(pattern.match_path("/a/1").is_none());
    assert!(pattern.match_path("/a/1/c/d").is_none());
}

#[test]
fn literal_segments_are_not_regex() {
    let pattern = PathPattern::compile("/v1.0/items");
    assert!(pattern.match_path("/v1.0/items").is_some());
    assert!(pattern.match_path("/v1x0/items").is_none());
}

#[test]
fn multiple_params_bind_in_path_order() {
    let pattern = PathPattern::compile("/users/:user_id/posts/:post_id");
    let params = pattern.match_path("/users/7/posts/42").unwrap();
    let names: Vec<&str> = params.iter().map(|(k, _)| k.as_ref()).collect();
    assert_eq!(names, vec!["user_id", "post_id"]);
    assert_eq!(params[1].1, "42");
}

#[test]
#[should_panic(expected = "twice")]
fn duplicate_param_names_are_rejected_at_registration() {
    let _ = PathPattern::compile("/orgs/:id/users/:id");
}

#[test]
#[should_panic(expected = "invalid parameter name")]
fn empty_param_name_is_rejected_at_registration() {
    let _ = PathPattern::compile("/users/:");
}

#[test]
fn lookup_scans_in_registration_order() {
    let mut table = RouteTable::new();
    table.register(
        MethodFilter::Exact(Method::GET),
        "/items/:id",
        Arc::new(ok_handler),
    );
    table.register(
        MethodFilter::Exact(Method::GET),
        "/items/special",
        Arc::new(ok_handler),
    );

    // Both patterns match "/items/special"; the first registered wins.
    let (route, params) = table.lookup(&Method::GET, "/items/special").unwrap();
    assert_eq!(route.pattern(), "/items/:id");
    assert_eq!(params[0].1, "special");
}

#[test]
fn lookup_requires_method_match() {
    let mut table = RouteTable::new();
    table.register(
        MethodFilter::Exact(Method::GET),
        "/items",
        Arc::new(ok_handler),
    );

    assert!(table.lookup(&Method::GET, "/items").is_some());
    assert!(table.lookup(&Method::POST, "/items").is_none());
}

#[test]
fn any_filter_matches_every_method() {
    let mut table = RouteTable::new();
    table.register(MethodFilter::Any, "/anything", Arc::new(ok_handler));

    for method in [Method::GET, Method::POST, Method::DELETE, Method::PATCH] {
        assert!(table.lookup(&method, "/anything").is_some());
    }
}
