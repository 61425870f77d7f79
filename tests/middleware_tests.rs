use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde_json::json;
use switchyard::cache;
use switchyard::dispatcher::{DispatchError, Next};
use switchyard::middleware::{
    AuthMiddleware, CorsMiddleware, MetricsMiddleware, Middleware, MiddlewareEntry,
    WrappingMiddleware,
};
use switchyard::pipeline::{Context, RouterRequest, RouterResponse};
use switchyard::Router;

mod tracing_util;
use tracing_util::TestTracing;

struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

impl switchyard::Handler for CountingHandler {
    fn call(
        &self,
        _req: &RouterRequest,
        _ctx: &mut Context,
    ) -> Result<RouterResponse, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RouterResponse::json(200, json!({"ok": true})))
    }
}

/// Wrapping middleware standing in for request logging: stamps a response
/// header in its after-phase.
struct HeaderStamp {
    name: &'static str,
}

impl WrappingMiddleware for HeaderStamp {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError> {
        let mut res = next.run(req, ctx)?;
        res.set_header(self.name, "1".to_string());
        Ok(res)
    }
}

#[test]
fn function_short_circuit_halts_the_whole_chain() {
    let _tracing = TestTracing::init();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut router = Router::new();
    router.use_fn(AuthMiddleware::new("Bearer valid-token".to_string()));
    router.use_wrap(CorsMiddleware::default());
    router.use_wrap(HeaderStamp { name: "x-logged" });
    router.route("/protected").get(CountingHandler {
        calls: Arc::clone(&calls),
    });

    // No authorization header: auth rejects before cors or logging run.
    let res = router
        .dispatch(
            RouterRequest::get("http://example.com/protected")
                .with_header("origin", "https://example.com"),
        )
        .unwrap();

    assert_eq!(res.status, 401);
    assert_eq!(res.body, json!({ "error": "Unauthorized" }));
    assert!(res.get_header("access-control-allow-origin").is_none());
    assert!(res.get_header("x-logged").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn auth_middleware_passes_matching_token() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut router = Router::new();
    router.use_fn(AuthMiddleware::new("Bearer valid-token".to_string()));
    router.route("/protected").get(CountingHandler {
        calls: Arc::clone(&calls),
    });

    let res = router
        .dispatch(
            RouterRequest::get("http://example.com/protected")
                .with_header("Authorization", "Bearer valid-token"),
        )
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn auth_middleware_rejects_wrong_token() {
    let mut router = Router::new();
    router.use_fn(AuthMiddleware::new("Bearer valid-token".to_string()));
    router.route("/protected").get(ok_handler);

    let res = router
        .dispatch(
            RouterRequest::get("http://example.com/protected")
                .with_header("authorization", "Bearer other"),
        )
        .unwrap();
    assert_eq!(res.status, 401);
}

fn ok_handler(
    _req: &RouterRequest,
    _ctx: &mut Context,
) -> Result<RouterResponse, anyhow::Error> {
    Ok(RouterResponse::json(200, json!({})))
}

fn forbidden(
    _req: &mut RouterRequest,
    _ctx: &mut Context,
) -> Result<Option<RouterResponse>, anyhow::Error> {
    Ok(Some(RouterResponse::error(403, "Forbidden")))
}

#[test]
fn prefix_scoped_middleware_matches_on_segment_boundaries() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut router = Router::new();
    router.use_fn_scoped("/admin", forbidden);
    for pattern in ["/admin", "/admin/users", "/administrator"] {
        router.route(pattern).get(CountingHandler {
            calls: Arc::clone(&calls),
        });
    }

    for path in ["/admin", "/admin/users"] {
        let res = router
            .dispatch(RouterRequest::get(format!("http://example.com{path}")))
            .unwrap();
        assert_eq!(res.status, 403, "expected scope to cover {path}");
    }

    let res = router
        .dispatch(RouterRequest::get("http://example.com/administrator"))
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cors_preflight_is_answered_without_delegating() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut router = Router::new();
    router.use_wrap(CorsMiddleware::default());
    router.route("/api/data").options(CountingHandler {
        calls: Arc::clone(&calls),
    });

    let res = router
        .dispatch(
            RouterRequest::new(Method::OPTIONS, "http://example.com/api/data")
                .with_header("origin", "https://example.com")
                .with_header("access-control-request-method", "GET"),
        )
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        res.get_header("access-control-allow-headers"),
        Some("Content-Type, Authorization")
    );
    assert_eq!(
        res.get_header("access-control-allow-methods"),
        Some("GET, POST, PUT, DELETE, OPTIONS")
    );
    assert_eq!(res.get_header("vary"), Some("Origin"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn cors_decorates_downstream_responses_for_allowed_origins() {
    let mut router = Router::new();
    router.use_wrap(CorsMiddleware::new(
        vec!["https://example.com".to_string()],
        vec!["X-Token".to_string()],
        vec![Method::GET, Method::POST],
    ));
    router.route("/api/data").get(ok_handler);

    let res = router
        .dispatch(
            RouterRequest::get("http://example.com/api/data")
                .with_header("origin", "https://example.com"),
        )
        .unwrap();

    assert_eq!(
        res.get_header("access-control-allow-origin"),
        Some("https://example.com")
    );
    assert_eq!(res.get_header("access-control-allow-headers"), Some("X-Token"));
    assert_eq!(res.get_header("access-control-allow-methods"), Some("GET, POST"));
    assert_eq!(res.get_header("vary"), Some("Origin"));

    // Disallowed origin: response passes through undecorated.
    let res = router
        .dispatch(
            RouterRequest::get("http://example.com/api/data")
                .with_header("origin", "https://evil.example"),
        )
        .unwrap();
    assert!(res.get_header("access-control-allow-origin").is_none());
}

fn slow_handler(
    _req: &RouterRequest,
    _ctx: &mut Context,
) -> Result<RouterResponse, anyhow::Error> {
    std::thread::sleep(Duration::from_millis(2));
    Ok(RouterResponse::json(200, json!({})))
}

#[test]
fn metrics_middleware_counts_and_times_requests() {
    let metrics = Arc::new(MetricsMiddleware::new());

    let mut router = Router::new();
    // Register through the raw entry API so the test keeps an observable
    // handle on the same instance the router runs.
    router.use_middleware(MiddlewareEntry::new(
        None,
        Middleware::Wrapping(Arc::clone(&metrics) as Arc<dyn WrappingMiddleware>),
    ));
    router.route("/timed").get(slow_handler);

    for i in 1..=3 {
        let res = router
            .dispatch(RouterRequest::get("http://example.com/timed"))
            .unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(metrics.request_count(), i);
    }

    assert!(metrics.average_latency() >= Duration::from_millis(2));
    assert_eq!(metrics.path_hits("/timed"), 3);
}

/// Response cache built on the collaborator contract: serve from the named
/// cache when possible, otherwise delegate and store.
struct CacheMiddleware {
    cache_name: &'static str,
}

impl WrappingMiddleware for CacheMiddleware {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError> {
        let store = cache::open(self.cache_name);
        if let Some(hit) = store.match_request(req) {
            return Ok(hit);
        }
        let res = next.run(req, ctx)?;
        store.put(req, &res);
        Ok(res)
    }
}

#[test]
fn cache_middleware_short_circuits_on_the_second_hit() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut router = Router::new();
    router.use_wrap(CacheMiddleware {
        cache_name: "middleware-test-responses",
    });
    router.route("/cached").get(CountingHandler {
        calls: Arc::clone(&calls),
    });

    let first = router
        .dispatch(RouterRequest::get("http://example.com/cached"))
        .unwrap();
    let second = router
        .dispatch(RouterRequest::get("http://example.com/cached"))
        .unwrap();

    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert_eq!(first.body, second.body);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(cache::remove("middleware-test-responses"));
}
