use http::header::{HeaderValue, ORIGIN, VARY};
use http::{Request, Response, StatusCode};
use preflight::{CorsError, CorsOutcome, CorsPolicyBuilder, RequestHead, ResponseSink};

fn request(method: &str, headers: &[(&str, &str)]) -> Request<()> {
    let mut builder = Request::builder().method(method).uri("/items");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap()
}

#[test]
fn test_http_preflight() {
    let policy = CorsPolicyBuilder::new()
        .allow_origins(&["https://app.test"])
        .allow_methods(&["GET", "PUT"])
        .allow_headers(&["X-Test"])
        .max_age(10)
        .credentials(true)
        .build()
        .unwrap();
    let req = request(
        "OPTIONS",
        &[
            ("Origin", "https://app.test"),
            ("Access-Control-Request-Method", "PUT"),
        ],
    );
    let mut res = Response::new("stale body".to_string());

    let outcome = policy.evaluate(&req, &mut res).unwrap();
    assert_eq!(outcome, CorsOutcome::Preflight);
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.body().is_empty());

    let h = res.headers();
    assert_eq!(h["access-control-allow-origin"], "https://app.test");
    assert_eq!(h["access-control-allow-methods"], "GET, PUT");
    assert_eq!(h["access-control-allow-headers"], "X-Test");
    assert_eq!(h["access-control-max-age"], "10");
    assert_eq!(h["access-control-allow-credentials"], "true");
    assert_eq!(
        h[VARY],
        "Origin, Access-Control-Request-Method, Access-Control-Request-Headers"
    );
}

#[test]
fn test_http_simple_request_keeps_status_and_body() {
    let policy = CorsPolicyBuilder::new()
        .expose_headers(&["X-Total-Count", "X-Page"])
        .build()
        .unwrap();
    let req = request("POST", &[("origin", "https://app.test")]);
    let mut res = Response::new("payload".to_string());

    let outcome = policy.evaluate(&req, &mut res).unwrap();
    assert_eq!(outcome, CorsOutcome::Simple);
    assert!(!outcome.is_terminal());
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), "payload");
    assert_eq!(res.headers()["access-control-allow-origin"], "https://app.test");
    assert_eq!(res.headers()["access-control-expose-headers"], "X-Total-Count, X-Page");
}

#[test]
fn test_http_rejection() {
    let policy = CorsPolicyBuilder::new()
        .allow_origins(&["test.org"])
        .build()
        .unwrap();
    let req = request("GET", &[("Origin", "not-allowed.org")]);
    let mut res = Response::new(String::new());

    let err = policy.evaluate(&req, &mut res).unwrap_err();
    assert_eq!(
        err,
        CorsError::OriginRejected {
            origin: "not-allowed.org".to_string()
        }
    );
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "Origin \"not-allowed.org\" is not allowed");
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(res.headers()[VARY], "Origin");
}

#[test]
fn test_http_invalid_preflight() {
    let policy = CorsPolicyBuilder::new().credentials(true).build().unwrap();
    let req = request("OPTIONS", &[("Origin", "test.org")]);
    let mut res = Response::new(String::new());

    let err = policy.evaluate(&req, &mut res).unwrap_err();
    assert_eq!(err, CorsError::InvalidPreflight);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert!(res.headers().get("access-control-allow-credentials").is_none());
}

#[test]
fn test_http_no_origin() {
    let policy = CorsPolicyBuilder::new().build().unwrap();
    let req = request("GET", &[]);
    let mut res = Response::new(String::new());

    assert_eq!(policy.evaluate(&req, &mut res).unwrap(), CorsOutcome::NotCors);
    assert_eq!(res.headers().len(), 1);
    assert_eq!(res.headers()[VARY], "Origin");
}

#[test]
fn test_http_request_parts() {
    let policy = CorsPolicyBuilder::new().build().unwrap();
    let (parts, _body) = request(
        "OPTIONS",
        &[
            ("Origin", "test.org"),
            ("Access-Control-Request-Method", "GET"),
            ("Access-Control-Request-Headers", "X-Foo"),
        ],
    )
    .into_parts();
    let mut res = Response::new(String::new());

    policy.evaluate(&parts, &mut res).unwrap();
    assert_eq!(res.headers()["access-control-allow-headers"], "X-Foo");
}

#[test]
fn test_http_vary_folds_multiple_lines() {
    let mut res = Response::new(String::new());
    res.headers_mut().append(VARY, "Accept-Encoding".parse().unwrap());
    res.headers_mut().append(VARY, "origin".parse().unwrap());

    res.append_vary("Origin");
    assert_eq!(res.headers().get_all(VARY).iter().count(), 2);

    res.append_vary("Access-Control-Request-Method");
    let values: Vec<_> = res.headers().get_all(VARY).iter().collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0], "Accept-Encoding, origin, Access-Control-Request-Method");
}

#[test]
fn test_http_set_header_rejects_invalid_value() {
    let mut res = Response::new(String::new());
    res.set_header("access-control-allow-origin", "bad\nvalue");
    assert!(res.headers().get("access-control-allow-origin").is_none());

    res.remove_header("x-missing");
    assert!(res.headers().is_empty());
}

#[test]
fn test_http_validator_value_with_line_break_is_rejected() {
    let policy = CorsPolicyBuilder::new()
        .credentials(true)
        .origin_validator(|_origin: &str, _req: &dyn RequestHead| {
            Some("https://a.test\r\nX-Injected: 1".to_string())
        })
        .build()
        .unwrap();
    let req = request("GET", &[("Origin", "https://a.test")]);
    let mut res = Response::new(String::new());

    let err = policy.evaluate(&req, &mut res).unwrap_err();
    assert_eq!(
        err,
        CorsError::OriginRejected {
            origin: "https://a.test".to_string()
        }
    );
    assert!(res.headers().get("access-control-allow-credentials").is_none());
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert!(res.headers().get("x-injected").is_none());
    assert_eq!(res.headers()[VARY], "Origin");
}

#[test]
fn test_http_non_ascii_origin_is_validated_not_skipped() {
    let policy = CorsPolicyBuilder::new()
        .allow_origins(&["test.org"])
        .build()
        .unwrap();
    let mut req = request("GET", &[]);
    req.headers_mut().insert(
        ORIGIN,
        HeaderValue::from_bytes(b"https://\xe9vil.test").unwrap(),
    );
    let mut res = Response::new(String::new());

    let err = policy.evaluate(&req, &mut res).unwrap_err();
    assert!(matches!(err, CorsError::OriginRejected { .. }));
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert!(res.headers().get("access-control-allow-origin").is_none());
}

#[test]
fn test_http_non_ascii_origin_rejected_even_with_wildcard() {
    // The echoed origin would not be a legal header value.
    let policy = CorsPolicyBuilder::new().credentials(true).build().unwrap();
    let mut req = request("OPTIONS", &[("Access-Control-Request-Method", "GET")]);
    req.headers_mut().insert(
        ORIGIN,
        HeaderValue::from_bytes(b"https://\xe9vil.test").unwrap(),
    );
    let mut res = Response::new(String::new());

    assert!(policy.evaluate(&req, &mut res).is_err());
    assert_ne!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.headers().get("access-control-allow-credentials").is_none());
}
