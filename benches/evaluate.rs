use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use preflight::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use preflight::middleware::{CorsMiddleware, CorsPolicyBuilder};

fn requests() -> [HandlerRequest; 4] {
    [
        HandlerRequest::new(Method::GET, "/zoo/animals"),
        HandlerRequest::new(Method::GET, "/zoo/animals").with_header("Origin", "https://app.test"),
        HandlerRequest::new(Method::OPTIONS, "/zoo/animals")
            .with_header("Origin", "https://app.test")
            .with_header("Access-Control-Request-Method", "PUT")
            .with_header("Access-Control-Request-Headers", "X-Trace-Id, Content-Type"),
        HandlerRequest::new(Method::GET, "/zoo/animals").with_header("Origin", "https://evil.test"),
    ]
}

fn bench_evaluate(c: &mut Criterion) {
    let policy = CorsPolicyBuilder::new()
        .allow_origins(&["https://app.test", "https://admin.test"])
        .expose_headers(&["X-Total-Count"])
        .max_age(600)
        .credentials(true)
        .build()
        .expect("valid policy");
    let reqs = requests();

    c.bench_function("cors_evaluate", |b| {
        b.iter(|| {
            for req in reqs.iter() {
                let mut res = HandlerResponse::default();
                let outcome = policy.evaluate(req, &mut res);
                black_box((&outcome, &res));
            }
        })
    });

    let patterns = CorsPolicyBuilder::new()
        .allow_origins(&[])
        .allow_origin_patterns(&[r"^https://[a-z]+\.test$"])
        .build()
        .expect("valid policy");
    c.bench_function("cors_evaluate_patterns", |b| {
        b.iter(|| {
            for req in reqs.iter() {
                let mut res = HandlerResponse::default();
                black_box(patterns.evaluate(req, &mut res).ok());
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let policy = CorsPolicyBuilder::new().build().expect("valid policy");
    let mut dispatcher = Dispatcher::new(|_req, res| res.status = 200);
    dispatcher.add_middleware(Arc::new(CorsMiddleware::new(policy)));
    let reqs = requests();

    c.bench_function("dispatch_with_cors", |b| {
        b.iter(|| {
            for req in reqs.iter() {
                black_box(dispatcher.dispatch(req));
            }
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_dispatch);
criterion_main!(benches);
