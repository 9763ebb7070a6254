use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

pub static NOTICES_COUNTER: Lazy<NoticeMutationCounters> = Lazy::new(|| {
    let opts = Opts::new("notices_mutations_total", "count of changes made to notices by administrators");
    NoticeMutationCounters {
        created: Counter::new("notices (created)", opts.clone().const_label("action", "created")),
        updated: Counter::new("notices (updated)", opts.clone().const_label("action", "updated")),
        deleted: Counter::new("notices (deleted)", opts.clone().const_label("action", "deleted")),
        visibility_changed: Counter::new("notices (visibility)", opts.const_label("action", "visibility")),
    }
});
pub static VIEWS_COUNTER: Lazy<ComplexCounters> = Lazy::new(|| {
    let opts = Opts::new("notice_views_total", "count of notices marked as viewed and of the marks that were lost");
    ComplexCounters {
        succeeded: Counter::new("notice_views (recorded)", opts.clone().const_label("state", "recorded")),
        failed: Counter::new("notice_views (dropped)", opts.const_label("state", "dropped")),
    }
});
pub static CLOSES_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("notice_closes", Opts::new("notice_closes_total", "count of notices closed by users"))
});
pub static REGISTRATION_COUNTER: Lazy<ComplexCounters> = Lazy::new(|| {
    let opts = Opts::new("registrations_total", "count of sign up attempts and failures");
    ComplexCounters {
        succeeded: Counter::new("registrations (succeeded)", opts.clone().const_label("state", "succeeded")),
        failed: Counter::new("registrations (failed)", opts.const_label("state", "failed")),
    }
});
pub static REALTIME_EVENTS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("realtime_events", Opts::new("realtime_events_total", "count of change notifications received from the database"))
});


pub fn init(app: axum::Router) -> axum::Router {
    let prometheus = REGISTRY
        .register(&NOTICES_COUNTER.created)
        .register(&NOTICES_COUNTER.updated)
        .register(&NOTICES_COUNTER.deleted)
        .register(&NOTICES_COUNTER.visibility_changed)
        .register(&VIEWS_COUNTER.succeeded)
        .register(&VIEWS_COUNTER.failed)
        .register(&CLOSES_COUNTER)
        .register(&REGISTRATION_COUNTER.succeeded)
        .register(&REGISTRATION_COUNTER.failed)
        .register(&REALTIME_EVENTS_COUNTER)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    app
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            if let Err(e) = TextEncoder::new().encode(&metrics, &mut buffer) {
                log::error!("couldn't encode custom metrics: {e}");
            }
            let custom_metrics = String::from_utf8_lossy(&buffer);

            metric_handle.render() + &*custom_metrics
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}
pub struct ComplexCounters {
    pub succeeded: Counter,
    pub failed: Counter,
}
pub struct NoticeMutationCounters {
    pub created: Counter,
    pub updated: Counter,
    pub deleted: Counter,
    pub visibility_changed: Counter,
}
struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }

    pub fn inc_by(&self, n: usize) {
        self.inner.inc_by(n as f64)
    }
}

impl ComplexCounters {
    pub fn succeeded(&self) {
        self.succeeded.inc()
    }

    pub fn failed(&self) {
        self.failed.inc()
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}
