use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
///
/// The pipeline logs stage transitions at debug and the final
/// `pricing_source` of every estimate at info (warn when degraded).
fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "estimator_backend=debug,tower_http=debug,info",
        Environment::Staging => {
            "estimator_backend=info,estimator_backend::estimation=debug,tower_http=info,warn"
        }
        Environment::Prod => "estimator_backend=info,tower_http=warn,warn",
    }
}

pub fn init_logging(env: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    if env.is_dev() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    } else {
        // Span fields (request location, quality) ride along with each event
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().with_current_span(true).flatten_event(true))
            .init();
    }

    tracing::info!(filter = default_filter(env), "Logging initialized for {:?} environment", env);
}
