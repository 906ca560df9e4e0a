//! Global subscriber installation. Kept in its own test binary since the
//! subscriber is process-wide.

use saga_core::config::ObservabilityConfig;
use saga_core::observability::init_tracing;
use saga_core::SagaError;

#[test]
fn subscriber_installs_once() {
    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        json_logs: true,
    };
    init_tracing(&config).unwrap();

    let err = init_tracing(&config).unwrap_err();
    assert!(matches!(err, SagaError::ConfigError(_)));
}
