use fantasy402_rs::Fantasy402Config;

/// Config pointed at a local mock server, with short timeouts.
pub fn test_config(api_url: &str) -> Fantasy402Config {
    Fantasy402Config {
        api_url: api_url.to_string(),
        customer_id: "cust1".to_string(),
        password: "secret".to_string(),
        request_timeout_secs: 5,
        retry_attempts: 3,
        session_ttl_secs: 1200,
        health_latency_threshold_ms: 1000,
        enable_event_versioning: false,
    }
}
