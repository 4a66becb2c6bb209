use std::io::Write;
use std::time::Duration;

use rate_guard_keyed::config::{load_config, parse_config, BucketConfig, EvictionConfig, LimiterConfig};
use rate_guard_keyed::cores::RefillPolicy;
use rate_guard_keyed::error::ConfigError;

#[test]
fn test_empty_document_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config, LimiterConfig::default());
    assert_eq!(config.bucket.capacity, 10);
    assert_eq!(config.bucket.refill_interval, Duration::from_secs(1));
    assert!(config.eviction.is_none());
}

#[test]
fn test_full_document() {
    let config = parse_config(
        r#"
        [bucket]
        capacity = 25
        refill_interval_ms = 200
        refill_policy = "carry"

        [eviction]
        idle_ttl_ms = 300000
        sweep_interval_ms = 15000
        "#,
    )
    .unwrap();

    assert_eq!(config.bucket.capacity, 25);
    assert_eq!(config.bucket.refill_interval, Duration::from_millis(200));
    assert_eq!(config.bucket.refill_policy, RefillPolicy::Carry);

    let eviction = config.eviction.unwrap();
    assert_eq!(eviction.idle_ttl, Duration::from_secs(300));
    assert_eq!(eviction.sweep_interval, Duration::from_secs(15));
}

#[test]
fn test_partial_eviction_section_fills_defaults() {
    let config = parse_config(
        r#"
        [eviction]
        idle_ttl_ms = 120000
        "#,
    )
    .unwrap();

    let eviction = config.eviction.unwrap();
    assert_eq!(eviction.idle_ttl, Duration::from_secs(120));
    assert_eq!(eviction.sweep_interval, EvictionConfig::default().sweep_interval);
}

#[test]
fn test_unknown_field_is_rejected() {
    let result = parse_config(
        r#"
        [bucket]
        capcity = 10
        "#,
    );
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_unknown_policy_is_rejected() {
    let result = parse_config(
        r#"
        [bucket]
        refill_policy = "sliding"
        "#,
    );
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_zero_capacity_is_rejected() {
    let result = parse_config(
        r#"
        [bucket]
        capacity = 0
        "#,
    );
    assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
}

#[test]
fn test_zero_refill_interval_is_rejected() {
    let result = parse_config(
        r#"
        [bucket]
        refill_interval_ms = 0
        "#,
    );
    assert!(matches!(result, Err(ConfigError::ZeroRefillInterval)));
}

#[test]
fn test_zero_sweep_interval_is_rejected() {
    let result = parse_config(
        r#"
        [eviction]
        sweep_interval_ms = 0
        "#,
    );
    assert!(matches!(result, Err(ConfigError::ZeroSweepInterval)));
}

#[test]
fn test_idle_ttl_shorter_than_full_refill_is_rejected() {
    let result = parse_config(
        r#"
        [bucket]
        capacity = 10
        refill_interval_ms = 1000

        [eviction]
        idle_ttl_ms = 5000
        "#,
    );

    match result {
        Err(ConfigError::IdleTtlTooShort { idle_ttl, full_refill }) => {
            assert_eq!(idle_ttl, Duration::from_secs(5));
            assert_eq!(full_refill, Duration::from_secs(10));
        }
        other => panic!("expected IdleTtlTooShort, got {:?}", other),
    }
}

#[test]
fn test_idle_ttl_equal_to_full_refill_is_accepted() {
    let bucket = BucketConfig::new(10, Duration::from_secs(1));
    let eviction = EvictionConfig::new(Duration::from_secs(10), Duration::from_secs(1));
    assert!(eviction.validate(&bucket).is_ok());
}

#[test]
fn test_serialized_config_parses_back() {
    let config = LimiterConfig {
        bucket: BucketConfig::new(7, Duration::from_millis(1500)).with_refill_policy(RefillPolicy::Carry),
        eviction: Some(EvictionConfig::new(Duration::from_secs(60), Duration::from_secs(5))),
    };

    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("refill_interval_ms = 1500"));
    assert!(text.contains("refill_policy = \"carry\""));
    assert_eq!(parse_config(&text).unwrap(), config);
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[bucket]\ncapacity = 3\nrefill_interval_ms = 250").unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.bucket.capacity, 3);
    assert_eq!(config.bucket.refill_interval, Duration::from_millis(250));
}

#[test]
fn test_load_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config(dir.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_sub_millisecond_refill_interval_is_rejected() {
    let bucket = BucketConfig::new(10, Duration::from_micros(500));
    match bucket.validate() {
        Err(ConfigError::SubMillisecondPrecision { field, value }) => {
            assert_eq!(field, "refill_interval");
            assert_eq!(value, Duration::from_micros(500));
        }
        other => panic!("expected SubMillisecondPrecision, got {:?}", other),
    }

    let bucket = BucketConfig::new(10, Duration::from_micros(1500));
    assert!(matches!(bucket.validate(), Err(ConfigError::SubMillisecondPrecision { .. })));
}

#[test]
fn test_sub_millisecond_eviction_durations_are_rejected() {
    let bucket = BucketConfig::default();

    let eviction = EvictionConfig::new(Duration::from_secs(10) + Duration::from_nanos(1), Duration::from_secs(1));
    assert!(matches!(
        eviction.validate(&bucket),
        Err(ConfigError::SubMillisecondPrecision { field: "idle_ttl", .. })
    ));

    let eviction = EvictionConfig::new(Duration::from_secs(10), Duration::from_micros(10));
    assert!(matches!(
        eviction.validate(&bucket),
        Err(ConfigError::SubMillisecondPrecision { field: "sweep_interval", .. })
    ));
}

#[test]
fn test_valid_configs_serialize_without_loss() {
    let config = LimiterConfig {
        bucket: BucketConfig::new(10, Duration::from_millis(1)),
        eviction: Some(EvictionConfig::new(Duration::from_millis(10), Duration::from_millis(1))),
    };
    assert!(config.validate().is_ok());

    let text = toml::to_string(&config).unwrap();
    assert_eq!(parse_config(&text).unwrap(), config);
}
