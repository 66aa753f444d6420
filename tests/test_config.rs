use outflow::config::Config;
use std::path::PathBuf;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert!(cfg.server.keep_alive);
    assert_eq!(cfg.server.keep_alive_timeout, 10);
    assert_eq!(cfg.static_files.index, "index.html");
    assert_eq!(cfg.log_level().unwrap(), tracing::Level::INFO);
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str(
        r#"
server:
  listen_addr: "0.0.0.0:3000"
  keep_alive_timeout: 30
"#,
    )
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.server.keep_alive_timeout, 30);
    assert_eq!(cfg.server.max_keep_alive_requests, 100);
    assert_eq!(cfg.static_files.document_root, PathBuf::from("./public"));
}

#[test]
fn test_config_full_yaml() {
    let cfg = Config::from_yaml_str(
        r#"
log_level: debug
server:
  listen_addr: "127.0.0.1:9000"
  keep_alive: false
  keep_alive_timeout: 5
  max_keep_alive_requests: 0
  server_token: "edge"
static_files:
  document_root: /srv/www
  index: default.htm
  cache: false
"#,
    )
    .unwrap();

    assert_eq!(cfg.log_level().unwrap(), tracing::Level::DEBUG);
    assert!(!cfg.server.keep_alive);
    assert_eq!(cfg.server.max_keep_alive_requests, 0);
    assert_eq!(cfg.server_token(), Some("edge"));
    assert_eq!(cfg.static_files.document_root, PathBuf::from("/srv/www"));
    assert_eq!(cfg.static_files.index, "default.htm");
    assert!(!cfg.static_files.cache);
}

#[test]
fn test_config_empty_server_token_is_absent() {
    let cfg = Config::from_yaml_str("server:\n  server_token: \"\"\n").unwrap();
    assert_eq!(cfg.server_token(), None);
}

#[test]
fn test_config_rejects_unknown_log_level() {
    assert!(Config::from_yaml_str("log_level: loud\n").is_err());
}

#[test]
fn test_config_rejects_bad_types() {
    assert!(Config::from_yaml_str("server:\n  keep_alive_timeout: soon\n").is_err());
}

#[test]
fn test_config_from_missing_file() {
    let err = Config::from_file("/nonexistent/outflow.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_config_listen_override_from_env() {
    // When LISTEN env var is set, it wins over the file/defaults
    unsafe {
        std::env::remove_var("OUTFLOW_CONFIG");
        std::env::set_var("LISTEN", "0.0.0.0:5000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:5000");
    unsafe {
        std::env::remove_var("LISTEN");
    }
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.listen_addr, cfg2.server.listen_addr);
}

#[test]
fn test_config_zero_timeouts_are_raised_to_one_second() {
    let cfg = Config::from_yaml_str(
        r#"
server:
  keep_alive_timeout: 0
  request_timeout: 0
"#,
    )
    .unwrap();

    assert_eq!(cfg.server.keep_alive_timeout, 1);
    assert_eq!(cfg.server.request_timeout, 1);
}

#[test]
fn test_config_request_limits() {
    let cfg = Config::from_yaml_str(
        r#"
server:
  max_head_size: 1024
  max_body_size: 0
"#,
    )
    .unwrap();
    let limits = cfg.limits();

    assert_eq!(limits.max_head_size, 1024);
    assert_eq!(limits.max_body_size, 0);
    assert_eq!(Config::default().limits().max_body_size, 1024 * 1024);
}
