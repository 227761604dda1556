use std::path::PathBuf;
use std::time::Duration;

use mote::config::{CONFIG_ENV, Config, LISTEN_ENV};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 80);
    assert_eq!(cfg.server.recv_timeout(), Duration::from_secs(1));
    assert_eq!(cfg.server.send_timeout(), Duration::from_secs(1));
    assert_eq!(cfg.server.poll_interval(), Duration::from_millis(100));
    assert_eq!(cfg.server.read_chunk, 64);
    assert_eq!(cfg.error_log, PathBuf::from("error.log"));
    assert_eq!(cfg.index_page, PathBuf::from("templates/index.html"));
    assert_eq!(cfg.restart_delay(), Duration::from_secs(1));
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml("server:\n  port: 8080\n").unwrap();

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.read_chunk, 64);
    assert_eq!(cfg.error_log, PathBuf::from("error.log"));
}

#[test]
fn test_config_full_yaml() {
    let yaml = r#"
server:
  host: 192.168.4.1
  port: 8000
  recv_timeout_ms: 250
  send_timeout_ms: 750
  poll_interval_ms: 20
  read_chunk: 128
error_log: /data/error.log
index_page: /www/index.html
restart_delay_ms: 5000
"#;
    let cfg = Config::from_yaml(yaml).unwrap();

    assert_eq!(cfg.server.listen_addr(), "192.168.4.1:8000");
    assert_eq!(cfg.server.recv_timeout(), Duration::from_millis(250));
    assert_eq!(cfg.server.send_timeout(), Duration::from_millis(750));
    assert_eq!(cfg.server.poll_interval(), Duration::from_millis(20));
    assert_eq!(cfg.server.read_chunk, 128);
    assert_eq!(cfg.error_log, PathBuf::from("/data/error.log"));
    assert_eq!(cfg.index_page, PathBuf::from("/www/index.html"));
    assert_eq!(cfg.restart_delay(), Duration::from_secs(5));
}

#[test]
fn test_config_rejects_bad_types() {
    assert!(Config::from_yaml("server:\n  port: eighty\n").is_err());
}

#[test]
fn test_config_from_missing_file() {
    let err = Config::from_file(std::path::Path::new("/no/such/mote.yaml")).unwrap_err();

    assert!(err.to_string().contains("/no/such/mote.yaml"));
}

// All environment handling lives in one test so parallel tests never see
// each other's variables.
#[test]
fn test_config_load_from_environment() {
    let path = std::env::temp_dir().join(format!("mote-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "server:\n  port: 9000\nerror_log: boot.log\n").unwrap();

    unsafe {
        std::env::remove_var(LISTEN_ENV);
        std::env::remove_var(CONFIG_ENV);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.port, 80);

    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.error_log, PathBuf::from("boot.log"));

    unsafe {
        std::env::set_var(LISTEN_ENV, "127.0.0.1:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.error_log, PathBuf::from("boot.log"));

    unsafe {
        std::env::set_var(LISTEN_ENV, "[::1]:3001");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.host, "::1");
    assert_eq!(cfg.server.port, 3001);

    unsafe {
        std::env::set_var(LISTEN_ENV, "no-port-here");
    }
    assert!(Config::load().is_err());

    unsafe {
        std::env::remove_var(LISTEN_ENV);
        std::env::remove_var(CONFIG_ENV);
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.listen_addr(), cfg2.server.listen_addr());
}
