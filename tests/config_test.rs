use inverter_web::config::Config;
use inverter_web::source::Transport;
use serial_test::serial;

/// Test configuration loading
#[tokio::test]
#[serial]
async fn test_config_loading() {
    let config_str = r#"
server:
  host: "127.0.0.1"
  port: 8080

source:
  transport: "tcp"
  addr: "localhost:8139"
"#;

    let temp_file = std::env::temp_dir().join(format!("test-config-{}.yaml", std::process::id()));
    std::fs::write(&temp_file, config_str).unwrap();

    let config = Config::load(&temp_file).unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(
        config.source.transport().unwrap(),
        Transport::Tcp {
            addr: "localhost:8139".to_string()
        }
    );

    std::fs::remove_file(&temp_file).ok();
}

/// Test environment variable substitution in the config file
#[tokio::test]
#[serial]
async fn test_config_env_substitution() {
    let config_str = r#"
server:
  host: "0.0.0.0"
  port: 8080

source:
  transport: "serial"
  device: "$(INVERTER_DEVICE)"
  baud: 2400
"#;

    let temp_file =
        std::env::temp_dir().join(format!("test-config-env-{}.yaml", std::process::id()));
    std::fs::write(&temp_file, config_str).unwrap();

    let original = std::env::var("INVERTER_DEVICE").ok();
    std::env::set_var("INVERTER_DEVICE", "/dev/ttyUSB7");

    let config = Config::load(&temp_file).unwrap();
    assert_eq!(config.source.device.as_deref(), Some("/dev/ttyUSB7"));

    if let Some(val) = original {
        std::env::set_var("INVERTER_DEVICE", val);
    } else {
        std::env::remove_var("INVERTER_DEVICE");
    }

    std::fs::remove_file(&temp_file).ok();
}

/// Test that validation rejects a tcp transport without an address
#[tokio::test]
#[serial]
async fn test_config_rejects_tcp_without_addr() {
    let config_str = r#"
server:
  host: "0.0.0.0"
  port: 8080

source:
  transport: "tcp"
"#;

    let temp_file =
        std::env::temp_dir().join(format!("test-config-bad-{}.yaml", std::process::id()));
    std::fs::write(&temp_file, config_str).unwrap();

    assert!(Config::load(&temp_file).is_err());

    std::fs::remove_file(&temp_file).ok();
}

/// Test that validation rejects an unknown transport
#[tokio::test]
#[serial]
async fn test_config_rejects_unknown_transport() {
    let config_str = r#"
server:
  host: "0.0.0.0"
  port: 8080

source:
  transport: "carrier-pigeon"
"#;

    let temp_file =
        std::env::temp_dir().join(format!("test-config-unknown-{}.yaml", std::process::id()));
    std::fs::write(&temp_file, config_str).unwrap();

    assert!(Config::load(&temp_file).is_err());

    std::fs::remove_file(&temp_file).ok();
}
