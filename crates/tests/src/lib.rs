//! # Integration Tests
//!
//! End-to-end tests across crates:
//! - Configuration snapshot round trips
//! - Config file -> dispatcher -> sink delivery
//! - Shutdown, ordering and failure behaviour observed from outside

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    const CONFIG: &str = r#"
version = "V1"

[destination]
group_name = "payments"
stream_name = "api-1"

[export]
batch_size = 25
interval_ms = 1000
ordered_logs = true

[sink]
name = "console"
sink_type = "log"
"#;

    #[test]
    fn test_blueprint_survives_toml_and_json() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();

        let toml = ConfigLoader::to_toml(&blueprint).unwrap();
        let from_toml = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&blueprint).unwrap();
        let from_json = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        for loaded in [from_toml, from_json] {
            let config = loaded.to_export_config().unwrap();
            assert_eq!(config.batch_size(), 25);
            assert!(config.ordered_logs());
            assert_eq!(config.destination().to_string(), "payments/api-1");
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{InputLogEvent, LogEvent, ShipperBlueprint};
    use dispatcher::{create_dispatcher, BatchEnvelope};
    use tempfile::tempdir;

    fn file_blueprint(base: &Path, batch_size: usize, extra_export: &str, create_groups: bool) -> ShipperBlueprint {
        let config = format!(
            r#"
[destination]
group_name = "app"
stream_name = "web"

[export]
batch_size = {batch_size}
{extra_export}

[sink]
name = "disk"
sink_type = "file"
params = {{ base_path = "{}", create_groups = "{create_groups}" }}
"#,
            base.display()
        );
        ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap()
    }

    fn read_records(path: &Path) -> Vec<InputLogEvent> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Config -> Dispatcher -> FileSink; every event lands exactly once
    #[tokio::test]
    async fn test_e2e_file_delivery() {
        let dir = tempdir().unwrap();
        let blueprint = file_blueprint(dir.path(), 4, "interval_ms = 3600000", true);

        let dispatcher = create_dispatcher(blueprint).await.unwrap();
        for i in 0..10 {
            dispatcher.dispatch(LogEvent::now(format!("line-{i}"))).await;
        }
        let metrics = dispatcher.stop().await;

        assert_eq!(metrics.received_count, 10);
        assert_eq!(metrics.batch_count, 3);
        assert_eq!(metrics.delivered_count, 10);
        assert_eq!(metrics.lost_count, 0);

        let records = read_records(&dir.path().join("app").join("web.jsonl"));
        let messages: Vec<_> = records.iter().map(|r| r.message.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("line-{i}")).collect();
        assert_eq!(messages, expected);
    }

    /// Missing group is reported per batch and never stops the exporter
    #[tokio::test]
    async fn test_e2e_destination_not_found() {
        let dir = tempdir().unwrap();
        let blueprint = file_blueprint(dir.path(), 2, "", false);

        let dispatcher = create_dispatcher(blueprint).await.unwrap();
        for i in 0..5 {
            dispatcher.dispatch(LogEvent::now(format!("line-{i}"))).await;
        }
        let metrics = dispatcher.stop().await;

        assert_eq!(metrics.batch_count, 3);
        assert_eq!(metrics.destination_not_found, 3);
        assert_eq!(metrics.lost_count, 5);
        assert!(!dir.path().join("app").exists());
    }

    /// Ordered logs: each batch is sorted by timestamp before delivery
    #[tokio::test]
    async fn test_e2e_ordered_logs() {
        let dir = tempdir().unwrap();
        let blueprint = file_blueprint(dir.path(), 4, "ordered_logs = true", true);

        let dispatcher = create_dispatcher(blueprint).await.unwrap();
        for (message, millis) in [("d", 4_000), ("b", 2_000), ("a", 1_000), ("c", 3_000)] {
            let timestamp = Utc.timestamp_millis_opt(millis).unwrap();
            dispatcher.dispatch(LogEvent::new(message, timestamp)).await;
        }
        dispatcher.stop().await;

        let records = read_records(&dir.path().join("app").join("web.jsonl"));
        let timestamps: Vec<_> = records.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![1_000, 2_000, 3_000, 4_000]);
    }

    /// Interval trigger delivers a partial batch without waiting for stop
    #[tokio::test(start_paused = true)]
    async fn test_e2e_interval_flush() {
        let dir = tempdir().unwrap();
        let blueprint = file_blueprint(dir.path(), 100, "interval_ms = 100", true);
        let stream = dir.path().join("app").join("web.jsonl");

        let dispatcher = create_dispatcher(blueprint).await.unwrap();
        dispatcher.dispatch(LogEvent::now("early")).await;
        dispatcher.dispatch(LogEvent::now("bird")).await;
        assert!(!stream.exists());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(read_records(&stream).len(), 2);

        dispatcher.stop().await;
    }

    /// Plain threads write through the io::Write adapter
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_e2e_writer_from_threads() {
        let dir = tempdir().unwrap();
        let blueprint = file_blueprint(dir.path(), 8, "", true);
        let dispatcher = create_dispatcher(blueprint).await.unwrap();

        let threads: Vec<_> = (0..3)
            .map(|t| {
                let mut writer = dispatcher.writer();
                std::thread::spawn(move || {
                    for i in 0..10 {
                        writer.write_all(format!("t{t}-{i}").as_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        let metrics = dispatcher.stop().await;

        assert_eq!(metrics.delivered_count, 30);
        assert_eq!(read_records(&dir.path().join("app").join("web.jsonl")).len(), 30);
    }

    /// Config -> Dispatcher -> NetworkSink; one datagram per batch
    #[tokio::test]
    async fn test_e2e_network_delivery() {
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap();
        let config = format!(
            r#"
[destination]
group_name = "app"
stream_name = "udp"

[export]
batch_size = 3

[sink]
name = "net"
sink_type = "network"
params = {{ addr = "{addr}", format = "json" }}
"#
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let dispatcher = create_dispatcher(blueprint).await.unwrap();
        for i in 0..3 {
            dispatcher.dispatch(LogEvent::now(format!("packet-{i}"))).await;
        }
        dispatcher.stop().await;

        let mut buf = vec![0u8; 65535];
        let n = receiver.recv(&mut buf).await.unwrap();
        let envelope: BatchEnvelope = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(envelope.group_name, "app");
        assert_eq!(envelope.stream_name, "udp");
        assert_eq!(envelope.events.len(), 3);
    }
}
