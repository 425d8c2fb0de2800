use clap::Parser;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9092";
const DEFAULT_LOG_DIR: &str = "/tmp/kraft-combined-logs";

/// Startup configuration for the broker: where it listens and where the
/// KRaft-style logs live on disk.
#[derive(Parser, Debug, Clone)]
#[command(name = "kafka-broker", about = "Minimal Kafka-protocol broker")]
pub struct Config {
    /// Address the TCP listener binds to.
    #[arg(long, env = "KAFKA_BROKER_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Base directory holding the cluster-metadata log and partition logs.
    #[arg(long, env = "KAFKA_BROKER_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: String,
}

impl Config {
    pub fn cluster_metadata_log_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.log_dir)
            .join("__cluster_metadata-0")
            .join("00000000000000000000.log")
    }

    pub fn partition_log_path(&self, topic: &str, partition: i32) -> std::path::PathBuf {
        std::path::Path::new(&self.log_dir)
            .join(format!("{topic}-{partition}"))
            .join("00000000000000000000.log")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}
