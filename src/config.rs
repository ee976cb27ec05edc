//! Runtime configuration, read from the command line or the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::audio::StreamFormat;

#[derive(Parser, Clone, Debug)]
#[command(name = "opus-recorder", version, about = "Receives framed Opus audio and saves it as WAV")]
pub struct RecorderConfig {
    /// Address the HTTP intake listens on
    #[arg(long, env = "RECORDER_LISTEN", default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,

    /// Directory finished recordings are written to
    #[arg(long, env = "RECORDER_DIR", default_value = "recordings")]
    pub recordings_dir: PathBuf,

    /// Decoder sample rate in Hz
    #[arg(long, env = "RECORDER_SAMPLE_RATE", default_value_t = 16000)]
    pub sample_rate: u32,

    /// Decoded channel count
    #[arg(long, env = "RECORDER_CHANNELS", default_value_t = 1)]
    pub channels: u16,

    /// Duration of one Opus frame as sent by the client
    #[arg(long, env = "RECORDER_FRAME_MS", default_value_t = 20)]
    pub frame_duration_ms: u32,

    /// Submissions that may wait for the worker before intake rejects new ones
    #[arg(long, env = "RECORDER_QUEUE_CAPACITY", default_value_t = 64)]
    pub queue_capacity: usize,

    /// Largest accepted request body in bytes
    #[arg(long, env = "RECORDER_MAX_BODY", default_value_t = 16 * 1024 * 1024)]
    pub max_body_bytes: usize,
}

impl RecorderConfig {
    /// Checks everything that would otherwise only fail once audio arrives.
    pub fn validate(&self) -> Result<StreamFormat> {
        if self.queue_capacity == 0 {
            anyhow::bail!("Queue capacity must be at least 1");
        }
        StreamFormat::new(self.sample_rate, self.channels, self.frame_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn default_of(name: &str) -> String {
        let command = RecorderConfig::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == name)
            .unwrap();
        arg.get_default_values()[0].to_string_lossy().into_owned()
    }

    #[test]
    fn test_default_listen_and_format() {
        assert_eq!(default_of("listen"), "127.0.0.1:5000");
        assert_eq!(default_of("recordings_dir"), "recordings");
        assert_eq!(default_of("sample_rate"), "16000");
        assert_eq!(default_of("channels"), "1");
        assert_eq!(default_of("frame_duration_ms"), "20");
        assert_eq!(default_of("queue_capacity"), "64");

        let config = RecorderConfig {
            listen: default_of("listen").parse().unwrap(),
            recordings_dir: PathBuf::from(default_of("recordings_dir")),
            sample_rate: default_of("sample_rate").parse().unwrap(),
            channels: default_of("channels").parse().unwrap(),
            frame_duration_ms: default_of("frame_duration_ms").parse().unwrap(),
            queue_capacity: default_of("queue_capacity").parse().unwrap(),
            max_body_bytes: default_of("max_body_bytes").parse().unwrap(),
        };
        assert_eq!(config.validate().unwrap(), StreamFormat::default());
        assert_eq!(config.max_body_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = RecorderConfig::parse_from([
            "opus-recorder",
            "--sample-rate",
            "48000",
            "--channels",
            "2",
            "--frame-duration-ms",
            "20",
            "--queue-capacity",
            "4",
        ]);
        let format = config.validate().unwrap();
        assert_eq!(format.samples_per_frame(), 960);
        assert_eq!(config.queue_capacity, 4);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = RecorderConfig::parse_from(["opus-recorder", "--queue-capacity", "0"]);
        assert!(config.validate().is_err());

        let config = RecorderConfig::parse_from(["opus-recorder", "--sample-rate", "44100"]);
        assert!(config.validate().is_err());
    }
}
