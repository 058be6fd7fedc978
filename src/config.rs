//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{
    services::{history::Intensity, storage::default_data_dir},
    state::TimerSettings,
};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "shadowbox-timer")]
#[command(about = "A shadow-boxing round timer controlled over a local HTTP API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Number of rounds
    #[arg(short, long, default_value = "3")]
    pub rounds: u32,

    /// Round length in seconds
    #[arg(long, default_value = "180")]
    pub round_time: u64,

    /// Rest between rounds in seconds
    #[arg(long, default_value = "60")]
    pub rest_time: u64,

    /// Countdown before the first round in seconds
    #[arg(long, default_value = "10")]
    pub get_ready_time: u64,

    /// Intensity recorded for completed workouts
    #[arg(short, long, value_enum, default_value = "medium")]
    pub intensity: Intensity,

    /// Directory for presets, history and profile
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Command run for every bell, e.g. "paplay /usr/share/sounds/bell.oga"
    #[arg(long)]
    pub bell_command: Option<String>,

    /// Music player command; the track is appended or replaces "{url}"
    #[arg(long)]
    pub music_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Timer settings assembled from the flags
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings::new(self.rounds, self.round_time, self.rest_time, self.get_ready_time)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}
