//! CLI argument parsing for gridwatch.

use camino::Utf8PathBuf;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gridwatch")]
#[command(about = "Watch grid agent schedules on a sliding 48-hour timeline")]
pub struct Args {
    /// Backend base URL
    #[arg(long, default_value = "http://localhost:8000", env = "GRIDWATCH_API_URL")]
    pub api_url: String,

    /// Dashboard (status) poll interval in seconds
    #[arg(long, default_value = "2")]
    pub status_interval: u64,

    /// Discovery poll interval in seconds
    #[arg(long, default_value = "3")]
    pub discovery_interval: u64,

    /// Timeline poll interval in seconds
    #[arg(long, default_value = "5")]
    pub timeline_interval: u64,

    /// Job queue poll interval in seconds
    #[arg(long, default_value = "2")]
    pub jobs_interval: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Hours to move the clock when the backend cannot step it
    #[arg(long, default_value = "1")]
    pub step_hours: i64,

    /// Only show locations in this region
    #[arg(long)]
    pub region: Option<String>,

    /// Color theme (dark or light)
    #[arg(long, default_value = "dark")]
    pub theme: String,

    /// Write logs to this file instead of discarding them
    #[arg(long)]
    pub log_file: Option<Utf8PathBuf>,

    /// Fetch the timeline once, print it as JSON and exit
    #[arg(long)]
    pub dump: bool,
}

impl Args {
    pub fn status_interval(&self) -> Duration {
        secs(self.status_interval)
    }

    pub fn discovery_interval(&self) -> Duration {
        secs(self.discovery_interval)
    }

    pub fn timeline_interval(&self) -> Duration {
        secs(self.timeline_interval)
    }

    pub fn jobs_interval(&self) -> Duration {
        secs(self.jobs_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        secs(self.timeout)
    }
}

/// Zero would spin the poll loops, so treat it as one second.
fn secs(n: u64) -> Duration {
    Duration::from_secs(n.max(1))
}
