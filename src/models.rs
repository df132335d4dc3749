//! Data models for the Chinachu API

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Records that carry a server-side identifier
pub trait Identified {
    fn id(&self) -> &str;
}

/// Broadcast channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    /// Broadcast type: GR, BS, CS, SKY
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sid: Option<u32>,
}

/// Program / guide entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    /// Genre
    #[serde(default)]
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub sub_title: String,
    #[serde(default)]
    pub full_title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub end: Option<DateTime<Utc>>,
    /// Duration in seconds
    pub seconds: f64,
    /// Attributes such as 新, 再, 字
    #[serde(default)]
    pub flags: Vec<String>,
    pub channel: Channel,
}

pub type GuideEntry = Program;

impl Program {
    /// Zero for negative or unrepresentable lengths
    pub fn duration(&self) -> Duration {
        let millis = self.seconds * 1000.0;
        if !millis.is_finite() || millis <= 0.0 {
            return Duration::zero();
        }
        Duration::try_milliseconds(millis as i64).unwrap_or_else(Duration::zero)
    }

    /// `end` when present, else `start + seconds`; `start` if that overflows
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end
            .unwrap_or_else(|| self.start.checked_add_signed(self.duration()).unwrap_or(self.start))
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn is_airing_at(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end_time()
    }

    /// Full title when the server provided one
    pub fn display_title(&self) -> &str {
        if self.full_title.is_empty() {
            &self.title
        } else {
            &self.full_title
        }
    }
}

impl Identified for Program {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub is_scrambling: bool,
}

/// Recorded program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(flatten)]
    pub program: Program,
    /// Path of the recorded file on the server
    #[serde(rename = "recorded")]
    pub file_path: String,
    #[serde(default)]
    pub tuner: Option<Tuner>,
    #[serde(default)]
    pub command: String,
    /// Bytes, when the server reported it
    #[serde(default)]
    pub size: Option<u64>,
}

impl Recording {
    pub fn tuner_name(&self) -> &str {
        self.tuner.as_ref().map(|t| t.name.as_str()).unwrap_or("")
    }
}

impl Identified for Recording {
    fn id(&self) -> &str {
        &self.program.id
    }
}

/// Reservation of an upcoming program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    #[serde(flatten)]
    pub program: Program,
    #[serde(rename = "isSkip", default)]
    pub skip: bool,
    #[serde(rename = "isConflict", default)]
    pub conflict: bool,
    #[serde(rename = "isManualReserved", default)]
    pub manual: bool,
}

impl Timer {
    pub fn state_label(&self) -> &'static str {
        if self.skip {
            "Skipped"
        } else if self.conflict {
            "Conflicted"
        } else {
            "Reserved"
        }
    }
}

impl Identified for Timer {
    fn id(&self) -> &str {
        &self.program.id
    }
}

/// Locally cached recording (not part of the API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    pub recording_id: String,
    pub local_path: PathBuf,
    pub size: u64,
    /// Last played position as a fraction of the duration
    #[serde(default)]
    pub last_position: f64,
    pub downloaded_at: DateTime<Utc>,
}

impl Download {
    pub fn human_readable_size(&self) -> String {
        format_size(self.size)
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
