//! Wire model of the polled state document.
//!
//! The remote service returns one JSON document per successful probe.
//! Every group is optional on the wire; unknown top-level fields are
//! preserved in the extension map so newer firmware can ship fields the
//! client does not yet model. The whole value is replaced wholesale on
//! each successful cycle — never partially merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Groups ──────────────────────────────────────────────────────

/// System resource summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemGroup {
    #[serde(default)]
    pub cpu_load: Option<f64>,
    #[serde(default)]
    pub uptime_secs: Option<u64>,
}

/// Named runtime flags reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeGroup {
    #[serde(default)]
    pub flags: serde_json::Map<String, Value>,
}

/// Device-level signals. `media_present` plus its timestamp is the
/// signal the notification deriver watches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceGroup {
    #[serde(default)]
    pub media_present: bool,
    #[serde(default)]
    pub media_inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media_slot: Option<String>,
}

/// Environment clock as reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockGroup {
    #[serde(default)]
    pub device_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Memory usage summary (bytes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryGroup {
    #[serde(default)]
    pub used: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Task/process counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskGroup {
    #[serde(default)]
    pub running: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

// ─── Polled State ────────────────────────────────────────────────

/// The opaque structured payload returned by the first successful probe
/// of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolledState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskGroup>,
    /// Open-ended extension map for fields the client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PolledState {
    /// The media-insertion signal, if present and carrying a timestamp.
    pub fn media_signal(&self) -> Option<(DateTime<Utc>, Option<&str>)> {
        let device = self.device.as_ref()?;
        if !device.media_present {
            return None;
        }
        let inserted_at = device.media_inserted_at?;
        Some((inserted_at, device.media_slot.as_deref()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────
