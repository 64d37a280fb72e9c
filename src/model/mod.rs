//! # Project Snapshot Model
//!
//! The input representation for the report engine. A project is a flat
//! record plus an ordered list of devices, exactly as the CRUD layer that
//! owns them serializes them. The engine never mutates or persists these
//! values; it only reads a snapshot handed to it at composition time.
//!
//! Field names follow the collaborator's JSON (`map_filename`,
//! `device_type`, ...) so a project dump can be fed in without a mapping
//! step.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;

/// Category assigned to a freshly created device.
pub const DEFAULT_DEVICE_TYPE: &str = "router";

/// Placeholder shown for any absent or empty field.
pub const FALLBACK: &str = "-";

/// A network topology project ready for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,

    /// Display name, used in the title block.
    pub name: String,

    /// Free-form notes. Rendered line by line when non-empty.
    #[serde(default)]
    pub notes: Option<String>,

    /// Reference to the background map image: a file name resolved against
    /// the configured image directory, a path, or a data URI.
    #[serde(default)]
    pub map_filename: Option<String>,

    /// Devices in render order.
    #[serde(default)]
    pub devices: Vec<Device>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Project {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            notes: None,
            map_filename: None,
            devices: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_map(mut self, reference: impl Into<String>) -> Self {
        self.map_filename = Some(reference.into());
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    /// Notes text, if there is anything to render.
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }

    /// Map image reference, if one is set.
    pub fn map_reference(&self) -> Option<&str> {
        self.map_filename.as_deref().filter(|m| !m.is_empty())
    }
}

/// A single device placed on the project canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,

    /// Primary category field (router, switch, host, ...).
    #[serde(default)]
    pub device_type: Option<String>,

    /// Older snapshots carry the category under `type`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,

    /// Canvas position. Only the interactive editor uses these.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub dns: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Device {
    /// A new device with the default category at the canvas origin.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            device_type: Some(DEFAULT_DEVICE_TYPE.to_string()),
            legacy_type: None,
            x: 0.0,
            y: 0.0,
            name: None,
            ip: None,
            mac: None,
            gateway: None,
            dns: None,
            notes: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, device_type: Option<&str>) -> Self {
        self.device_type = device_type.map(str::to_string);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = Some(gateway.into());
        self
    }

    pub fn with_dns(mut self, dns: impl Into<String>) -> Self {
        self.dns = Some(dns.into());
        self
    }

    /// Category as displayed in the report: `device_type`, then the legacy
    /// `type` field, then the fallback dash.
    pub fn category(&self) -> &str {
        resolve(
            self.device_type.as_deref(),
            self.legacy_type.as_deref(),
            FALLBACK,
        )
    }
}

/// Pick the first present, non-empty value in priority order.
pub fn resolve<'a>(primary: Option<&'a str>, secondary: Option<&'a str>, default: &'a str) -> &'a str {
    primary
        .filter(|v| !v.is_empty())
        .or_else(|| secondary.filter(|v| !v.is_empty()))
        .unwrap_or(default)
}

/// The JSON envelope accepted by [`crate::compose_json`] and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub project: Project,

    /// Display name of the user requesting the report.
    pub generated_by: String,

    /// Generation timestamp. The CLI fills it from the local clock when it
    /// is absent; the library itself never reads the clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub config: ReportConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_primary() {
        assert_eq!(resolve(Some("switch"), Some("hub"), "-"), "switch");
    }

    #[test]
    fn resolve_skips_empty_primary() {
        assert_eq!(resolve(Some(""), Some("hub"), "-"), "hub");
        assert_eq!(resolve(None, Some("hub"), "-"), "hub");
    }

    #[test]
    fn resolve_falls_back_to_default() {
        assert_eq!(resolve(None, None, "-"), "-");
        assert_eq!(resolve(Some(""), Some(""), "-"), "-");
    }

    #[test]
    fn new_device_is_a_router() {
        let device = Device::new(1);
        assert_eq!(device.category(), "router");
        assert_eq!((device.x, device.y), (0.0, 0.0));
    }

    #[test]
    fn legacy_type_used_when_primary_unset() {
        let json = r#"{ "id": 4, "type": "switch" }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.device_type, None);
        assert_eq!(device.category(), "switch");
    }

    #[test]
    fn project_from_collaborator_json() {
        let json = r#"{
            "id": 7,
            "name": "Lab-Net",
            "map_filename": "20240101_120000_map.png",
            "notes": "Uplink: 1Gbps",
            "created_at": "2024-01-01T12:00:00",
            "devices": [
                { "id": 1, "device_type": "router", "x": 10.5, "y": 20.0, "ip": "10.0.0.1",
                  "name": "Edge-RTR", "dns": null, "gateway": null, "mac": null, "notes": null }
            ]
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, 7);
        assert_eq!(project.map_reference(), Some("20240101_120000_map.png"));
        assert_eq!(project.devices.len(), 1);
        assert_eq!(project.devices[0].ip.as_deref(), Some("10.0.0.1"));
        assert!(project.created_at.is_some());
        assert!(project.updated_at.is_none());
    }

    #[test]
    fn empty_notes_are_not_rendered() {
        let project = Project::new(1, "p").with_notes("");
        assert_eq!(project.notes_text(), None);
        let project = Project::new(1, "p").with_notes("x");
        assert_eq!(project.notes_text(), Some("x"));
    }

    #[test]
    fn request_defaults() {
        let json = r#"{ "project": { "id": 1, "name": "p" }, "generated_by": "ana" }"#;
        let request: ReportRequest = serde_json::from_str(json).unwrap();
        assert!(request.generated_at.is_none());
        assert!(request.project.devices.is_empty());
        assert!(request.config.compress);
    }
}
