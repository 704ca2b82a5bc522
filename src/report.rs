/// Report assembly: decoded values plus pass-through session fields become
/// labeled rows in a fixed order, then fixed-width text.
///
/// The single branch point is the mode's `DetailLevel`: versions and
/// peripherals are listed only when SlimCore is active, and a restart warning
/// takes their place when SlimCore was negotiated but never loaded.

use crate::session::SessionSnapshot;
use crate::vdi_mode::{DetailLevel, VdiMode};

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Write as _;

pub const TITLE: &str = "Teams VDI Report";
pub const LOAD_FAILED_WARNING: &str = "SlimCore failed to load, please restart Teams";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Heading(&'static str),
    Field { label: &'static str, value: String },
    Warning(&'static str),
}

fn field(label: &'static str, value: impl Into<String>) -> Row {
    Row::Field { label, value: value.into() }
}

/// Build the report rows for one session.
pub fn assemble(session: &SessionSnapshot, mode: &VdiMode, os_version: &str) -> Vec<Row> {
    let mut rows = vec![
        Row::Heading(TITLE),
        field("Timestamp", format_timestamp(session.timestamp, &chrono::Local)),
        field("Windows Version", os_version),
        field("VDI Mode", mode.to_string()),
        field("Connected Stack", session.connected_stack.as_str()),
    ];

    match mode.detail_level(&session.connected_stack) {
        DetailLevel::Summary => {}
        DetailLevel::LoadFailed => rows.push(Row::Warning(LOAD_FAILED_WARNING)),
        DetailLevel::Details => {
            let v = &session.version;
            let d = &session.device;
            rows.extend([
                field("Plugin Version", v.plugin.as_str()),
                field("Bridge Version", v.bridge.as_str()),
                field("Client Version", v.client.as_str()),
                field("SlimCore Version", v.slimcore.as_str()),
                field("Speakers", d.speaker.joined_labels()),
                field("Selected Speaker", d.speaker.selected.as_str()),
                field("Cameras", d.camera.joined_labels()),
                field("Selected Camera", d.camera.selected.as_str()),
                field("Microphones", d.microphone.joined_labels()),
                field("Selected Microphone", d.microphone.selected.as_str()),
                field("Secondary Ringer", d.secondary_ringer.as_str()),
            ]);
        }
    }

    rows
}

/// Render rows as text with labels padded to `label_width`.
pub fn render(rows: &[Row], label_width: usize) -> String {
    let mut out = String::new();
    for row in rows {
        // Writing to a String cannot fail.
        let _ = match row {
            Row::Heading(title) => {
                writeln!(out, "{title}\n{}", "=".repeat(title.chars().count()))
            }
            Row::Field { label, value } if value.is_empty() => {
                writeln!(out, "{label:<label_width$} :")
            }
            Row::Field { label, value } => writeln!(out, "{label:<label_width$} : {value}"),
            Row::Warning(message) => writeln!(out, "{:<label_width$} : {message}", "WARNING"),
        };
    }
    out
}

/// Format a millisecond Unix timestamp as `YYYY-MM-DD HH:MM:SS` in `tz`.
/// Absent or out-of-range values render empty.
pub fn format_timestamp<Tz: TimeZone>(millis: Option<i64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::parse_latest;
    use crate::vdi_mode::{decode, ModeScheme};

    const SESSION: &str = r#"{"h": [{
        "timestamp": 1730000000000,
        "connectedStack": "remote",
        "vdiMode": "120X",
        "version": {"plugin": "2.0.0.1", "bridge": "1.14.0", "client": "24295", "slimcore": "2024.45"},
        "device": {
            "speaker": {"available": [{"label": "Speakers"}, {"label": "Headset"}], "selected": "Headset"},
            "camera": {"available": [], "selected": ""},
            "microphone": {"available": [{"label": "Array Mic"}], "selected": "Array Mic"},
            "secondaryRinger": "Speakers"
        }
    }]}"#;

    fn session_with_stack(stack: &str) -> SessionSnapshot {
        let mut s = parse_latest(SESSION, "h").unwrap();
        s.connected_stack = stack.into();
        s
    }

    fn labels(rows: &[Row]) -> Vec<&'static str> {
        rows.iter()
            .filter_map(|r| match r {
                Row::Field { label, .. } => Some(*label),
                _ => None,
            })
            .collect()
    }

    fn value<'a>(rows: &'a [Row], wanted: &str) -> Option<&'a str> {
        rows.iter().find_map(|r| match r {
            Row::Field { label, value } if *label == wanted => Some(value.as_str()),
            _ => None,
        })
    }

    #[test]
    fn details_when_slimcore_and_remote_stack() {
        let s = session_with_stack("remote");
        let mode = decode(&s.vdi_mode, ModeScheme::Positional);
        let rows = assemble(&s, &mode, "Windows 11 24H2");

        assert_eq!(
            labels(&rows),
            vec![
                "Timestamp",
                "Windows Version",
                "VDI Mode",
                "Connected Stack",
                "Plugin Version",
                "Bridge Version",
                "Client Version",
                "SlimCore Version",
                "Speakers",
                "Selected Speaker",
                "Cameras",
                "Selected Camera",
                "Microphones",
                "Selected Microphone",
                "Secondary Ringer",
            ]
        );
        assert_eq!(value(&rows, "Speakers"), Some("Speakers, Headset"));
        assert_eq!(value(&rows, "Cameras"), Some(""));
        assert!(!rows.iter().any(|r| matches!(r, Row::Warning(_))));
    }

    #[test]
    fn warning_when_slimcore_without_stack() {
        let s = session_with_stack("local");
        let mode = decode(&s.vdi_mode, ModeScheme::Positional);
        let rows = assemble(&s, &mode, "Windows 11 24H2");

        assert_eq!(rows.last(), Some(&Row::Warning(LOAD_FAILED_WARNING)));
        assert_eq!(value(&rows, "Plugin Version"), None);
        assert_eq!(value(&rows, "Speakers"), None);
    }

    #[test]
    fn summary_for_lower_tiers() {
        let s = session_with_stack("remote");
        for code in ["110X", "100X", "19XX", ""] {
            let mode = decode(code, ModeScheme::Positional);
            let rows = assemble(&s, &mode, "x");
            assert_eq!(labels(&rows).len(), 4, "code {code:?}");
            assert!(!rows.iter().any(|r| matches!(r, Row::Warning(_))), "code {code:?}");
        }
    }

    #[test]
    fn mode_row_embeds_raw_code() {
        let s = session_with_stack("remote");
        let mode = decode(&s.vdi_mode, ModeScheme::Auto);
        let rows = assemble(&s, &mode, "x");
        assert_eq!(value(&rows, "VDI Mode"), Some("Citrix - SlimCore Optimized (Code: 120X)"));
    }

    #[test]
    fn render_fixed_width_labels() {
        let rows = vec![
            Row::Heading("Title"),
            field("Stack", "remote"),
            field("Cameras", ""),
            Row::Warning(LOAD_FAILED_WARNING),
        ];
        let text = render(&rows, 10);
        let expected = format!(
            "Title\n=====\nStack      : remote\nCameras    :\nWARNING    : {LOAD_FAILED_WARNING}\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(format_timestamp(Some(1730000000000), &Utc), "2024-10-27 03:33:20");
        assert_eq!(format_timestamp(Some(0), &Utc), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(None, &Utc), "");
        assert_eq!(format_timestamp(Some(i64::MAX), &Utc), "");
    }
}
