mod config;
mod error;
mod os_version;
mod registry;
mod report;
mod session;
mod vdi_mode;

use crate::error::SessionError;
use crate::os_version::OsInfoProvider;

use std::path::Path;

fn main() {
    // Logs go to stderr; stdout carries only the report.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cfg = config::Config::load();
    log::debug!("Session file: {}", cfg.session_file);

    match build_report(&cfg, &registry::RegistryOsInfo) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Load the latest session, decode it and render the report text.
/// Fails only when the session snapshot cannot be loaded.
fn build_report(cfg: &config::Config, os_info: &dyn OsInfoProvider) -> Result<String, SessionError> {
    let session = session::load_latest(Path::new(&cfg.session_file), &cfg.history_key)?;

    let mode = vdi_mode::decode(&session.vdi_mode, cfg.mode_scheme);
    log::debug!(
        "vdiMode {:?} → {mode} (tier {:?}, stack {:?})",
        mode.raw_code(),
        mode.optimization(),
        session.connected_stack
    );

    let os = os_info.os_descriptor();
    let os_version = os_version::resolve(os.as_ref());
    log::debug!("OS: {os_version}");

    let rows = report::assemble(&session, &mode, &os_version);
    Ok(report::render(&rows, cfg.label_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os_version::OsDescriptor;
    use crate::vdi_mode::ModeScheme;

    struct FixedOs(Option<OsDescriptor>);

    impl OsInfoProvider for FixedOs {
        fn os_descriptor(&self) -> Option<OsDescriptor> {
            self.0.clone()
        }
    }

    fn config_for(path: &Path) -> config::Config {
        config::Config {
            session_file: path.to_string_lossy().into_owned(),
            history_key: "vdiSessionHistory".into(),
            mode_scheme: ModeScheme::Auto,
            label_width: 20,
        }
    }

    #[test]
    fn missing_session_file_produces_no_report() {
        let path = std::env::temp_dir().join("vdireport_main_missing.json");
        let _ = std::fs::remove_file(&path);

        let result = build_report(&config_for(&path), &FixedOs(None));
        match result {
            Err(e @ SessionError::MissingInputFile(_)) => assert_eq!(e.exit_code(), 1),
            other => panic!("Expected MissingInputFile, got {other:?}"),
        }
    }

    #[test]
    fn full_report_end_to_end() {
        let dir = std::env::temp_dir().join("vdireport_main_e2e");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("history.json");
        std::fs::write(
            &path,
            r#"{"vdiSessionHistory": [
                {"vdiMode": "1100", "connectedStack": "local"},
                {
                    "timestamp": 1730000000000,
                    "vdiMode": "5200",
                    "connectedStack": "remote",
                    "version": {"plugin": "2.0.0.1", "bridge": "1.14.0"},
                    "device": {
                        "speaker": {"available": [{"label": "A"}, {"label": "B"}], "selected": "B"},
                        "secondaryRinger": "A"
                    }
                }
            ]}"#,
        )
        .unwrap();

        let os = OsDescriptor {
            build_number: 26100,
            update_revision: 2605,
            edition_id: "ServerDatacenter".into(),
            product_name: "Windows Server 2025 Datacenter".into(),
        };
        let text = build_report(&config_for(&path), &FixedOs(Some(os))).unwrap();

        assert!(text.starts_with("Teams VDI Report\n"));
        assert!(text.contains("Windows Server 2025 (Build 26100.2605, ServerDatacenter)"));
        assert!(text.contains(
            "VDI Mode             : Azure Virtual Desktop / Windows 365 - SlimCore Optimized (Code: 5200)"
        ));
        assert!(text.contains("Speakers             : A, B\n"));
        assert!(text.contains("Secondary Ringer     : A\n"));
        assert!(!text.contains("WARNING"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn slimcore_code_without_remote_stack_warns() {
        let dir = std::env::temp_dir().join("vdireport_main_load_failed");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("history.json");
        std::fs::write(
            &path,
            r#"{"vdiSessionHistory": [{
                "vdiMode": "1200",
                "connectedStack": "local",
                "version": {"plugin": "2.0.0.1"},
                "device": {"speaker": {"available": [{"label": "A"}]}}
            }]}"#,
        )
        .unwrap();

        let text = build_report(&config_for(&path), &FixedOs(None)).unwrap();
        assert!(text.contains("WARNING              : SlimCore failed to load, please restart Teams\n"));
        assert!(!text.contains("Plugin Version"));
        assert!(!text.contains("Speakers"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_os_still_reports() {
        let dir = std::env::temp_dir().join("vdireport_main_no_os");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("history.json");
        std::fs::write(&path, r#"{"vdiSessionHistory": [{"vdiMode": "12"}]}"#).unwrap();

        let text = build_report(&config_for(&path), &FixedOs(None)).unwrap();
        assert!(text.contains("Windows Version      : Unknown Windows Version\n"));
        assert!(text.contains("VDI Mode             : Unknown (Invalid Code)\n"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
