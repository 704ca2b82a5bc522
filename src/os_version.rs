/// Friendly Windows version names from the build number.
///
/// `ProductName` alone is unreliable (Windows 11 still reports "Windows 10"),
/// so the build number is matched against a fixed table. Edition and product
/// name only disambiguate client, server and multi-session releases of the
/// same build.

/// Returned whenever the build is unknown or the OS could not be read.
pub const UNKNOWN_WINDOWS: &str = "Unknown Windows Version";

/// OS identity as read from the local machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsDescriptor {
    pub build_number: u32,
    pub update_revision: u32,
    pub edition_id: String,
    pub product_name: String,
}

/// Source of the local OS descriptor.
/// Returns `None` when the OS identity cannot be read at all.
pub trait OsInfoProvider {
    fn os_descriptor(&self) -> Option<OsDescriptor>;
}

// ── Known builds ─────────────────────────────────────────────────────

struct KnownBuild {
    build: u32,
    client: Option<&'static str>,
    server: Option<&'static str>,
}

const fn both(build: u32, client: &'static str, server: &'static str) -> KnownBuild {
    KnownBuild { build, client: Some(client), server: Some(server) }
}

const fn client(build: u32, name: &'static str) -> KnownBuild {
    KnownBuild { build, client: Some(name), server: None }
}

const fn server(build: u32, name: &'static str) -> KnownBuild {
    KnownBuild { build, client: None, server: Some(name) }
}

const KNOWN_BUILDS: &[KnownBuild] = &[
    client(10240, "Windows 10 1507"),
    client(10586, "Windows 10 1511"),
    both(14393, "Windows 10 1607", "Windows Server 2016"),
    client(15063, "Windows 10 1703"),
    both(16299, "Windows 10 1709", "Windows Server 1709"),
    both(17134, "Windows 10 1803", "Windows Server 1803"),
    both(17763, "Windows 10 1809", "Windows Server 2019"),
    both(18362, "Windows 10 1903", "Windows Server 1903"),
    both(18363, "Windows 10 1909", "Windows Server 1909"),
    both(19041, "Windows 10 2004", "Windows Server 2004"),
    both(19042, "Windows 10 20H2", "Windows Server 20H2"),
    client(19043, "Windows 10 21H1"),
    client(19044, "Windows 10 21H2"),
    client(19045, "Windows 10 22H2"),
    server(20348, "Windows Server 2022"),
    client(22000, "Windows 11 21H2"),
    client(22621, "Windows 11 22H2"),
    client(22631, "Windows 11 23H2"),
    server(25398, "Windows Server 23H2"),
    both(26100, "Windows 11 24H2", "Windows Server 2025"),
    client(26200, "Windows 11 25H2"),
];

/// Editions used by Azure Virtual Desktop multi-session hosts.
const MULTI_SESSION_EDITIONS: &[&str] = &["ServerRdsh", "EnterpriseMultiSession"];

// ── Resolution ───────────────────────────────────────────────────────

fn is_server(os: &OsDescriptor) -> bool {
    os.product_name.contains("Server")
}

fn is_multi_session(os: &OsDescriptor) -> bool {
    MULTI_SESSION_EDITIONS
        .iter()
        .any(|e| os.edition_id.eq_ignore_ascii_case(e))
}

/// Family name for the descriptor's build, without build details.
pub fn family_name(os: &OsDescriptor) -> String {
    let Some(known) = KNOWN_BUILDS.iter().find(|k| k.build == os.build_number) else {
        return UNKNOWN_WINDOWS.to_string();
    };

    // Server check comes first: 26100 is both Windows 11 24H2 and Server 2025.
    if is_server(os) {
        if let Some(name) = known.server.or(known.client) {
            return name.to_string();
        }
    }

    match known.client {
        Some(name) if is_multi_session(os) => format!("{name} Enterprise multi-session"),
        Some(name) => name.to_string(),
        None => known.server.unwrap_or(UNKNOWN_WINDOWS).to_string(),
    }
}

/// Full display string, e.g. `Windows 11 24H2 (Build 26100.2605, Professional)`.
pub fn resolve(os: Option<&OsDescriptor>) -> String {
    let Some(os) = os else {
        return UNKNOWN_WINDOWS.to_string();
    };

    let name = family_name(os);
    let label = if !os.edition_id.is_empty() {
        os.edition_id.as_str()
    } else {
        os.product_name.as_str()
    };

    if label.is_empty() {
        format!("{name} (Build {}.{})", os.build_number, os.update_revision)
    } else {
        format!("{name} (Build {}.{}, {label})", os.build_number, os.update_revision)
    }
}
