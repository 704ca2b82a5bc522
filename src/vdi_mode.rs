/// VDI mode decoding: turns the `vdiMode` status code into a platform and
/// media optimization tier.
///
/// Two code schemes exist in the wild and they disagree:
///   - Legacy: the whole 4-digit code must match a fixed table exactly.
///   - Positional: char 0 is the platform digit, char 1 the optimization digit,
///     the remaining characters are ignored (e.g. "120X").
///
/// `ModeScheme::Auto` picks legacy for a known 4-digit code and positional
/// for everything else. Only an explicit `ModeScheme::Legacy` skips the
/// connected-stack check. Decoding never fails; unrecognized input maps to an
/// explicit unknown variant.

use serde::Deserialize;

/// Connectivity stack reported when SlimCore actually loaded.
pub const SLIMCORE_STACK: &str = "remote";

/// Shortest code the positional scheme accepts.
const MIN_POSITIONAL_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Citrix,
    VMware,
    AzureVirtualDesktop,
    Unknown,
}

/// Media optimization tier, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    NotOptimized,
    WebRtc,
    SlimCore,
    Unknown,
}

/// Code scheme selection. `Auto` is resolved per code by `decode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeScheme {
    Auto,
    Legacy,
    Positional,
}

/// A successfully parsed code (platform and tier may still be unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMode {
    pub platform: Platform,
    pub optimization: Optimization,
    pub raw_code: String,
    /// Scheme that produced this result. Never `Auto`.
    pub scheme: ModeScheme,
    /// SlimCore details also need the connected stack to confirm the load.
    pub requires_stack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VdiMode {
    /// Code too short (or empty) for the positional scheme.
    Invalid { raw_code: String },
    Decoded(DecodedMode),
}

/// What the report shows below the mode line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Session summary only.
    Summary,
    /// SlimCore is active: versions and peripherals are meaningful.
    Details,
    /// SlimCore was negotiated but the media stack did not load.
    LoadFailed,
}

// ── Lookup tables ────────────────────────────────────────────────────

/// Known legacy 4-digit codes.
const LEGACY_CODES: &[(&str, Platform, Optimization)] = &[
    ("1000", Platform::Citrix, Optimization::NotOptimized),
    ("1100", Platform::Citrix, Optimization::WebRtc),
    ("1200", Platform::Citrix, Optimization::SlimCore),
    ("2000", Platform::Citrix, Optimization::NotOptimized),
    ("2100", Platform::Citrix, Optimization::WebRtc),
    ("2200", Platform::Citrix, Optimization::SlimCore),
    ("3000", Platform::VMware, Optimization::NotOptimized),
    ("3100", Platform::VMware, Optimization::WebRtc),
    ("3200", Platform::VMware, Optimization::SlimCore),
    ("5000", Platform::AzureVirtualDesktop, Optimization::NotOptimized),
    ("5100", Platform::AzureVirtualDesktop, Optimization::WebRtc),
    ("5200", Platform::AzureVirtualDesktop, Optimization::SlimCore),
];

fn platform_from_digit(c: char) -> Platform {
    match c {
        '1' | '2' => Platform::Citrix,
        '3' => Platform::VMware,
        '5' => Platform::AzureVirtualDesktop,
        _ => Platform::Unknown,
    }
}

fn optimization_from_digit(c: char) -> Optimization {
    match c {
        '0' => Optimization::NotOptimized,
        '1' => Optimization::WebRtc,
        '2' => Optimization::SlimCore,
        _ => Optimization::Unknown,
    }
}

// ── Decoders ─────────────────────────────────────────────────────────

/// Decode with the legacy exact-match table.
pub fn decode_legacy(code: &str) -> VdiMode {
    let (platform, optimization) = LEGACY_CODES
        .iter()
        .find(|(known, _, _)| *known == code)
        .map(|&(_, p, o)| (p, o))
        .unwrap_or((Platform::Unknown, Optimization::Unknown));

    VdiMode::Decoded(DecodedMode {
        platform,
        optimization,
        raw_code: code.to_string(),
        scheme: ModeScheme::Legacy,
        requires_stack: false,
    })
}

/// Decode with the positional scheme (platform digit, optimization digit).
pub fn decode_positional(code: &str) -> VdiMode {
    let mut chars = code.chars();
    let (Some(p), Some(o)) = (chars.next(), chars.next()) else {
        return VdiMode::Invalid { raw_code: code.to_string() };
    };
    if 2 + chars.count() < MIN_POSITIONAL_LEN {
        return VdiMode::Invalid { raw_code: code.to_string() };
    }

    VdiMode::Decoded(DecodedMode {
        platform: platform_from_digit(p),
        optimization: optimization_from_digit(o),
        raw_code: code.to_string(),
        scheme: ModeScheme::Positional,
        requires_stack: true,
    })
}

/// True if `code` has the legacy shape and appears in the legacy table.
fn is_known_legacy(code: &str) -> bool {
    code.len() == 4
        && code.bytes().all(|b| b.is_ascii_digit())
        && LEGACY_CODES.iter().any(|(known, _, _)| *known == code)
}

/// Decode `code` with the requested scheme.
pub fn decode(code: &str, scheme: ModeScheme) -> VdiMode {
    let code = code.trim();
    match scheme {
        ModeScheme::Legacy => decode_legacy(code),
        ModeScheme::Positional => decode_positional(code),
        ModeScheme::Auto if is_known_legacy(code) => match decode_legacy(code) {
            VdiMode::Decoded(m) => VdiMode::Decoded(DecodedMode { requires_stack: true, ..m }),
            invalid => invalid,
        },
        ModeScheme::Auto => decode_positional(code),
    }
}

impl VdiMode {
    pub fn raw_code(&self) -> &str {
        match self {
            VdiMode::Invalid { raw_code } => raw_code,
            VdiMode::Decoded(m) => &m.raw_code,
        }
    }

    pub fn optimization(&self) -> Optimization {
        match self {
            VdiMode::Invalid { .. } => Optimization::Unknown,
            VdiMode::Decoded(m) => m.optimization,
        }
    }

    /// Decide how much of the session the report expands.
    ///
    /// Only the SlimCore tier expands, and unless legacy decoding was asked
    /// for explicitly the connected stack must confirm SlimCore is running.
    pub fn detail_level(&self, connected_stack: &str) -> DetailLevel {
        let VdiMode::Decoded(m) = self else {
            return DetailLevel::Summary;
        };
        if m.optimization != Optimization::SlimCore {
            return DetailLevel::Summary;
        }
        if m.requires_stack && connected_stack.trim() != SLIMCORE_STACK {
            DetailLevel::LoadFailed
        } else {
            DetailLevel::Details
        }
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl Platform {
    pub fn name(self) -> &'static str {
        match self {
            Platform::Citrix => "Citrix",
            Platform::VMware => "VMware",
            Platform::AzureVirtualDesktop => "Azure Virtual Desktop / Windows 365",
            Platform::Unknown => "Unknown Platform",
        }
    }
}

impl Optimization {
    pub fn name(self) -> &'static str {
        match self {
            Optimization::NotOptimized => "Not Optimized",
            Optimization::WebRtc => "WebRTC Optimized",
            Optimization::SlimCore => "SlimCore Optimized",
            Optimization::Unknown => "Unknown Optimization",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for Optimization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for VdiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VdiMode::Invalid { .. } => f.write_str("Unknown (Invalid Code)"),
            VdiMode::Decoded(m) => {
                write!(f, "{} - {} (Code: {})", m.platform, m.optimization, m.raw_code)
            }
        }
    }
}
