/// OS descriptor from `HKLM\SOFTWARE\Microsoft\Windows NT\CurrentVersion`.
/// Calls `RegGetValueW` through the `windows` crate.
/// Best-effort: an unreadable build number means "no descriptor".

use crate::os_version::{OsDescriptor, OsInfoProvider};

/// Reads the OS descriptor from the local registry.
/// Always reports absence on non-Windows targets.
pub struct RegistryOsInfo;

impl OsInfoProvider for RegistryOsInfo {
    #[cfg(windows)]
    fn os_descriptor(&self) -> Option<OsDescriptor> {
        win::read_current_version()
    }

    #[cfg(not(windows))]
    fn os_descriptor(&self) -> Option<OsDescriptor> {
        log::debug!("registry: not available on this platform");
        None
    }
}

#[cfg(windows)]
mod win {
    use super::OsDescriptor;

    use windows::core::{w, PCWSTR};
    use windows::Win32::Foundation::ERROR_SUCCESS;
    use windows::Win32::System::Registry::{
        RegGetValueW, HKEY_LOCAL_MACHINE, RRF_RT_REG_DWORD, RRF_RT_REG_SZ,
    };

    const CURRENT_VERSION_KEY: PCWSTR = w!(r"SOFTWARE\Microsoft\Windows NT\CurrentVersion");

    pub(super) fn read_current_version() -> Option<OsDescriptor> {
        let Some(build) = read_string(w!("CurrentBuildNumber")) else {
            log::warn!("registry: CurrentBuildNumber unreadable");
            return None;
        };
        let Ok(build_number) = build.trim().parse::<u32>() else {
            log::warn!("registry: CurrentBuildNumber not numeric: {build:?}");
            return None;
        };

        let descriptor = OsDescriptor {
            build_number,
            update_revision: read_dword(w!("UBR")).unwrap_or(0),
            edition_id: read_string(w!("EditionID")).unwrap_or_default(),
            product_name: read_string(w!("ProductName")).unwrap_or_default(),
        };
        log::debug!("registry: {descriptor:?}");
        Some(descriptor)
    }

    fn read_string(name: PCWSTR) -> Option<String> {
        unsafe {
            // First call sizes the buffer (in bytes, including the terminator).
            let mut size: u32 = 0;
            let status = RegGetValueW(
                HKEY_LOCAL_MACHINE,
                CURRENT_VERSION_KEY,
                name,
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size),
            );
            if status != ERROR_SUCCESS || size == 0 {
                return None;
            }

            let mut buf = vec![0u16; (size as usize).div_ceil(2)];
            let status = RegGetValueW(
                HKEY_LOCAL_MACHINE,
                CURRENT_VERSION_KEY,
                name,
                RRF_RT_REG_SZ,
                None,
                Some(buf.as_mut_ptr().cast()),
                Some(&mut size),
            );
            if status != ERROR_SUCCESS {
                return None;
            }

            let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
            Some(String::from_utf16_lossy(&buf[..len]))
        }
    }

    fn read_dword(name: PCWSTR) -> Option<u32> {
        let mut value: u32 = 0;
        let mut size = std::mem::size_of::<u32>() as u32;
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                CURRENT_VERSION_KEY,
                name,
                RRF_RT_REG_DWORD,
                None,
                Some((&mut value as *mut u32).cast()),
                Some(&mut size),
            )
        };
        (status == ERROR_SUCCESS).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(windows)]
    #[test]
    fn reads_local_build_number() {
        let os = RegistryOsInfo.os_descriptor().unwrap();
        assert!(os.build_number >= 10240);
    }

    #[cfg(not(windows))]
    #[test]
    fn absent_off_windows() {
        assert!(RegistryOsInfo.os_descriptor().is_none());
    }
}
