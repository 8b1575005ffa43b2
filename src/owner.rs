//! Owner-name resolution.
//!
//! POSIX hosts map the file's uid through the account database with
//! `getpwuid_r()`. Windows hosts read the owner SID from the file's security
//! descriptor and look up its `DOMAIN\name` form. Either way the caller gets a
//! string: lookup failures become an `Unknown (...)` placeholder.

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Resolves the account owning a file.
pub trait OwnerLookup {
    /// Label used in the placeholder when resolution fails.
    fn platform(&self) -> &'static str;

    fn owner_of(&self, path: &Path, metadata: &Metadata) -> io::Result<String>;
}

/// Resolve through the host's lookup, never failing.
#[must_use]
pub fn resolve_owner(path: &Path, metadata: &Metadata) -> String {
    resolve_with(platform_lookup(), path, metadata)
}

pub fn resolve_with(lookup: &dyn OwnerLookup, path: &Path, metadata: &Metadata) -> String {
    match lookup.owner_of(path, metadata) {
        Ok(name) => name,
        Err(e) => {
            log::debug!("owner lookup failed for {}: {e}", path.display());
            format!("Unknown ({}): {e}", lookup.platform())
        }
    }
}

#[cfg(unix)]
#[must_use]
pub fn platform_lookup() -> &'static dyn OwnerLookup {
    &PosixOwnerLookup
}

#[cfg(windows)]
#[must_use]
pub fn platform_lookup() -> &'static dyn OwnerLookup {
    &WindowsOwnerLookup
}

#[cfg(not(any(unix, windows)))]
#[must_use]
pub fn platform_lookup() -> &'static dyn OwnerLookup {
    &UnsupportedOwnerLookup
}

#[cfg(unix)]
pub struct PosixOwnerLookup;

#[cfg(unix)]
impl OwnerLookup for PosixOwnerLookup {
    fn platform(&self) -> &'static str {
        "Unix"
    }

    fn owner_of(&self, _path: &Path, metadata: &Metadata) -> io::Result<String> {
        use std::os::unix::fs::MetadataExt;
        username_for_uid(metadata.uid())
    }
}

#[cfg(unix)]
fn username_for_uid(uid: u32) -> io::Result<String> {
    let mut buf = vec![0u8; 1024];

    loop {
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let ret = unsafe {
            libc::getpwuid_r(
                uid,
                &mut pwd,
                buf.as_mut_ptr().cast::<libc::c_char>(),
                buf.len(),
                &mut result,
            )
        };

        if ret == libc::ERANGE && buf.len() < 1 << 16 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if ret != 0 {
            return Err(io::Error::from_raw_os_error(ret));
        }
        if result.is_null() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no account entry for uid {uid}"),
            ));
        }

        let name = unsafe { std::ffi::CStr::from_ptr(pwd.pw_name) };
        return Ok(name.to_string_lossy().to_string());
    }
}

#[cfg(windows)]
pub struct WindowsOwnerLookup;

#[cfg(windows)]
impl OwnerLookup for WindowsOwnerLookup {
    fn platform(&self) -> &'static str {
        "Windows"
    }

    fn owner_of(&self, path: &Path, _metadata: &Metadata) -> io::Result<String> {
        use windows::Win32::Foundation::{ERROR_SUCCESS, HLOCAL, LocalFree};
        use windows::Win32::Security::Authorization::{GetNamedSecurityInfoW, SE_FILE_OBJECT};
        use windows::Win32::Security::{
            LookupAccountSidW, OWNER_SECURITY_INFORMATION, PSECURITY_DESCRIPTOR, PSID,
            SID_NAME_USE,
        };
        use windows::core::{HSTRING, PCWSTR, PWSTR};

        let wide_path = HSTRING::from(path.as_os_str());
        let mut owner = PSID::default();
        let mut descriptor = PSECURITY_DESCRIPTOR::default();

        let status = unsafe {
            GetNamedSecurityInfoW(
                &wide_path,
                SE_FILE_OBJECT,
                OWNER_SECURITY_INFORMATION,
                Some(&mut owner),
                None,
                None,
                None,
                &mut descriptor,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(status.0 as i32));
        }

        let mut name = [0u16; 256];
        let mut domain = [0u16; 256];
        let mut name_len = name.len() as u32;
        let mut domain_len = domain.len() as u32;
        let mut sid_use = SID_NAME_USE::default();

        let lookup = unsafe {
            LookupAccountSidW(
                PCWSTR::null(),
                owner,
                PWSTR(name.as_mut_ptr()),
                &mut name_len,
                PWSTR(domain.as_mut_ptr()),
                &mut domain_len,
                &mut sid_use,
            )
        };

        // The owner SID points into the descriptor, so free it only after the lookup
        unsafe {
            let _ = LocalFree(HLOCAL(descriptor.0));
        }
        lookup.map_err(io::Error::other)?;

        let name = String::from_utf16_lossy(&name[..name_len as usize]);
        let domain = String::from_utf16_lossy(&domain[..domain_len as usize]);
        Ok(format!("{domain}\\{name}"))
    }
}

#[cfg(not(any(unix, windows)))]
pub struct UnsupportedOwnerLookup;

#[cfg(not(any(unix, windows)))]
impl OwnerLookup for UnsupportedOwnerLookup {
    fn platform(&self) -> &'static str {
        std::env::consts::OS
    }

    fn owner_of(&self, _path: &Path, _metadata: &Metadata) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "owner lookup is not available on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct FailingLookup;

    impl OwnerLookup for FailingLookup {
        fn platform(&self) -> &'static str {
            "Test"
        }

        fn owner_of(&self, _path: &Path, _metadata: &Metadata) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"))
        }
    }

    #[test]
    fn test_failed_lookup_becomes_placeholder() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("owned.txt");
        fs::write(&path, b"x").unwrap();
        let metadata = fs::metadata(&path).unwrap();

        let owner = resolve_with(&FailingLookup, &path, &metadata);
        assert_eq!(owner, "Unknown (Test): access denied");
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_lookup_matches_current_user() {
        use std::os::unix::fs::MetadataExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mine.txt");
        fs::write(&path, b"x").unwrap();
        let metadata = fs::metadata(&path).unwrap();

        let owner = resolve_owner(&path, &metadata);
        match username_for_uid(metadata.uid()) {
            Ok(name) => assert_eq!(owner, name),
            // Containers may run under a uid with no passwd entry
            Err(_) => assert!(owner.starts_with("Unknown (Unix): ")),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unknown_uid_is_an_error() {
        assert!(username_for_uid(3_987_654_321).is_err());
    }
}
