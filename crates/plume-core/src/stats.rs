//! Metadata accessors and formatters for detail columns.

use std::collections::HashMap;
use std::fmt::Write;
use std::fs::Metadata;
use std::sync::{LazyLock, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use chrono::{DateTime, Local};

use crate::config::UnitSystem;

// Cross-platform metadata helpers

/// Get the inode number from metadata.
#[cfg(unix)]
pub fn get_ino(metadata: &Metadata) -> u64 {
    metadata.ino()
}

#[cfg(not(unix))]
pub fn get_ino(_metadata: &Metadata) -> u64 {
    0
}

/// Get the number of hard links from metadata.
#[cfg(unix)]
pub fn get_nlink(metadata: &Metadata) -> u64 {
    metadata.nlink()
}

#[cfg(not(unix))]
pub fn get_nlink(_metadata: &Metadata) -> u64 {
    1
}

/// Get the permission bits from metadata.
#[cfg(unix)]
pub fn get_mode(metadata: &Metadata) -> u32 {
    metadata.mode()
}

#[cfg(not(unix))]
pub fn get_mode(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Get the status change time (creation time off unix).
#[cfg(unix)]
pub fn get_ctime(metadata: &Metadata) -> Option<SystemTime> {
    Some(from_unix(metadata.ctime(), metadata.ctime_nsec()))
}

#[cfg(not(unix))]
pub fn get_ctime(metadata: &Metadata) -> Option<SystemTime> {
    metadata.created().ok()
}

pub fn get_mtime(metadata: &Metadata) -> Option<SystemTime> {
    metadata.modified().ok()
}

pub fn get_atime(metadata: &Metadata) -> Option<SystemTime> {
    metadata.accessed().ok()
}

#[cfg(unix)]
fn from_unix(secs: i64, nsecs: i64) -> SystemTime {
    let nsecs = nsecs.clamp(0, 999_999_999) as u32;
    if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nsecs)
    } else {
        UNIX_EPOCH - Duration::new(secs.unsigned_abs(), 0) + Duration::new(0, nsecs)
    }
}

/// Cache for uid→username resolution.
static OWNER_CACHE: LazyLock<RwLock<HashMap<u32, String>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));
/// Cache for gid→groupname resolution.
static GROUP_CACHE: LazyLock<RwLock<HashMap<u32, String>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn cached_name(
    cache: &RwLock<HashMap<u32, String>>,
    id: u32,
    resolve: impl FnOnce(u32) -> Option<String>,
) -> String {
    if let Ok(cache) = cache.read() {
        if let Some(name) = cache.get(&id) {
            return name.clone();
        }
    }
    let name = resolve(id).unwrap_or_else(|| id.to_string());
    if let Ok(mut cache) = cache.write() {
        cache.insert(id, name.clone());
    }
    name
}

/// Name of the owning user, or the numeric uid.
#[cfg(unix)]
pub fn formatted_user(metadata: &Metadata) -> String {
    cached_name(&OWNER_CACHE, metadata.uid(), |uid| {
        uzers::get_user_by_uid(uid).map(|u| u.name().to_string_lossy().into_owned())
    })
}

#[cfg(not(unix))]
pub fn formatted_user(_metadata: &Metadata) -> String {
    cached_name(&OWNER_CACHE, 0, |_| None)
}

/// Name of the owning group, or the numeric gid.
#[cfg(unix)]
pub fn formatted_group(metadata: &Metadata) -> String {
    cached_name(&GROUP_CACHE, metadata.gid(), |gid| {
        uzers::get_group_by_gid(gid).map(|g| g.name().to_string_lossy().into_owned())
    })
}

#[cfg(not(unix))]
pub fn formatted_group(_metadata: &Metadata) -> String {
    cached_name(&GROUP_CACHE, 0, |_| None)
}

pub fn formatted_links(metadata: &Metadata) -> String {
    get_nlink(metadata).to_string()
}

/// `rwxr-xr-x` style permissions with dimmed dashes.
pub fn formatted_perms(metadata: &Metadata) -> String {
    let mode = get_mode(metadata);
    let mut out = String::new();
    for (shift, flag) in (0..9).rev().zip("rwxrwxrwx".chars()) {
        if mode & (1 << shift) != 0 {
            out.push(flag);
        } else {
            out.push_str("[dim]-[/]");
        }
    }
    out
}

/// File size in the given units. Directories have no meaningful size.
pub fn formatted_size(metadata: &Metadata, units: UnitSystem) -> String {
    if metadata.is_dir() {
        return "[dim]-[/]".to_string();
    }
    format_bytes(metadata.len(), units)
}

pub fn format_bytes(bytes: u64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Binary => humansize::format_size(bytes, humansize::BINARY),
        UnitSystem::Decimal => humansize::format_size(bytes, humansize::DECIMAL),
        UnitSystem::None => bytes.to_string(),
    }
}

/// Render a timestamp in local time using a strftime template.
pub fn formatted_time(time: Option<SystemTime>, template: &str) -> String {
    let Some(time) = time else {
        return String::new();
    };
    let local: DateTime<Local> = time.into();
    let mut out = String::new();
    if write!(out, "{}", local.format(template)).is_err() {
        // Options validate the template, so this only happens for hand-built options.
        out = local.to_rfc3339();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_bytes() {
        assert!(format_bytes(2048, UnitSystem::Binary).contains("KiB"));
        let decimal = format_bytes(2000, UnitSystem::Decimal);
        assert!(decimal.starts_with('2') && !decimal.contains("iB"));
        assert_eq!(format_bytes(2048, UnitSystem::None), "2048");
    }

    #[test]
    fn test_formatted_time_template() {
        let time = UNIX_EPOCH + Duration::from_secs(86_400 * 365);
        let year = formatted_time(Some(time), "%Y");
        assert!(year == "1970" || year == "1971");
        assert_eq!(formatted_time(None, "%Y"), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_formatted_perms() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("script.sh");
        fs::write(&path, "#!/bin/sh").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        let metadata = fs::symlink_metadata(&path).unwrap();
        assert_eq!(
            formatted_perms(&metadata),
            "rwxr[dim]-[/]x[dim]-[/][dim]-[/][dim]-[/]"
        );
    }

    #[test]
    fn test_formatted_size_of_dir() {
        let temp = TempDir::new().unwrap();
        let metadata = fs::symlink_metadata(temp.path()).unwrap();
        assert_eq!(formatted_size(&metadata, UnitSystem::Binary), "[dim]-[/]");
    }
}
