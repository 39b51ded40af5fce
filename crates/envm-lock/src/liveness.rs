//! Process liveness checks used to recognise abandoned lock files.

/// Returns `true` if a process with `pid` currently exists.
///
/// On Unix this sends signal 0, which performs the permission and existence
/// checks without delivering anything. `EPERM` means the process exists but
/// belongs to someone else. Pids that do not fit a positive `pid_t` are never
/// alive (0 and negative values address process groups).
#[cfg(unix)]
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    // SAFETY: kill with signal 0 has no side effects.
    if unsafe { libc::kill(raw, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Without a liveness primitive every recorded holder is assumed alive.
#[cfg(not(unix))]
pub fn is_process_alive(_pid: u32) -> bool {
    true
}
