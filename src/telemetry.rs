//! Live readings about the supervisor process itself.

/// Current resident set size in bytes, from the `VmRSS:` line of
/// `/proc/self/status`. `None` where procfs is unavailable.
#[cfg(target_os = "linux")]
pub fn resident_memory_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;

    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
        Some(kib * 1024)
    })
}

#[cfg(not(target_os = "linux"))]
pub fn resident_memory_bytes() -> Option<u64> {
    None
}

/// One-minute load average.
#[cfg(unix)]
pub fn load_average_1m() -> Option<f64> {
    let mut loads = [0f64; 3];
    let filled = unsafe { libc::getloadavg(loads.as_mut_ptr(), 3) };
    (filled >= 1).then(|| loads[0])
}

#[cfg(not(unix))]
pub fn load_average_1m() -> Option<f64> {
    None
}

/// Per-cycle resource usage line, or `None` when the platform exposes no
/// memory reading.
pub fn usage_line() -> Option<String> {
    let resident = resident_memory_bytes()?;
    let megabytes = resident as f64 / 1024.0 / 1024.0;

    Some(match load_average_1m() {
        Some(load) => format!(
            "Memory Usage: {megabytes:.2} MB | Load Average (last 1 minute): {load:.2}"
        ),
        None => format!("Memory Usage: {megabytes:.2} MB"),
    })
}
