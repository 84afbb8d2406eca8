use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

/// Whether a process executable name matches the name a script asked for.
///
/// Comparison is case-insensitive; a trailing `.exe` on either side is ignored
/// so `AttachProcess "notepad.exe"` also works where executables carry no suffix.
pub fn name_matches(process_name: &str, wanted: &str) -> bool {
    fn stem(s: &str) -> String {
        let lower = s.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stripped) => stripped.to_string(),
            None => lower,
        }
    }
    let wanted = stem(wanted);
    !wanted.is_empty() && stem(process_name) == wanted
}

/// Lowest pid of a running process whose executable name matches `name`.
pub fn find_pid_by_name(name: &str) -> Option<u32> {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());

    let pid = sys
        .processes()
        .iter()
        .filter(|(_, p)| name_matches(&p.name().to_string_lossy(), name))
        .map(|(pid, _)| pid.as_u32())
        .min();
    debug!(target: "uiscript::backend", %name, ?pid, "Process lookup by name");
    pid
}

pub fn is_process_running(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    sys.process(pid).is_some()
}
