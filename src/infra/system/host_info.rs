use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

use crate::core::stats::HostStats;

/// Samples CPU and memory usage. CPU usage needs two refreshes spaced by the
/// minimum update interval, so this takes a fraction of a second.
pub async fn sample() -> HostStats {
    let mut system = System::new();
    system.refresh_cpu();
    tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
    system.refresh_cpu();
    system.refresh_memory();

    let total = system.total_memory();
    let memory_percent = if total == 0 {
        0.0
    } else {
        system.used_memory() as f64 / total as f64 * 100.0
    };

    HostStats {
        cpu_percent: system.global_cpu_info().cpu_usage() as f64,
        memory_percent,
        os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
        os_version: System::os_version().unwrap_or_default(),
    }
}
