//! Gauge sources read on every poll
//!
//! Samplers are synchronous and may block; the agent runs them on the
//! blocking pool.

use crate::utils::error::{MetricError, Result};
use parking_lot::Mutex;
use sysinfo::{Disks, Networks, Pid, System};

/// A named source of gauge readings
pub trait Sampler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Read every gauge this sampler knows about
    fn sample(&self) -> Result<Vec<(String, f64)>>;
}

struct RuntimeState {
    system: System,
    networks: Networks,
    disks: Disks,
}

/// Process and operating system runtime figures (27 gauges)
pub struct RuntimeSampler {
    pid: Option<Pid>,
    state: Mutex<RuntimeState>,
}

impl RuntimeSampler {
    pub fn new() -> Self {
        Self {
            pid: sysinfo::get_current_pid().ok(),
            state: Mutex::new(RuntimeState {
                system: System::new_all(),
                networks: Networks::new_with_refreshed_list(),
                disks: Disks::new_with_refreshed_list(),
            }),
        }
    }
}

impl Default for RuntimeSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RuntimeSampler {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn sample(&self) -> Result<Vec<(String, f64)>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.system.refresh_all();
        state.networks.refresh();
        state.disks.refresh_list();

        let sys = &state.system;
        let process = self.pid.and_then(|pid| sys.process(pid));
        let (memory, virtual_memory, cpu, run_time, start_time, disk) = match process {
            Some(p) => (
                p.memory(),
                p.virtual_memory(),
                p.cpu_usage(),
                p.run_time(),
                p.start_time(),
                p.disk_usage(),
            ),
            None => (0, 0, 0.0, 0, 0, Default::default()),
        };
        let load = System::load_average();
        let cpu_frequency = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0);
        let (received, transmitted) = state
            .networks
            .list()
            .values()
            .fold((0u64, 0u64), |(rx, tx), data| {
                (rx + data.total_received(), tx + data.total_transmitted())
            });
        let (disk_total, disk_available) = state
            .disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, available), d| {
                (total + d.total_space(), available + d.available_space())
            });

        let gauges = [
            ("ProcessResidentMemory", memory as f64),
            ("ProcessVirtualMemory", virtual_memory as f64),
            ("ProcessCpuUsage", cpu as f64),
            ("ProcessRunTime", run_time as f64),
            ("ProcessStartTime", start_time as f64),
            ("ProcessDiskRead", disk.read_bytes as f64),
            ("ProcessDiskWritten", disk.written_bytes as f64),
            ("ProcessDiskTotalRead", disk.total_read_bytes as f64),
            ("ProcessDiskTotalWritten", disk.total_written_bytes as f64),
            ("Uptime", System::uptime() as f64),
            ("BootTime", System::boot_time() as f64),
            ("LoadAverage1", load.one),
            ("LoadAverage5", load.five),
            ("LoadAverage15", load.fifteen),
            ("UsedMemory", sys.used_memory() as f64),
            ("AvailableMemory", sys.available_memory() as f64),
            ("TotalSwap", sys.total_swap() as f64),
            ("UsedSwap", sys.used_swap() as f64),
            ("FreeSwap", sys.free_swap() as f64),
            ("CpuCount", sys.cpus().len() as f64),
            ("GlobalCpuUsage", sys.global_cpu_usage() as f64),
            ("CpuFrequency", cpu_frequency as f64),
            ("ProcessCount", sys.processes().len() as f64),
            ("NetworkReceived", received as f64),
            ("NetworkTransmitted", transmitted as f64),
            ("DiskTotalSpace", disk_total as f64),
            ("DiskAvailableSpace", disk_available as f64),
        ];

        Ok(gauges
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect())
    }
}

/// Host memory totals and per-CPU utilization
pub struct HostSampler {
    system: Mutex<System>,
}

impl HostSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_usage();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for HostSampler {
    fn name(&self) -> &'static str {
        "host"
    }

    fn sample(&self) -> Result<Vec<(String, f64)>> {
        let mut sys = self.system.lock();
        sys.refresh_memory();
        sys.refresh_cpu_usage();

        if sys.cpus().is_empty() {
            return Err(MetricError::unavailable("No CPU statistics available"));
        }

        let mut gauges = vec![
            ("TotalMemory".to_string(), sys.total_memory() as f64),
            ("FreeMemory".to_string(), sys.free_memory() as f64),
        ];
        gauges.extend(
            sys.cpus()
                .iter()
                .enumerate()
                .map(|(i, cpu)| (format!("CPUutilization{}", i + 1), cpu.cpu_usage() as f64)),
        );
        Ok(gauges)
    }
}
