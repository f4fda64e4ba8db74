//! Host operating-system metadata for operator troubleshooting.
//!
//! The orchestrator writes this to the debug log when a group starts. Nothing
//! reads it back programmatically.

use std::fmt;

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Source of a human-readable host description.
///
/// The orchestrator depends on this seam rather than on `sysinfo` directly so
/// tests can observe when the dump happens.
pub trait HostMetadataSource {
    /// Describe the host, one `key: value` pair per line.
    fn describe(&self) -> String;
}

/// Snapshot of host operating-system details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMetadata {
    /// Operating system name.
    pub os_name: Option<String>,
    /// Operating system version.
    pub os_version: Option<String>,
    /// Kernel version.
    pub kernel_version: Option<String>,
    /// Host name.
    pub host_name: Option<String>,
    /// CPU architecture the harness was compiled for.
    pub arch: &'static str,
    /// Number of logical CPUs.
    pub cpus: usize,
    /// Total memory in MiB.
    pub total_memory_mib: u64,
    /// Available memory in MiB.
    pub available_memory_mib: u64,
}

impl HostMetadata {
    /// Collect metadata from the running system.
    #[must_use]
    pub fn collect() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_memory(MemoryRefreshKind::everything())
                .with_cpu(CpuRefreshKind::everything()),
        );

        Self {
            os_name: System::name(),
            os_version: System::long_os_version(),
            kernel_version: System::kernel_version(),
            host_name: System::host_name(),
            arch: std::env::consts::ARCH,
            cpus: system.cpus().len(),
            total_memory_mib: system.total_memory() / BYTES_PER_MIB,
            available_memory_mib: system.available_memory() / BYTES_PER_MIB,
        }
    }
}

impl fmt::Display for HostMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = "unknown";
        writeln!(f, "os: {}", self.os_name.as_deref().unwrap_or(unknown))?;
        writeln!(
            f,
            "os version: {}",
            self.os_version.as_deref().unwrap_or(unknown)
        )?;
        writeln!(
            f,
            "kernel: {}",
            self.kernel_version.as_deref().unwrap_or(unknown)
        )?;
        writeln!(f, "host: {}", self.host_name.as_deref().unwrap_or(unknown))?;
        writeln!(f, "arch: {}", self.arch)?;
        writeln!(f, "cpus: {}", self.cpus)?;
        write!(
            f,
            "memory: {} MiB available of {} MiB",
            self.available_memory_mib, self.total_memory_mib
        )
    }
}

/// [`HostMetadataSource`] backed by `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostMetadata;

impl HostMetadataSource for SystemHostMetadata {
    fn describe(&self) -> String {
        HostMetadata::collect().to_string()
    }
}
