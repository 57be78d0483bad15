//! Platform connection strategy contract.
//!
//! Each operating system brings a tunnel up with a different elevation
//! mechanism (osascript admin dialog on macOS, cached sudo on Linux, a
//! tunnel service on Windows) and confirms liveness differently. The
//! variability lives behind this trait; exactly one implementation is
//! selected when the manager is constructed and never re-checked per call.

use std::path::Path;

use crate::error::Result;

/// OS-specific tunnel driver orchestration.
pub trait ConnectionStrategy: Send {
    /// Bring the tunnel described by `config` up. Blocks until the driver
    /// reports success (and, where the platform requires it, until liveness
    /// is confirmed by a bounded poll).
    fn up(&self, config: &Path) -> Result<()>;

    /// Take the tunnel down. A driver response meaning "no such tunnel" is
    /// success — the desired end state already holds.
    fn down(&self, config: &Path) -> Result<()>;

    /// Non-interactive liveness probe. Must never prompt for credentials;
    /// when liveness cannot be determined without a prompt, report `false`.
    fn probe(&self) -> bool;

    /// Fetch the driver's free-text status dump for statistics parsing.
    fn status_dump(&self) -> Result<String>;
}

/// Select the strategy for the host operating system.
pub fn platform_strategy() -> Box<dyn ConnectionStrategy> {
    #[cfg(target_os = "linux")]
    {
        Box::new(crate::linux::LinuxStrategy)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(crate::macos::MacosStrategy)
    }
    #[cfg(target_os = "windows")]
    {
        Box::new(crate::windows::WindowsStrategy)
    }
}
