//! Infrastructure checks applied to every host through NRPE.

/// A fixed NRPE check covering every discovered host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Check {
    DiskSpace,
    DiskInode,
    CpuLoad,
    MemSwap,
}

impl Check {
    /// Every check, in the order they are emitted.
    pub const ALL: [Check; 4] = [
        Check::DiskSpace,
        Check::DiskInode,
        Check::CpuLoad,
        Check::MemSwap,
    ];

    /// Service id (and output file stem) of the check.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::DiskSpace => "nrpe_disk_space",
            Self::DiskInode => "nrpe_disk_inode",
            Self::CpuLoad => "nrpe_cpu_load",
            Self::MemSwap => "nrpe_mem_swap",
        }
    }

    /// Nagios check command (thresholds are warning then critical).
    pub const fn command(&self) -> &'static str {
        match self {
            Self::DiskSpace => "check_nrpe!check_disk_space!10%20% /",
            Self::DiskInode => "check_nrpe!check_disk_inode!10%20% /",
            Self::CpuLoad => "check_nrpe!check_cpu_load!30,25,2015,10,5",
            Self::MemSwap => "check_nrpe!check_mem_swap!80%90%",
        }
    }

    /// Returns the check whose id is `id`, if any.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.id() == id)
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
