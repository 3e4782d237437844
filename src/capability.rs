/*!
 * Host environment capability probing.
 *
 * The hosting shell decides whether the machine can run local inference at
 * all; orchestration code only consumes the verdict. The probe runs once,
 * before any engine load is attempted.
 */

use crate::errors::AppError;

/// What the probe found out about the host (best effort)
#[derive(Debug, Clone)]
pub struct EnvironmentReport {
    /// Operating system family
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Logical CPU count, if the host reports one
    pub cpu_count: Option<usize>,
    /// Whether local inference is expected to work here
    pub supported: bool,
    /// Human-readable reason when unsupported
    pub reason: Option<String>,
}

impl EnvironmentReport {
    /// A report for an environment with no known blockers
    pub fn supported(os: &str, arch: &str, cpu_count: Option<usize>) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            cpu_count,
            supported: true,
            reason: None,
        }
    }

    /// A report for an environment that cannot run the engine
    pub fn unsupported(os: &str, arch: &str, reason: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            cpu_count: None,
            supported: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Capability predicate supplied by the hosting shell
///
/// Implementations must not touch the engine; they only inspect the host.
pub trait CapabilityProbe: Send + Sync {
    /// Inspect the host environment
    fn probe(&self) -> EnvironmentReport;

    /// Turn an unsupported report into an application error
    fn check(&self) -> Result<EnvironmentReport, AppError> {
        let report = self.probe();
        if report.supported {
            Ok(report)
        } else {
            let reason = report
                .reason
                .clone()
                .unwrap_or_else(|| "host cannot run local inference".to_string());
            Err(AppError::UnsupportedEnvironment(reason))
        }
    }
}

/// Default probe for the local machine
#[derive(Debug, Default)]
pub struct HostProbe;

impl CapabilityProbe for HostProbe {
    fn probe(&self) -> EnvironmentReport {
        let os = std::env::consts::OS;
        let arch = std::env::consts::ARCH;

        #[cfg(target_pointer_width = "32")]
        {
            return EnvironmentReport::unsupported(
                os,
                arch,
                "local inference requires a 64-bit host",
            );
        }

        #[cfg(not(target_pointer_width = "32"))]
        {
            let cpu_count = std::thread::available_parallelism().ok().map(|n| n.get());
            EnvironmentReport::supported(os, arch, cpu_count)
        }
    }
}

/// Fixed-verdict probe for tests and embedding hosts
#[derive(Debug)]
pub struct StaticProbe {
    report: EnvironmentReport,
}

impl StaticProbe {
    /// A probe that always reports a supported environment
    pub fn supported() -> Self {
        Self {
            report: EnvironmentReport::supported("test", "test", Some(1)),
        }
    }

    /// A probe that always reports an unsupported environment
    pub fn unsupported(reason: &str) -> Self {
        Self {
            report: EnvironmentReport::unsupported("test", "test", reason),
        }
    }
}

impl CapabilityProbe for StaticProbe {
    fn probe(&self) -> EnvironmentReport {
        self.report.clone()
    }
}
