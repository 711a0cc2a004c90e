//! Host observation: CPU/GPU utilization and device specs.
//!
//! These are orchestrator-level observations taken around the isolated run,
//! not pipeline internals. GPU data comes from `nvidia-smi` when present;
//! hosts without it are reported as CPU devices.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use lumen_models::DeviceSpecs;

/// One observation of host utilization.
#[derive(Debug, Clone)]
pub struct SystemObservation {
    /// CPU utilization percentage.
    pub cpu_usage_percent: f64,
    /// GPU utilization percentage, `None` without a visible GPU.
    pub gpu_usage_percent: Option<f64>,
    /// Hardware model names.
    pub device_specs: DeviceSpecs,
}

impl SystemObservation {
    /// Take a best-effort snapshot of the host.
    pub async fn capture() -> Self {
        Self {
            cpu_usage_percent: cpu_utilization(),
            gpu_usage_percent: gpu_utilization().await,
            device_specs: device_specs().await,
        }
    }

    /// "GPU" when a GPU is visible, else "CPU".
    pub fn device_used(&self) -> &'static str {
        if self.gpu_usage_percent.is_some() {
            "GPU"
        } else {
            "CPU"
        }
    }
}

/// Approximate CPU utilization from the 1-minute load average, normalized by
/// core count and capped at 100%.
pub fn cpu_utilization() -> f64 {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1) as f64;

    let load = std::fs::read_to_string("/proc/loadavg")
        .ok()
        .and_then(|s| {
            s.split_whitespace()
                .next()
                .and_then(|v| v.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    (load / cores * 100.0).min(100.0)
}

/// Current GPU utilization from `nvidia-smi`, `None` when unavailable.
pub async fn gpu_utilization() -> Option<f64> {
    let value = query_nvidia_smi("utilization.gpu").await?;
    value.trim().parse::<f64>().ok()
}

/// CPU and GPU model names.
pub async fn device_specs() -> DeviceSpecs {
    let cpu = std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|s| {
            s.lines()
                .find(|l| l.starts_with("model name"))
                .and_then(|l| l.split(':').nth(1))
                .map(|v| v.trim().to_string())
        })
        .unwrap_or_else(|| std::env::consts::ARCH.to_string());

    let gpu = query_nvidia_smi("name")
        .await
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "None".to_string());

    DeviceSpecs { cpu, gpu }
}

/// Run one `nvidia-smi --query-gpu` field query, first GPU only.
async fn query_nvidia_smi(field: &str) -> Option<String> {
    which::which("nvidia-smi").ok()?;

    let output = Command::new("nvidia-smi")
        .args([
            &format!("--query-gpu={field}"),
            "--format=csv,noheader,nounits",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        debug!(field, "nvidia-smi query failed");
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_utilization_in_range() {
        let cpu = cpu_utilization();
        assert!((0.0..=100.0).contains(&cpu));
    }

    #[tokio::test]
    async fn test_capture_device_consistency() {
        let obs = SystemObservation::capture().await;
        match obs.gpu_usage_percent {
            Some(_) => assert_eq!(obs.device_used(), "GPU"),
            None => assert_eq!(obs.device_used(), "CPU"),
        }
        assert!(!obs.device_specs.cpu.is_empty());
    }
}
