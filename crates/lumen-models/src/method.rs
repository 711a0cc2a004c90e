//! Enhancement method selection.
//!
//! The method is chosen once per run from a closed enumeration. Unknown
//! method strings fall back to the learned-network method with a visible
//! marker so the fallback is never silent.

use serde::{Deserialize, Serialize};

/// Enhancement strategy for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhanceMethod {
    /// Classical contrast-limited adaptive histogram equalization.
    Clahe,
    /// Learned UNet restoration network.
    Unet,
}

impl EnhanceMethod {
    /// Get string representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhanceMethod::Clahe => "clahe",
            EnhanceMethod::Unet => "unet",
        }
    }

    /// Name of the isolated pipeline executable for this method.
    pub fn pipeline_bin(&self) -> &'static str {
        match self {
            EnhanceMethod::Clahe => "run-clahe",
            EnhanceMethod::Unet => "run-unet",
        }
    }

    /// Resolve a raw method string, falling back to UNet for unknown values.
    pub fn resolve(raw: &str) -> MethodSelection {
        match raw.trim().to_lowercase().as_str() {
            "clahe" => MethodSelection {
                method: EnhanceMethod::Clahe,
                fallback: false,
            },
            "unet" => MethodSelection {
                method: EnhanceMethod::Unet,
                fallback: false,
            },
            _ => MethodSelection {
                method: EnhanceMethod::Unet,
                fallback: true,
            },
        }
    }
}

impl std::fmt::Display for EnhanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of resolving a raw method string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSelection {
    /// The method that will actually run.
    pub method: EnhanceMethod,
    /// True when the raw string was unrecognized and UNet was substituted.
    pub fallback: bool,
}

impl MethodSelection {
    /// Human-readable model label recorded in telemetry.
    pub fn model_label(&self) -> &'static str {
        match (self.method, self.fallback) {
            (EnhanceMethod::Clahe, _) => "CLAHE",
            (EnhanceMethod::Unet, false) => "UNet",
            (EnhanceMethod::Unet, true) => "UNet (fallback)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_methods() {
        let sel = EnhanceMethod::resolve("clahe");
        assert_eq!(sel.method, EnhanceMethod::Clahe);
        assert!(!sel.fallback);
        assert_eq!(sel.model_label(), "CLAHE");

        let sel = EnhanceMethod::resolve("UNet");
        assert_eq!(sel.method, EnhanceMethod::Unet);
        assert!(!sel.fallback);
        assert_eq!(sel.model_label(), "UNet");
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_unet() {
        let sel = EnhanceMethod::resolve("foo");
        assert_eq!(sel.method, EnhanceMethod::Unet);
        assert!(sel.fallback);
        assert_eq!(sel.model_label(), "UNet (fallback)");
    }

    #[test]
    fn test_pipeline_bin_names() {
        assert_eq!(EnhanceMethod::Clahe.pipeline_bin(), "run-clahe");
        assert_eq!(EnhanceMethod::Unet.pipeline_bin(), "run-unet");
    }
}
