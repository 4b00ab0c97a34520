//! Biometric capability probing.
//!
//! Biometric sign-in and enrollment are not available in this build: the
//! auth service always declines them with [`BIOMETRIC_NOT_SUPPORTED_MESSAGE`].
//! The probe below only answers whether the device could do it, so the UI can
//! label the button.

use strum::{Display, EnumString};

/// Message surfaced whenever a biometric operation is declined.
pub const BIOMETRIC_NOT_SUPPORTED_MESSAGE: &str = "Sorry, Face ID is not supported in this build. We will improve this in the future. Please use a development build to test biometric features.";

/// Label used when the device reports no recognizable biometric kind.
pub const GENERIC_BIOMETRIC_LABEL: &str = "Biometric";

/// Biometric authentication kinds a device may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum BiometricKind {
    /// Face recognition.
    #[strum(serialize = "Face ID")]
    FacialRecognition,
    /// Fingerprint reader.
    #[strum(serialize = "Touch ID / Fingerprint")]
    Fingerprint,
    /// Iris scanner.
    #[strum(serialize = "Iris")]
    Iris,
}

/// Error reported by a platform biometric probe.
#[derive(Debug, thiserror::Error)]
#[error("biometric probe failed: {0}")]
pub struct BiometricProbeError(pub String);

/// Platform biometric capabilities.
pub trait BiometricAuthenticator: Send + Sync {
    /// Whether biometric hardware is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform query fails.
    fn has_hardware(&self) -> Result<bool, BiometricProbeError>;

    /// Whether the user has enrolled biometrics on the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform query fails.
    fn is_enrolled(&self) -> Result<bool, BiometricProbeError>;

    /// Supported authentication kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform query fails.
    fn supported_kinds(&self) -> Result<Vec<BiometricKind>, BiometricProbeError>;
}

/// Authenticator for devices without biometric hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

impl BiometricAuthenticator for NoBiometrics {
    fn has_hardware(&self) -> Result<bool, BiometricProbeError> {
        Ok(false)
    }

    fn is_enrolled(&self) -> Result<bool, BiometricProbeError> {
        Ok(false)
    }

    fn supported_kinds(&self) -> Result<Vec<BiometricKind>, BiometricProbeError> {
        Ok(Vec::new())
    }
}

/// What the device reports about biometric sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricAvailability {
    /// Hardware is present and the user has enrolled.
    pub available: bool,
    /// Human-readable name of the preferred biometric kind.
    pub label: String,
}

/// Probes `authenticator`. Probe failures are logged and read as unavailable.
#[must_use]
pub fn probe(authenticator: &dyn BiometricAuthenticator) -> BiometricAvailability {
    let available = authenticator
        .has_hardware()
        .and_then(|hardware| Ok(hardware && authenticator.is_enrolled()?))
        .unwrap_or_else(|e| {
            log::error!("Error checking biometric availability: {e}");
            false
        });
    BiometricAvailability {
        available,
        label: preferred_label(authenticator),
    }
}

fn preferred_label(authenticator: &dyn BiometricAuthenticator) -> String {
    let kinds = match authenticator.supported_kinds() {
        Ok(kinds) => kinds,
        Err(e) => {
            log::error!("Error getting biometric type: {e}");
            return GENERIC_BIOMETRIC_LABEL.to_string();
        }
    };
    [
        BiometricKind::FacialRecognition,
        BiometricKind::Fingerprint,
        BiometricKind::Iris,
    ]
    .into_iter()
    .find(|kind| kinds.contains(kind))
    .map_or_else(|| GENERIC_BIOMETRIC_LABEL.to_string(), |kind| kind.to_string())
}
