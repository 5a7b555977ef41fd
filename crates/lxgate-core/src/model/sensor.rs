// ── Sensor and attack-kind domain types ──

use serde_json::json;

use lxgate_api::types::SimulationTarget;

/// Sensor families exposed by the gateway's reading endpoints.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SensorFamily {
    Soil,
    Atmosphere,
    Water,
    Plant,
    Threat,
}

/// Attack scenarios the gateway can be exercised with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackKind {
    Spoofing,
    Replay,
    FirmwareInjection,
    MlEvasion,
    Ddos,
}

impl AttackKind {
    /// The gateway detection endpoint this attack kind exercises.
    pub fn target(self) -> SimulationTarget {
        match self {
            Self::Spoofing => SimulationTarget::Spoofing,
            Self::Replay => SimulationTarget::Replay,
            Self::FirmwareInjection => SimulationTarget::FirmwareInjection,
            Self::MlEvasion => SimulationTarget::DriftDetect,
            Self::Ddos => SimulationTarget::Ddos,
        }
    }

    /// Short operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Spoofing => "Sensor Spoofing",
            Self::Replay => "Replay Attack",
            Self::FirmwareInjection => "Firmware Injection",
            Self::MlEvasion => "ML Evasion",
            Self::Ddos => "DDoS Flood",
        }
    }

    /// A payload that triggers this attack kind's detector.
    ///
    /// Each template carries the field the detector checks, deliberately
    /// invalid: a bad ECC signature, a reused nonce, an unsigned firmware
    /// blob, a drifted feature vector, or a flood threshold.
    pub fn sample_payload(self, sensor_id: &str) -> serde_json::Value {
        match self {
            Self::Spoofing => json!({
                "sensor_id": sensor_id,
                "payload": { "moisture": 44.0, "temperature": 21.5 },
                "ecc_signature": "wronghash",
            }),
            Self::Replay => json!({
                "sensor_id": sensor_id,
                "nonce": "0000-repeated-nonce",
                "payload": { "moisture": 44.0 },
            }),
            Self::FirmwareInjection => json!({
                "sensor_id": sensor_id,
                "firmware_version": "9.9.9",
                "firmware_signature": "invalid_signature",
            }),
            Self::MlEvasion => json!({
                "sensor_id": sensor_id,
                "values": [0.1, 0.9, 0.2, 0.8, 0.3, 0.7, 0.4, 0.6, 0.5, 1.0],
            }),
            Self::Ddos => json!({
                "sensor_id": sensor_id,
                "threshold": 10,
            }),
        }
    }
}
