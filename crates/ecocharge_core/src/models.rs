use serde::{Deserialize, Serialize};

/// Charging preference selected at the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargingMode {
    #[default]
    ChargeNow,
    FullCharge,
    Custom,
}

/// Bounds for the custom energy limit slider, in kWh.
///
/// Stored values are clamped to `[min, max]` and quantized to the
/// nearest multiple of `step` above `min`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KwhEnvelope {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl Default for KwhEnvelope {
    fn default() -> Self {
        KwhEnvelope {
            min: 10,
            max: 100,
            step: 5,
            default: 50,
        }
    }
}

impl KwhEnvelope {
    pub fn quantize(&self, kwh: u32) -> u32 {
        let clamped = kwh.clamp(self.min, self.max);
        let steps = (clamped - self.min + self.step / 2) / self.step;
        (self.min + steps * self.step).min(self.max)
    }
}

/// Body of `POST /connect`. Built once per submit attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub vehicle_id: String,
    pub mode: ChargingMode,
    pub custom_kwh: u32,
}

/// Power source currently feeding a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSource {
    Renewable,
    Conventional,
    Paused,
}

impl PowerSource {
    /// The backend sends free-form labels such as `"SOLAR_RENEWABLE"`;
    /// only the embedded keyword is contractual.
    pub fn from_label(label: &str) -> Option<PowerSource> {
        if label.contains("RENEWABLE") {
            Some(PowerSource::Renewable)
        } else if label.contains("CONVENTIONAL") {
            Some(PowerSource::Conventional)
        } else if label.contains("PAUSED") {
            Some(PowerSource::Paused)
        } else {
            None
        }
    }
}

/// Backend response to a successful `/connect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    #[serde(rename = "Slot_ID")]
    pub slot_id: String,
    #[serde(rename = "Initial_Source")]
    pub initial_source: String,
    #[serde(rename = "Est_Bill")]
    pub est_bill: f64,
}

impl SessionResult {
    pub fn power_source(&self) -> Option<PowerSource> {
        PowerSource::from_label(&self.initial_source)
    }
}

/// Full payload of `GET /admin/dashboard_stats`.
///
/// A fresh snapshot replaces the previous one wholesale; fields are
/// never merged across polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub current_load: GridLoad,
    pub system_health: SystemHealth,
    pub energy_mix: EnergyMix,
    pub predictions: GenerationForecast,
    pub live_sessions: Vec<LiveSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridLoad {
    pub value: f64,
    pub capacity: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub green_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyMix {
    pub renewable_users: u32,
    pub conventional_users: u32,
    pub paused_users: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationForecast {
    pub solar_now_kw: f64,
    pub wind_now_kw: f64,
    pub net_green_available_kw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSession {
    pub slot: String,
    pub vehicle: String,
    pub mode: String,
    pub source: String,
}

impl LiveSession {
    pub fn power_source(&self) -> Option<PowerSource> {
        PowerSource::from_label(&self.source)
    }
}
