//! Carbon intensity levels and the sources that produce them
//!
//! The router never decides what "carbon intensity" means. It asks an
//! [`IntensitySource`] for a level on every call. The random source stands in
//! for a grid telemetry feed; gauge and label sources adapt raw readings from
//! such a feed and reject anything outside the three recognized levels.

use crate::core::config_loader::IntensitySourceConfig;
use crate::core::unified_error::{intensity_errors, UnifiedResult};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse carbon-intensity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntensityLevel {
    Low,
    Medium,
    High,
}

impl IntensityLevel {
    /// Every level, in ascending order
    pub const ALL: [IntensityLevel; 3] = [
        IntensityLevel::Low,
        IntensityLevel::Medium,
        IntensityLevel::High,
    ];

    /// Upper-case label, as shown on the dashboard
    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityLevel::Low => "LOW",
            IntensityLevel::Medium => "MEDIUM",
            IntensityLevel::High => "HIGH",
        }
    }

    /// Gauge reading (percent) displayed for this level
    pub fn gauge_percent(&self) -> f32 {
        match self {
            IntensityLevel::Low => 30.0,
            IntensityLevel::Medium => 60.0,
            IntensityLevel::High => 90.0,
        }
    }

    /// Dashboard colour for this level
    pub fn color_hex(&self) -> &'static str {
        match self {
            IntensityLevel::Low => "#32CD32",
            IntensityLevel::Medium => "#FFD700",
            IntensityLevel::High => "#FF6347",
        }
    }

    /// C discriminant (0 = LOW, 1 = MEDIUM, 2 = HIGH)
    pub fn as_c_int(&self) -> i32 {
        match self {
            IntensityLevel::Low => 0,
            IntensityLevel::Medium => 1,
            IntensityLevel::High => 2,
        }
    }

    /// Map a 0-100 gauge reading onto a level using the dashboard bands:
    /// `[0, 40)` LOW, `[40, 70)` MEDIUM, `[70, 100]` HIGH.
    pub fn from_gauge_percent(percent: f32) -> Option<IntensityLevel> {
        if !(0.0..=100.0).contains(&percent) {
            return None;
        }
        if percent < 40.0 {
            Some(IntensityLevel::Low)
        } else if percent < 70.0 {
            Some(IntensityLevel::Medium)
        } else {
            Some(IntensityLevel::High)
        }
    }
}

impl fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of LOW / MEDIUM / HIGH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIntensityLabel(pub String);

impl fmt::Display for UnknownIntensityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown carbon intensity label '{}'", self.0)
    }
}

impl std::error::Error for UnknownIntensityLabel {}

impl FromStr for IntensityLevel {
    type Err = UnknownIntensityLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(IntensityLevel::Low),
            "MEDIUM" => Ok(IntensityLevel::Medium),
            "HIGH" => Ok(IntensityLevel::High),
            _ => Err(UnknownIntensityLabel(s.to_string())),
        }
    }
}

/// Produces an intensity level on demand
pub trait IntensitySource: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Sample the current level
    fn sample(&self) -> UnifiedResult<IntensityLevel>;
}

impl<S: IntensitySource + ?Sized> IntensitySource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sample(&self) -> UnifiedResult<IntensityLevel> {
        (**self).sample()
    }
}

/// Uniformly random level; the stand-in for a real telemetry feed
pub struct RandomIntensitySource {
    rng: Mutex<StdRng>,
}

impl RandomIntensitySource {
    /// Seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomIntensitySource {
    fn default() -> Self {
        Self::new()
    }
}

impl IntensitySource for RandomIntensitySource {
    fn name(&self) -> &str {
        "random"
    }

    fn sample(&self) -> UnifiedResult<IntensityLevel> {
        let index = self.rng.lock().gen_range(0..IntensityLevel::ALL.len());
        Ok(IntensityLevel::ALL[index])
    }
}

/// Always reports the same level
#[derive(Debug, Clone, Copy)]
pub struct FixedIntensitySource {
    level: IntensityLevel,
}

impl FixedIntensitySource {
    pub fn new(level: IntensityLevel) -> Self {
        Self { level }
    }
}

impl IntensitySource for FixedIntensitySource {
    fn name(&self) -> &str {
        "fixed"
    }

    fn sample(&self) -> UnifiedResult<IntensityLevel> {
        Ok(self.level)
    }
}

/// Adapts a 0-100 gauge reading into a level
pub struct GaugeIntensitySource<F>
where
    F: Fn() -> f32 + Send + Sync,
{
    name: String,
    read: F,
}

impl<F> GaugeIntensitySource<F>
where
    F: Fn() -> f32 + Send + Sync,
{
    pub fn new(name: impl Into<String>, read: F) -> Self {
        Self {
            name: name.into(),
            read,
        }
    }
}

impl<F> IntensitySource for GaugeIntensitySource<F>
where
    F: Fn() -> f32 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self) -> UnifiedResult<IntensityLevel> {
        let percent = (self.read)();
        IntensityLevel::from_gauge_percent(percent)
            .ok_or_else(|| intensity_errors::unrecognized(&self.name, percent))
    }
}

/// Adapts a raw textual reading (e.g. `"HIGH"`) into a level
pub struct LabelIntensitySource<F>
where
    F: Fn() -> String + Send + Sync,
{
    name: String,
    read: F,
}

impl<F> LabelIntensitySource<F>
where
    F: Fn() -> String + Send + Sync,
{
    pub fn new(name: impl Into<String>, read: F) -> Self {
        Self {
            name: name.into(),
            read,
        }
    }
}

impl<F> IntensitySource for LabelIntensitySource<F>
where
    F: Fn() -> String + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self) -> UnifiedResult<IntensityLevel> {
        let raw = (self.read)();
        raw.parse::<IntensityLevel>()
            .map_err(|_| intensity_errors::unrecognized(&self.name, &raw))
    }
}

/// Build the source named by the router configuration
pub fn build_intensity_source(config: &IntensitySourceConfig) -> Box<dyn IntensitySource> {
    match config {
        IntensitySourceConfig::Random { seed: Some(seed) } => {
            Box::new(RandomIntensitySource::with_seed(*seed))
        }
        IntensitySourceConfig::Random { seed: None } => Box::new(RandomIntensitySource::new()),
        IntensitySourceConfig::Fixed { level } => Box::new(FixedIntensitySource::new(*level)),
    }
}
