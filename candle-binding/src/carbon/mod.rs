//! Carbon intensity signal and dashboard reporting

pub mod dashboard;
pub mod intensity;

pub use dashboard::DashboardReport;
pub use intensity::{
    build_intensity_source, FixedIntensitySource, GaugeIntensitySource, IntensityLevel,
    IntensitySource, LabelIntensitySource, RandomIntensitySource,
};
