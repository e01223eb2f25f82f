//! Dashboard report for one routed inference
//!
//! Everything a host UI needs to draw the carbon dashboard: headline
//! metrics, the gauge, a six-month trend ending at the current reading, and
//! the static model summary table.

use crate::carbon::intensity::IntensityLevel;
use crate::model_architectures::routing::InferenceResult;
use crate::model_architectures::traits::ModelVariant;
use serde::Serialize;
use std::fmt::Write as _;

/// Months shown on the trend chart
pub const TREND_MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Historical readings; the current gauge value is appended as the last month
pub const TREND_HISTORY: [f32; 5] = [85.0, 70.0, 65.0, 50.0, 45.0];

/// Gauge colour bands as `(start, end, colour)` percentages
pub const GAUGE_BANDS: [(f32, f32, &str); 3] = [
    (0.0, 40.0, "#32CD32"),
    (40.0, 70.0, "#FFD700"),
    (70.0, 100.0, "#FF6347"),
];

/// One row of the model selection summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelSummaryRow {
    pub model_variant: &'static str,
    pub carbon_usage: &'static str,
    pub accuracy: &'static str,
    pub use_case: &'static str,
}

impl ModelSummaryRow {
    pub fn for_variant(variant: ModelVariant) -> Self {
        let (carbon_usage, accuracy, use_case) = match variant {
            ModelVariant::Full => ("High", "High", "Full performance"),
            ModelVariant::Balanced => ("Medium", "Medium-High", "Balanced mode"),
            ModelVariant::Eco => ("Low", "Moderate", "Eco mode"),
        };
        Self {
            model_variant: variant.short_name(),
            carbon_usage,
            accuracy,
            use_case,
        }
    }
}

/// Static summary table, most to least carbon-hungry
pub fn model_summary() -> [ModelSummaryRow; 3] {
    ModelVariant::ALL.map(ModelSummaryRow::for_variant)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: &'static str,
    pub intensity_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeReading {
    pub value_percent: f32,
    pub color: &'static str,
    pub bands: [(f32, f32, &'static str); 3],
}

/// Renderable view of one [`InferenceResult`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub carbon_intensity: IntensityLevel,
    pub model_used: String,
    pub model_output: String,
    pub gauge: GaugeReading,
    pub trend: Vec<TrendPoint>,
    pub model_summary: [ModelSummaryRow; 3],
}

impl DashboardReport {
    pub fn from_result(result: &InferenceResult) -> Self {
        let level = result.intensity_level;
        let gauge = GaugeReading {
            value_percent: level.gauge_percent(),
            color: level.color_hex(),
            bands: GAUGE_BANDS,
        };

        let trend = TREND_MONTHS
            .iter()
            .zip(TREND_HISTORY.iter().copied().chain([gauge.value_percent]))
            .map(|(&month, intensity_percent)| TrendPoint {
                month,
                intensity_percent,
            })
            .collect();

        Self {
            carbon_intensity: level,
            model_used: result.model_used.clone(),
            model_output: result.sentiment_label.clone(),
            gauge,
            trend,
            model_summary: model_summary(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering for terminals and logs
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "Carbon Intensity : {}", self.carbon_intensity);
        let _ = writeln!(out, "Model Used       : {}", self.model_used);
        let _ = writeln!(out, "Model Output     : {}", self.model_output);
        let _ = writeln!(
            out,
            "Gauge            : {:.0} % ({})",
            self.gauge.value_percent, self.gauge.color
        );

        let _ = writeln!(out, "\nCarbon Intensity Trend");
        for point in &self.trend {
            let bar = "#".repeat((point.intensity_percent / 5.0).round() as usize);
            let _ = writeln!(
                out,
                "  {:<4}{:>5.0} % {}",
                point.month, point.intensity_percent, bar
            );
        }

        let _ = writeln!(out, "\nModel Selection Summary");
        let _ = writeln!(
            out,
            "  {:<22}{:<14}{:<13}{}",
            "Model Variant", "Carbon Usage", "Accuracy", "Use Case"
        );
        for row in &self.model_summary {
            let _ = writeln!(
                out,
                "  {:<22}{:<14}{:<13}{}",
                row.model_variant, row.carbon_usage, row.accuracy, row.use_case
            );
        }

        out
    }
}
