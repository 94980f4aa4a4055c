use tracing::debug;

use crate::downspout::{DownspoutSizing, DownspoutWarning, size_downspouts};
use crate::error::{ReferenceDataError, SizingError};
use crate::gutter::{GutterSection, rectangular_section, semicircular_section};
use crate::hydrology::Hydrology;
use crate::inputs::{GutterShape, SizingInput};
use crate::reference_data::ReferenceData;

/// Complete sizing of one roof, in SI-ish units (m, L/min, mm for downspouts).
#[derive(Debug, Clone, PartialEq)]
pub struct SizingResult {
    pub hydrology: Hydrology,
    pub gutter: GutterSection,
    pub downspout: DownspoutSizing,
}

impl SizingResult {
    pub fn warning(&self) -> Option<DownspoutWarning> {
        self.downspout.warning
    }
}

/// Flat record for display: gutter dimensions in cm, downspout in mm.
///
/// Hard failures are folded into a zeroed record whose `downspout_warning`
/// carries the failure message, so a consumer must check the warning before
/// trusting the numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingReport {
    pub flow_rate: f64,           // [L/min]
    pub contribution_area: f64,   // [m²]
    pub rainfall_intensity: f64,  // [mm/h]
    pub gutter_width: f64,        // [cm]
    pub water_depth: f64,         // [cm]
    pub total_gutter_height: f64, // [cm]
    pub downspout_diameter: u32,  // [mm]
    pub downspout_warning: Option<String>,
}

impl SizingReport {
    pub fn from_outcome(outcome: &Result<SizingResult, SizingError>) -> Self {
        match outcome {
            Ok(result) => SizingReport::from(result),
            Err(err) => SizingReport::failed(err),
        }
    }

    fn failed(err: &SizingError) -> Self {
        SizingReport {
            flow_rate: 0.0,
            contribution_area: 0.0,
            rainfall_intensity: 0.0,
            gutter_width: 0.0,
            water_depth: 0.0,
            total_gutter_height: 0.0,
            downspout_diameter: 0,
            downspout_warning: Some(err.to_string()),
        }
    }
}

impl From<&SizingResult> for SizingReport {
    fn from(result: &SizingResult) -> Self {
        SizingReport {
            flow_rate: result.hydrology.flow_rate,
            contribution_area: result.hydrology.contribution_area,
            rainfall_intensity: result.hydrology.rainfall_intensity,
            gutter_width: result.gutter.width * 100.0,
            water_depth: result.gutter.water_depth * 100.0,
            total_gutter_height: result.gutter.total_height * 100.0,
            downspout_diameter: result.downspout.diameter_mm,
            downspout_warning: result.downspout.warning.map(|w| w.to_string()),
        }
    }
}

// Gutter and downspout sizing against a fixed set of reference tables
#[derive(Debug, Clone)]
pub struct SizingEngine {
    data: ReferenceData,
}

impl SizingEngine {
    pub fn new(data: ReferenceData) -> Self {
        SizingEngine { data }
    }

    pub fn with_builtin_data() -> Result<Self, ReferenceDataError> {
        Ok(SizingEngine::new(ReferenceData::builtin()?))
    }

    pub fn reference_data(&self) -> &ReferenceData {
        &self.data
    }

    /// Run hydrology, gutter and downspout stages in order.
    ///
    /// Missing rainfall data, an unknown or unsupported material and an
    /// infeasible gutter abort with an error. An undersized downspout
    /// catalog does not: the result carries a warning instead.
    pub fn compute(&self, input: &SizingInput) -> Result<SizingResult, SizingError> {
        input.validate()?;

        let intensity = self.data.rainfall_intensity(&input.state, &input.city)?;
        let hydrology = Hydrology::new(
            intensity,
            input.roof_width,
            input.roof_length,
            input.roof_slope,
        );
        debug!(
            state = %input.state,
            city = %input.city,
            intensity,
            area = hydrology.contribution_area,
            flow_rate = hydrology.flow_rate,
            "hydrology"
        );

        let roughness = self.data.manning_roughness(&input.gutter_material)?;
        let gutter = match input.gutter_shape {
            GutterShape::Rectangular => {
                let width = self.data.initial_gutter_width(input.roof_length);
                rectangular_section(hydrology.flow_rate, width, roughness)?
            }
            GutterShape::Semicircular => semicircular_section(
                hydrology.flow_rate,
                &input.gutter_material,
                roughness,
                &self.data,
            )?,
        };

        let downspout = size_downspouts(
            hydrology.flow_rate,
            input.downspout_count,
            gutter.water_depth,
            &self.data,
        );

        Ok(SizingResult {
            hydrology,
            gutter,
            downspout,
        })
    }

    // Single-channel form of `compute` for display
    pub fn report(&self, input: &SizingInput) -> SizingReport {
        SizingReport::from_outcome(&self.compute(input))
    }
}
