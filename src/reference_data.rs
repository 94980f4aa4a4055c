use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ReferenceDataError, SizingError};

const BUILTIN_TOML: &str = include_str!("../reference_data.toml");

// Slope keys are written as decimal strings; match them within this tolerance
const SLOPE_TOLERANCE: f64 = 1e-9;

// One step of the initial rectangular width table, as written in TOML
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub(crate) struct WidthStep {
    pub max_roof_length: Option<f64>, // Upper bound of roof length [m], None on the last step
    pub width: f64,                   // Gutter width [m]
}

// Tabulated semicircular gutter of one nominal diameter
#[derive(Debug, Clone, PartialEq)]
pub struct SemicircularGutter {
    pub diameter_mm: u32,
    capacities: Vec<(f64, f64)>, // (slope [m/m], capacity [L/min]), ascending slope
}

impl SemicircularGutter {
    // Capacity [L/min] at the given longitudinal slope, if tabulated
    pub fn capacity_at(&self, slope: f64) -> Option<f64> {
        self.capacities
            .iter()
            .find(|(s, _)| (s - slope).abs() < SLOPE_TOLERANCE)
            .map(|&(_, capacity)| capacity)
    }
}

// Layout of reference_data.toml
#[derive(Deserialize)]
struct RawReferenceData {
    downspout_diameters: Vec<u32>,
    semicircular_roughness: f64,
    rainfall_intensity: BTreeMap<String, BTreeMap<String, f64>>,
    manning_roughness: BTreeMap<String, f64>,
    semicircular_capacity: BTreeMap<String, BTreeMap<String, f64>>,
    initial_gutter_width: Vec<WidthStep>,
}

/// Read-only tables the sizing engine works against.
///
/// Built once from TOML and validated on construction, so every lookup
/// afterwards either resolves or reports an explicit not-found error.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    rainfall_intensity: BTreeMap<String, BTreeMap<String, f64>>, // state -> city -> [mm/h]
    manning_roughness: BTreeMap<String, f64>,                    // material -> n [-]
    semicircular_roughness: f64,                                 // n of the capacity table
    semicircular_gutters: Vec<SemicircularGutter>,               // ascending diameter
    downspout_diameters: Vec<u32>,                               // ascending [mm]
    largest_downspout: u32,                                      // last catalog entry [mm]
    width_steps: Vec<(f64, f64)>,                                // (max roof length, width) [m]
    fallback_width: f64,                                         // width past the last step [m]
}

impl ReferenceData {
    /// NBR 10844 and Tomaz tables shipped with the crate.
    pub fn builtin() -> Result<Self, ReferenceDataError> {
        Self::from_toml_str(BUILTIN_TOML)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReferenceDataError> {
        let path = path.as_ref();
        let toml_str = fs::read_to_string(path).map_err(|source| ReferenceDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_toml_str(&toml_str)?;
        info!(
            path = %path.display(),
            states = data.rainfall_intensity.len(),
            materials = data.manning_roughness.len(),
            "loaded reference data"
        );
        Ok(data)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ReferenceDataError> {
        let raw: RawReferenceData = toml::from_str(toml_str)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawReferenceData) -> Result<Self, ReferenceDataError> {
        for (state, cities) in &raw.rainfall_intensity {
            for (city, intensity) in cities {
                ensure_positive(*intensity, &format!("rainfall intensity for {state}/{city}"))?;
            }
        }
        for (material, n) in &raw.manning_roughness {
            ensure_positive(*n, &format!("roughness of '{material}'"))?;
        }
        ensure_positive(raw.semicircular_roughness, "semicircular_roughness")?;

        let Some(&largest_downspout) = raw.downspout_diameters.last() else {
            return Err(invalid("downspout_diameters is empty"));
        };
        if raw.downspout_diameters[0] == 0
            || raw.downspout_diameters.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(invalid(
                "downspout_diameters must be positive and strictly ascending",
            ));
        }

        let mut semicircular_gutters = raw
            .semicircular_capacity
            .iter()
            .map(|(diameter, slopes)| parse_semicircular(diameter, slopes))
            .collect::<Result<Vec<_>, _>>()?;
        semicircular_gutters.sort_by_key(|g| g.diameter_mm);

        let (width_steps, fallback_width) = split_width_steps(&raw.initial_gutter_width)?;

        Ok(ReferenceData {
            rainfall_intensity: raw.rainfall_intensity,
            manning_roughness: raw.manning_roughness,
            semicircular_roughness: raw.semicircular_roughness,
            semicircular_gutters,
            downspout_diameters: raw.downspout_diameters,
            largest_downspout,
            width_steps,
            fallback_width,
        })
    }

    // Rainfall intensity [mm/h] for a city of a state
    pub fn rainfall_intensity(&self, state: &str, city: &str) -> Result<f64, SizingError> {
        self.rainfall_intensity
            .get(state)
            .and_then(|cities| cities.get(city))
            .copied()
            .ok_or_else(|| SizingError::RainfallNotFound {
                state: state.to_string(),
                city: city.to_string(),
            })
    }

    // Manning's n for a gutter material
    pub fn manning_roughness(&self, material: &str) -> Result<f64, SizingError> {
        self.manning_roughness
            .get(material)
            .copied()
            .ok_or_else(|| SizingError::UnknownMaterial(material.to_string()))
    }

    pub fn semicircular_roughness(&self) -> f64 {
        self.semicircular_roughness
    }

    pub fn semicircular_gutters(&self) -> &[SemicircularGutter] {
        &self.semicircular_gutters
    }

    // Tabulated capacity [L/min] of a semicircular diameter [mm] at a slope [m/m]
    pub fn semicircular_capacity(&self, diameter_mm: u32, slope: f64) -> Result<f64, SizingError> {
        self.semicircular_gutters
            .iter()
            .find(|g| g.diameter_mm == diameter_mm)
            .and_then(|g| g.capacity_at(slope))
            .ok_or(SizingError::CapacityNotTabulated { diameter_mm, slope })
    }

    pub fn downspout_diameters(&self) -> &[u32] {
        &self.downspout_diameters
    }

    pub fn largest_downspout_diameter(&self) -> u32 {
        self.largest_downspout
    }

    // Starting rectangular gutter width [m] for a roof length [m]
    pub fn initial_gutter_width(&self, roof_length: f64) -> f64 {
        self.width_steps
            .iter()
            .find(|&&(max_roof_length, _)| roof_length <= max_roof_length)
            .map_or(self.fallback_width, |&(_, width)| width)
    }

    // Sorted state codes
    pub fn states(&self) -> Vec<&str> {
        self.rainfall_intensity.keys().map(String::as_str).collect()
    }

    // Sorted cities of a state, empty when the state is unknown
    pub fn cities(&self, state: &str) -> Vec<&str> {
        self.rainfall_intensity
            .get(state)
            .map(|cities| cities.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn materials(&self) -> Vec<&str> {
        self.manning_roughness.keys().map(String::as_str).collect()
    }
}

fn invalid(msg: impl Into<String>) -> ReferenceDataError {
    ReferenceDataError::Invalid(msg.into())
}

fn ensure_positive(value: f64, what: &str) -> Result<(), ReferenceDataError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{what} must be a positive number, got {value}")))
    }
}

fn parse_semicircular(
    diameter: &str,
    slopes: &BTreeMap<String, f64>,
) -> Result<SemicircularGutter, ReferenceDataError> {
    let diameter_mm: u32 = diameter
        .trim()
        .parse()
        .map_err(|_| {
            invalid(format!(
                "semicircular diameter '{diameter}' is not an integer"
            ))
        })?;
    if diameter_mm == 0 {
        return Err(invalid("semicircular diameter must be positive"));
    }

    let mut capacities = Vec::with_capacity(slopes.len());
    for (slope, capacity) in slopes {
        let slope_value: f64 = slope.trim().parse().map_err(|_| {
            invalid(format!(
                "slope '{slope}' of diameter {diameter_mm} is not a number"
            ))
        })?;
        ensure_positive(
            slope_value,
            &format!("slope '{slope}' of diameter {diameter_mm}"),
        )?;
        ensure_positive(
            *capacity,
            &format!("capacity of diameter {diameter_mm} at slope {slope}"),
        )?;
        capacities.push((slope_value, *capacity));
    }
    capacities.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(SemicircularGutter {
        diameter_mm,
        capacities,
    })
}

// Bounded (max roof length, width) steps plus the trailing fallback width
fn split_width_steps(
    steps: &[WidthStep],
) -> Result<(Vec<(f64, f64)>, f64), ReferenceDataError> {
    let Some((last, bounded)) = steps.split_last() else {
        return Err(invalid("initial_gutter_width is empty"));
    };
    if last.max_roof_length.is_some() {
        return Err(invalid(
            "the last initial_gutter_width step must omit max_roof_length",
        ));
    }

    let mut previous = f64::NEG_INFINITY;
    let mut table = Vec::with_capacity(bounded.len());
    for step in bounded {
        let Some(max) = step.max_roof_length else {
            return Err(invalid(
                "only the last initial_gutter_width step may omit max_roof_length",
            ));
        };
        if !max.is_finite() || max <= previous {
            return Err(invalid("initial_gutter_width steps must be strictly ascending"));
        }
        ensure_positive(step.width, "initial gutter width")?;
        previous = max;
        table.push((max, step.width));
    }
    ensure_positive(last.width, "initial gutter width")?;
    Ok((table, last.width))
}
