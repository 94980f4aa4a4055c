use serde::Deserialize;

use crate::error::SizingError;

// Minimum number of downspouts per gutter
pub const MIN_DOWNSPOUTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GutterShape {
    Rectangular,
    Semicircular,
}

// Roof, location and gutter choices for one sizing run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SizingInput {
    pub roof_width: f64,         // Roof width draining into the gutter [m]
    pub roof_length: f64,        // Roof length along the gutter [m]
    pub roof_slope: f64,         // Roof slope [%]
    pub state: String,           // Rainfall table state code, e.g. "SP"
    pub city: String,            // Rainfall table city within the state
    pub gutter_material: String, // Key into the Manning roughness table
    pub gutter_shape: GutterShape,
    pub downspout_count: u32,
    pub building_height: f64, // Building height [m], not used by the sizing yet
}

impl Default for SizingInput {
    fn default() -> Self {
        SizingInput {
            roof_width: 10.0,
            roof_length: 15.0,
            roof_slope: 30.0,
            state: "SP".to_string(),
            city: "São Paulo (Mirante Santana)".to_string(),
            gutter_material: "Chapa Metálica".to_string(),
            gutter_shape: GutterShape::Rectangular,
            downspout_count: MIN_DOWNSPOUTS,
            building_height: 3.0,
        }
    }
}

impl SizingInput {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    // Reject geometry the formulas are not defined for
    pub fn validate(&self) -> Result<(), SizingError> {
        if !(self.roof_width.is_finite() && self.roof_width > 0.0) {
            return Err(invalid(format!(
                "largura do telhado deve ser positiva (recebido {})",
                self.roof_width
            )));
        }
        if !(self.roof_length.is_finite() && self.roof_length > 0.0) {
            return Err(invalid(format!(
                "comprimento do telhado deve ser positivo (recebido {})",
                self.roof_length
            )));
        }
        if !(self.roof_slope.is_finite() && self.roof_slope >= 0.0) {
            return Err(invalid(format!(
                "inclinação do telhado não pode ser negativa (recebido {})",
                self.roof_slope
            )));
        }
        if self.downspout_count < MIN_DOWNSPOUTS {
            return Err(invalid(format!(
                "são necessários pelo menos {MIN_DOWNSPOUTS} dutos de descida (recebido {})",
                self.downspout_count
            )));
        }
        if !(self.building_height.is_finite() && self.building_height >= 0.0) {
            return Err(invalid(format!(
                "altura da edificação não pode ser negativa (recebido {})",
                self.building_height
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> SizingError {
    SizingError::InvalidInput(msg)
}
