/*!
Design flow reaching the gutter.

The roof plan area is widened by half the slope-induced rise to account for
wind-driven rain on the inclined plane, and the rainfall intensity is applied
over that contribution area.

Units: intensity in mm/h, areas in m², flow in L/min
(1 mm/h over 1 m² is 1 L/h, i.e. 1/60 L/min).
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hydrology {
    pub rainfall_intensity: f64, // [mm/h]
    pub contribution_area: f64,  // [m²]
    pub flow_rate: f64,          // [L/min]
}

// Rise over the roof width [m] for a slope in percent
pub fn roof_rise(roof_width: f64, roof_slope: f64) -> f64 {
    roof_width * (roof_slope / 100.0)
}

// Contribution area [m²] of an inclined roof plane
pub fn contribution_area(roof_width: f64, roof_length: f64, roof_slope: f64) -> f64 {
    let h = roof_rise(roof_width, roof_slope);
    (roof_width + h / 2.0) * roof_length
}

// Design flow [L/min] from intensity [mm/h] and area [m²]
pub fn flow_rate(rainfall_intensity: f64, contribution_area: f64) -> f64 {
    rainfall_intensity * contribution_area / 60.0
}

impl Hydrology {
    pub fn new(
        rainfall_intensity: f64,
        roof_width: f64,
        roof_length: f64,
        roof_slope: f64,
    ) -> Self {
        let area = contribution_area(roof_width, roof_length, roof_slope);
        Hydrology {
            rainfall_intensity,
            contribution_area: area,
            flow_rate: flow_rate(rainfall_intensity, area),
        }
    }
}
