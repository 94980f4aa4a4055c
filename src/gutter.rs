/*!
Gutter cross-section sizing.

Rectangular gutters are sized with Manning's equation: the width comes from
the roof-length step table and the flow depth is the smallest whole
millimetre whose discharge carries the design flow. Semicircular gutters use
the tabulated NBR 10844 capacities, which only hold for n = 0.011.

All lengths in this module are meters; flow rates are L/min unless noted.
*/
use tracing::debug;

use crate::error::{GutterInfeasibility, SizingError};
use crate::inputs::GutterShape;
use crate::reference_data::ReferenceData;

// Minimum longitudinal gutter slope [m/m]
pub const GUTTER_SLOPE: f64 = 0.005;

// Depth resolution of the rectangular solve [m]
pub const DEPTH_STEP: f64 = 0.001;

const FREEBOARD_FACTOR: f64 = 1.3;
const MIN_FREEBOARD: f64 = 0.02; // [m]

// Maximum flow depth as a multiple of the gutter width
const DEPTH_BOUND_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterSection {
    pub shape: GutterShape,
    pub width: f64,        // Channel width, full diameter for semicircular [m]
    pub water_depth: f64,  // Design flow depth [m]
    pub total_height: f64, // Depth plus freeboard [m]
    pub nominal_diameter_mm: Option<u32>,
}

// Manning discharge [m³/s] of a rectangular channel flowing at depth y [m]
pub fn manning_discharge(width: f64, depth: f64, roughness: f64, slope: f64) -> f64 {
    let area = width * depth;
    let perimeter = width + 2.0 * depth;
    let hydraulic_radius = area / perimeter;
    (1.0 / roughness) * area * hydraulic_radius.powf(2.0 / 3.0) * slope.sqrt()
}

// Depth [m] of a whole number of solver steps
pub fn depth_from_steps(steps: u32) -> f64 {
    steps as f64 * DEPTH_STEP
}

// Larger of a 30 % margin or a fixed 2 cm margin
pub fn rectangular_total_height(water_depth: f64) -> f64 {
    (water_depth * FREEBOARD_FACTOR).max(water_depth + MIN_FREEBOARD)
}

/// Size a rectangular gutter of the given width for a flow [L/min].
///
/// Discharge grows monotonically with depth at fixed width, so the depth is
/// found by bisection over whole millimetres between 1 mm and twice the
/// width. A flow the bound cannot carry is reported as infeasible.
pub fn rectangular_section(
    flow_rate: f64,
    width: f64,
    roughness: f64,
) -> Result<GutterSection, SizingError> {
    let q = flow_rate / 60_000.0; // L/min -> m³/s
    let discharge =
        |steps: u32| manning_discharge(width, depth_from_steps(steps), roughness, GUTTER_SLOPE);

    let max_steps = (DEPTH_BOUND_FACTOR * width / DEPTH_STEP + 1e-9).floor() as u32;
    if max_steps == 0 || discharge(max_steps) < q {
        return Err(SizingError::NoFeasibleGutter(
            GutterInfeasibility::RectangularDepthBound {
                width_m: width,
                flow_rate,
            },
        ));
    }

    let (mut lo, mut hi) = (1, max_steps);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if discharge(mid) >= q {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    let water_depth = depth_from_steps(lo);
    debug!(width, water_depth, steps = lo, "rectangular gutter depth found");
    Ok(GutterSection {
        shape: GutterShape::Rectangular,
        width,
        water_depth,
        total_height: rectangular_total_height(water_depth),
        nominal_diameter_mm: None,
    })
}

/// Pick the smallest tabulated semicircular gutter that carries the flow [L/min].
pub fn semicircular_section(
    flow_rate: f64,
    material: &str,
    roughness: f64,
    data: &ReferenceData,
) -> Result<GutterSection, SizingError> {
    if roughness != data.semicircular_roughness() {
        return Err(SizingError::UnsupportedMaterial {
            material: material.to_string(),
            roughness,
        });
    }

    let mut selected = None;
    for gutter in data.semicircular_gutters() {
        if data.semicircular_capacity(gutter.diameter_mm, GUTTER_SLOPE)? >= flow_rate {
            selected = Some(gutter.diameter_mm);
            break;
        }
    }
    let diameter_mm = selected.ok_or(SizingError::NoFeasibleGutter(
        GutterInfeasibility::SemicircularCapacityExceeded { flow_rate },
    ))?;

    let width = diameter_mm as f64 / 1000.0;
    let water_depth = (diameter_mm as f64 / 2.0) / 1000.0; // Half-full design
    debug!(diameter_mm, flow_rate, "semicircular gutter selected");
    Ok(GutterSection {
        shape: GutterShape::Semicircular,
        width,
        water_depth,
        total_height: water_depth * FREEBOARD_FACTOR,
        nominal_diameter_mm: Some(diameter_mm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_data::tests::FIXTURE_TOML;
    use approx::assert_relative_eq;

    fn required(flow_rate: f64) -> f64 {
        flow_rate / 60_000.0
    }

    #[test]
    fn manning_matches_hand_calculation() {
        // A = 0.015, P = 0.4, Rh = 0.0375
        let q = manning_discharge(0.3, 0.05, 0.011, 0.005);
        let expected = (1.0 / 0.011) * 0.015 * 0.0375_f64.powf(2.0 / 3.0) * 0.005_f64.sqrt();
        assert_relative_eq!(q, expected, max_relative = 1e-12);
    }

    #[test]
    fn manning_is_monotonic_in_depth() {
        let mut last = 0.0;
        for steps in 1..=600 {
            let q = manning_discharge(0.3, depth_from_steps(steps), 0.011, GUTTER_SLOPE);
            assert!(q > last);
            last = q;
        }
    }

    #[test]
    fn reference_roof_depth() {
        let section = rectangular_section(494.5, 0.3, 0.011).unwrap();
        assert_relative_eq!(section.water_depth, 0.042, epsilon = 1e-12);
        assert_relative_eq!(section.total_height, 0.062, epsilon = 1e-12);
        assert_eq!(section.shape, GutterShape::Rectangular);
    }

    #[test]
    fn depth_is_smallest_whole_millimetre() {
        let cases = [
            (40.0, 0.15),
            (494.5, 0.3),
            (3600.0, 0.6),
            (12_000.0, 0.6),
            (7.5, 0.2),
        ];
        for (flow, width) in cases {
            let section = rectangular_section(flow, width, 0.011).unwrap();
            let steps = (section.water_depth / DEPTH_STEP).round() as u32;
            let at = manning_discharge(width, depth_from_steps(steps), 0.011, GUTTER_SLOPE);
            assert!(at >= required(flow));
            if steps > 1 {
                let below =
                    manning_discharge(width, depth_from_steps(steps - 1), 0.011, GUTTER_SLOPE);
                assert!(below < required(flow), "flow {flow} width {width}");
            }
        }
    }

    #[test]
    fn tiny_flow_floors_at_one_millimetre() {
        let section = rectangular_section(0.01, 0.15, 0.011).unwrap();
        assert_relative_eq!(section.water_depth, 0.001, epsilon = 1e-15);
        assert_relative_eq!(section.total_height, 0.021, epsilon = 1e-12);
    }

    #[test]
    fn deep_flow_uses_proportional_freeboard() {
        assert_relative_eq!(rectangular_total_height(0.1), 0.13, epsilon = 1e-12);
        assert_relative_eq!(rectangular_total_height(0.05), 0.07, epsilon = 1e-12);
    }

    #[test]
    fn rougher_material_needs_more_depth() {
        let smooth = rectangular_section(494.5, 0.3, 0.011).unwrap();
        let rough = rectangular_section(494.5, 0.3, 0.015).unwrap();
        assert!(rough.water_depth > smooth.water_depth);
    }

    #[test]
    fn depth_bound_is_infeasible() {
        let err = rectangular_section(120_000.0, 0.6, 0.011).unwrap_err();
        assert!(matches!(
            err,
            SizingError::NoFeasibleGutter(GutterInfeasibility::RectangularDepthBound { .. })
        ));
    }

    #[test]
    fn semicircular_picks_smallest_sufficient_diameter() {
        let data = ReferenceData::builtin().unwrap();
        let cases = [
            (71.7, 100),
            (130.0, 100),
            (130.1, 125),
            (286.7, 150),
            (645.0, 200),
        ];
        for (flow, diameter) in cases {
            let section = semicircular_section(flow, "PVC", 0.011, &data).unwrap();
            assert_eq!(section.nominal_diameter_mm, Some(diameter));
            assert_relative_eq!(section.width, diameter as f64 / 1000.0, epsilon = 1e-12);
            assert_relative_eq!(section.water_depth, diameter as f64 / 2000.0, epsilon = 1e-12);
            assert_relative_eq!(section.total_height, section.water_depth * 1.3, epsilon = 1e-12);
        }
    }

    #[test]
    fn semicircular_rejects_other_roughness() {
        let data = ReferenceData::from_toml_str(FIXTURE_TOML).unwrap();
        let err = semicircular_section(100.0, "Concrete", 0.015, &data).unwrap_err();
        assert_eq!(
            err,
            SizingError::UnsupportedMaterial {
                material: "Concrete".to_string(),
                roughness: 0.015,
            }
        );
    }

    #[test]
    fn semicircular_without_design_slope_is_a_lookup_failure() {
        let toml_str = FIXTURE_TOML.replace(
            "[semicircular_capacity.150]\n\"0.005\" = 384.0",
            "[semicircular_capacity.150]\n\"0.01\" = 541.0",
        );
        let data = ReferenceData::from_toml_str(&toml_str).unwrap();
        // 130 L/min fits 100 mm; 200 L/min must consult the 150 mm row
        assert!(semicircular_section(100.0, "PVC", 0.011, &data).is_ok());
        assert_eq!(
            semicircular_section(200.0, "PVC", 0.011, &data).unwrap_err(),
            SizingError::CapacityNotTabulated {
                diameter_mm: 150,
                slope: GUTTER_SLOPE,
            }
        );
    }

    #[test]
    fn semicircular_capacity_exceeded() {
        let data = ReferenceData::builtin().unwrap();
        let err = semicircular_section(1146.7, "PVC", 0.011, &data).unwrap_err();
        assert!(matches!(
            err,
            SizingError::NoFeasibleGutter(GutterInfeasibility::SemicircularCapacityExceeded { .. })
        ));
    }
}
