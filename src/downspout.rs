/*!
Downspout diameter by the Frutuoso Dantas method.

The inlet either behaves as a free weir (H/d > 1/3) or as an orifice; the
weir formula is tried first and the orifice formula replaces it when the
trial diameter contradicts the weir assumption. The result is snapped up to
the standard diameter catalog.

Flow per downspout in L/min, head and diameters in mm.
*/
use std::fmt;

use tracing::{debug, warn};

use crate::reference_data::ReferenceData;

const WEIR_COEFFICIENT: f64 = 0.0039;
const ORIFICE_COEFFICIENT: f64 = 0.0116;
const WEIR_HEAD_RATIO: f64 = 1.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRegime {
    Weir,    // H/d > 1/3
    Orifice, // H/d <= 1/3
}

// Advisory attached to an otherwise usable result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownspoutWarning {
    NoFeasibleDiameter { required_mm: f64, fallback_mm: u32 },
}

impl fmt::Display for DownspoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownspoutWarning::NoFeasibleDiameter { .. } => f.write_str(
                "Nenhum diâmetro de duto atende a solicitação. Aumente a quantidade de dutos de descida ou revise o projeto.",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownspoutSizing {
    pub flow_per_downspout: f64, // [L/min]
    pub head: f64,               // Water depth over the inlet [mm]
    pub regime: FlowRegime,
    pub required_diameter: f64, // Unrounded diameter [mm]
    pub diameter_mm: u32,       // Catalog diameter
    pub warning: Option<DownspoutWarning>,
}

// Unrounded diameter [mm] and the regime it was computed under
pub fn required_diameter(flow_per_downspout: f64, head: f64) -> (f64, FlowRegime) {
    let d_trial = (flow_per_downspout / (WEIR_COEFFICIENT * head.powf(0.5))).sqrt();
    if head / d_trial > WEIR_HEAD_RATIO {
        (d_trial, FlowRegime::Weir)
    } else {
        (
            flow_per_downspout / (ORIFICE_COEFFICIENT * head.powf(1.5)),
            FlowRegime::Orifice,
        )
    }
}

// Smallest catalog diameter at least `required` [mm]
pub fn snap_to_catalog(required: f64, catalog: &[u32]) -> Option<u32> {
    catalog.iter().copied().find(|&d| d as f64 >= required)
}

/// Size `count` downspouts sharing `flow_rate` [L/min] under a gutter
/// flowing at `water_depth` [m].
///
/// When the required diameter exceeds the catalog the largest standard size
/// is returned with a warning instead of failing.
pub fn size_downspouts(
    flow_rate: f64,
    count: u32,
    water_depth: f64,
    data: &ReferenceData,
) -> DownspoutSizing {
    let flow_per_downspout = flow_rate / count as f64;
    let head = water_depth * 1000.0;
    let (required, regime) = required_diameter(flow_per_downspout, head);

    let (diameter_mm, warning) = match snap_to_catalog(required, data.downspout_diameters()) {
        Some(d) => (d, None),
        None => {
            let fallback_mm = data.largest_downspout_diameter();
            warn!(
                required_mm = required,
                fallback_mm, "no standard downspout diameter is large enough"
            );
            (
                fallback_mm,
                Some(DownspoutWarning::NoFeasibleDiameter {
                    required_mm: required,
                    fallback_mm,
                }),
            )
        }
    };
    debug!(flow_per_downspout, head, ?regime, required, diameter_mm, "downspout sized");

    DownspoutSizing {
        flow_per_downspout,
        head,
        regime,
        required_diameter: required,
        diameter_mm,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_data::tests::FIXTURE_TOML;
    use approx::assert_relative_eq;

    const CATALOG: [u32; 7] = [75, 100, 125, 150, 200, 250, 300];

    fn builtin() -> ReferenceData {
        ReferenceData::builtin().unwrap()
    }

    #[test]
    fn weir_regime_for_reference_roof() {
        let (d, regime) = required_diameter(247.25, 42.0);
        assert_eq!(regime, FlowRegime::Weir);
        let expected = (247.25 / (0.0039 * 42.0_f64.sqrt())).sqrt();
        assert_relative_eq!(d, expected, max_relative = 1e-12);
        assert_relative_eq!(d, 98.906, epsilon = 1e-3);
    }

    #[test]
    fn shallow_head_switches_to_orifice() {
        let (d, regime) = required_diameter(500.0, 10.0);
        assert_eq!(regime, FlowRegime::Orifice);
        let expected = 500.0 / (0.0116 * 10.0_f64.powf(1.5));
        assert_relative_eq!(d, expected, max_relative = 1e-12);
    }

    #[test]
    fn snaps_up_to_catalog() {
        assert_eq!(snap_to_catalog(98.9, &CATALOG), Some(100));
        assert_eq!(snap_to_catalog(100.0, &CATALOG), Some(100));
        assert_eq!(snap_to_catalog(10.0, &CATALOG), Some(75));
        assert_eq!(snap_to_catalog(300.5, &CATALOG), None);
    }

    #[test]
    fn reference_roof_uses_100mm() {
        let sizing = size_downspouts(494.5, 2, 0.042, &builtin());
        assert_eq!(sizing.diameter_mm, 100);
        assert_eq!(sizing.warning, None);
        assert_relative_eq!(sizing.flow_per_downspout, 247.25, epsilon = 1e-12);
    }

    #[test]
    fn oversized_flow_falls_back_with_warning() {
        let sizing = size_downspouts(1000.0, 2, 0.01, &builtin());
        assert_eq!(sizing.diameter_mm, 300);
        assert_eq!(sizing.regime, FlowRegime::Orifice);
        match sizing.warning {
            Some(DownspoutWarning::NoFeasibleDiameter { required_mm, fallback_mm }) => {
                assert!(required_mm > 300.0);
                assert_eq!(fallback_mm, 300);
            }
            None => panic!("expected a warning"),
        }
    }

    #[test]
    fn fallback_is_largest_size_of_injected_catalog() {
        let data = ReferenceData::from_toml_str(FIXTURE_TOML).unwrap();
        // 247.25 L/min over a 42 mm head needs about 99 mm: fits 100 mm
        assert_eq!(size_downspouts(494.5, 2, 0.042, &data).diameter_mm, 100);

        let sizing = size_downspouts(12_000.0, 2, 0.21, &data);
        assert_eq!(sizing.diameter_mm, 150);
        assert_eq!(
            sizing.warning.map(|w| match w {
                DownspoutWarning::NoFeasibleDiameter { fallback_mm, .. } => fallback_mm,
            }),
            Some(150)
        );
    }

    #[test]
    fn more_downspouts_never_need_larger_diameter() {
        let data = builtin();
        for (flow, depth) in [(494.5, 0.042), (12_000.0, 0.21), (800.0, 0.008)] {
            let mut last = u32::MAX;
            for count in 2..=40 {
                let sizing = size_downspouts(flow, count, depth, &data);
                assert!(sizing.diameter_mm <= last, "flow {flow} count {count}");
                last = sizing.diameter_mm;
            }
        }
    }

    #[test]
    fn warning_text_matches_calculator() {
        let warning = DownspoutWarning::NoFeasibleDiameter {
            required_mm: 320.0,
            fallback_mm: 300,
        };
        assert!(warning.to_string().starts_with("Nenhum diâmetro de duto atende"));
    }
}
