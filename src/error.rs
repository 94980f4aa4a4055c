use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why no gutter section could carry the design flow.
#[derive(Debug, Clone, PartialEq)]
pub enum GutterInfeasibility {
    /// Largest tabulated semicircular diameter is still too small.
    SemicircularCapacityExceeded { flow_rate: f64 },
    /// Manning discharge at twice the gutter width is still too small.
    RectangularDepthBound { width_m: f64, flow_rate: f64 },
}

impl fmt::Display for GutterInfeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GutterInfeasibility::SemicircularCapacityExceeded { .. } => f.write_str(
                "Nenhuma calha semicircular padrão suporta a vazão. Considere dividir a área de captação.",
            ),
            GutterInfeasibility::RectangularDepthBound { .. } => f.write_str(
                "Nenhuma lâmina d'água viável para a calha retangular. Considere dividir a área de captação.",
            ),
        }
    }
}

/// Hard failures of the sizing pipeline.
///
/// Display strings are the user-facing messages shown by the calculator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("Dados de chuva não encontrados para a cidade selecionada.")]
    RainfallNotFound { state: String, city: String },

    #[error("Material de calha desconhecido: '{0}'.")]
    UnknownMaterial(String),

    #[error(
        "Capacidade não tabelada para calha semicircular de {diameter_mm} mm com declividade {slope}."
    )]
    CapacityNotTabulated { diameter_mm: u32, slope: f64 },

    #[error(
        "Cálculo para calhas semicirculares está disponível apenas para materiais com n=0,011 (Aço, PVC, etc)."
    )]
    UnsupportedMaterial { material: String, roughness: f64 },

    #[error("{0}")]
    NoFeasibleGutter(GutterInfeasibility),

    #[error("Parâmetro de entrada inválido: {0}")]
    InvalidInput(String),
}

/// Category of a [`SizingError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingErrorKind {
    LookupFailure,
    UnsupportedMaterial,
    NoFeasibleGutter,
    InvalidInput,
}

impl SizingError {
    pub fn kind(&self) -> SizingErrorKind {
        match self {
            SizingError::RainfallNotFound { .. }
            | SizingError::UnknownMaterial(_)
            | SizingError::CapacityNotTabulated { .. } => SizingErrorKind::LookupFailure,
            SizingError::UnsupportedMaterial { .. } => SizingErrorKind::UnsupportedMaterial,
            SizingError::NoFeasibleGutter(_) => SizingErrorKind::NoFeasibleGutter,
            SizingError::InvalidInput(_) => SizingErrorKind::InvalidInput,
        }
    }
}

/// Failures while loading the reference tables.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("failed to read reference data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reference data: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid reference data: {0}")]
    Invalid(String),
}
