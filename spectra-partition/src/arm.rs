use std::{fmt, str::FromStr};

/// One of the three spectrograph arms a coadd spectrum is split into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
pub enum Arm {
    B,
    #[default]
    R,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Wavelength,
    Flux,
    Ivar,
    Mask,
}

impl ArrayKind {
    pub const ALL: [ArrayKind; 4] = [
        ArrayKind::Wavelength,
        ArrayKind::Flux,
        ArrayKind::Ivar,
        ArrayKind::Mask,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            ArrayKind::Wavelength => "WAVELENGTH",
            ArrayKind::Flux => "FLUX",
            ArrayKind::Ivar => "IVAR",
            ArrayKind::Mask => "MASK",
        }
    }
}

impl Arm {
    pub const ALL: [Arm; 3] = [Arm::B, Arm::R, Arm::Z];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arm::B => "B",
            Arm::R => "R",
            Arm::Z => "Z",
        }
    }

    /// Name of the array inside a coadd file, e.g. `R_FLUX`.
    pub fn array_name(&self, kind: ArrayKind) -> String {
        format!("{}_{}", self.as_str(), kind.suffix())
    }

    /// Key used in response documents, e.g. `r_flux`.
    pub fn document_key(&self, kind: ArrayKind) -> String {
        self.array_name(kind).to_lowercase()
    }
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid arm {0:?}, expected one of B, R, Z")]
pub struct ParseArmError(pub String);

impl FromStr for Arm {
    type Err = ParseArmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(Arm::B),
            "R" => Ok(Arm::R),
            "Z" => Ok(Arm::Z),
            _ => Err(ParseArmError(s.to_string())),
        }
    }
}
