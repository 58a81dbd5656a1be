use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sequencing platform, written into the read group `PL` tag
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    Illumina,
    Solid,
    Ls454,
    Helicos,
    IonTorrent,
    PacBio,
    Ont,
    Capillary,
}

impl fmt::Display for Platform {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Illumina => write!(f, "ILLUMINA"),
            Platform::Solid => write!(f, "SOLID"),
            Platform::Ls454 => write!(f, "LS454"),
            Platform::Helicos => write!(f, "HELICOS"),
            Platform::IonTorrent => write!(f, "IONTORRENT"),
            Platform::PacBio => write!(f, "PACBIO"),
            Platform::Ont => write!(f, "ONT"),
            Platform::Capillary => write!(f, "CAPILLARY"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown sequencing platform '{}'", self.0)
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Platform names are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ILLUMINA" => Ok(Platform::Illumina),
            "SOLID" => Ok(Platform::Solid),
            "LS454" => Ok(Platform::Ls454),
            "HELICOS" => Ok(Platform::Helicos),
            "IONTORRENT" => Ok(Platform::IonTorrent),
            "PACBIO" => Ok(Platform::PacBio),
            "ONT" => Ok(Platform::Ont),
            "CAPILLARY" => Ok(Platform::Capillary),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = UnknownPlatform;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}
