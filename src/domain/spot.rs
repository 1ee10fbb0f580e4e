//! Parking spot identifiers

use std::str::FromStr;

/// One of the two physical parking spots.
///
/// The set is fixed: spots are never created or destroyed at runtime,
/// and each one is backed by its own calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spot {
    Northern,
    Southern,
}

impl Spot {
    /// All spots, in display order.
    pub const ALL: [Spot; 2] = [Spot::Northern, Spot::Southern];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Northern => "northern",
            Self::Southern => "southern",
        }
    }
}

impl FromStr for Spot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "northern" => Ok(Self::Northern),
            "southern" => Ok(Self::Southern),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Spot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Tests ──────────────────────────────────────────────────────
