use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PbpkError;

/// Number of slots in the state vector
pub const NSTATES: usize = 17;

/// Number of captured concentrations
pub const NCAPTURED: usize = 15;

/// How a compartment takes part in the mass balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompartmentKind {
    /// Gut lumen, tissues and blood pools
    Physiological,
    /// Cumulative amount excreted, a sink for drug mass
    Excretion,
    /// Validation integral; never read by any rate equation
    Observer,
}

/// A slot of the state vector.
///
/// The discriminant is the position of the compartment in the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compartment {
    GutLumen = 0,
    Gut = 1,
    Adipose = 2,
    Brain = 3,
    Heart = 4,
    Bone = 5,
    Kidney = 6,
    Liver = 7,
    Lung = 8,
    Muscle = 9,
    Spleen = 10,
    Rest = 11,
    Arterial = 12,
    Venous = 13,
    Skin = 14,
    Urine = 15,
    Auc = 16,
}

impl Compartment {
    /// All compartments in state-vector order
    pub const ALL: [Compartment; NSTATES] = [
        Compartment::GutLumen,
        Compartment::Gut,
        Compartment::Adipose,
        Compartment::Brain,
        Compartment::Heart,
        Compartment::Bone,
        Compartment::Kidney,
        Compartment::Liver,
        Compartment::Lung,
        Compartment::Muscle,
        Compartment::Spleen,
        Compartment::Rest,
        Compartment::Arterial,
        Compartment::Venous,
        Compartment::Skin,
        Compartment::Urine,
        Compartment::Auc,
    ];

    /// Compartments whose concentration is captured, in output order
    pub const CAPTURED: [Compartment; NCAPTURED] = [
        Compartment::Adipose,
        Compartment::Bone,
        Compartment::Brain,
        Compartment::Heart,
        Compartment::Kidney,
        Compartment::Liver,
        Compartment::Lung,
        Compartment::Muscle,
        Compartment::Spleen,
        Compartment::Rest,
        Compartment::Arterial,
        Compartment::Venous,
        Compartment::GutLumen,
        Compartment::Gut,
        Compartment::Skin,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn kind(self) -> CompartmentKind {
        match self {
            Compartment::Urine => CompartmentKind::Excretion,
            Compartment::Auc => CompartmentKind::Observer,
            _ => CompartmentKind::Physiological,
        }
    }

    /// Whether a dose may be administered into this compartment
    pub fn accepts_dose(self) -> bool {
        self.kind() == CompartmentKind::Physiological
    }

    /// Position of this compartment's concentration in the captured output
    pub fn capture_index(self) -> Option<usize> {
        Self::CAPTURED.iter().position(|&c| c == self)
    }

    /// State name as it appears in model listings
    pub fn name(self) -> &'static str {
        match self {
            Compartment::GutLumen => "GUTLUMEN",
            Compartment::Gut => "GUT",
            Compartment::Adipose => "ADIPOSE",
            Compartment::Brain => "BRAIN",
            Compartment::Heart => "HEART",
            Compartment::Bone => "BONE",
            Compartment::Kidney => "KIDNEY",
            Compartment::Liver => "LIVER",
            Compartment::Lung => "LUNG",
            Compartment::Muscle => "MUSCLE",
            Compartment::Spleen => "SPLEEN",
            Compartment::Rest => "REST",
            Compartment::Arterial => "ART",
            Compartment::Venous => "VEN",
            Compartment::Skin => "SKIN",
            Compartment::Urine => "URINE",
            Compartment::Auc => "AUC",
        }
    }

    /// Name of the captured concentration, e.g. `Cliver`
    pub fn concentration_name(self) -> Option<&'static str> {
        let name = match self {
            Compartment::GutLumen => "CgutLumen",
            Compartment::Gut => "Cgut",
            Compartment::Adipose => "Cadipose",
            Compartment::Brain => "Cbrain",
            Compartment::Heart => "Cheart",
            Compartment::Bone => "Cbone",
            Compartment::Kidney => "Ckidney",
            Compartment::Liver => "Cliver",
            Compartment::Lung => "Clung",
            Compartment::Muscle => "Cmuscle",
            Compartment::Spleen => "Cspleen",
            Compartment::Rest => "Crest",
            Compartment::Arterial => "Carterial",
            Compartment::Venous => "Cvenous",
            Compartment::Skin => "Cskin",
            Compartment::Urine | Compartment::Auc => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Compartment {
    type Err = PbpkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let found = match upper.as_str() {
            "ARTERIAL" => Some(Compartment::Arterial),
            "VENOUS" => Some(Compartment::Venous),
            other => Compartment::ALL.iter().copied().find(|c| c.name() == other),
        };
        found.ok_or_else(|| PbpkError::InvalidCompartment(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_state_order() {
        for (i, c) in Compartment::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Compartment::from_index(i), Some(*c));
        }
        assert_eq!(Compartment::from_index(NSTATES), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Compartment::Auc.kind(), CompartmentKind::Observer);
        assert_eq!(Compartment::Urine.kind(), CompartmentKind::Excretion);
        assert_eq!(Compartment::Liver.kind(), CompartmentKind::Physiological);
        assert!(!Compartment::Auc.accepts_dose());
        assert!(!Compartment::Urine.accepts_dose());
        assert!(Compartment::GutLumen.accepts_dose());
    }

    #[test]
    fn test_captured_compartments() {
        let physiological = Compartment::ALL
            .iter()
            .filter(|c| c.kind() == CompartmentKind::Physiological)
            .count();
        assert_eq!(physiological, NCAPTURED);
        assert_eq!(Compartment::Adipose.capture_index(), Some(0));
        assert_eq!(Compartment::Skin.capture_index(), Some(14));
        assert_eq!(Compartment::Urine.capture_index(), None);
        assert_eq!(Compartment::Gut.concentration_name(), Some("Cgut"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("gutlumen".parse::<Compartment>().unwrap(), Compartment::GutLumen);
        assert_eq!("ART".parse::<Compartment>().unwrap(), Compartment::Arterial);
        assert_eq!("venous".parse::<Compartment>().unwrap(), Compartment::Venous);
        assert!("pancreas".parse::<Compartment>().is_err());
    }
}
