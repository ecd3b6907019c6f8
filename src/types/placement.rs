use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A structured basket placement, parsed from the compact `<row><slot>` form
/// used by the callers (e.g. `DX3` is slot 3 of the right-hand row).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Placement {
    pub row: String,
    pub slot: i32,
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits_start = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidInput(format!("malformed placement {:?}", s)))?;
        let (row, slot) = s.split_at(digits_start);
        if row.is_empty() || !row.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::InvalidInput(format!("malformed placement {:?}", s)));
        }
        let slot = slot
            .parse()
            .map_err(|_| Error::InvalidInput(format!("malformed placement {:?}", s)))?;
        Ok(Self {
            row: row.to_string(),
            slot,
        })
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.slot)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_placement() {
        let placement: Placement = "DX3".parse().unwrap();
        assert_eq!(placement.row, "DX");
        assert_eq!(placement.slot, 3);
        assert_eq!(placement.to_string(), "DX3");

        let placement: Placement = "SX12".parse().unwrap();
        assert_eq!(placement.row, "SX");
        assert_eq!(placement.slot, 12);
    }

    #[test]
    fn test_malformed_placements_are_rejected() {
        for raw in &["", "DX", "3", "dx3", "D3X", "DX-3"] {
            assert!(raw.parse::<Placement>().is_err(), "{:?} should not parse", raw);
        }
    }
}
