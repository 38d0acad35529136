//! Fixed choice lists offered by the prediction form.
//!
//! Month and neighborhood labels double as feature-column names in the
//! trained model, so their spelling must match the training data exactly
//! (note `March` but `Jan`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value that is not one of the offered choices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a valid {kind}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    #[serde(rename = "Jan")]
    January,
    #[serde(rename = "Feb")]
    February,
    March,
    April,
    May,
    June,
    July,
    #[serde(rename = "Aug")]
    August,
    #[serde(rename = "Sep")]
    September,
    #[serde(rename = "Oct")]
    October,
    #[serde(rename = "Nov")]
    November,
    #[serde(rename = "Dec")]
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Form label, which is also the one-hot column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::January => "Jan",
            Self::February => "Feb",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "Aug",
            Self::September => "Sep",
            Self::October => "Oct",
            Self::November => "Nov",
            Self::December => "Dec",
        }
    }
}

impl FromStr for Month {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownChoice {
                kind: "month",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Police district the incident is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Neighborhood {
    Bayview,
    Central,
    Ingleside,
    Mission,
    Northern,
    Park,
    Richmond,
    Southern,
    Taraval,
    Tenderloin,
}

impl Neighborhood {
    pub const ALL: [Neighborhood; 10] = [
        Self::Bayview,
        Self::Central,
        Self::Ingleside,
        Self::Mission,
        Self::Northern,
        Self::Park,
        Self::Richmond,
        Self::Southern,
        Self::Taraval,
        Self::Tenderloin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bayview => "BAYVIEW",
            Self::Central => "CENTRAL",
            Self::Ingleside => "INGLESIDE",
            Self::Mission => "MISSION",
            Self::Northern => "NORTHERN",
            Self::Park => "PARK",
            Self::Richmond => "RICHMOND",
            Self::Southern => "SOUTHERN",
            Self::Taraval => "TARAVAL",
            Self::Tenderloin => "TENDERLOIN",
        }
    }
}

impl FromStr for Neighborhood {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| UnknownChoice {
                kind: "neighborhood",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hour of day on the form's 1–24 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Hour(u8);

impl Hour {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 24;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every selectable hour, in order.
    pub fn all() -> impl Iterator<Item = Hour> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl TryFrom<u8> for Hour {
    type Error = UnknownChoice;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| UnknownChoice {
            kind: "hour",
            value: value.to_string(),
        })
    }
}

impl From<Hour> for u8 {
    fn from(hour: Hour) -> u8 {
        hour.0
    }
}

impl FromStr for Hour {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownChoice {
            kind: "hour",
            value: s.to_string(),
        };
        let value: u8 = s.trim().parse().map_err(|_| unknown())?;
        Self::new(value).ok_or_else(unknown)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
