//! Canonical stop chains and their bracketed list encoding
//!
//! A chain is written as `[12, 45, 9]`. Reading it back goes through a
//! small explicit grammar:
//!
//! ```text
//! chain := ws '[' ws ( int ( ws ',' ws int )* )? ws ']' ws
//! int   := '-'? digit+
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use thiserror::Error;

use crate::StopId;

/// Chains of all routes, keyed by route name
pub type RouteChains = BTreeMap<String, RouteChain>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseChainError {
    #[error("expected '[' at the start of the list")]
    MissingOpeningBracket,
    #[error("expected ']' at the end of the list")]
    MissingClosingBracket,
    #[error("empty list element at position {0}")]
    EmptyElement(usize),
    #[error("invalid stop id '{0}'")]
    InvalidStopId(String),
}

/// Ordered stop ids visited by one route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteChain(Vec<StopId>);

impl RouteChain {
    pub fn new(stops: Vec<StopId>) -> Self {
        Self(stops)
    }

    /// Builds a chain, dropping immediate repeats
    pub fn collapsed(stops: impl IntoIterator<Item = StopId>) -> Self {
        Self(stops.into_iter().dedup().collect())
    }

    pub fn stops(&self) -> &[StopId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no two adjacent entries are equal
    pub fn is_collapsed(&self) -> bool {
        self.0.iter().tuple_windows().all(|(a, b)| a != b)
    }
}

impl fmt::Display for RouteChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

impl FromStr for RouteChain {
    type Err = ParseChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .trim()
            .strip_prefix('[')
            .ok_or(ParseChainError::MissingOpeningBracket)?
            .strip_suffix(']')
            .ok_or(ParseChainError::MissingClosingBracket)?;

        if body.trim().is_empty() {
            return Ok(Self::default());
        }

        body.split(',')
            .enumerate()
            .map(|(position, element)| parse_stop_id(position, element.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

fn parse_stop_id(position: usize, element: &str) -> Result<StopId, ParseChainError> {
    if element.is_empty() {
        return Err(ParseChainError::EmptyElement(position));
    }

    let digits = element.strip_prefix('-').unwrap_or(element);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseChainError::InvalidStopId(element.to_string()));
    }

    element
        .parse()
        .map_err(|_| ParseChainError::InvalidStopId(element.to_string()))
}
