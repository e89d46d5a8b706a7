//! Feature weights and the weight-file format
//!
//! A weight file holds one floating-point value per line, in [`Feature`]
//! order. Blank lines are skipped. Files written before the crevices feature
//! existed carry six values; the missing crevices weight reads as zero.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WeightsError;
use crate::features::{Feature, Features};

/// One weight per [`Feature`]; a grid's score is the dot product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights([f64; Feature::COUNT]);

impl Default for Weights {
    /// Hand-tuned baseline
    fn default() -> Self {
        Self([
            -1.0, // max height
            -4.0, // avg height
            -0.5, // height variance
            -0.5, // discontinuities
            -6.0, // gaps
            -1.0, // cells
            -2.0, // crevices
        ])
    }
}

impl Weights {
    pub fn new(values: [f64; Feature::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    pub fn as_array(&self) -> &[f64; Feature::COUNT] {
        &self.0
    }

    /// Weighted sum of the features
    pub fn score(&self, features: &Features) -> f64 {
        self.0
            .iter()
            .zip(features.as_array())
            .map(|(w, f)| w * f)
            .sum()
    }

    /// Parse the weight-file format.
    pub fn parse(text: &str) -> Result<Self, WeightsError> {
        let mut values = Vec::with_capacity(Feature::COUNT);
        for (i, line) in text.lines().enumerate() {
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            let value = token.parse::<f64>().map_err(|_| WeightsError::Parse {
                line: i + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }

        match values.len() {
            n if n == Feature::COUNT || n == Feature::COUNT - 1 => {
                let mut weights = [0.0; Feature::COUNT];
                weights[..n].copy_from_slice(&values);
                Ok(Self(weights))
            }
            found => Err(WeightsError::Count {
                found,
                expected: Feature::COUNT,
            }),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WeightsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let weights = Self::parse(&text)?;
        debug!(path = %path.display(), "loaded weights");
        Ok(weights)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WeightsError> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| WeightsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl FromStr for Weights {
    type Err = WeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in &self.0 {
            writeln!(f, "{}", w)?;
        }
        Ok(())
    }
}
