//! Grid features scored by the move search
//!
//! Column height is `relief + 1`, so an empty column has height 0.

use serde::{Deserialize, Serialize};

use tetris_ai_core::Grid;
use tetris_ai_types::CREVICE_DEPTH;

/// Evaluated grid properties, in weight-file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    MaxHeight,
    AvgHeight,
    HeightVar,
    Discontinuities,
    Gaps,
    Cells,
    Crevices,
}

impl Feature {
    pub const COUNT: usize = 7;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::MaxHeight,
        Feature::AvgHeight,
        Feature::HeightVar,
        Feature::Discontinuities,
        Feature::Gaps,
        Feature::Cells,
        Feature::Crevices,
    ];

    pub fn index(&self) -> usize {
        match self {
            Feature::MaxHeight => 0,
            Feature::AvgHeight => 1,
            Feature::HeightVar => 2,
            Feature::Discontinuities => 3,
            Feature::Gaps => 4,
            Feature::Cells => 5,
            Feature::Crevices => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::MaxHeight => "max_height",
            Feature::AvgHeight => "avg_height",
            Feature::HeightVar => "height_var",
            Feature::Discontinuities => "discontinuities",
            Feature::Gaps => "gaps",
            Feature::Cells => "cells",
            Feature::Crevices => "crevices",
        }
    }
}

/// Feature values of one grid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Features([f64; Feature::COUNT]);

impl Features {
    pub fn from_grid(grid: &Grid) -> Self {
        let reliefs = grid.reliefs();
        let n = grid.width() as f64;

        let mut max = 0;
        let mut sum = 0i64;
        let mut sum_sq = 0i64;
        for h in reliefs.iter().map(|&r| r + 1) {
            max = max.max(h);
            sum += h as i64;
            sum_sq += (h as i64) * (h as i64);
        }
        let avg = sum as f64 / n;
        let var = sum_sq as f64 / n - avg * avg;

        let discontinuities = reliefs.windows(2).filter(|w| w[0] != w[1]).count();

        let crevices = (0..reliefs.len())
            .filter(|&x| {
                let r = reliefs[x];
                let left = x.checked_sub(1).map(|l| reliefs[l]);
                let right = reliefs.get(x + 1).copied();
                [left, right]
                    .into_iter()
                    .all(|n| n.map_or(true, |h| h - r >= CREVICE_DEPTH))
            })
            .count();

        let mut values = [0.0; Feature::COUNT];
        values[Feature::MaxHeight.index()] = max as f64;
        values[Feature::AvgHeight.index()] = avg;
        values[Feature::HeightVar.index()] = var.max(0.0);
        values[Feature::Discontinuities.index()] = discontinuities as f64;
        values[Feature::Gaps.index()] = grid.total_gaps() as f64;
        values[Feature::Cells.index()] = grid.total_cells() as f64;
        values[Feature::Crevices.index()] = crevices as f64;
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_array(&self) -> &[f64; Feature::COUNT] {
        &self.0
    }
}
