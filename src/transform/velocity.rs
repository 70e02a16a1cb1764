// 🚀 Velocity Analysis - ABC classification by cumulative share of lines
//
// Group outbound lines by SKU, sort by Lines descending (stable: ties keep
// first-appearance order), accumulate, and cut at 25/80/95/99/100 percent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// VELOCITY CLASS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Velocity {
    A,
    B,
    C,
    D,
    E,
    /// Present in ItemMaster but without outbound activity
    X,
}

/// Upper bound (percent of total lines, inclusive) for each active class
const THRESHOLDS: [(i64, Velocity); 5] = [
    (25, Velocity::A),
    (80, Velocity::B),
    (95, Velocity::C),
    (99, Velocity::D),
    (100, Velocity::E),
];

impl Velocity {
    /// The classes an active SKU can receive
    pub const ACTIVE: [Velocity; 5] = [Velocity::A, Velocity::B, Velocity::C, Velocity::D, Velocity::E];

    pub fn as_str(&self) -> &'static str {
        match self {
            Velocity::A => "A",
            Velocity::B => "B",
            Velocity::C => "C",
            Velocity::D => "D",
            Velocity::E => "E",
            Velocity::X => "X",
        }
    }

    /// Class for a running line count; compared in integers so boundary
    /// shares (exactly 25%, 80%, ...) land in the lower class.
    pub fn classify(lines_running_sum: i64, total_lines: i64) -> Velocity {
        if total_lines <= 0 {
            return Velocity::X;
        }
        THRESHOLDS
            .iter()
            .find(|(percent, _)| lines_running_sum * 100 <= percent * total_lines)
            .map(|(_, v)| *v)
            .unwrap_or(Velocity::E)
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ANALYSIS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuVelocity {
    pub sku: String,
    pub lines: i64,
    pub units: i64,
    pub lines_running_sum: i64,
    pub percent: f64,
    pub velocity: Velocity,
}

#[derive(Debug, Clone, Default)]
pub struct VelocityAnalysis {
    /// Sorted by Lines descending
    pub skus: Vec<SkuVelocity>,
    pub total_lines: i64,
    pub total_units: i64,
    index: HashMap<String, usize>,
}

impl VelocityAnalysis {
    /// Run the analysis over `(sku, quantity)` outbound lines
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = (&'a str, i64)>) -> VelocityAnalysis {
        let mut grouped: Vec<SkuVelocity> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();

        for (sku, quantity) in lines {
            let pos = *positions.entry(sku).or_insert_with(|| {
                grouped.push(SkuVelocity {
                    sku: sku.to_string(),
                    lines: 0,
                    units: 0,
                    lines_running_sum: 0,
                    percent: 0.0,
                    velocity: Velocity::X,
                });
                grouped.len() - 1
            });
            grouped[pos].lines += 1;
            grouped[pos].units = grouped[pos].units.saturating_add(quantity);
        }

        // sort_by is stable: ties keep first-appearance order
        grouped.sort_by(|a, b| b.lines.cmp(&a.lines));

        let total_lines: i64 = grouped.iter().map(|s| s.lines).sum();
        let total_units = grouped.iter().fold(0i64, |acc, s| acc.saturating_add(s.units));

        let mut running = 0;
        for sku in grouped.iter_mut() {
            running += sku.lines;
            sku.lines_running_sum = running;
            sku.percent = running as f64 / total_lines as f64;
            sku.velocity = Velocity::classify(running, total_lines);
        }

        let index = grouped
            .iter()
            .enumerate()
            .map(|(i, s)| (s.sku.clone(), i))
            .collect();

        VelocityAnalysis {
            skus: grouped,
            total_lines,
            total_units,
            index,
        }
    }

    pub fn get(&self, sku: &str) -> Option<&SkuVelocity> {
        self.index.get(sku).map(|&i| &self.skus[i])
    }

    /// Class of a SKU; X when it had no outbound lines
    pub fn velocity_of(&self, sku: &str) -> Velocity {
        self.get(sku).map(|s| s.velocity).unwrap_or(Velocity::X)
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
