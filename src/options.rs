// ⚙️ Transform options - which files to process and how to date activity

use crate::registry::FileKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which OrderHeader date drives the outbound analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateForAnalysis {
    ReceivedDate,
    PickDate,
    ShipDate,
}

impl DateForAnalysis {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateForAnalysis::ReceivedDate => "ReceivedDate",
            DateForAnalysis::PickDate => "PickDate",
            DateForAnalysis::ShipDate => "ShipDate",
        }
    }
}

impl FromStr for DateForAnalysis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "receiveddate" | "received" => Ok(DateForAnalysis::ReceivedDate),
            "pickdate" | "pick" => Ok(DateForAnalysis::PickDate),
            "shipdate" | "ship" => Ok(DateForAnalysis::ShipDate),
            _ => Err(format!("unknown analysis date: {}", s)),
        }
    }
}

impl fmt::Display for DateForAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy mapping Saturday/Sunday activity onto weekdays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekendDateRule {
    NearestWeekday,
    AllToMonday,
    AllToFriday,
    AsIs,
}

impl WeekendDateRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekendDateRule::NearestWeekday => "NearestWeekday",
            WeekendDateRule::AllToMonday => "AllToMonday",
            WeekendDateRule::AllToFriday => "AllToFriday",
            WeekendDateRule::AsIs => "AsIs",
        }
    }
}

impl FromStr for WeekendDateRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "nearestweekday" | "nearest" => Ok(WeekendDateRule::NearestWeekday),
            "alltomonday" | "monday" => Ok(WeekendDateRule::AllToMonday),
            "alltofriday" | "friday" => Ok(WeekendDateRule::AllToFriday),
            "asis" => Ok(WeekendDateRule::AsIs),
            _ => Err(format!("unknown weekend rule: {}", s)),
        }
    }
}

impl fmt::Display for WeekendDateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    pub date_for_analysis: DateForAnalysis,
    pub weekend_date_rule: WeekendDateRule,
    pub process_inbound: bool,
    pub process_inventory: bool,
    pub process_outbound: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            date_for_analysis: DateForAnalysis::ShipDate,
            weekend_date_rule: WeekendDateRule::AsIs,
            process_inbound: true,
            process_inventory: true,
            process_outbound: true,
        }
    }
}

impl TransformOptions {
    /// Files the options ask for, ItemMaster first
    pub fn active_kinds(&self) -> Vec<FileKind> {
        let mut kinds = vec![FileKind::ItemMaster];
        if self.process_inbound {
            kinds.push(FileKind::InboundHeader);
            kinds.push(FileKind::InboundDetails);
        }
        if self.process_inventory {
            kinds.push(FileKind::Inventory);
        }
        if self.process_outbound {
            kinds.push(FileKind::OrderHeader);
            kinds.push(FileKind::OrderDetails);
        }
        kinds
    }

    pub fn is_active(&self, kind: FileKind) -> bool {
        match kind {
            FileKind::ItemMaster => true,
            FileKind::InboundHeader | FileKind::InboundDetails => self.process_inbound,
            FileKind::Inventory => self.process_inventory,
            FileKind::OrderHeader | FileKind::OrderDetails => self.process_outbound,
        }
    }
}
