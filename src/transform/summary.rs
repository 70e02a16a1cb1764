// 📈 Velocity roll-ups
// VelocitySummary, DailyOrderProfileByVelocity, VelocityByMonth,
// ProjectNumberVelocity and VelocityLadder

use super::calendar::month_key;
use super::derived::{
    DailyProfileRow, DailyStat, InventoryRow, OutboundRow, ProjectVelocityRow, VelocityByMonthRow,
    VelocityLadderRow, VelocitySummaryRow,
};
use super::velocity::{Velocity, VelocityAnalysis};
use super::{round2, surrogate};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// VELOCITY SUMMARY
// ============================================================================

#[derive(Default)]
struct ClassTally<'a> {
    active_skus: i64,
    lines: i64,
    units: i64,
    on_hand_skus: HashSet<&'a str>,
    qty_on_hand: i64,
}

/// Outbound activity per class, outer-joined with on-hand inventory per class
pub(crate) fn velocity_summary(
    pn: &str,
    analysis: &VelocityAnalysis,
    inventory: &[InventoryRow],
) -> Vec<VelocitySummaryRow> {
    let mut classes: BTreeMap<Velocity, ClassTally> = BTreeMap::new();

    for sku in &analysis.skus {
        let tally = classes.entry(sku.velocity).or_default();
        tally.active_skus += 1;
        tally.lines += sku.lines;
        tally.units = tally.units.saturating_add(sku.units);
    }
    for row in inventory {
        let tally = classes.entry(row.velocity).or_default();
        tally.on_hand_skus.insert(row.sku.as_str());
        tally.qty_on_hand = tally.qty_on_hand.saturating_add(row.quantity);
    }

    classes
        .into_iter()
        .map(|(velocity, t)| VelocitySummaryRow {
            project_number: pn.to_string(),
            project_number_velocity: surrogate(pn, velocity.as_str()),
            velocity,
            active_skus: t.active_skus,
            lines: t.lines,
            units: t.units,
            on_hand_skus: t.on_hand_skus.len() as i64,
            qty_on_hand: t.qty_on_hand,
        })
        .collect()
}

// ============================================================================
// DAILY ORDER PROFILE
// ============================================================================

#[derive(Default)]
struct DayTally<'a> {
    skus: HashSet<&'a str>,
    orders: HashSet<&'a str>,
    lines: i64,
    units: i64,
}

/// Mean and population standard deviation, rounded
fn daily_stat(values: &[f64]) -> DailyStat {
    if values.is_empty() {
        return DailyStat::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sd = variance.sqrt();
    DailyStat {
        average: round2(mean),
        std_dev: round2(sd),
        plus_one_std_dev: round2(mean + sd),
    }
}

fn stat_of<'a>(by_day: &BTreeMap<NaiveDate, DayTally<'a>>, f: impl Fn(&DayTally<'a>) -> f64) -> DailyStat {
    let values: Vec<f64> = by_day.values().map(f).collect();
    daily_stat(&values)
}

/// Per class, statistics over the days the class had outbound lines
pub(crate) fn daily_profile(
    pn: &str,
    outbound: &[OutboundRow],
    summary: &[VelocitySummaryRow],
) -> Vec<DailyProfileRow> {
    let mut days: BTreeMap<Velocity, BTreeMap<NaiveDate, DayTally>> = BTreeMap::new();
    for row in outbound {
        let day = days.entry(row.velocity).or_default().entry(row.date).or_default();
        day.skus.insert(row.sku.as_str());
        day.orders.insert(row.order_number.as_str());
        day.lines += 1;
        day.units = day.units.saturating_add(row.quantity);
    }

    days.into_iter()
        .map(|(velocity, by_day)| {
            let totals = summary.iter().find(|s| s.velocity == velocity);
            DailyProfileRow {
                project_number: pn.to_string(),
                project_number_velocity: surrogate(pn, velocity.as_str()),
                velocity,
                days: by_day.len() as i64,
                skus: stat_of(&by_day, |d| d.skus.len() as f64),
                orders: stat_of(&by_day, |d| d.orders.len() as f64),
                lines: stat_of(&by_day, |d| d.lines as f64),
                units: stat_of(&by_day, |d| d.units as f64),
                active_skus: totals.map(|s| s.active_skus).unwrap_or(0),
                total_lines: totals.map(|s| s.lines).unwrap_or(0),
                total_units: totals.map(|s| s.units).unwrap_or(0),
            }
        })
        .collect()
}

// ============================================================================
// VELOCITY BY MONTH
// ============================================================================

/// Month-Year labels present in OutboundData, chronological
fn months(outbound: &[OutboundRow]) -> BTreeMap<(i32, u32), &str> {
    outbound
        .iter()
        .map(|r| (month_key(r.date), r.month_year.as_str()))
        .collect()
}

pub(crate) fn month_count(outbound: &[OutboundRow]) -> usize {
    months(outbound).len()
}

/// Every overall-active SKU against every month, classified per month
pub(crate) fn velocity_by_month(
    pn: &str,
    outbound: &[OutboundRow],
    overall: &VelocityAnalysis,
) -> Vec<VelocityByMonthRow> {
    let monthly: Vec<(&str, VelocityAnalysis)> = months(outbound)
        .into_iter()
        .map(|(key, label)| {
            let slice = outbound
                .iter()
                .filter(|r| month_key(r.date) == key)
                .map(|r| (r.sku.as_str(), r.quantity));
            (label, VelocityAnalysis::from_lines(slice))
        })
        .collect();

    let mut rows = Vec::with_capacity(overall.skus.len() * monthly.len());
    for sku in &overall.skus {
        for (label, analysis) in &monthly {
            let (lines, units, month_velocity) = match analysis.get(&sku.sku) {
                Some(m) => (m.lines, m.units, m.velocity),
                None => (0, 0, Velocity::X),
            };
            rows.push(VelocityByMonthRow {
                project_number: pn.to_string(),
                project_number_sku: surrogate(pn, &sku.sku),
                sku: sku.sku.clone(),
                month_year: label.to_string(),
                lines,
                units,
                month_velocity,
                velocity: sku.velocity,
                equals_overall: (month_velocity == sku.velocity) as i64,
            });
        }
    }
    rows
}

// ============================================================================
// PROJECT VELOCITY & LADDER
// ============================================================================

pub(crate) fn project_velocity(pn: &str) -> Vec<ProjectVelocityRow> {
    Velocity::ACTIVE
        .iter()
        .map(|v| ProjectVelocityRow {
            project_number: pn.to_string(),
            project_number_velocity: surrogate(pn, v.as_str()),
            velocity: *v,
        })
        .collect()
}

/// 5% step of the cumulative line share, counted in twentieths
fn ladder_step(running: i64, total: i64) -> i64 {
    (running * 20 + total - 1) / total
}

fn share(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64)
    }
}

pub(crate) fn velocity_ladder(pn: &str, analysis: &VelocityAnalysis) -> Vec<VelocityLadderRow> {
    if analysis.total_lines <= 0 {
        return Vec::new();
    }
    let total_skus = analysis.skus.len() as i64;

    // (first velocity, skus, lines, units) per step
    let mut steps: BTreeMap<i64, (Velocity, i64, i64, i64)> = BTreeMap::new();
    for sku in &analysis.skus {
        let step = ladder_step(sku.lines_running_sum, analysis.total_lines);
        let entry = steps.entry(step).or_insert((sku.velocity, 0, 0, 0));
        entry.1 += 1;
        entry.2 += sku.lines;
        entry.3 = entry.3.saturating_add(sku.units);
    }

    let (mut cum_skus, mut cum_lines, mut cum_units) = (0, 0, 0i64);
    steps
        .into_iter()
        .map(|(step, (velocity, skus, lines, units))| {
            cum_skus += skus;
            cum_lines += lines;
            cum_units = cum_units.saturating_add(units);
            VelocityLadderRow {
                project_number: pn.to_string(),
                project_number_velocity: surrogate(pn, velocity.as_str()),
                pct_lines: round2(step as f64 * 0.05),
                velocity,
                skus,
                lines,
                units,
                cumulative_skus: cum_skus,
                cumulative_lines: cum_lines,
                cumulative_units: cum_units,
                pct_skus: share(cum_skus, total_skus),
                pct_units: share(cum_units, analysis.total_units),
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn outbound(order: &str, sku: &str, quantity: i64, date: NaiveDate, velocity: Velocity) -> OutboundRow {
        OutboundRow {
            project_number: "P1".to_string(),
            project_number_order_number: format!("P1-{}", order),
            project_number_sku: format!("P1-{}", sku),
            project_number_velocity: format!("P1-{}", velocity),
            order_number: order.to_string(),
            sku: sku.to_string(),
            quantity,
            uom: "Each".to_string(),
            business_unit: String::new(),
            ship_container_type: String::new(),
            special_handling_codes: String::new(),
            carrier: String::new(),
            channel: String::new(),
            received_date: date,
            pick_date: date,
            ship_date: date,
            date,
            weekday: String::new(),
            weekday_idx: 1,
            week_number: 1,
            week: date,
            month_year: date.format("%b-%Y").to_string(),
            velocity,
            units_per_line_range: String::new(),
            line_cube: 0.0,
            line_weight: 0.0,
        }
    }

    #[test]
    fn test_daily_stat_population_sd() {
        let stat = daily_stat(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stat.average, 5.0);
        assert_eq!(stat.std_dev, 2.0);
        assert_eq!(stat.plus_one_std_dev, 7.0);
        assert_eq!(daily_stat(&[]), DailyStat::default());
    }

    #[test]
    fn test_velocity_summary_outer_join() {
        let analysis = VelocityAnalysis::from_lines(vec![("A", 2), ("A", 3), ("B", 1)]);
        let inventory = vec![InventoryRow {
            project_number: "P1".to_string(),
            project_number_sku: "P1-C".to_string(),
            project_number_velocity: "P1-X".to_string(),
            period: d(2024, 1, 31),
            sku: "C".to_string(),
            quantity: 7,
            uom: "Each".to_string(),
            location: String::new(),
            lot: String::new(),
            subwarehouse: String::new(),
            velocity: Velocity::X,
            exists_in_outbound: false,
            line_cube: 0.0,
            line_weight: 0.0,
        }];

        let rows = velocity_summary("P1", &analysis, &inventory);
        let classes: Vec<Velocity> = rows.iter().map(|r| r.velocity).collect();
        // A: 2/3 -> B, B: 3/3 -> E
        assert_eq!(classes, vec![Velocity::B, Velocity::E, Velocity::X]);
        assert_eq!((rows[0].active_skus, rows[0].lines, rows[0].units), (1, 2, 5));
        assert_eq!((rows[0].on_hand_skus, rows[0].qty_on_hand), (0, 0));
        assert_eq!((rows[2].active_skus, rows[2].on_hand_skus, rows[2].qty_on_hand), (0, 1, 7));
    }

    #[test]
    fn test_daily_profile_over_active_days() {
        let rows = vec![
            outbound("O1", "A", 2, d(2024, 1, 1), Velocity::A),
            outbound("O1", "B", 4, d(2024, 1, 1), Velocity::A),
            outbound("O2", "A", 6, d(2024, 1, 2), Velocity::A),
        ];
        let summary = vec![VelocitySummaryRow {
            project_number: "P1".to_string(),
            project_number_velocity: "P1-A".to_string(),
            velocity: Velocity::A,
            active_skus: 2,
            lines: 3,
            units: 12,
            on_hand_skus: 0,
            qty_on_hand: 0,
        }];

        let profile = daily_profile("P1", &rows, &summary);
        assert_eq!(profile.len(), 1);
        let a = &profile[0];
        assert_eq!(a.days, 2);
        assert_eq!(a.lines.average, 1.5);
        assert_eq!(a.lines.std_dev, 0.5);
        assert_eq!(a.lines.plus_one_std_dev, 2.0);
        assert_eq!(a.orders.average, 1.0);
        assert_eq!(a.orders.std_dev, 0.0);
        assert_eq!(a.units.average, 6.0);
        assert_eq!((a.active_skus, a.total_lines, a.total_units), (2, 3, 12));
    }

    #[test]
    fn test_velocity_by_month_fills_inactive_months() {
        let rows = vec![
            outbound("O1", "A", 1, d(2024, 2, 1), Velocity::B),
            outbound("O2", "A", 1, d(2024, 1, 5), Velocity::B),
            outbound("O2", "B", 1, d(2024, 1, 5), Velocity::E),
        ];
        let overall = VelocityAnalysis::from_lines(rows.iter().map(|r| (r.sku.as_str(), r.quantity)));
        let by_month = velocity_by_month("P1", &rows, &overall);

        assert_eq!(by_month.len(), 4);
        let labels: Vec<&str> = by_month.iter().map(|r| r.month_year.as_str()).collect();
        assert_eq!(labels, vec!["Jan-2024", "Feb-2024", "Jan-2024", "Feb-2024"]);

        // B has no February lines
        let b_feb = &by_month[3];
        assert_eq!(b_feb.sku, "B");
        assert_eq!(b_feb.month_velocity, Velocity::X);
        assert_eq!((b_feb.lines, b_feb.units), (0, 0));
        assert_eq!(b_feb.equals_overall, 0);

        // A alone in February: 100% -> E, overall B
        assert_eq!(by_month[1].month_velocity, Velocity::E);
        assert_eq!(by_month[1].velocity, Velocity::B);
        assert_eq!(month_count(&rows), 2);
    }

    #[test]
    fn test_project_velocity_domain() {
        let rows = project_velocity("P9");
        let keys: Vec<&str> = rows.iter().map(|r| r.project_number_velocity.as_str()).collect();
        assert_eq!(keys, vec!["P9-A", "P9-B", "P9-C", "P9-D", "P9-E"]);
    }

    #[test]
    fn test_ladder_steps_and_cumulatives() {
        let names: Vec<String> = (0..100).map(|i| format!("S{:03}", i)).collect();
        let analysis = VelocityAnalysis::from_lines(names.iter().map(|s| (s.as_str(), 2)));
        let ladder = velocity_ladder("P1", &analysis);

        assert_eq!(ladder.len(), 20);
        assert_eq!(ladder[0].pct_lines, 0.05);
        assert_eq!(ladder[0].skus, 5);
        assert_eq!(ladder[0].velocity, Velocity::A);
        assert_eq!(ladder[4].pct_lines, 0.25);
        assert_eq!(ladder[5].velocity, Velocity::B);
        assert_eq!(ladder[19].pct_lines, 1.0);
        assert_eq!(ladder[19].cumulative_skus, 100);
        assert_eq!(ladder[19].cumulative_units, 200);
        assert_eq!(ladder[19].pct_units, 1.0);
        assert_eq!(ladder[9].pct_skus, 0.5);

        assert!(velocity_ladder("P1", &VelocityAnalysis::default()).is_empty());
    }
}
