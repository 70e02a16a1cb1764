// Half-open range buckets `(lo, hi]` with labels "{hi}", "{lo+1}-{hi}" or ">{lo}"

#[derive(Debug, Clone, Copy)]
pub struct RangePolicy {
    edges: &'static [f64],
}

pub const UNITS_PER_LINE: RangePolicy = RangePolicy {
    edges: &[0.0, 1.0, 2.0, 5.0, 10.0, f64::INFINITY],
};

pub const LINES_PER_ORDER: RangePolicy = RangePolicy {
    edges: &[0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, f64::INFINITY],
};

pub const UNITS_PER_ORDER: RangePolicy = RangePolicy {
    edges: &[0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0, f64::INFINITY],
};

impl RangePolicy {
    /// Label of the bucket holding `value`; empty when `value` is at or
    /// below the smallest edge.
    pub fn label(&self, value: f64) -> String {
        self.edges
            .windows(2)
            .find(|w| value > w[0] && value <= w[1])
            .map(|w| format_label(w[0], w[1]))
            .unwrap_or_default()
    }
}

fn format_label(lo: f64, hi: f64) -> String {
    if hi.is_infinite() {
        format!(">{}", lo as i64)
    } else if hi == lo + 1.0 {
        format!("{}", hi as i64)
    } else {
        format!("{}-{}", lo as i64 + 1, hi as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(policy: &RangePolicy) -> Vec<String> {
        policy.edges.windows(2).map(|w| format_label(w[0], w[1])).collect()
    }

    #[test]
    fn test_units_per_line_labels() {
        assert_eq!(labels(&UNITS_PER_LINE), vec!["1", "2", "3-5", "6-10", ">10"]);
        assert_eq!(UNITS_PER_LINE.label(1.0), "1");
        assert_eq!(UNITS_PER_LINE.label(3.0), "3-5");
        assert_eq!(UNITS_PER_LINE.label(5.0), "3-5");
        assert_eq!(UNITS_PER_LINE.label(11.0), ">10");
        assert_eq!(UNITS_PER_LINE.label(0.0), "");
        assert_eq!(UNITS_PER_LINE.label(-4.0), "");
    }

    #[test]
    fn test_order_policies() {
        assert_eq!(
            labels(&LINES_PER_ORDER),
            vec!["1", "2", "3-5", "6-10", "11-20", "21-50", ">50"]
        );
        assert_eq!(
            labels(&UNITS_PER_ORDER),
            vec!["1", "2-5", "6-10", "11-20", "21-50", "51-100", ">100"]
        );
        assert_eq!(UNITS_PER_ORDER.label(100.0), "51-100");
        assert_eq!(UNITS_PER_ORDER.label(101.0), ">100");
    }

    #[test]
    fn test_half_open_property() {
        for policy in [UNITS_PER_LINE, LINES_PER_ORDER, UNITS_PER_ORDER] {
            for v in 1..=150 {
                let value = v as f64;
                let label = policy.label(value);
                let (lo, hi) = policy
                    .edges
                    .windows(2)
                    .map(|w| (w[0], w[1]))
                    .find(|(lo, hi)| format_label(*lo, *hi) == label)
                    .unwrap();
                assert!(value > lo && value <= hi);
            }
        }
    }
}
