// ItemMaster': cubes plus each SKU's overall velocity and outbound totals

use super::derived::ItemMasterRow;
use super::surrogate;
use super::velocity::{Velocity, VelocityAnalysis};
use crate::inputs::Item;

pub(crate) fn item_master_rows(pn: &str, items: &[Item], analysis: &VelocityAnalysis) -> Vec<ItemMasterRow> {
    items
        .iter()
        .map(|item| {
            let (velocity, lines, units) = match analysis.get(&item.sku) {
                Some(s) => (s.velocity, s.lines, s.units),
                None => (Velocity::X, 0, 0),
            };
            ItemMasterRow {
                project_number: pn.to_string(),
                project_number_sku: surrogate(pn, &item.sku),
                each_cube: item.each.cube(),
                inner_cube: item.inner.cube(),
                carton_cube: item.carton.cube(),
                pallet_cube: item.pallet.cube(),
                velocity,
                lines,
                units,
                item: item.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Dimensions;

    #[test]
    fn test_every_sku_kept_and_inactive_is_x() {
        let items = vec![
            Item {
                sku: "A".to_string(),
                each: Dimensions { length: 12.0, width: 12.0, height: 12.0, weight: 1.0 },
                ..Item::default()
            },
            Item {
                sku: "B".to_string(),
                ..Item::default()
            },
        ];
        let analysis = VelocityAnalysis::from_lines(vec![("A", 4), ("A", 2)]);
        let rows = item_master_rows("P1", &items, &analysis);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].project_number_sku, "P1-A");
        assert_eq!(rows[0].each_cube, 1.0);
        assert_eq!(rows[0].velocity, Velocity::E);
        assert_eq!((rows[0].lines, rows[0].units), (2, 6));
        assert_eq!(rows[1].velocity, Velocity::X);
        assert_eq!(rows[1].lines, 0);
    }
}
