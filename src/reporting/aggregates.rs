use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::vendor::Vendor;
use super::report::*;
use super::snapshot::Snapshot;

// ============================================================================
// Dashboard Aggregates
// ============================================================================
//
// Pure functions of a snapshot. Each metric degrades to `None` on its own
// when its inputs are empty; no metric can fail the report. A record with a
// blank field is left out only of the metrics that need that field.
//
// ============================================================================

pub fn compute(snapshot: &Snapshot) -> DashboardReport {
    let products = &snapshot.products;
    let vendors = &snapshot.vendors;
    let orders = &snapshot.orders;

    DashboardReport {
        counts: Counts {
            products: products.len(),
            vendors: vendors.len(),
            orders: orders.len(),
        },
        stock_overview: stock_overview(products),
        order_status_distribution: order_status_distribution(orders),
        low_stock: low_stock(products),
        orders_per_product: orders_per_product(orders),
        products_per_category: products_per_category(products),
        vendor_scores: vendor_scores(vendors, orders),
        monthly_order_volume: monthly_order_volume(orders),
        average_quantity_per_vendor: average_quantity_per_vendor(orders),
        vendor_product_heatmap: vendor_product_heatmap(orders),
        skipped: snapshot.skipped,
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Group-by count, most frequent first; ties keep first-seen order
pub fn frequency_count<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<FrequencyEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(key, entries.len());
                entries.push(FrequencyEntry {
                    key: key.to_string(),
                    count: 1,
                });
            }
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Products without a usable stock figure are left out
pub fn stock_overview(products: &[Product]) -> Option<Vec<StockLevel>> {
    non_empty(
        products
            .iter()
            .filter_map(|p| {
                Some(StockLevel {
                    product_id: p.product_id.clone(),
                    stock: p.stock?,
                })
            })
            .collect(),
    )
}

/// Orders without a status are not counted; unknown statuses keep their literal value
pub fn order_status_distribution(orders: &[Order]) -> Option<Vec<FrequencyEntry>> {
    non_empty(frequency_count(
        orders.iter().filter_map(|o| o.status.as_ref()).map(|s| s.as_str()),
    ))
}

/// Only products with both stock and reorder level can be evaluated;
/// `NoData` when there are none
pub fn low_stock(products: &[Product]) -> LowStockReport {
    let evaluated: Vec<(&Product, u64, u64)> = products
        .iter()
        .filter_map(|p| Some((p, p.stock?, p.reorder_level?)))
        .collect();
    if evaluated.is_empty() {
        return LowStockReport::NoData;
    }

    let items: Vec<LowStockItem> = evaluated
        .into_iter()
        .filter(|(_, stock, reorder_level)| stock <= reorder_level)
        .map(|(p, stock, reorder_level)| LowStockItem {
            product_id: p.product_id.clone(),
            name: p.name.clone(),
            stock,
            reorder_level,
        })
        .collect();

    if items.is_empty() {
        LowStockReport::NoneBelowReorder
    } else {
        LowStockReport::Products(items)
    }
}

/// Counts every order with a ProductID, including those pointing at
/// products that no longer exist
pub fn orders_per_product(orders: &[Order]) -> Option<Vec<FrequencyEntry>> {
    non_empty(frequency_count(orders.iter().filter_map(|o| o.product_id.as_deref())))
}

pub fn products_per_category(products: &[Product]) -> Option<Vec<FrequencyEntry>> {
    non_empty(frequency_count(
        products.iter().filter_map(|p| p.category.as_deref()),
    ))
}

/// Left join of vendors with their order counts, ranked by
/// `order_count × product_count`. Orders to unknown vendors fall out.
pub fn vendor_scores(vendors: &[Vendor], orders: &[Order]) -> Option<Vec<VendorScore>> {
    let mut orders_by_vendor: HashMap<&str, u64> = HashMap::new();
    for vendor_id in orders.iter().filter_map(|o| o.vendor_id.as_deref()) {
        *orders_by_vendor.entry(vendor_id).or_default() += 1;
    }

    let mut scores: Vec<VendorScore> = vendors
        .iter()
        .map(|v| {
            let order_count = orders_by_vendor.get(v.vendor_id.as_str()).copied().unwrap_or(0);
            let product_count = v.product_count() as u64;
            VendorScore {
                vendor_id: v.vendor_id.clone(),
                label: v.label(),
                order_count,
                product_count,
                score: order_count.saturating_mul(product_count),
            }
        })
        .collect();

    // Stable: equal scores keep snapshot order
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    non_empty(scores)
}

/// Orders per calendar month, oldest first; undated orders are left out
pub fn monthly_order_volume(orders: &[Order]) -> Option<Vec<MonthlyVolume>> {
    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for date in orders.iter().filter_map(|o| o.order_date) {
        *months.entry((date.year(), date.month())).or_default() += 1;
    }

    non_empty(
        months
            .into_iter()
            .map(|((year, month), order_count)| MonthlyVolume {
                month: format!("{:04}-{:02}", year, month),
                order_count,
            })
            .collect(),
    )
}

/// Mean quantity per vendor over all orders with a vendor and a quantity,
/// dated or not
pub fn average_quantity_per_vendor(orders: &[Order]) -> Option<Vec<VendorAverageQuantity>> {
    // A u128 holds the sum of up to 2^64 u64 quantities
    let mut totals: BTreeMap<&str, (u128, u64)> = BTreeMap::new();
    for order in orders {
        let (Some(vendor_id), Some(quantity)) = (order.vendor_id.as_deref(), order.quantity) else {
            continue;
        };
        let (sum, count) = totals.entry(vendor_id).or_default();
        *sum += u128::from(quantity);
        *count += 1;
    }

    non_empty(
        totals
            .into_iter()
            .map(|(vendor_id, (sum, count))| VendorAverageQuantity {
                vendor_id: vendor_id.to_string(),
                average_quantity: sum as f64 / count as f64,
            })
            .collect(),
    )
}

/// Orders missing either reference are left out
pub fn vendor_product_heatmap(orders: &[Order]) -> Option<Heatmap> {
    let pairs: Vec<(&str, &str)> = orders
        .iter()
        .filter_map(|o| Some((o.vendor_id.as_deref()?, o.product_id.as_deref()?)))
        .collect();
    if pairs.is_empty() {
        return None;
    }

    let vendor_ids: Vec<String> = pairs
        .iter()
        .map(|(v, _)| *v)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let product_ids: Vec<String> = pairs
        .iter()
        .map(|(_, p)| *p)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let vendor_index: HashMap<&str, usize> =
        vendor_ids.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
    let product_index: HashMap<&str, usize> =
        product_ids.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();

    let mut counts = vec![vec![0u64; product_ids.len()]; vendor_ids.len()];
    for (vendor_id, product_id) in pairs {
        counts[vendor_index[vendor_id]][product_index[product_id]] += 1;
    }

    Some(Heatmap {
        vendor_ids,
        product_ids,
        counts,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use chrono::NaiveDate;
    use serde_json::json;

    fn product(id: &str, category: Option<&str>, stock: u64, reorder_level: u64) -> Product {
        Product {
            product_id: id.to_string(),
            name: Some(format!("Product {}", id)),
            category: category.map(str::to_string),
            stock: Some(stock),
            price: Some(1.0),
            reorder_level: Some(reorder_level),
        }
    }

    fn vendor(id: &str, supplied: &[&str]) -> Vendor {
        Vendor {
            vendor_id: id.to_string(),
            name: Some(format!("Vendor {}", id)),
            contact_info: None,
            product_supplied: supplied.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn order(id: &str, vendor_id: &str, product_id: &str, quantity: u64, date: Option<&str>) -> Order {
        Order {
            order_id: id.to_string(),
            product_id: Some(product_id.to_string()),
            vendor_id: Some(vendor_id.to_string()),
            quantity: Some(quantity),
            order_date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            status: Some(OrderStatus::Pending),
        }
    }

    fn snapshot(products: Vec<Product>, vendors: Vec<Vendor>, orders: Vec<Order>) -> Snapshot {
        Snapshot {
            products,
            vendors,
            orders,
            skipped: SkippedRecords::default(),
        }
    }

    #[test]
    fn test_single_low_stock_product_without_orders() {
        let report = compute(&snapshot(vec![product("P1", None, 5, 10)], vec![], vec![]));

        assert_eq!(report.counts, Counts { products: 1, vendors: 0, orders: 0 });
        match &report.low_stock {
            LowStockReport::Products(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].product_id, "P1");
                assert_eq!(items[0].stock, 5);
                assert_eq!(items[0].reorder_level, 10);
            }
            other => panic!("expected low stock products, got {:?}", other),
        }
        assert!(report.order_status_distribution.is_none());
        assert!(report.vendor_scores.is_none());
        assert!(report.monthly_order_volume.is_none());
        assert!(report.vendor_product_heatmap.is_none());
    }

    #[test]
    fn test_low_stock_partitions_products() {
        let products = vec![
            product("P1", None, 0, 0),
            product("P2", None, 11, 10),
            product("P3", None, 10, 10),
            product("P4", None, 3, 1),
        ];

        let LowStockReport::Products(items) = low_stock(&products) else {
            panic!("expected products below reorder level");
        };
        let members: Vec<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(members, vec!["P1", "P3"]);

        for p in &products {
            assert_eq!(Some(members.contains(&p.product_id.as_str())), p.needs_reorder());
        }
    }

    #[test]
    fn test_low_stock_none_versus_no_data() {
        assert_eq!(low_stock(&[]), LowStockReport::NoData);
        assert_eq!(low_stock(&[product("P1", None, 50, 10)]), LowStockReport::NoneBelowReorder);
    }

    #[test]
    fn test_stock_overview_keeps_snapshot_order() {
        let overview = stock_overview(&[product("P9", None, 1, 0), product("P1", None, 2, 0)]).unwrap();
        assert_eq!(overview[0].product_id, "P9");
        assert_eq!(overview[1].stock, 2);
    }

    #[test]
    fn test_monthly_volume_drops_only_bad_dates() {
        let orders = vec![
            order("O1", "V1", "P1", 3, Some("2024-01-05")),
            order("O2", "V1", "P2", 5, None),
        ];

        let monthly = monthly_order_volume(&orders).unwrap();
        assert_eq!(
            monthly,
            vec![MonthlyVolume { month: "2024-01".to_string(), order_count: 1 }]
        );

        // Average quantity is date independent
        let averages = average_quantity_per_vendor(&orders).unwrap();
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].vendor_id, "V1");
        assert_eq!(averages[0].average_quantity, 4.0);

        let heatmap = vendor_product_heatmap(&orders).unwrap();
        assert_eq!(heatmap.total(), 2);
    }

    #[test]
    fn test_monthly_volume_is_chronological() {
        let orders = vec![
            order("O1", "V1", "P1", 1, Some("2024-03-02")),
            order("O2", "V1", "P1", 1, Some("2023-12-31")),
            order("O3", "V1", "P1", 1, Some("2024-03-30")),
            order("O4", "V1", "P1", 1, Some("2024-01-15")),
        ];

        let monthly = monthly_order_volume(&orders).unwrap();
        let months: Vec<&str> = monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(monthly.iter().map(|m| m.order_count).sum::<u64>(), 4);
    }

    #[test]
    fn test_monthly_volume_all_undated_is_no_data() {
        assert!(monthly_order_volume(&[order("O1", "V1", "P1", 1, None)]).is_none());
    }

    #[test]
    fn test_vendor_scores_left_join_and_ranking() {
        let vendors = vec![
            vendor("V1", &["P1"]),
            vendor("V2", &["P1", "P2"]),
            vendor("V3", &[]),
            vendor("V4", &["P1", "P2", "P3"]),
        ];
        let orders = vec![
            order("O1", "V1", "P1", 1, None),
            order("O2", "V2", "P1", 1, None),
            order("O3", "V2", "P2", 1, None),
            order("O4", "V9", "P1", 1, None),
        ];

        let scores = vendor_scores(&vendors, &orders).unwrap();
        assert_eq!(scores.len(), vendors.len());

        let ranked: Vec<(&str, u64)> = scores.iter().map(|s| (s.vendor_id.as_str(), s.score)).collect();
        assert_eq!(ranked, vec![("V2", 4), ("V1", 1), ("V3", 0), ("V4", 0)]);

        // Orders to V9 match no vendor
        assert_eq!(scores.iter().map(|s| s.order_count).sum::<u64>(), 3);
        assert_eq!(scores[0].label, "Vendor V2 (V2)");
    }

    #[test]
    fn test_vendor_scores_without_orders() {
        let scores = vendor_scores(&[vendor("V1", &["P1"]), vendor("V2", &["P2"])], &[]).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.order_count == 0 && s.score == 0));
        assert_eq!(scores[0].vendor_id, "V1");
    }

    #[test]
    fn test_status_distribution_counts_literals() {
        let mut orders = vec![
            order("O1", "V1", "P1", 1, None),
            order("O2", "V1", "P1", 1, None),
            order("O3", "V1", "P1", 1, None),
            order("O4", "V1", "P1", 1, None),
        ];
        orders[0].status = Some(OrderStatus::Completed);
        orders[2].status = Some(OrderStatus::Other("Shipped".to_string()));
        orders[3].status = None;

        let distribution = order_status_distribution(&orders).unwrap();
        assert_eq!(
            distribution,
            vec![
                FrequencyEntry { key: "Completed".to_string(), count: 1 },
                FrequencyEntry { key: "Pending".to_string(), count: 1 },
                FrequencyEntry { key: "Shipped".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_orders_per_product_counts_dangling_references() {
        let orders = vec![
            order("O1", "V1", "P404", 1, None),
            order("O2", "V1", "P1", 1, None),
            order("O3", "V1", "P404", 1, None),
        ];
        let counts = orders_per_product(&orders).unwrap();
        assert_eq!(counts[0], FrequencyEntry { key: "P404".to_string(), count: 2 });
        assert_eq!(counts[1], FrequencyEntry { key: "P1".to_string(), count: 1 });
    }

    #[test]
    fn test_products_per_category_skips_uncategorized() {
        let products = vec![
            product("P1", Some("Tools"), 1, 0),
            product("P2", None, 1, 0),
            product("P3", Some("Tools"), 1, 0),
            product("P4", Some("Food"), 1, 0),
        ];
        let categories = products_per_category(&products).unwrap();
        assert_eq!(categories[0], FrequencyEntry { key: "Tools".to_string(), count: 2 });
        assert_eq!(categories[1], FrequencyEntry { key: "Food".to_string(), count: 1 });

        assert!(products_per_category(&[product("P1", None, 1, 0)]).is_none());
    }

    #[test]
    fn test_heatmap_is_dense_and_complete() {
        let orders = vec![
            order("O1", "V2", "P1", 1, None),
            order("O2", "V1", "P2", 1, None),
            order("O3", "V1", "P2", 1, None),
            order("O4", "V1", "P1", 1, Some("2024-05-01")),
        ];

        let heatmap = vendor_product_heatmap(&orders).unwrap();
        assert_eq!(heatmap.vendor_ids, vec!["V1", "V2"]);
        assert_eq!(heatmap.product_ids, vec!["P1", "P2"]);
        assert_eq!(heatmap.counts, vec![vec![1, 2], vec![1, 0]]);
        assert_eq!(heatmap.cell("V2", "P2"), 0);
        assert_eq!(heatmap.cell("V9", "P1"), 0);
        assert_eq!(heatmap.total(), orders.len() as u64);
    }

    #[test]
    fn test_average_quantity_survives_huge_quantities() {
        let orders = vec![
            order("O1", "V1", "P1", u64::MAX, None),
            order("O2", "V1", "P1", u64::MAX, None),
            order("O3", "V2", "P1", 4, None),
        ];

        let averages = average_quantity_per_vendor(&orders).unwrap();
        assert_eq!(averages[0].vendor_id, "V1");
        assert_eq!(averages[0].average_quantity, u64::MAX as f64);
        assert_eq!(averages[1].average_quantity, 4.0);
    }

    #[test]
    fn test_blank_fields_leave_only_their_metrics() {
        let mut products = vec![product("P1", None, 2, 5), product("P2", None, 9, 5)];
        products[1].stock = None;
        products[0].name = None;

        let overview = stock_overview(&products).unwrap();
        assert_eq!(overview.len(), 1);
        let LowStockReport::Products(items) = low_stock(&products) else {
            panic!("expected P1 below reorder level");
        };
        assert_eq!(items[0].name, None);

        products[0].reorder_level = None;
        assert_eq!(low_stock(&products), LowStockReport::NoData);

        let mut orders = vec![order("O1", "V1", "P1", 3, None), order("O2", "V1", "P2", 1, None)];
        orders[0].quantity = None;
        orders[1].vendor_id = None;

        assert!(average_quantity_per_vendor(&orders).is_none());
        assert_eq!(orders_per_product(&orders).unwrap().len(), 2);
        assert_eq!(vendor_product_heatmap(&orders).unwrap().total(), 1);

        let scores = vendor_scores(&[vendor("V1", &["P1"])], &orders).unwrap();
        assert_eq!(scores[0].order_count, 1);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let s = snapshot(
            vec![product("P1", Some("Tools"), 5, 10), product("P2", None, 50, 10)],
            vec![vendor("V1", &["P1"]), vendor("V2", &["P1", "P2"])],
            vec![
                order("O1", "V1", "P1", 3, Some("2024-01-05")),
                order("O2", "V2", "P2", 7, Some("2024-02-10")),
                order("O3", "V2", "P1", 1, None),
            ],
        );

        assert_eq!(compute(&s), compute(&s));
    }

    // ------------------------------------------------------------------------
    // From raw documents
    // ------------------------------------------------------------------------

    fn raw(value: serde_json::Value) -> crate::store::Document {
        value.as_object().cloned().unwrap()
    }

    fn raw_snapshot(
        products: Vec<serde_json::Value>,
        vendors: Vec<serde_json::Value>,
        orders: Vec<serde_json::Value>,
    ) -> Snapshot {
        let products: Vec<_> = products.into_iter().map(raw).collect();
        let vendors: Vec<_> = vendors.into_iter().map(raw).collect();
        let orders: Vec<_> = orders.into_iter().map(raw).collect();
        Snapshot::from_documents(&products, &vendors, &orders)
    }

    #[test]
    fn test_heatmap_counts_every_raw_order() {
        let orders = vec![
            json!({"OrderID": "O1", "ProductID": "P1", "VendorID": "V1", "Quantity": 2, "OrderDate": "2024-01-05"}),
            json!({"OrderID": "O2", "ProductID": "P1", "VendorID": "V1", "Quantity": "lots"}),
            json!({"OrderID": "O3", "ProductID": "P2", "VendorID": "V2", "OrderDate": "bad-date"}),
            json!({"OrderID": "O4", "ProductID": "P2", "VendorID": "V1", "Quantity": 1e20, "Status": "Shipped"}),
        ];
        let raw_count = orders.len() as u64;

        let report = compute(&raw_snapshot(vec![], vec![], orders));
        assert_eq!(report.vendor_product_heatmap.unwrap().total(), raw_count);
        assert_eq!(report.counts.orders as u64, raw_count);
        assert_eq!(report.skipped.incomplete_orders, 3);
    }

    #[test]
    fn test_every_raw_vendor_is_scored() {
        let vendors = vec![
            json!({"VendorID": "V1", "Name": "Acme", "ProductSupplied": ["P1"]}),
            json!({"VendorID": "V2", "ProductSupplied": "P2"}),
            json!({"VendorID": "V3", "Name": null}),
        ];
        let raw_count = vendors.len();
        let orders = vec![json!({"OrderID": "O1", "ProductID": "P2", "VendorID": "V2", "Quantity": 1})];

        let report = compute(&raw_snapshot(vec![], vendors, orders));
        let scores = report.vendor_scores.unwrap();
        assert_eq!(scores.len(), raw_count);
        assert_eq!(scores[0].vendor_id, "V2");
        assert_eq!(scores[0].label, "V2");
        assert_eq!(scores[0].score, 1);
    }

    #[test]
    fn test_bad_price_stays_in_low_stock() {
        let products = vec![
            json!({"ProductID": "P1", "Name": "Widget", "Stock": 2, "Price": "n/a", "ReorderLevel": 5}),
            json!({"ProductID": "P2", "Name": "Gadget", "Stock": 50, "Price": 3.5, "ReorderLevel": 5}),
        ];

        let report = compute(&raw_snapshot(products, vec![], vec![]));
        let LowStockReport::Products(items) = report.low_stock else {
            panic!("expected P1 below reorder level");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "P1");
        assert_eq!(report.skipped.incomplete_products, 1);
    }

    #[test]
    fn test_order_without_quantity_counts_per_product() {
        let orders = vec![
            json!({"OrderID": "O1", "ProductID": "P1", "VendorID": "V1"}),
            json!({"OrderID": "O2", "ProductID": "P1", "VendorID": "V1", "Quantity": 4}),
        ];

        let report = compute(&raw_snapshot(vec![], vec![], orders));
        assert_eq!(
            report.orders_per_product.unwrap(),
            vec![FrequencyEntry { key: "P1".to_string(), count: 2 }]
        );
        let averages = report.average_quantity_per_vendor.unwrap();
        assert_eq!(averages[0].average_quantity, 4.0);
    }
}
