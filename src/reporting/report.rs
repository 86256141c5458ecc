use serde::{Deserialize, Serialize};

// ============================================================================
// Dashboard Report - Output of the Reporting Engine
// ============================================================================
//
// Every metric is independently nullable: `None` means "no data" for that
// metric only. The low-stock report additionally distinguishes "no data"
// from "nothing below reorder level".
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub counts: Counts,
    pub stock_overview: Option<Vec<StockLevel>>,
    pub order_status_distribution: Option<Vec<FrequencyEntry>>,
    pub low_stock: LowStockReport,
    pub orders_per_product: Option<Vec<FrequencyEntry>>,
    pub products_per_category: Option<Vec<FrequencyEntry>>,
    pub vendor_scores: Option<Vec<VendorScore>>,
    pub monthly_order_volume: Option<Vec<MonthlyVolume>>,
    pub average_quantity_per_vendor: Option<Vec<VendorAverageQuantity>>,
    pub vendor_product_heatmap: Option<Heatmap>,
    pub skipped: SkippedRecords,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub products: usize,
    pub vendors: usize,
    pub orders: usize,
}

/// Record quality of one snapshot. `products`, `vendors` and `orders` count
/// records left out because their key was missing; `incomplete_*` count
/// records kept with one or more fields blanked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecords {
    pub products: usize,
    pub vendors: usize,
    pub orders: usize,
    pub incomplete_products: usize,
    pub incomplete_vendors: usize,
    pub incomplete_orders: usize,
    /// Orders kept everywhere except the month-bucketed volume
    pub undated_orders: usize,
}

impl SkippedRecords {
    pub fn total_invalid(&self) -> usize {
        self.products + self.vendors + self.orders
    }

    pub fn total_incomplete(&self) -> usize {
        self.incomplete_products + self.incomplete_vendors + self.incomplete_orders
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: String,
    pub stock: u64,
}

/// One bucket of a group-by count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub product_id: String,
    pub name: Option<String>,
    pub stock: u64,
    pub reorder_level: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "products", rename_all = "snake_case")]
pub enum LowStockReport {
    NoData,
    NoneBelowReorder,
    Products(Vec<LowStockItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorScore {
    pub vendor_id: String,
    pub label: String,
    pub order_count: u64,
    pub product_count: u64,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyVolume {
    /// `YYYY-MM`
    pub month: String,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorAverageQuantity {
    pub vendor_id: String,
    pub average_quantity: f64,
}

/// Dense vendor × product order counts; both axes sorted ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heatmap {
    pub vendor_ids: Vec<String>,
    pub product_ids: Vec<String>,
    /// `counts[v][p]` for `vendor_ids[v]` and `product_ids[p]`
    pub counts: Vec<Vec<u64>>,
}

impl Heatmap {
    pub fn cell(&self, vendor_id: &str, product_id: &str) -> u64 {
        let v = self.vendor_ids.iter().position(|id| id == vendor_id);
        let p = self.product_ids.iter().position(|id| id == product_id);
        match (v, p) {
            (Some(v), Some(p)) => self.counts[v][p],
            _ => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}
