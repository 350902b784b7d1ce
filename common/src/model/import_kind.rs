//! The import types offered by the application.
//!
//! Each kind fixes the header set a file must carry, which fields are
//! mandatory and how numeric and text columns are checked. The same catalog
//! drives the frontend dialog, the backend upload route and the downloadable
//! CSV templates, so client and server always agree on what a valid file is.

use crate::import::ImportError;
use crate::model::schema::{FieldCheck, ImportSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PRODUCT_HEADERS: [&str; 7] = [
    "Product Name",
    "Category Name",
    "Variant Name",
    "Price",
    "SKU",
    "Barcode",
    "Department",
];

const STOCK_HEADERS: [&str; 5] = [
    "Stock Name",
    "Stock Variant Name",
    "Starting Quantity",
    "Starting Value",
    "Alert Level",
];

/// SKUs longer than this are accepted but flagged.
pub const SKU_WARNING_LENGTH: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Products,
    Stock,
    ProductsWithStock,
}

impl ImportKind {
    pub const ALL: [ImportKind; 3] = [
        ImportKind::Products,
        ImportKind::Stock,
        ImportKind::ProductsWithStock,
    ];

    /// Path segment used by the import routes.
    pub fn slug(self) -> &'static str {
        match self {
            ImportKind::Products => "products",
            ImportKind::Stock => "stock",
            ImportKind::ProductsWithStock => "products_with_stock",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImportKind::Products => "Products",
            ImportKind::Stock => "Stock",
            ImportKind::ProductsWithStock => "Products with stock",
        }
    }

    pub fn upload_path(self) -> String {
        format!("/api/imports/{}/upload", self.slug())
    }

    pub fn template_path(self) -> String {
        format!("/api/imports/{}/template", self.slug())
    }

    /// Launcher page that announces a finished import of this kind.
    pub fn finished_page(self) -> String {
        format!("/?imported={}", self.slug())
    }

    /// Reads the kind back from the query string of `finished_page`.
    pub fn from_finished_query(query: &str) -> Option<ImportKind> {
        query
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("imported="))
            .and_then(|slug| slug.parse().ok())
    }

    pub fn template_file_name(self) -> String {
        format!("{}_template.csv", self.slug())
    }

    pub fn schema(self) -> ImportSchema {
        match self {
            ImportKind::Products => ImportSchema::new(PRODUCT_HEADERS)
                .require("Product Name")
                .require("Category Name")
                .require("Variant Name")
                .require("Price")
                .rule("Price", FieldCheck::WholePositive)
                .rule("SKU", FieldCheck::MaxLength(SKU_WARNING_LENGTH))
                .rule("Barcode", FieldCheck::DigitsOnly),
            ImportKind::Stock => ImportSchema::new(STOCK_HEADERS)
                .require("Stock Name")
                .require("Stock Variant Name")
                .require("Starting Quantity")
                .require("Starting Value")
                .rule("Starting Quantity", FieldCheck::NonNegativeDecimal)
                .rule("Starting Value", FieldCheck::NonNegativeDecimal)
                .rule("Alert Level", FieldCheck::NonNegativeInteger),
            ImportKind::ProductsWithStock => {
                ImportSchema::new(PRODUCT_HEADERS.into_iter().chain(STOCK_HEADERS))
                    .require("Product Name")
                    .require("Category Name")
                    .require("Variant Name")
                    .require("Price")
                    .require("Stock Name")
                    .require("Stock Variant Name")
                    .require("Starting Quantity")
                    .rule("Product Name", FieldCheck::PlainText)
                    .rule("Variant Name", FieldCheck::PlainText)
                    .rule("Stock Name", FieldCheck::PlainText)
                    .rule("Stock Variant Name", FieldCheck::PlainText)
                    .rule("Price", FieldCheck::DecimalPositive)
                    .rule("Starting Quantity", FieldCheck::NonNegativeDecimal)
                    .rule("Starting Value", FieldCheck::NonNegativeDecimal)
                    .rule("Alert Level", FieldCheck::NonNegativeInteger)
                    .rule("SKU", FieldCheck::MaxLength(SKU_WARNING_LENGTH))
                    .rule("Barcode", FieldCheck::DigitsOnly)
            }
        }
    }

    /// Sample data row shipped in the downloadable template, in header order.
    pub fn example_row(self) -> &'static [&'static str] {
        match self {
            ImportKind::Products => &[
                "Widget",
                "Gadgets",
                "Red",
                "10",
                "WID-RED-001",
                "0123456789012",
                "Hardware",
            ],
            ImportKind::Stock => &["Flour", "Bag 25kg", "40", "1200.50", "5"],
            ImportKind::ProductsWithStock => &[
                "Widget",
                "Gadgets",
                "Red",
                "10.50",
                "WID-RED-001",
                "0123456789012",
                "Hardware",
                "Widget Stock",
                "Red Box",
                "40",
                "420",
                "5",
            ],
        }
    }

    /// Header row followed by the example row, newline-terminated.
    pub fn template_csv(self) -> String {
        let schema = self.schema();
        format!(
            "{}\n{}\n",
            schema.expected_headers().join(","),
            self.example_row().join(",")
        )
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ImportKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImportKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| ImportError::UnknownImportKind(s.to_string()))
    }
}
