//! CSV loader for shipment data
//!
//! Headers are matched case-insensitively after trimming, with `_` treated as
//! a space, so `order_id` and `Order ID` name the same column.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{LoadError, ValidationError};
use crate::models::{CsvRecord, Dataset, Shipment, UNASSIGNED};

pub const COL_ORDER_ID: &str = "Order ID";
pub const COL_PRODUCT: &str = "Product";
pub const COL_SUPPLIER: &str = "Supplier";
pub const COL_WAREHOUSE: &str = "Warehouse Location";
pub const COL_PARTNER: &str = "Logistics Partner";
pub const COL_METHOD: &str = "Shipping Method";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_UNIT_PRICE: &str = "Unit Price";
pub const COL_TOTAL_COST: &str = "Total Cost";
pub const COL_PROMISED: &str = "Promised Date";
pub const COL_ACTUAL: &str = "Actual Delivery Date";
pub const COL_STATUS: &str = "Delivery Status";

pub const REQUIRED_COLUMNS: [&str; 11] = [
    COL_ORDER_ID,
    COL_PRODUCT,
    COL_SUPPLIER,
    COL_WAREHOUSE,
    COL_PARTNER,
    COL_METHOD,
    COL_QUANTITY,
    COL_UNIT_PRICE,
    COL_PROMISED,
    COL_ACTUAL,
    COL_STATUS,
];

fn normalize_header(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Header name to column index
struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, ValidationError> {
        let mut indices: HashMap<String, usize> = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(previous) = indices.insert(normalize_header(header), i) {
                return Err(ValidationError::DuplicateColumn {
                    first: headers.get(previous).unwrap_or_default().to_string(),
                    second: header.to_string(),
                });
            }
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !indices.contains_key(&normalize_header(col)))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingColumns(missing));
        }

        Ok(Self { indices })
    }

    fn index(&self, column: &str) -> Option<usize> {
        self.indices.get(&normalize_header(column)).copied()
    }

    fn field(&self, record: &StringRecord, column: &str) -> String {
        self.index(column)
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string()
    }

    fn extract(&self, record: &StringRecord, line: u64) -> CsvRecord {
        CsvRecord {
            line,
            order_id: self.field(record, COL_ORDER_ID),
            product: self.field(record, COL_PRODUCT),
            supplier: self.field(record, COL_SUPPLIER),
            warehouse: self.field(record, COL_WAREHOUSE),
            logistics_partner: self.field(record, COL_PARTNER),
            shipping_method: self.field(record, COL_METHOD),
            quantity: self.field(record, COL_QUANTITY),
            unit_price: self.field(record, COL_UNIT_PRICE),
            total_cost: self
                .index(COL_TOTAL_COST)
                .map(|_| self.field(record, COL_TOTAL_COST)),
            promised_date: self.field(record, COL_PROMISED),
            actual_date: self.field(record, COL_ACTUAL),
            status: self.field(record, COL_STATUS),
        }
    }
}

/// Load and validate the shipment file at `path`
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })?;

    let shipments = read_shipments(file)?;
    let dataset = Dataset::new(path, shipments);

    let unassigned = dataset.unassigned_count();
    if unassigned > 0 {
        warn!(
            "{} shipments have empty dimension values, grouped under {}",
            unassigned, UNASSIGNED
        );
    }
    info!("Loaded {} shipments from {:?}", dataset.len(), path);

    Ok(dataset)
}

/// Undecodable bytes are a problem with one row, not with the file
fn row_error(err: csv::Error, headers: &StringRecord) -> LoadError {
    if let csv::ErrorKind::Utf8 { pos, err: utf8 } = err.kind() {
        let field = utf8.field();
        return ValidationError::InvalidField {
            line: pos.as_ref().map(|p| p.line()).unwrap_or(1),
            column: headers
                .get(field)
                .map(str::to_string)
                .unwrap_or_else(|| format!("field {}", field + 1)),
            value: "\u{fffd}".to_string(),
            reason: "not valid UTF-8".to_string(),
        }
        .into();
    }
    LoadError::Csv(err)
}

/// Parse shipments from any CSV source; fails on the first invalid row
pub fn read_shipments<R: Read>(source: R) -> Result<Vec<Shipment>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| row_error(e, &StringRecord::new()))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut shipments = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| row_error(e, &headers))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let shipment = columns.extract(&record, line).to_shipment()?;

        if !seen.insert(shipment.order_id.clone()) {
            return Err(ValidationError::DuplicateOrderId {
                line,
                order_id: shipment.order_id,
            }
            .into());
        }
        shipments.push(shipment);
    }

    Ok(shipments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order ID,Product,Supplier,Warehouse Location,Logistics Partner,Shipping Method,Quantity,Unit Price,Total Cost,Promised Date,Actual Delivery Date,Delivery Status\n";

    #[test]
    fn reads_rows_and_skips_blank_lines() {
        let csv = format!(
            "{HEADER}A1,Widget,Acme,Dallas,FedEx,Air,5,10.0,50.0,2024-01-05,2024-01-04,Delivered\n,,,,,,,,,,,\nA2,Gadget,Beta,Austin,UPS,Sea,2,7.5,15,2024-01-07,,Pending\n"
        );
        let shipments = read_shipments(csv.as_bytes()).unwrap();
        assert_eq!(shipments.len(), 2);
        assert_eq!(shipments[1].actual_date, None);
        assert!(!shipments[0].delayed);
    }

    #[test]
    fn header_matching_ignores_case_and_underscores() {
        let csv = "order_id,PRODUCT,supplier,warehouse_location,logistics partner,shipping_method,quantity,unit_price,promised_date,actual_delivery_date,delivery_status\nA1,Widget,Acme,Dallas,FedEx,Air,5,10,2024-01-05,,In Transit\n";
        let shipments = read_shipments(csv.as_bytes()).unwrap();
        assert_eq!(shipments[0].total_cost, 50.0);
    }

    #[test]
    fn missing_columns_are_all_named() {
        let csv = "Order ID,Product,Supplier,Warehouse Location,Logistics Partner,Quantity,Unit Price,Promised Date,Delivery Status\n";
        match read_shipments(csv.as_bytes()) {
            Err(LoadError::Validation(ValidationError::MissingColumns(cols))) => {
                assert_eq!(cols, vec![COL_METHOD.to_string(), COL_ACTUAL.to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn malformed_row_reports_its_line() {
        let csv = format!(
            "{HEADER}A1,Widget,Acme,Dallas,FedEx,Air,5,10.0,50.0,2024-01-05,,Pending\nA2,Widget,Acme,Dallas,FedEx,Air,5,abc,50.0,2024-01-05,,Pending\n"
        );
        match read_shipments(csv.as_bytes()) {
            Err(LoadError::Validation(ValidationError::InvalidField { line, column, .. })) => {
                assert_eq!(line, 3);
                assert_eq!(column, COL_UNIT_PRICE);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn duplicate_order_ids_are_rejected() {
        let csv = format!(
            "{HEADER}A1,Widget,Acme,Dallas,FedEx,Air,5,10.0,50.0,2024-01-05,,Pending\nA1,Widget,Acme,Dallas,FedEx,Air,5,10.0,50.0,2024-01-05,,Pending\n"
        );
        assert!(matches!(
            read_shipments(csv.as_bytes()),
            Err(LoadError::Validation(ValidationError::DuplicateOrderId { line: 3, .. }))
        ));
    }

    #[test]
    fn invalid_utf8_names_row_and_column() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"A1,Widget,Acme,Dallas,FedEx,Air,5,10.0,50.0,2024-01-05,,Pending\n");
        bytes.extend_from_slice(b"A2,Wid\xffget,Acme,Dallas,FedEx,Air,5,10.0,50.0,2024-01-05,,Pending\n");
        match read_shipments(bytes.as_slice()) {
            Err(LoadError::Validation(ValidationError::InvalidField { line, column, .. })) => {
                assert_eq!(line, 3);
                assert_eq!(column, COL_PRODUCT);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn headers_that_normalize_alike_are_rejected() {
        let csv = format!("order_id,{HEADER}");
        match read_shipments(csv.as_bytes()) {
            Err(LoadError::Validation(ValidationError::DuplicateColumn { first, second })) => {
                assert_eq!(first, "order_id");
                assert_eq!(second, COL_ORDER_ID);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_dataset("/definitely/not/here.csv").unwrap_err();
        assert!(err.is_not_found());
    }
}
