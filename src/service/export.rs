use bigdecimal::BigDecimal;
use std::io::Write;
use std::str::FromStr;

use crate::error::ExportError;
use crate::models::{ReconciliationRow, ReconciliationStatus, ReconciliationTable};

pub const EXPORT_HEADER: [&str; 4] = [
    "article_id",
    "requested_quantity",
    "offered_quantity",
    "status",
];

/// 导出对账表 (UTF-8, 逗号分隔, 数量为普通十进制, 无千分位)
pub fn write_table_csv<W: Write>(table: &ReconciliationTable, output: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(EXPORT_HEADER)?;

    for row in table.iter() {
        writer.write_record([
            row.article_id.clone(),
            row.requested_quantity.to_string(),
            row.offered_quantity.to_string(),
            row.status.label().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn table_to_csv(table: &ReconciliationTable) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_table_csv(table, &mut buf)?;
    Ok(buf)
}

/// 读回导出的对账表
pub fn read_table_csv(text: &str) -> Result<ReconciliationTable, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().ne(EXPORT_HEADER) {
        return Err(ExportError::InvalidField {
            line: 1,
            field: "header",
            value: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let decimal = |idx: usize, name: &'static str| {
            BigDecimal::from_str(field(idx)).map_err(|_| ExportError::InvalidField {
                line,
                field: name,
                value: field(idx).to_string(),
            })
        };

        rows.push(ReconciliationRow {
            article_id: field(0).to_string(),
            requested_quantity: decimal(1, "requested_quantity")?,
            offered_quantity: decimal(2, "offered_quantity")?,
            status: ReconciliationStatus::from_str(field(3)).map_err(|e| {
                ExportError::InvalidField {
                    line,
                    field: "status",
                    value: e.0,
                }
            })?,
        });
    }

    Ok(ReconciliationTable { rows })
}
