//! GSTR-1 workbook export.

use crate::error::FiscalError;
use crate::models::Gstr1Report;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

enum Cell {
    Text(String),
    Amount(Decimal),
    Count(i64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<Decimal> for Cell {
    fn from(d: Decimal) -> Self {
        Cell::Amount(d)
    }
}

fn date_cell(date: NaiveDate) -> Cell {
    Cell::Text(date.format("%d-%b-%Y").to_string())
}

fn yes_no(flag: bool) -> Cell {
    Cell::from(if flag { "Y" } else { "N" })
}

/// `GSTR1_<gstin or company id>_<MMYYYY>.xlsx`
pub fn export_filename(report: &Gstr1Report, company_fallback: &str) -> String {
    let who = report
        .header
        .gstin
        .clone()
        .unwrap_or_else(|| company_fallback.to_string());
    format!("GSTR1_{}_{}.xlsx", who, report.header.fp)
}

/// Render the report as an xlsx workbook with one sheet per section.
pub fn render_workbook(report: &Gstr1Report) -> Result<Vec<u8>, FiscalError> {
    let mut workbook = Workbook::new();

    let mut b2b = Vec::new();
    for inv in &report.b2b {
        for item in &inv.items {
            b2b.push(vec![
                Cell::from(inv.customer_gstin.clone()),
                Cell::from(inv.customer_name.clone()),
                Cell::from(inv.invoice_number.clone()),
                date_cell(inv.invoice_date),
                Cell::from(inv.invoice_value),
                Cell::from(inv.place_of_supply.clone()),
                yes_no(inv.reverse_charge),
                Cell::from(inv.invoice_type.clone()),
                Cell::from(item.rate),
                Cell::from(item.taxable_value),
                Cell::from(item.igst),
                Cell::from(item.cgst),
                Cell::from(item.sgst),
                Cell::from(item.cess),
            ]);
        }
    }
    write_sheet(
        &mut workbook,
        "b2b",
        &[
            "GSTIN/UIN of Recipient",
            "Receiver Name",
            "Invoice Number",
            "Invoice date",
            "Invoice Value",
            "Place Of Supply",
            "Reverse Charge",
            "Invoice Type",
            "Rate",
            "Taxable Value",
            "Integrated Tax",
            "Central Tax",
            "State/UT Tax",
            "Cess Amount",
        ],
        b2b,
    )?;

    let mut b2cl = Vec::new();
    for inv in &report.b2c_large {
        for item in &inv.items {
            b2cl.push(vec![
                Cell::from(inv.invoice_number.clone()),
                date_cell(inv.invoice_date),
                Cell::from(inv.invoice_value),
                Cell::from(inv.place_of_supply.clone()),
                Cell::from(item.rate),
                Cell::from(item.taxable_value),
                Cell::from(item.igst),
                Cell::from(item.cess),
            ]);
        }
    }
    write_sheet(
        &mut workbook,
        "b2cl",
        &[
            "Invoice Number",
            "Invoice date",
            "Invoice Value",
            "Place Of Supply",
            "Rate",
            "Taxable Value",
            "Integrated Tax",
            "Cess Amount",
        ],
        b2cl,
    )?;

    let b2cs = report
        .b2c_small
        .iter()
        .map(|row| {
            vec![
                Cell::from("OE"),
                Cell::from(row.supply_type.as_str()),
                Cell::from(row.place_of_supply.clone()),
                Cell::from(row.rate),
                Cell::from(row.taxable_value),
                Cell::from(row.igst),
                Cell::from(row.cgst),
                Cell::from(row.sgst),
                Cell::from(row.cess),
                Cell::Count(row.invoice_count as i64),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "b2cs",
        &[
            "Type",
            "Supply Type",
            "Place Of Supply",
            "Rate",
            "Taxable Value",
            "Integrated Tax",
            "Central Tax",
            "State/UT Tax",
            "Cess Amount",
            "Invoice Count",
        ],
        b2cs,
    )?;

    let hsn = report
        .hsn_summary
        .iter()
        .map(|row| {
            vec![
                Cell::from(row.hsn_code.clone()),
                Cell::from(row.description.clone().unwrap_or_default()),
                Cell::from(format!("{}-{}", row.uqc, row.uqc_description)),
                Cell::from(row.quantity),
                Cell::from(row.total_value),
                Cell::from(row.taxable_value),
                Cell::from(row.igst),
                Cell::from(row.cgst),
                Cell::from(row.sgst),
                Cell::from(row.cess),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "hsn",
        &[
            "HSN",
            "Description",
            "UQC",
            "Total Quantity",
            "Total Value",
            "Taxable Value",
            "Integrated Tax Amount",
            "Central Tax Amount",
            "State/UT Tax Amount",
            "Cess Amount",
        ],
        hsn,
    )?;

    let docs = report
        .document_summary
        .iter()
        .map(|row| {
            vec![
                Cell::from(row.nature.clone()),
                Cell::from(row.from_number.clone()),
                Cell::from(row.to_number.clone()),
                Cell::Count(row.total_count as i64),
                Cell::Count(row.cancelled_count as i64),
                Cell::Count(row.net_issued as i64),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "docs",
        &[
            "Nature of Document",
            "Sr. No. From",
            "Sr. No. To",
            "Total Number",
            "Cancelled",
            "Net Issued",
        ],
        docs,
    )?;

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    headers: &[&str],
    rows: Vec<Vec<Cell>>,
) -> Result<(), FiscalError> {
    let header_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (r, row) in rows.into_iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(r, col, text)?;
                }
                Cell::Amount(value) => {
                    let number = value.to_f64().ok_or_else(|| {
                        FiscalError::Export(format!("amount {} does not fit a cell", value))
                    })?;
                    sheet.write_number_with_format(r, col, number, &amount_format)?;
                }
                Cell::Count(n) => {
                    sheet.write_number(r, col, n as f64)?;
                }
            }
        }
    }

    Ok(())
}
