//! GSTR-1 aggregation.
//!
//! [`build_gstr1_report`] is a pure function over a period's invoice records.
//! Input is sorted by (date, sequence, number, id) and every grouping uses a
//! `BTreeMap`, so identical input always serializes identically.

use super::tax::{round_money, supply_type, TaxSplit};
use super::{gstin, state, uqc};
use crate::error::FiscalError;
use crate::models::{
    B2bInvoice, B2cLargeInvoice, B2cSmallRow, DocumentSummaryRow, DocumentType, Gstr1Report,
    HsnSummaryRow, InvoiceRecord, RateItem, ReportHeader, ReportTotals, ReturnPeriod,
    SkippedRecord, SupplyType,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;
use uuid::Uuid;

/// Default B2C-Large threshold in rupees.
pub const DEFAULT_B2C_LARGE_THRESHOLD: i64 = 250_000;

/// Seller and filter settings for one report run.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub period: ReturnPeriod,
    pub branch_id: Option<Uuid>,
    pub seller_gstin: Option<String>,
    pub legal_name: Option<String>,
    /// Two-digit state code of the seller.
    pub seller_state_code: String,
    pub b2c_large_threshold: Decimal,
}

/// Per-line facts after tax reconciliation.
struct LineFact {
    hsn_code: String,
    description: Option<String>,
    uqc: &'static str,
    quantity: Decimal,
    taxable_value: Decimal,
    rate: Decimal,
    split: TaxSplit,
    cess: Decimal,
}

#[derive(Default)]
struct Amounts {
    quantity: Decimal,
    taxable_value: Decimal,
    igst: Decimal,
    cgst: Decimal,
    sgst: Decimal,
    cess: Decimal,
}

impl Amounts {
    fn add(&mut self, fact: &LineFact) {
        self.quantity += fact.quantity;
        self.taxable_value += fact.taxable_value;
        self.igst += fact.split.igst();
        self.cgst += fact.split.cgst();
        self.sgst += fact.split.sgst();
        self.cess += fact.cess;
    }

    fn tax(&self) -> Decimal {
        self.igst + self.cgst + self.sgst + self.cess
    }
}

struct HsnAcc {
    description: Option<String>,
    uqc: &'static str,
    amounts: Amounts,
}

struct B2csAcc {
    amounts: Amounts,
    invoices: BTreeSet<Uuid>,
}

/// (document type, branch key, period key) of one counter series.
type SeriesKey = (String, Uuid, String);

struct DocAcc {
    first: (i64, String),
    last: (i64, String),
    total: u32,
    cancelled: u32,
}

/// Aggregate a period's records into a GSTR-1 report.
///
/// Records outside the period or branch filter are ignored. Invalid GSTINs
/// and places of supply skip the invoice; inconsistent stored tax aborts.
pub fn build_gstr1_report(
    ctx: &ReportContext,
    records: &[InvoiceRecord],
) -> Result<Gstr1Report, FiscalError> {
    let mut ordered: Vec<&InvoiceRecord> = records
        .iter()
        .filter(|r| ctx.period.contains(r.invoice.invoice_date))
        .filter(|r| ctx.branch_id.is_none() || r.invoice.branch_id == ctx.branch_id)
        .collect();
    ordered.sort_by(|a, b| {
        let (a, b) = (&a.invoice, &b.invoice);
        (a.invoice_date, a.sequence_value, &a.document_number, a.invoice_id).cmp(&(
            b.invoice_date,
            b.sequence_value,
            &b.document_number,
            b.invoice_id,
        ))
    });

    let mut b2b = Vec::new();
    let mut b2c_large = Vec::new();
    let mut b2cs: BTreeMap<(SupplyType, String, Decimal), B2csAcc> = BTreeMap::new();
    let mut hsn: BTreeMap<String, HsnAcc> = BTreeMap::new();
    let mut docs: BTreeMap<SeriesKey, DocAcc> = BTreeMap::new();
    let mut totals = ReportTotals::default();
    let mut skipped = Vec::new();

    for record in &ordered {
        track_document(&mut docs, record);

        let invoice = &record.invoice;
        if invoice.cancelled || invoice.document_type != DocumentType::Invoice.as_str() {
            continue;
        }

        let (pos, customer_gstin) = match resolve_parties(record) {
            Ok(parties) => parties,
            Err(e) if e.is_record_scoped() => {
                skip(&mut skipped, record, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let supply = supply_type(&ctx.seller_state_code, pos.code);
        let facts = line_facts(record, supply)?;

        let mut invoice_amounts = Amounts::default();
        for fact in &facts {
            invoice_amounts.add(fact);
            add_to_hsn(&mut hsn, fact, &invoice.document_number);
        }

        totals.invoice_count += 1;
        totals.invoice_value += invoice.invoice_value;
        totals.taxable_value += invoice_amounts.taxable_value;
        totals.igst += invoice_amounts.igst;
        totals.cgst += invoice_amounts.cgst;
        totals.sgst += invoice_amounts.sgst;
        totals.cess += invoice_amounts.cess;

        if let Some(customer_gstin) = customer_gstin {
            b2b.push(B2bInvoice {
                customer_gstin,
                customer_name: invoice.customer_name.clone(),
                invoice_number: invoice.document_number.clone(),
                invoice_date: invoice.invoice_date,
                invoice_value: round_money(invoice.invoice_value),
                place_of_supply: pos.label(),
                reverse_charge: invoice.reverse_charge,
                invoice_type: "Regular".to_string(),
                supply_type: supply,
                items: rate_items(&facts),
            });
        } else if invoice.invoice_value > ctx.b2c_large_threshold && supply == SupplyType::Inter {
            b2c_large.push(B2cLargeInvoice {
                invoice_number: invoice.document_number.clone(),
                invoice_date: invoice.invoice_date,
                invoice_value: round_money(invoice.invoice_value),
                place_of_supply: pos.label(),
                items: rate_items(&facts),
            });
        } else {
            for fact in &facts {
                let acc = b2cs
                    .entry((supply, pos.label(), fact.rate))
                    .or_insert_with(|| B2csAcc {
                        amounts: Amounts::default(),
                        invoices: BTreeSet::new(),
                    });
                acc.amounts.add(fact);
                acc.invoices.insert(invoice.invoice_id);
            }
        }
    }

    totals.invoice_value = round_money(totals.invoice_value);
    totals.taxable_value = round_money(totals.taxable_value);
    totals.total_tax = round_money(totals.igst + totals.cgst + totals.sgst + totals.cess);
    totals.igst = round_money(totals.igst);
    totals.cgst = round_money(totals.cgst);
    totals.sgst = round_money(totals.sgst);
    totals.cess = round_money(totals.cess);

    let b2c_small = b2cs
        .into_iter()
        .map(|((supply, pos, rate), acc)| B2cSmallRow {
            supply_type: supply,
            place_of_supply: pos,
            rate,
            quantity: acc.amounts.quantity,
            taxable_value: round_money(acc.amounts.taxable_value),
            igst: round_money(acc.amounts.igst),
            cgst: round_money(acc.amounts.cgst),
            sgst: round_money(acc.amounts.sgst),
            cess: round_money(acc.amounts.cess),
            invoice_count: acc.invoices.len() as u32,
        })
        .collect();

    let hsn_summary = hsn
        .into_iter()
        .map(|(hsn_code, acc)| HsnSummaryRow {
            hsn_code,
            description: acc.description,
            uqc: acc.uqc.to_string(),
            uqc_description: uqc::description(acc.uqc).to_string(),
            quantity: acc.amounts.quantity,
            total_value: round_money(acc.amounts.taxable_value + acc.amounts.tax()),
            taxable_value: round_money(acc.amounts.taxable_value),
            igst: round_money(acc.amounts.igst),
            cgst: round_money(acc.amounts.cgst),
            sgst: round_money(acc.amounts.sgst),
            cess: round_money(acc.amounts.cess),
        })
        .collect();

    let document_summary = docs
        .into_iter()
        .map(|((document_type, branch_key, period_key), acc)| DocumentSummaryRow {
            nature: DocumentType::parse(&document_type)
                .map(|t| t.gst_nature().to_string())
                .unwrap_or_else(|_| document_type.clone()),
            document_type,
            branch_id: (!branch_key.is_nil()).then_some(branch_key),
            period_key,
            from_sequence: acc.first.0,
            to_sequence: acc.last.0,
            from_number: acc.first.1,
            to_number: acc.last.1,
            total_count: acc.total,
            cancelled_count: acc.cancelled,
            net_issued: acc.total - acc.cancelled,
        })
        .collect();

    Ok(Gstr1Report {
        header: ReportHeader {
            gstin: ctx.seller_gstin.clone(),
            legal_name: ctx.legal_name.clone(),
            fp: ctx.period.fp(),
            period_start: ctx.period.first_day(),
            period_end: ctx.period.last_day(),
            branch_id: ctx.branch_id,
            seller_state_code: ctx.seller_state_code.clone(),
        },
        b2b,
        b2c_large,
        b2c_small,
        hsn_summary,
        document_summary,
        totals,
        skipped,
    })
}

/// Place of supply and, for registered buyers, the validated GSTIN.
fn resolve_parties(
    record: &InvoiceRecord,
) -> Result<(&'static state::GstState, Option<String>), FiscalError> {
    let invoice = &record.invoice;
    let pos = state::resolve_place_of_supply(&invoice.place_of_supply)?;
    let customer_gstin = invoice
        .customer_gstin
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(gstin::validate)
        .transpose()?;
    Ok((pos, customer_gstin))
}

fn skip(skipped: &mut Vec<SkippedRecord>, record: &InvoiceRecord, err: FiscalError) {
    warn!(
        document_number = %record.invoice.document_number,
        invoice_id = %record.invoice.invoice_id,
        code = err.code(),
        error = %err,
        "Skipping invoice in GSTR-1"
    );
    skipped.push(SkippedRecord {
        document_number: record.invoice.document_number.clone(),
        invoice_date: record.invoice.invoice_date,
        code: err.code().to_string(),
        reason: err.to_string(),
    });
}

fn line_facts(record: &InvoiceRecord, supply: SupplyType) -> Result<Vec<LineFact>, FiscalError> {
    let mut lines: Vec<_> = record.lines.iter().collect();
    lines.sort_by(|a, b| (a.line_no, a.line_id).cmp(&(b.line_no, b.line_id)));

    lines
        .into_iter()
        .map(|line| {
            let split = TaxSplit::from_line(line, supply, &record.invoice.document_number)?;
            let uqc = match uqc::lookup(&line.uqc) {
                Ok((code, _)) => code,
                Err(e) => {
                    warn!(
                        document_number = %record.invoice.document_number,
                        line_no = line.line_no,
                        code = e.code(),
                        uqc = %line.uqc,
                        "Unknown UQC, reporting as {}",
                        uqc::FALLBACK
                    );
                    uqc::FALLBACK
                }
            };
            Ok(LineFact {
                hsn_code: line.hsn_code.trim().to_string(),
                description: line.description.clone(),
                uqc,
                quantity: line.quantity,
                taxable_value: line.taxable_value,
                rate: line.tax_rate.normalize(),
                split,
                cess: line.cess_amount,
            })
        })
        .collect()
}

fn add_to_hsn(hsn: &mut BTreeMap<String, HsnAcc>, fact: &LineFact, document_number: &str) {
    let acc = hsn.entry(fact.hsn_code.clone()).or_insert_with(|| HsnAcc {
        description: None,
        uqc: fact.uqc,
        amounts: Amounts::default(),
    });
    if acc.uqc != fact.uqc {
        warn!(
            hsn_code = %fact.hsn_code,
            document_number,
            reported = acc.uqc,
            found = fact.uqc,
            "Mixed UQC within one HSN code"
        );
    }
    if acc.description.is_none() {
        acc.description = fact.description.clone();
    }
    acc.amounts.add(fact);
}

fn rate_items(facts: &[LineFact]) -> Vec<RateItem> {
    let mut by_rate: BTreeMap<Decimal, Amounts> = BTreeMap::new();
    for fact in facts {
        by_rate.entry(fact.rate).or_default().add(fact);
    }
    by_rate
        .into_iter()
        .map(|(rate, a)| RateItem {
            rate,
            taxable_value: round_money(a.taxable_value),
            igst: round_money(a.igst),
            cgst: round_money(a.cgst),
            sgst: round_money(a.sgst),
            cess: round_money(a.cess),
        })
        .collect()
}

fn track_document(docs: &mut BTreeMap<SeriesKey, DocAcc>, record: &InvoiceRecord) {
    let invoice = &record.invoice;
    let key = (invoice.sequence_value, invoice.document_number.clone());
    let series = (
        invoice.document_type.clone(),
        invoice.branch_key,
        invoice.period_key.clone(),
    );
    let acc = docs
        .entry(series)
        .or_insert_with(|| DocAcc {
            first: key.clone(),
            last: key.clone(),
            total: 0,
            cancelled: 0,
        });
    if key.0 < acc.first.0 {
        acc.first = key.clone();
    }
    if key.0 > acc.last.0 {
        acc.last = key;
    }
    acc.total += 1;
    if invoice.cancelled {
        acc.cancelled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GstInvoiceLineRow, GstInvoiceRow};
    use chrono::NaiveDate;
    use std::str::FromStr;

    const SELLER: &str = "29";

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ctx() -> ReportContext {
        ReportContext {
            period: ReturnPeriod::new(5, 2024).unwrap(),
            branch_id: None,
            seller_gstin: Some("29AAACR5055K1Z3".to_string()),
            legal_name: Some("Fixit Mobiles".to_string()),
            seller_state_code: SELLER.to_string(),
            b2c_large_threshold: Decimal::from(DEFAULT_B2C_LARGE_THRESHOLD),
        }
    }

    fn record(seq: i64, pos: &str, gstin: Option<&str>, value: &str, taxable: &str) -> InvoiceRecord {
        let invoice_id = Uuid::from_u128(seq as u128);
        InvoiceRecord {
            invoice: GstInvoiceRow {
                invoice_id,
                company_id: Uuid::from_u128(1),
                branch_id: None,
                document_type: "invoice".to_string(),
                document_number: format!("INV-{:05}", seq),
                sequence_value: seq,
                branch_key: Uuid::nil(),
                period_key: "ALL".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
                customer_name: format!("Customer {}", seq),
                customer_gstin: gstin.map(str::to_string),
                place_of_supply: pos.to_string(),
                invoice_value: d(value),
                reverse_charge: false,
                cancelled: false,
            },
            lines: vec![GstInvoiceLineRow {
                line_id: Uuid::from_u128(1000 + seq as u128),
                invoice_id,
                line_no: 1,
                description: Some("Screen replacement".to_string()),
                hsn_code: "8517".to_string(),
                uqc: "NOS".to_string(),
                quantity: Decimal::ONE,
                taxable_value: d(taxable),
                tax_rate: d("18"),
                igst_amount: None,
                cgst_amount: None,
                sgst_amount: None,
                cess_amount: Decimal::ZERO,
            }],
        }
    }

    #[test]
    fn test_b2c_large_threshold() {
        let records = vec![
            record(1, "27", None, "300000", "254237.29"),
            record(2, "27", None, "200000", "169491.53"),
        ];
        let report = build_gstr1_report(&ctx(), &records).unwrap();

        assert_eq!(report.b2c_large.len(), 1);
        assert_eq!(report.b2c_large[0].invoice_number, "INV-00001");
        assert_eq!(report.b2c_large[0].place_of_supply, "27-Maharashtra");
        assert_eq!(report.b2c_small.len(), 1);
        assert_eq!(report.b2c_small[0].invoice_count, 1);
        assert_eq!(report.b2c_small[0].supply_type, SupplyType::Inter);
    }

    #[test]
    fn test_large_intra_state_b2c_is_small() {
        let records = vec![record(1, SELLER, None, "300000", "254237.29")];
        let report = build_gstr1_report(&ctx(), &records).unwrap();
        assert!(report.b2c_large.is_empty());
        assert_eq!(report.b2c_small.len(), 1);
        assert_eq!(report.b2c_small[0].supply_type, SupplyType::Intra);
    }

    #[test]
    fn test_b2b_and_tax_split() {
        let records = vec![
            record(1, "29-Karnataka", Some("29AAACR5055K1Z3"), "1180", "1000"),
            record(2, "27", Some("27AAPFU0939F1ZV"), "1180", "1000"),
        ];
        let report = build_gstr1_report(&ctx(), &records).unwrap();

        assert_eq!(report.b2b.len(), 2);
        let intra = &report.b2b[0].items[0];
        assert_eq!((intra.cgst, intra.sgst, intra.igst), (d("90"), d("90"), d("0")));
        let inter = &report.b2b[1].items[0];
        assert_eq!((inter.cgst, inter.sgst, inter.igst), (d("0"), d("0"), d("180")));

        assert_eq!(report.totals.total_tax, d("360"));
        assert_eq!(report.hsn_summary.len(), 1);
        assert_eq!(report.hsn_summary[0].quantity, d("2"));
        assert_eq!(report.hsn_summary[0].total_value, d("2360"));
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let records = vec![
            record(1, "99", None, "100", "100"),
            record(2, "27", Some("27AAPFU0939F1ZX"), "100", "100"),
            record(3, "27", None, "100", "100"),
        ];
        let report = build_gstr1_report(&ctx(), &records).unwrap();

        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].code, "INVALID_PLACE_OF_SUPPLY");
        assert_eq!(report.skipped[1].code, "INVALID_GSTIN");
        assert_eq!(report.totals.invoice_count, 1);
        // skipped invoices still count as issued documents
        assert_eq!(report.document_summary[0].total_count, 3);
    }

    #[test]
    fn test_inconsistent_line_aborts() {
        let mut r = record(1, "27", None, "100", "100");
        r.lines[0].igst_amount = Some(d("18"));
        r.lines[0].cgst_amount = Some(d("9"));
        r.lines[0].sgst_amount = Some(d("9"));
        assert!(matches!(
            build_gstr1_report(&ctx(), &[r]),
            Err(FiscalError::PeriodDataInconsistency { .. })
        ));
    }

    #[test]
    fn test_unknown_uqc_defaults_to_oth() {
        let mut r = record(1, "27", None, "100", "100");
        r.lines[0].uqc = "PIECE".to_string();
        let report = build_gstr1_report(&ctx(), &[r]).unwrap();
        assert_eq!(report.hsn_summary[0].uqc, "OTH");
        assert_eq!(report.hsn_summary[0].uqc_description, "OTHERS");
    }

    #[test]
    fn test_document_summary() {
        let mut cancelled = record(3, "27", None, "100", "100");
        cancelled.invoice.cancelled = true;
        let mut job_sheet = record(7, "27", None, "0", "0");
        job_sheet.invoice.document_type = "job_sheet".to_string();
        job_sheet.invoice.document_number = "JS-7".to_string();
        let records = vec![
            record(2, "27", None, "100", "100"),
            cancelled,
            record(10, "27", None, "100", "100"),
            job_sheet,
        ];
        let report = build_gstr1_report(&ctx(), &records).unwrap();

        let invoices = report
            .document_summary
            .iter()
            .find(|r| r.document_type == "invoice")
            .unwrap();
        assert_eq!((invoices.from_sequence, invoices.to_sequence), (2, 10));
        assert_eq!(invoices.from_number, "INV-00002");
        assert_eq!(invoices.to_number, "INV-00010");
        assert_eq!(invoices.total_count, 3);
        assert_eq!(invoices.cancelled_count, 1);
        assert_eq!(invoices.nature, "Invoices for outward supply");
        for row in &report.document_summary {
            assert_eq!(row.net_issued, row.total_count - row.cancelled_count);
        }
        // job sheets never reach the tax sections
        assert_eq!(report.totals.invoice_count, 2);
    }

    #[test]
    fn test_sequence_ordering_is_numeric() {
        let records = vec![record(10, "27", None, "100", "100"), record(9, "27", None, "100", "100")];
        let report = build_gstr1_report(&ctx(), &records).unwrap();
        let docs = &report.document_summary[0];
        assert_eq!(docs.from_number, "INV-00009");
        assert_eq!(docs.to_sequence, 10);
    }

    #[test]
    fn test_threshold_value_is_b2c_small() {
        let records = vec![record(1, "27", None, "250000", "211864.41")];
        let report = build_gstr1_report(&ctx(), &records).unwrap();
        assert!(report.b2c_large.is_empty());
        assert_eq!(report.b2c_small.len(), 1);
        assert_eq!(report.b2c_small[0].supply_type, SupplyType::Inter);
    }

    fn in_series(seq: i64, prefix: &str, branch_key: Uuid, period_key: &str) -> InvoiceRecord {
        let mut r = record(seq, "27", None, "100", "100");
        r.invoice.invoice_id = Uuid::new_v4();
        r.invoice.document_number = format!("INV-{}-{:05}", prefix, seq);
        r.invoice.branch_key = branch_key;
        r.invoice.branch_id = (!branch_key.is_nil()).then_some(branch_key);
        r.invoice.period_key = period_key.to_string();
        r
    }

    #[test]
    fn test_document_summary_per_branch_series() {
        let (blr, hyd) = (Uuid::from_u128(7), Uuid::from_u128(8));
        let mut records: Vec<_> = (1..=3).map(|n| in_series(n, "BLR", blr, "ALL")).collect();
        records.extend((1..=7).map(|n| in_series(n, "HYD", hyd, "ALL")));
        let report = build_gstr1_report(&ctx(), &records).unwrap();

        assert_eq!(report.document_summary.len(), 2);
        let bangalore = &report.document_summary[0];
        assert_eq!(bangalore.branch_id, Some(blr));
        assert_eq!(bangalore.from_number, "INV-BLR-00001");
        assert_eq!(bangalore.to_number, "INV-BLR-00003");
        assert_eq!(bangalore.total_count, 3);
        let hyderabad = &report.document_summary[1];
        assert_eq!(hyderabad.branch_id, Some(hyd));
        assert_eq!(hyderabad.from_number, "INV-HYD-00001");
        assert_eq!(hyderabad.to_number, "INV-HYD-00007");
        assert_eq!(hyderabad.total_count, 7);
        for row in &report.document_summary {
            assert_eq!(row.total_count as i64, row.to_sequence - row.from_sequence + 1);
        }
    }

    #[test]
    fn test_document_summary_per_daily_series() {
        let mut records: Vec<_> = (1..=2)
            .map(|n| in_series(n, "0510", Uuid::nil(), "2024-05-10"))
            .collect();
        records.extend((1..=4).map(|n| in_series(n, "0511", Uuid::nil(), "2024-05-11")));
        let report = build_gstr1_report(&ctx(), &records).unwrap();

        assert_eq!(report.document_summary.len(), 2);
        let first = &report.document_summary[0];
        assert_eq!(first.period_key, "2024-05-10");
        assert_eq!(first.branch_id, None);
        assert_eq!((first.from_sequence, first.to_sequence, first.total_count), (1, 2, 2));
        let second = &report.document_summary[1];
        assert_eq!(second.period_key, "2024-05-11");
        assert_eq!(second.from_number, "INV-0511-00001");
        assert_eq!(second.to_number, "INV-0511-00004");
        assert_eq!(second.total_count, 4);
    }

    #[test]
    fn test_report_is_idempotent() {
        let mut records = vec![
            record(3, "27", Some("27AAPFU0939F1ZV"), "1180", "1000"),
            record(1, "29", None, "590", "500"),
            record(2, "33", None, "400000", "338983.05"),
        ];
        let first = serde_json::to_string(&build_gstr1_report(&ctx(), &records).unwrap()).unwrap();
        records.reverse();
        let second = serde_json::to_string(&build_gstr1_report(&ctx(), &records).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_period_and_branch_filters() {
        let branch = Uuid::from_u128(42);
        let mut other_month = record(1, "27", None, "100", "100");
        other_month.invoice.invoice_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut in_branch = record(2, "27", None, "100", "100");
        in_branch.invoice.branch_id = Some(branch);
        let no_branch = record(3, "27", None, "100", "100");

        let mut c = ctx();
        c.branch_id = Some(branch);
        let report = build_gstr1_report(&c, &[other_month, in_branch, no_branch]).unwrap();
        assert_eq!(report.totals.invoice_count, 1);
        assert_eq!(report.header.branch_id, Some(branch));
        assert_eq!(report.header.fp, "052024");
    }
}
