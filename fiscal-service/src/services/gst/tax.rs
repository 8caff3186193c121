//! CGST+SGST / IGST split for one invoice line.

use crate::error::FiscalError;
use crate::models::{GstInvoiceLineRow, SupplyType};
use rust_decimal::{Decimal, RoundingStrategy};

/// Tax on a line is either intra-state (CGST+SGST) or inter-state (IGST),
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxSplit {
    IntraState { cgst: Decimal, sgst: Decimal },
    InterState { igst: Decimal },
}

/// Two decimals, half away from zero, always carrying scale 2.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Intra-state when the place of supply is the seller's state.
pub fn supply_type(seller_state: &str, place_of_supply: &str) -> SupplyType {
    if seller_state == place_of_supply {
        SupplyType::Intra
    } else {
        SupplyType::Inter
    }
}

impl TaxSplit {
    pub fn compute(supply: SupplyType, taxable_value: Decimal, rate: Decimal) -> Self {
        match supply {
            SupplyType::Intra => {
                let half = taxable_value * rate / Decimal::TWO / Decimal::ONE_HUNDRED;
                let half = round_money(half);
                TaxSplit::IntraState {
                    cgst: half,
                    sgst: half,
                }
            }
            SupplyType::Inter => TaxSplit::InterState {
                igst: round_money(taxable_value * rate / Decimal::ONE_HUNDRED),
            },
        }
    }

    /// Use stored tax columns when present, compute them when all are NULL.
    pub fn from_line(
        line: &GstInvoiceLineRow,
        supply: SupplyType,
        document_number: &str,
    ) -> Result<Self, FiscalError> {
        if line.igst_amount.is_none() && line.cgst_amount.is_none() && line.sgst_amount.is_none()
        {
            return Ok(Self::compute(supply, line.taxable_value, line.tax_rate));
        }

        let inconsistent = |reason: &str| FiscalError::PeriodDataInconsistency {
            document_number: document_number.to_string(),
            line_no: line.line_no,
            reason: reason.to_string(),
        };
        let nonzero = |v: Option<Decimal>| v.map(|d| !d.is_zero()).unwrap_or(false);

        let igst = line.igst_amount.unwrap_or_default();
        let cgst = line.cgst_amount.unwrap_or_default();
        let sgst = line.sgst_amount.unwrap_or_default();
        let inter = nonzero(line.igst_amount);
        let intra = nonzero(line.cgst_amount) || nonzero(line.sgst_amount);

        match (intra, inter) {
            (true, true) => Err(inconsistent("both CGST/SGST and IGST are populated")),
            (true, false) => {
                if cgst.is_zero() || sgst.is_zero() {
                    return Err(inconsistent("only one of CGST and SGST is populated"));
                }
                if supply != SupplyType::Intra {
                    return Err(inconsistent(
                        "CGST/SGST recorded on an inter-state supply",
                    ));
                }
                Ok(TaxSplit::IntraState {
                    cgst: round_money(cgst),
                    sgst: round_money(sgst),
                })
            }
            (false, true) => {
                if supply != SupplyType::Inter {
                    return Err(inconsistent("IGST recorded on an intra-state supply"));
                }
                Ok(TaxSplit::InterState {
                    igst: round_money(igst),
                })
            }
            (false, false) => {
                if !line.tax_rate.is_zero() && !line.taxable_value.is_zero() {
                    return Err(inconsistent("no tax recorded at a nonzero rate"));
                }
                Ok(Self::compute(supply, line.taxable_value, line.tax_rate))
            }
        }
    }

    pub fn igst(&self) -> Decimal {
        match self {
            TaxSplit::InterState { igst } => *igst,
            TaxSplit::IntraState { .. } => Decimal::ZERO,
        }
    }

    pub fn cgst(&self) -> Decimal {
        match self {
            TaxSplit::IntraState { cgst, .. } => *cgst,
            TaxSplit::InterState { .. } => Decimal::ZERO,
        }
    }

    pub fn sgst(&self) -> Decimal {
        match self {
            TaxSplit::IntraState { sgst, .. } => *sgst,
            TaxSplit::InterState { .. } => Decimal::ZERO,
        }
    }

    pub fn total(&self) -> Decimal {
        self.igst() + self.cgst() + self.sgst()
    }
}
