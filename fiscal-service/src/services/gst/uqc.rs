//! Unit Quantity Codes accepted in the HSN summary.

use crate::error::FiscalError;

pub const FALLBACK: &str = "OTH";

const UQC_TABLE: &[(&str, &str)] = &[
    ("BAG", "BAGS"),
    ("BAL", "BALE"),
    ("BDL", "BUNDLES"),
    ("BKL", "BUCKLES"),
    ("BOU", "BILLIONS OF UNITS"),
    ("BOX", "BOX"),
    ("BTL", "BOTTLES"),
    ("BUN", "BUNCHES"),
    ("CAN", "CANS"),
    ("CBM", "CUBIC METER"),
    ("CCM", "CUBIC CENTIMETER"),
    ("CMS", "CENTIMETER"),
    ("CTN", "CARTONS"),
    ("DOZ", "DOZEN"),
    ("DRM", "DRUM"),
    ("GGR", "GREAT GROSS"),
    ("GMS", "GRAMS"),
    ("GRS", "GROSS"),
    ("GYD", "GROSS YARDS"),
    ("KGS", "KILOGRAMS"),
    ("KLR", "KILOLITER"),
    ("KME", "KILOMETRE"),
    ("LTR", "LITRE"),
    ("MLT", "MILILITRE"),
    ("MTR", "METERS"),
    ("MTS", "METRIC TON"),
    ("NOS", "NUMBERS"),
    ("OTH", "OTHERS"),
    ("PAC", "PACKS"),
    ("PCS", "PIECES"),
    ("PRS", "PAIRS"),
    ("QTL", "QUINTAL"),
    ("ROL", "ROLLS"),
    ("SET", "SETS"),
    ("SQF", "SQUARE FEET"),
    ("SQM", "SQUARE METERS"),
    ("SQY", "SQUARE YARDS"),
    ("TBS", "TABLETS"),
    ("TGM", "TEN GROSS"),
    ("THD", "THOUSANDS"),
    ("TON", "TONNES"),
    ("TUB", "TUBES"),
    ("UGS", "US GALLONS"),
    ("UNT", "UNITS"),
    ("YDS", "YARDS"),
];

/// Look up a code, returning its canonical form and description.
pub fn lookup(raw: &str) -> Result<(&'static str, &'static str), FiscalError> {
    let code = raw.trim().to_ascii_uppercase();
    UQC_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .copied()
        .ok_or_else(|| FiscalError::UnknownUqcCode(raw.to_string()))
}

pub fn description(code: &str) -> &'static str {
    lookup(code).map(|(_, d)| d).unwrap_or("OTHERS")
}
