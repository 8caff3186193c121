//! GST state code table and place-of-supply normalization.

use crate::error::FiscalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GstState {
    pub code: &'static str,
    pub name: &'static str,
}

impl GstState {
    /// Place of supply as it appears in the return, e.g. `27-Maharashtra`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.code, self.name)
    }
}

pub const STATES: &[GstState] = &[
    GstState { code: "01", name: "Jammu and Kashmir" },
    GstState { code: "02", name: "Himachal Pradesh" },
    GstState { code: "03", name: "Punjab" },
    GstState { code: "04", name: "Chandigarh" },
    GstState { code: "05", name: "Uttarakhand" },
    GstState { code: "06", name: "Haryana" },
    GstState { code: "07", name: "Delhi" },
    GstState { code: "08", name: "Rajasthan" },
    GstState { code: "09", name: "Uttar Pradesh" },
    GstState { code: "10", name: "Bihar" },
    GstState { code: "11", name: "Sikkim" },
    GstState { code: "12", name: "Arunachal Pradesh" },
    GstState { code: "13", name: "Nagaland" },
    GstState { code: "14", name: "Manipur" },
    GstState { code: "15", name: "Mizoram" },
    GstState { code: "16", name: "Tripura" },
    GstState { code: "17", name: "Meghalaya" },
    GstState { code: "18", name: "Assam" },
    GstState { code: "19", name: "West Bengal" },
    GstState { code: "20", name: "Jharkhand" },
    GstState { code: "21", name: "Odisha" },
    GstState { code: "22", name: "Chhattisgarh" },
    GstState { code: "23", name: "Madhya Pradesh" },
    GstState { code: "24", name: "Gujarat" },
    GstState { code: "26", name: "Dadra and Nagar Haveli and Daman and Diu" },
    GstState { code: "27", name: "Maharashtra" },
    GstState { code: "29", name: "Karnataka" },
    GstState { code: "30", name: "Goa" },
    GstState { code: "31", name: "Lakshadweep" },
    GstState { code: "32", name: "Kerala" },
    GstState { code: "33", name: "Tamil Nadu" },
    GstState { code: "34", name: "Puducherry" },
    GstState { code: "35", name: "Andaman and Nicobar Islands" },
    GstState { code: "36", name: "Telangana" },
    GstState { code: "37", name: "Andhra Pradesh" },
    GstState { code: "38", name: "Ladakh" },
    GstState { code: "97", name: "Other Territory" },
];

pub fn by_code(code: &str) -> Option<&'static GstState> {
    STATES.iter().find(|s| s.code == code)
}

/// Accepts `27`, `7`, `27-Maharashtra` or `maharashtra`.
pub fn resolve_place_of_supply(raw: &str) -> Result<&'static GstState, FiscalError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FiscalError::InvalidPlaceOfSupply(
            "place of supply is empty".to_string(),
        ));
    }

    let head = trimmed.split('-').next().unwrap_or(trimmed).trim();
    if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) && head.len() <= 2 {
        let code = format!("{:0>2}", head);
        return by_code(&code)
            .ok_or_else(|| FiscalError::InvalidPlaceOfSupply(raw.to_string()));
    }

    STATES
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| FiscalError::InvalidPlaceOfSupply(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_forms() {
        assert_eq!(resolve_place_of_supply("27").unwrap().name, "Maharashtra");
        assert_eq!(resolve_place_of_supply("7").unwrap().code, "07");
        assert_eq!(
            resolve_place_of_supply("29-Karnataka").unwrap().code,
            "29"
        );
        assert_eq!(resolve_place_of_supply(" tamil nadu ").unwrap().code, "33");
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for raw in ["25", "28", "99", "", "Atlantis", "123"] {
            assert!(
                matches!(
                    resolve_place_of_supply(raw),
                    Err(FiscalError::InvalidPlaceOfSupply(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(by_code("33").unwrap().label(), "33-Tamil Nadu");
    }
}
