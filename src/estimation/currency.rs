//! Fixed-table currency conversion and formatting.
//!
//! Every rate is expressed in units of the currency per one unit of
//! [`BASE_CURRENCY`]. Conversions between two non-base currencies route
//! through the base currency.

use crate::domain::currency::CurrencyResponse;

pub const BASE_CURRENCY: &str = "USD";

/// Symbol used for codes missing from the table.
const GENERIC_SYMBOL: &str = "¤";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPlacement {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub rate: f64,
    pub placement: SymbolPlacement,
    pub decimals: usize,
}

static CURRENCIES: [CurrencyInfo; 7] = [
    CurrencyInfo {
        code: "USD",
        symbol: "$",
        rate: 1.0,
        placement: SymbolPlacement::Prefix,
        decimals: 2,
    },
    CurrencyInfo {
        code: "EUR",
        symbol: "€",
        rate: 0.92,
        placement: SymbolPlacement::Suffix,
        decimals: 2,
    },
    CurrencyInfo {
        code: "GBP",
        symbol: "£",
        rate: 0.79,
        placement: SymbolPlacement::Prefix,
        decimals: 2,
    },
    CurrencyInfo {
        code: "MAD",
        symbol: "DH",
        rate: 9.95,
        placement: SymbolPlacement::Suffix,
        decimals: 2,
    },
    CurrencyInfo {
        code: "CAD",
        symbol: "CA$",
        rate: 1.36,
        placement: SymbolPlacement::Prefix,
        decimals: 2,
    },
    CurrencyInfo {
        code: "AED",
        symbol: "AED",
        rate: 3.6725,
        placement: SymbolPlacement::Prefix,
        decimals: 2,
    },
    CurrencyInfo {
        code: "JPY",
        symbol: "¥",
        rate: 149.5,
        placement: SymbolPlacement::Prefix,
        decimals: 0,
    },
];

/// Read-only currency table, loaded once and shared by every request.
#[derive(Debug, Clone)]
pub struct CurrencyService {
    currencies: &'static [CurrencyInfo],
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self {
            currencies: &CURRENCIES,
        }
    }
}

impl CurrencyService {
    pub fn lookup(&self, code: &str) -> Option<&CurrencyInfo> {
        let code = code.trim();
        self.currencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// Unknown codes are treated as the base currency.
    fn rate(&self, code: &str) -> f64 {
        match self.lookup(code) {
            Some(info) => info.rate,
            None => {
                tracing::warn!(currency = code, "Unknown currency code, using base rate");
                1.0
            }
        }
    }

    /// Convert `amount` from one currency to another.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from.trim().eq_ignore_ascii_case(to.trim()) {
            return amount;
        }
        let in_base = amount / self.rate(from);
        in_base * self.rate(to)
    }

    pub fn symbol_for(&self, code: &str) -> &'static str {
        self.lookup(code).map_or(GENERIC_SYMBOL, |c| c.symbol)
    }

    /// Render `amount` with the currency's symbol placement and precision.
    pub fn format(&self, amount: f64, code: &str) -> String {
        let (symbol, placement, decimals) = match self.lookup(code) {
            Some(c) => (c.symbol, c.placement, c.decimals),
            None => (GENERIC_SYMBOL, SymbolPlacement::Prefix, 2),
        };

        let digits = format!("{:.*}", decimals, amount.abs());
        let negative = amount < 0.0 && digits.bytes().any(|b| matches!(b, b'1'..=b'9'));
        let sign = if negative { "-" } else { "" };

        match placement {
            SymbolPlacement::Prefix if symbol.chars().all(char::is_alphabetic) => {
                format!("{}{} {}", sign, symbol, digits)
            }
            SymbolPlacement::Prefix => format!("{}{}{}", sign, symbol, digits),
            SymbolPlacement::Suffix => format!("{}{} {}", sign, digits, symbol),
        }
    }

    pub fn supported(&self) -> Vec<CurrencyResponse> {
        self.currencies
            .iter()
            .map(|c| CurrencyResponse {
                code: c.code.to_string(),
                symbol: c.symbol.to_string(),
                rate: c.rate,
                decimals: c.decimals,
            })
            .collect()
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.currencies.iter().map(|c| c.code)
    }
}
