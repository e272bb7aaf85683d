use serde::{Deserialize, Serialize};

use crate::group_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Cop,
}

impl Currency {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "USD" | "$" | "US$" => Some(Currency::Usd),
            "COP" | "COL$" => Some(Currency::Cop),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cop => "COP",
        }
    }

    pub fn fraction_digits(self) -> usize {
        match self {
            Currency::Usd => 2,
            Currency::Cop => 0,
        }
    }

    fn group_separator(self) -> char {
        match self {
            Currency::Usd => ',',
            Currency::Cop => '.',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Currency::Usd => '.',
            Currency::Cop => ',',
        }
    }

    /// Full currency style: `$2,000.00` for USD, `$ 2.000` for COP.
    pub fn format(self, amount: f64) -> String {
        let body = self.grouped_amount(amount.abs());
        let sign = if is_negative(amount, self.fraction_digits()) { "-" } else { "" };
        match self {
            Currency::Usd => format!("{}${}", sign, body),
            Currency::Cop => format!("{}$ {}", sign, body),
        }
    }

    /// Compact label used inside campaign trees: `$12.50` or `COP $100.000`.
    pub fn format_compact(self, amount: f64) -> String {
        let sign = if is_negative(amount, self.fraction_digits()) { "-" } else { "" };
        match self {
            Currency::Usd => format!("{}${:.2}", sign, amount.abs()),
            Currency::Cop => format!("{}COP ${}", sign, self.grouped_amount(amount.abs())),
        }
    }

    fn grouped_amount(self, amount: f64) -> String {
        let digits = self.fraction_digits();
        let scale = 10f64.powi(digits as i32);
        let scaled = round_half_away(amount * scale);
        let whole = (scaled / scale).trunc();
        let fraction = (scaled - whole * scale).round() as u64;

        let integer = group_digits(whole as u64, self.group_separator());
        if digits == 0 {
            return integer;
        }
        format!(
            "{}{}{:0width$}",
            integer,
            self.decimal_separator(),
            fraction,
            width = digits
        )
    }
}

fn round_half_away(value: f64) -> f64 {
    // 1.005 * 100 == 100.49999999999999
    let nudged = value + value.signum() * 1e-9;
    nudged.round()
}

fn is_negative(amount: f64, digits: usize) -> bool {
    let scale = 10f64.powi(digits as i32);
    amount < 0.0 && round_half_away(amount.abs() * scale) > 0.0
}
