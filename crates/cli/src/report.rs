use std::fmt;

use advisor_core::domain::{AllocationRecord, PreviewRow, RiskProfile};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub suggested: RiskProfile,
    pub chosen: RiskProfile,
    pub total_investment: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<PreviewRow>>,
    pub items: Vec<AllocationRecord>,
    /// Rows shown in the text table.
    #[serde(skip)]
    pub top: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top = self.top;
        writeln!(out, "Suggested profile: {}", self.suggested)?;
        if self.chosen != self.suggested {
            writeln!(out, "Manual override:   {}", self.chosen)?;
        }

        if let Some(rows) = &self.preview {
            writeln!(out)?;
            writeln!(out, "Portfolio preview ({}):", self.chosen)?;
            for r in rows {
                writeln!(
                    out,
                    "  {:<10} {:<32} {:<24} {:>10.4}",
                    r.symbol, r.display_name, r.sector, r.weight
                )?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "How to invest {} for the {} profile:",
            money(self.total_investment),
            self.chosen
        )?;

        let Some(first) = self.items.first() else {
            writeln!(out, "  No instruments qualify for this profile.")?;
            return Ok(());
        };
        writeln!(
            out,
            "Primary move: invest {} in {}",
            money(first.invest_amount),
            first.display_name
        )?;
        writeln!(out)?;

        for (rank, r) in self.items.iter().take(top).enumerate() {
            writeln!(
                out,
                "{:>3}. {:<10} {:<32} {:>14} {:>7.2}%",
                rank + 1,
                r.symbol,
                r.display_name,
                money(r.invest_amount),
                r.normalized_weight * 100.0
            )?;
        }

        if self.items.len() > top {
            writeln!(out, "     ... {} more", self.items.len() - top)?;
        }
        Ok(())
    }
}

/// `$1,234.50` style formatting.
fn money(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    // Past i64 range the cast saturates; print the plain value instead.
    if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
        return if amount < 0.0 {
            format!("-${:.2}", -amount)
        } else {
            format!("${amount:.2}")
        };
    }
    let cents = cents as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}
