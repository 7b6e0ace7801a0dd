//! Human-readable recommendation text
//!
//! The engine decides a [`SpendAction`]; this module only words it.

use spendopt_types::SpendAction;

/// Render an action as the sentence shown in the dashboard tooltip
pub fn describe(action: &SpendAction) -> String {
    match action {
        SpendAction::Collecting => {
            "Collecting data - need more days with ad spend before optimizing".to_string()
        }
        SpendAction::VarySpend { target } => format!(
            "Vary daily spend by ±20% to enable optimization (try {}/day)",
            format_dollars(*target)
        ),
        SpendAction::Increase { by, .. } => format!("Increase by {}/day", format_dollars(*by)),
        SpendAction::Decrease { by, .. } => format!("Decrease by {}/day", format_dollars(*by)),
        SpendAction::Hold { .. } => "Current spend is in the optimal spend range".to_string(),
    }
}

/// Whole dollars with thousands separators: `$1,250`
pub fn format_dollars(amount: f64) -> String {
    let rounded = amount.round().abs() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount.round() < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}")
}
