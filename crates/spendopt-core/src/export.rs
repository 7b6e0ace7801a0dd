//! Export of per-campaign optimization results
//!
//! Both formats keep the input order, which is campaign id order when the
//! results come from [`crate::HistoryStore::optimize_all`].

use anyhow::{Context, Result};
use serde::Serialize;
use spendopt_types::OptimizationResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CSV_HEADER: &str = "Campaign,Analysis,Optimal Daily Spend,Efficiency,Confidence,Marginal Leads/$,Projected Lead Increase,Recommendation";

/// Export optimization results to CSV
///
/// CSV columns: Campaign, Analysis, Optimal Daily Spend, Efficiency,
/// Confidence, Marginal Leads/$, Projected Lead Increase, Recommendation
///
/// # Errors
/// Returns error if file creation or write operations fail
pub fn export_results_to_csv(results: &[(String, OptimizationResult)], path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", CSV_HEADER).context("Failed to write CSV header")?;

    for (campaign, result) in results {
        writeln!(
            writer,
            "{},{},{:.2},{},{},{:.6},{},{}",
            csv_quote(campaign),
            result.analysis_type.as_str(),
            result.optimal_daily_spend,
            result.current_efficiency,
            result.confidence_score,
            result.marginal_leads_per_dollar,
            result.projected_lead_increase,
            csv_quote(&result.recommendation)
        )
        .with_context(|| format!("Failed to write row for campaign {}", campaign))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignResult<'a> {
    campaign: &'a str,
    #[serde(flatten)]
    result: &'a OptimizationResult,
}

/// Export optimization results to a pretty-printed JSON array
///
/// Each element is the result object with an extra `campaign` field.
pub fn export_results_to_json(results: &[(String, OptimizationResult)], path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let rows: Vec<CampaignResult<'_>> = results
        .iter()
        .map(|(campaign, result)| CampaignResult { campaign, result })
        .collect();

    let json =
        serde_json::to_string_pretty(&rows).context("Failed to serialize results to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Quote a CSV field, doubling embedded quotes
fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
