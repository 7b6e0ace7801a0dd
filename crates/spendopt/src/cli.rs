//! CLI output and campaign selection
//!
//! Formats optimization results, batch summaries and fit diagnostics as
//! tables (human) or pretty JSON.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use serde::Serialize;
use spendopt_core::optimizer::{format_dollars, select_best};
use spendopt_core::{AnalysisType, FitDiagnostics, HistorySource, OptimizationResult};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    NoCampaigns {
        path: String,
    },
    UnknownCampaign {
        campaign: String,
        available: Vec<String>,
    },
    AmbiguousCampaign {
        available: Vec<String>,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NoCampaigns { path } => {
                write!(f, "No campaign history found in {}", path)
            }
            CliError::UnknownCampaign {
                campaign,
                available,
            } => {
                write!(
                    f,
                    "Campaign '{}' not found (available: {})",
                    campaign,
                    available.join(", ")
                )
            }
            CliError::AmbiguousCampaign { available } => {
                write!(
                    f,
                    "File holds {} campaigns, pick one with --campaign: {}",
                    available.len(),
                    available.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for CliError {}

// ============================================================================
// Campaign Selection
// ============================================================================

/// Resolve which campaign a single-campaign command works on
///
/// An explicit `--campaign` must exist; without one the source must hold
/// exactly one campaign.
pub fn select_campaign(
    source: &impl HistorySource,
    requested: Option<&str>,
    path: &str,
) -> Result<String, CliError> {
    let available = source.campaigns();

    match requested {
        Some(campaign) if available.iter().any(|c| c == campaign) => Ok(campaign.to_string()),
        Some(campaign) => Err(CliError::UnknownCampaign {
            campaign: campaign.to_string(),
            available,
        }),
        None => match available.as_slice() {
            [] => Err(CliError::NoCampaigns {
                path: path.to_string(),
            }),
            [only] => Ok(only.clone()),
            _ => Err(CliError::AmbiguousCampaign { available }),
        },
    }
}

// ============================================================================
// Formatting
// ============================================================================

#[derive(Serialize)]
struct CampaignOutput<'a, T: Serialize> {
    campaign: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

fn to_json<T: Serialize>(campaign: &str, body: &T) -> String {
    serde_json::to_string_pretty(&CampaignOutput { campaign, body })
        .unwrap_or_else(|_| "{}".to_string())
}

fn header(table: &mut Table, names: &[&str], no_color: bool) {
    if no_color {
        table.set_header(names.to_vec());
    } else {
        table.set_header(
            names
                .iter()
                .map(|name| Cell::new(name).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn analysis_cell(analysis: AnalysisType, no_color: bool) -> Cell {
    let cell = Cell::new(analysis.label());
    if no_color {
        return cell;
    }
    match analysis {
        AnalysisType::Advanced => cell.fg(Color::Green),
        AnalysisType::LowConfidence | AnalysisType::Basic => cell.fg(Color::Yellow),
        AnalysisType::InsufficientVariation => cell.fg(Color::Magenta),
        AnalysisType::Gathering => cell.fg(Color::DarkGrey),
    }
}

/// Format one campaign's result as table (human) or JSON
pub fn format_result(
    campaign: &str,
    result: &OptimizationResult,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(campaign, result);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Campaign", campaign], no_color);

    table.add_row(Row::from(vec![
        Cell::new("Analysis"),
        analysis_cell(result.analysis_type, no_color),
    ]));
    table.add_row(vec![
        "Optimal daily spend".to_string(),
        format_spend(result.optimal_daily_spend),
    ]);
    table.add_row(vec![
        "Current efficiency".to_string(),
        format!("{}%", result.current_efficiency),
    ]);
    table.add_row(vec![
        "Confidence".to_string(),
        format!("{}%", result.confidence_score),
    ]);
    table.add_row(vec![
        "Marginal leads/$".to_string(),
        format!("{:.4}", result.marginal_leads_per_dollar),
    ]);
    table.add_row(vec![
        "Projected lead change".to_string(),
        format!("{:+}/day", result.projected_lead_increase),
    ]);
    table.add_row(vec![
        "Recommendation".to_string(),
        result.recommendation.clone(),
    ]);

    table.to_string()
}

/// Format per-campaign results as table (human) or JSON array
pub fn format_batch_table(
    results: &[(String, OptimizationResult)],
    json: bool,
    no_color: bool,
) -> String {
    if json {
        let rows: Vec<CampaignOutput<'_, OptimizationResult>> = results
            .iter()
            .map(|(campaign, result)| CampaignOutput {
                campaign,
                body: result,
            })
            .collect();
        return serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());
    }

    if results.is_empty() {
        return "No campaigns found.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(
        &mut table,
        &[
            "Campaign",
            "Analysis",
            "Optimal",
            "Eff.",
            "Conf.",
            "Leads Δ",
            "Recommendation",
        ],
        no_color,
    );

    for (campaign, result) in results {
        table.add_row(Row::from(vec![
            Cell::new(truncate(campaign, 24)),
            analysis_cell(result.analysis_type, no_color),
            Cell::new(format_spend(result.optimal_daily_spend)),
            Cell::new(format!("{}%", result.current_efficiency)),
            Cell::new(format!("{}%", result.confidence_score)),
            Cell::new(format!("{:+}", result.projected_lead_increase)),
            Cell::new(&result.recommendation),
        ]));
    }

    table.to_string()
}

/// Format fit diagnostics as table (human) or JSON
pub fn format_fit(
    campaign: &str,
    diagnostics: &FitDiagnostics,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(campaign, diagnostics);
    }

    let mut lines = vec![];
    lines.push(format!("Campaign:            {}", campaign));
    lines.push(format!("Usable points:       {}", diagnostics.points));
    lines.push(format!(
        "Spend range:         {} - {}",
        format_spend(diagnostics.min_spend),
        format_spend(diagnostics.max_spend)
    ));
    lines.push(format!(
        "Variation required:  {}",
        format_spend(diagnostics.variation_threshold)
    ));
    lines.push(format!(
        "Analysis:            {}",
        diagnostics.analysis_type.label()
    ));

    if diagnostics.models.is_empty() {
        lines.push("\nNo curves fitted.".to_string());
        return lines.join("\n");
    }

    let best = select_best(&diagnostics.models);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Model", "R²", "Coefficients", "Apex"], no_color);

    for model in &diagnostics.models {
        let selected = best.is_some_and(|b| std::ptr::eq(b, model));
        let name = if selected {
            format!("{} *", model.kind())
        } else {
            model.kind().to_string()
        };
        let coefficients = model
            .coefficients()
            .iter()
            .map(|c| format!("{:.6}", c))
            .collect::<Vec<_>>()
            .join(", ");
        let apex = model
            .vertex()
            .map(format_spend)
            .unwrap_or_else(|| "-".to_string());

        let name_cell = if selected && !no_color {
            Cell::new(name).fg(Color::Green)
        } else {
            Cell::new(name)
        };
        table.add_row(Row::from(vec![
            name_cell,
            Cell::new(format!("{:.4}", model.r_squared())),
            Cell::new(coefficients),
            Cell::new(apex),
        ]));
    }

    lines.push(String::new());
    lines.push(table.to_string());
    lines.join("\n")
}

/// Dollars per day with cents below $1,000: `$87.50`, `$1,250`
fn format_spend(amount: f64) -> String {
    if amount.abs() < 1000.0 {
        format!("${:.2}", amount)
    } else {
        format_dollars(amount)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
