//! Campaign history parser for JSON and CSV exports
//!
//! Accepted layouts:
//! - JSON array of points: `[{"date": "...", "adSpend": 120.0, "leads": 3}, ...]`
//! - JSON object keyed by campaign: `{"campaigns": {"search-us": [...], ...}}`
//! - CSV with a header row: `date,adSpend,leads[,campaign]`
//!
//! Single-campaign files are keyed by the file stem. Rows that do not parse
//! are skipped individually in both formats.

use crate::error::{CoreError, LoadError, LoadReport};
use serde::de::Error as _;
use serde_json::Value;
use spendopt_types::HistoryPoint;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where a skipped row sat in its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLocation {
    /// 1-based CSV line
    Line(usize),
    /// 0-based index into a JSON points array
    Element {
        campaign: Option<String>,
        index: usize,
    },
}

impl fmt::Display for RowLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLocation::Line(line) => write!(f, "line {}", line),
            RowLocation::Element {
                campaign: None,
                index,
            } => write!(f, "element [{}]", index),
            RowLocation::Element {
                campaign: Some(campaign),
                index,
            } => write!(f, "campaigns.{}[{}]", campaign, index),
        }
    }
}

/// A row dropped while reading a history export
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub location: RowLocation,
    pub message: String,
}

/// Parsed history, one series per campaign, each ordered newest-first
#[derive(Debug, Clone, Default)]
pub struct HistoryFile {
    pub path: PathBuf,
    pub campaigns: BTreeMap<String, Vec<HistoryPoint>>,
    pub skipped: Vec<SkippedRow>,
}

impl HistoryFile {
    pub fn campaign(&self, id: &str) -> Option<&[HistoryPoint]> {
        self.campaigns.get(id).map(Vec::as_slice)
    }

    pub fn campaign_ids(&self) -> impl Iterator<Item = &str> {
        self.campaigns.keys().map(String::as_str)
    }

    /// The only campaign in the file, if there is exactly one
    pub fn single(&self) -> Option<(&str, &[HistoryPoint])> {
        if self.campaigns.len() != 1 {
            return None;
        }
        self.campaigns
            .iter()
            .next()
            .map(|(id, points)| (id.as_str(), points.as_slice()))
    }

    pub fn point_count(&self) -> usize {
        self.campaigns.values().map(Vec::len).sum()
    }
}

/// Supported file layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    Json,
    Csv,
}

impl HistoryFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Parser for campaign history exports
#[derive(Debug, Default)]
pub struct HistoryParser;

impl HistoryParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a history file
    pub async fn parse(&self, path: &Path) -> Result<HistoryFile, CoreError> {
        let format = HistoryFormat::from_path(path).ok_or_else(|| CoreError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let file = self.parse_str(&content, format, path)?;
        debug!(
            path = %path.display(),
            campaigns = file.campaigns.len(),
            points = file.point_count(),
            skipped = file.skipped.len(),
            "Parsed history file"
        );
        Ok(file)
    }

    /// Parse in-memory content; `path` names the source and the default campaign
    pub fn parse_str(
        &self,
        content: &str,
        format: HistoryFormat,
        path: &Path,
    ) -> Result<HistoryFile, CoreError> {
        let default_campaign = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("campaign")
            .to_string();

        let (mut campaigns, skipped) = match format {
            HistoryFormat::Json => parse_json(content, path, default_campaign)?,
            HistoryFormat::Csv => parse_csv(content, path, &default_campaign)?,
        };

        for points in campaigns.values_mut() {
            sort_newest_first(points);
        }

        Ok(HistoryFile {
            path: path.to_path_buf(),
            campaigns,
            skipped,
        })
    }

    /// Parse with graceful degradation, recording problems in LoadReport
    pub async fn parse_graceful(
        &self,
        path: &Path,
        report: &mut LoadReport,
    ) -> Option<HistoryFile> {
        match self.parse(path).await {
            Ok(file) => {
                report.files_loaded += 1;
                report.points_loaded += file.point_count();
                report.rows_skipped += file.skipped.len();
                for row in &file.skipped {
                    report.add_warning(
                        path.display().to_string(),
                        format!("{} skipped: {}", row.location, row.message),
                    );
                }
                Some(file)
            }
            Err(e) => {
                report.add_error(LoadError::from_core_error(path.display().to_string(), &e));
                None
            }
        }
    }
}

type ParseOutcome = (BTreeMap<String, Vec<HistoryPoint>>, Vec<SkippedRow>);

fn parse_json(
    content: &str,
    path: &Path,
    default_campaign: String,
) -> Result<ParseOutcome, CoreError> {
    let json_error = |source: serde_json::Error| CoreError::JsonParse {
        path: path.to_path_buf(),
        message: source.to_string(),
        source,
    };

    let root: Value = serde_json::from_str(content).map_err(json_error)?;
    let mut campaigns = BTreeMap::new();
    let mut skipped = Vec::new();

    match root {
        Value::Array(rows) => {
            let points = json_points(rows, None, path, &mut skipped);
            campaigns.insert(default_campaign, points);
        }
        Value::Object(mut root) => {
            let Some(Value::Object(by_campaign)) = root.remove("campaigns") else {
                return Err(json_error(serde_json::Error::custom(
                    "expected an array of points or a \"campaigns\" object",
                )));
            };
            for (campaign, rows) in by_campaign {
                let Value::Array(rows) = rows else {
                    return Err(json_error(serde_json::Error::custom(format!(
                        "campaign \"{campaign}\" is not an array of points"
                    ))));
                };
                let points = json_points(rows, Some(&campaign), path, &mut skipped);
                campaigns.insert(campaign, points);
            }
        }
        _ => {
            return Err(json_error(serde_json::Error::custom(
                "expected an array of points or a \"campaigns\" object",
            )))
        }
    }

    Ok((campaigns, skipped))
}

/// Convert each JSON element on its own so one bad row does not sink the file
fn json_points(
    rows: Vec<Value>,
    campaign: Option<&str>,
    path: &Path,
    skipped: &mut Vec<SkippedRow>,
) -> Vec<HistoryPoint> {
    let mut points = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<HistoryPoint>(row) {
            Ok(point) => points.push(point),
            Err(e) => {
                let location = RowLocation::Element {
                    campaign: campaign.map(str::to_string),
                    index,
                };
                warn!(path = %path.display(), %location, error = %e, "Skipping JSON row");
                skipped.push(SkippedRow {
                    location,
                    message: e.to_string(),
                });
            }
        }
    }
    points
}

/// Column positions resolved from the CSV header
struct CsvColumns {
    date: usize,
    ad_spend: usize,
    leads: usize,
    campaign: Option<usize>,
}

impl CsvColumns {
    fn from_header(header: &str, path: &Path) -> Result<Self, CoreError> {
        let names: Vec<String> = split_csv_line(header)
            .iter()
            .map(|h| h.to_ascii_lowercase().replace(['_', ' '], ""))
            .collect();

        let missing = |column: &str| CoreError::CsvParse {
            path: path.to_path_buf(),
            line_number: 1,
            message: format!("header has no '{column}' column"),
        };

        Ok(Self {
            date: column_index(&names, &["date", "day"]).ok_or_else(|| missing("date"))?,
            ad_spend: column_index(&names, &["adspend", "spend"])
                .ok_or_else(|| missing("adSpend"))?,
            leads: column_index(&names, &["leads"]).ok_or_else(|| missing("leads"))?,
            campaign: column_index(&names, &["campaign", "campaignid"]),
        })
    }
}

fn column_index(names: &[String], wanted: &[&str]) -> Option<usize> {
    names.iter().position(|n| wanted.contains(&n.as_str()))
}

fn parse_csv(
    content: &str,
    path: &Path,
    default_campaign: &str,
) -> Result<ParseOutcome, CoreError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(CoreError::CsvParse {
            path: path.to_path_buf(),
            line_number: 1,
            message: "file is empty".to_string(),
        });
    };
    let columns = CsvColumns::from_header(header, path)?;

    let mut campaigns: BTreeMap<String, Vec<HistoryPoint>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (line_number, line) in lines {
        match parse_csv_row(line, &columns) {
            Ok((campaign, point)) => campaigns
                .entry(campaign.unwrap_or_else(|| default_campaign.to_string()))
                .or_default()
                .push(point),
            Err(message) => {
                warn!(path = %path.display(), line_number, %message, "Skipping CSV row");
                skipped.push(SkippedRow {
                    location: RowLocation::Line(line_number),
                    message,
                });
            }
        }
    }

    Ok((campaigns, skipped))
}

fn parse_csv_row(
    line: &str,
    columns: &CsvColumns,
) -> Result<(Option<String>, HistoryPoint), String> {
    let fields = split_csv_line(line);
    let field = |idx: usize, name: &str| {
        fields
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| format!("missing '{name}' field"))
    };

    let date = field(columns.date, "date")?.to_string();
    let spend_raw = field(columns.ad_spend, "adSpend")?;
    let ad_spend: f64 = spend_raw
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .map_err(|_| format!("invalid adSpend '{spend_raw}'"))?;
    let leads_raw = field(columns.leads, "leads")?;
    let leads: i64 = leads_raw
        .parse()
        .map_err(|_| format!("invalid leads '{leads_raw}'"))?;
    let campaign = columns
        .campaign
        .and_then(|idx| fields.get(idx))
        .filter(|c| !c.is_empty())
        .cloned();

    Ok((campaign, HistoryPoint::new(date, ad_spend, leads)))
}

/// Split a CSV line on commas, honouring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Newest-first by date when every date is ISO; otherwise keep file order
fn sort_newest_first(points: &mut [HistoryPoint]) {
    let dates: Option<Vec<_>> = points.iter().map(HistoryPoint::parsed_date).collect();
    let Some(dates) = dates else {
        debug!("History dates are not all ISO, keeping file order");
        return;
    };

    let mut keyed: Vec<_> = dates.into_iter().zip(points.iter().cloned()).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    for (slot, (_, point)) in points.iter_mut().zip(keyed) {
        *slot = point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_parse_json_array() {
        let file = temp_file(
            ".json",
            r#"[
                {"date": "2026-03-01", "adSpend": 100.0, "leads": 4},
                {"date": "2026-03-03", "adSpend": 150.0, "leads": 6},
                {"date": "2026-03-02", "adSpend": 120.0, "leads": 5}
            ]"#,
        );

        let history = HistoryParser::new().parse(file.path()).await.unwrap();
        let (_, points) = history.single().unwrap();

        assert_eq!(points.len(), 3);
        // Sorted newest-first
        assert_eq!(points[0].date, "2026-03-03");
        assert_eq!(points[2].date, "2026-03-01");
    }

    #[tokio::test]
    async fn test_parse_json_campaigns() {
        let file = temp_file(
            ".json",
            r#"{"campaigns": {
                "search": [{"date": "2026-03-01", "adSpend": 100.0, "leads": 4}],
                "social": [{"date": "2026-03-01", "adSpend": 80.0, "leads": 1}]
            }}"#,
        );

        let history = HistoryParser::new().parse(file.path()).await.unwrap();
        let ids: Vec<_> = history.campaign_ids().collect();
        assert_eq!(ids, vec!["search", "social"]);
        assert!(history.single().is_none());
        assert_eq!(history.campaign("social").unwrap()[0].ad_spend, 80.0);
    }

    #[tokio::test]
    async fn test_parse_json_skips_bad_row_keeps_neighbours() {
        let file = temp_file(
            ".json",
            r#"[
                {"date": "2026-03-01", "adSpend": 100.0, "leads": 4},
                {"date": "2026-03-02", "adSpend": null, "leads": 5},
                {"date": "2026-03-03", "adSpend": 150.0, "leads": 6}
            ]"#,
        );
        let mut report = LoadReport::new();

        let history = HistoryParser::new()
            .parse_graceful(file.path(), &mut report)
            .await
            .unwrap();

        let (_, points) = history.single().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2026-03-03");
        assert_eq!(points[1].date, "2026-03-01");
        assert_eq!(
            history.skipped[0].location,
            RowLocation::Element {
                campaign: None,
                index: 1
            }
        );

        assert_eq!(report.files_loaded, 1);
        assert_eq!(report.points_loaded, 2);
        assert_eq!(report.rows_skipped, 1);
        let warning = report.warnings().next().unwrap();
        assert!(warning.message.starts_with("element [1] skipped: invalid type: null"));
    }

    #[tokio::test]
    async fn test_parse_json_campaign_bad_row_names_campaign() {
        let file = temp_file(
            ".json",
            r#"{"campaigns": {
                "search": [{"date": "2026-03-01", "adSpend": 100.0, "leads": 4}],
                "social": [
                    {"date": "2026-03-01", "adSpend": 80.0, "leads": "many"},
                    {"date": "2026-03-02", "adSpend": 90.0, "leads": 2}
                ]
            }}"#,
        );

        let history = HistoryParser::new().parse(file.path()).await.unwrap();
        assert_eq!(history.campaign("search").unwrap().len(), 1);
        assert_eq!(history.campaign("social").unwrap().len(), 1);
        assert_eq!(history.skipped.len(), 1);
        assert_eq!(history.skipped[0].location.to_string(), "campaigns.social[0]");
    }

    #[tokio::test]
    async fn test_parse_json_syntax_error_keeps_position() {
        let file = temp_file(".json", "[\n  {\"date\": \"2026-03-01\",, }\n]");
        let result = HistoryParser::new().parse(file.path()).await;
        match result {
            Err(CoreError::JsonParse { message, .. }) => {
                assert!(message.contains("line 2"), "message was {message}")
            }
            other => panic!("expected JsonParse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_rejects_unknown_layout() {
        let result = HistoryParser::new().parse_str(
            r#"{"points": []}"#,
            HistoryFormat::Json,
            Path::new("h.json"),
        );
        assert!(matches!(result, Err(CoreError::JsonParse { .. })));

        let result = HistoryParser::new().parse_str(
            r#"{"campaigns": {"search": 5}}"#,
            HistoryFormat::Json,
            Path::new("h.json"),
        );
        assert!(matches!(result, Err(CoreError::JsonParse { .. })));
    }

    #[tokio::test]
    async fn test_parse_csv_skips_bad_rows() {
        let file = temp_file(
            ".csv",
            "date,ad_spend,leads\n\
             2026-03-01,100,4\n\
             2026-03-02,abc,4\n\
             \n\
             2026-03-03,\"$1,200.50\",9\n",
        );

        let history = HistoryParser::new().parse(file.path()).await.unwrap();
        let (_, points) = history.single().unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].ad_spend, 1200.5);
        assert_eq!(history.skipped.len(), 1);
        assert_eq!(history.skipped[0].location, RowLocation::Line(3));
    }

    #[tokio::test]
    async fn test_parse_csv_campaign_column() {
        let file = temp_file(
            ".csv",
            "Campaign,Date,AdSpend,Leads\n\
             search,2026-03-01,100,4\n\
             social,2026-03-01,50,1\n\
             search,2026-03-02,110,5\n",
        );

        let history = HistoryParser::new().parse(file.path()).await.unwrap();
        assert_eq!(history.campaign("search").unwrap().len(), 2);
        assert_eq!(history.campaign("social").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_parse_csv_missing_column() {
        let file = temp_file(".csv", "date,spend\n2026-03-01,100\n");
        let result = HistoryParser::new().parse(file.path()).await;
        assert!(matches!(
            result,
            Err(CoreError::CsvParse { line_number: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_parse_missing_file() {
        let result = HistoryParser::new()
            .parse(Path::new("/nonexistent/history.json"))
            .await;
        assert!(matches!(result, Err(CoreError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_parse_unsupported_extension() {
        let file = temp_file(".xlsx", "whatever");
        let result = HistoryParser::new().parse(file.path()).await;
        assert!(matches!(result, Err(CoreError::UnsupportedFormat { .. })));
    }

    #[tokio::test]
    async fn test_parse_graceful_records_errors() {
        let file = temp_file(".json", "not valid json");
        let mut report = LoadReport::new();

        let result = HistoryParser::new()
            .parse_graceful(file.path(), &mut report)
            .await;

        assert!(result.is_none());
        assert!(!report.errors.is_empty());
        assert!(report.errors[0].suggestion.is_some());
    }

    #[tokio::test]
    async fn test_parse_graceful_counts_skipped_rows() {
        let file = temp_file(
            ".csv",
            "date,adSpend,leads\n2026-03-01,100,x\n2026-03-02,90,3\n",
        );
        let mut report = LoadReport::new();

        let history = HistoryParser::new()
            .parse_graceful(file.path(), &mut report)
            .await
            .unwrap();

        assert_eq!(history.point_count(), 1);
        assert_eq!(report.points_loaded, 1);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_non_iso_dates_keep_file_order() {
        let parser = HistoryParser::new();
        let history = parser
            .parse_str(
                "date,adSpend,leads\nMon,10,1\nTue,20,2\n",
                HistoryFormat::Csv,
                Path::new("weekly.csv"),
            )
            .unwrap();
        let points = history.campaign("weekly").unwrap();
        assert_eq!(points[0].date, "Mon");
        assert_eq!(points[1].date, "Tue");
    }

    #[test]
    fn test_split_csv_line_quotes() {
        assert_eq!(
            split_csv_line(r#"a,"b,c","d""e""#),
            vec!["a".to_string(), "b,c".to_string(), "d\"e".to_string()]
        );
    }
}
