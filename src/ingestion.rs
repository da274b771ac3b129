use crate::error::{ProfitabilityError, Result};
use crate::schema::ReportConfig;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const DATE_COLUMN: &str = "Date";
pub const COMPANY_COLUMN: &str = "Account name";
pub const REVENUE_COLUMN: &str = "Billed total";
pub const COST_COLUMN: &str = "Paid total";

pub const REQUIRED_COLUMNS: [&str; 4] = [DATE_COLUMN, COMPANY_COLUMN, REVENUE_COLUMN, COST_COLUMN];

/// One untyped ledger row, already mapped onto the canonical column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among the data rows (the header is not counted).
    pub line: usize,
    pub date: String,
    pub company: String,
    pub revenue: String,
    pub cost: String,
}

impl RawRow {
    pub fn new(
        line: usize,
        date: impl Into<String>,
        company: impl Into<String>,
        revenue: impl Into<String>,
        cost: impl Into<String>,
    ) -> Self {
        Self {
            line,
            date: date.into(),
            company: company.into(),
            revenue: revenue.into(),
            cost: cost.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    company: usize,
    revenue: usize,
    cost: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        // Exact, case-sensitive match on the header text.
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ProfitabilityError::SchemaMismatch { missing });
        }

        Ok(Self {
            date: position(DATE_COLUMN).unwrap_or_default(),
            company: position(COMPANY_COLUMN).unwrap_or_default(),
            revenue: position(REVENUE_COLUMN).unwrap_or_default(),
            cost: position(COST_COLUMN).unwrap_or_default(),
        })
    }

    fn row(&self, line: usize, record: &StringRecord) -> RawRow {
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        RawRow {
            line,
            date: cell(self.date),
            company: cell(self.company),
            revenue: cell(self.revenue),
            cost: cell(self.cost),
        }
    }
}

/// Decodes single-byte Latin-1 text: each byte is the code point of equal value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Reads a delimited ledger into raw rows.
///
/// Missing required headers are fatal. Rows the CSV reader cannot decode are
/// skipped with a warning; short rows read their missing cells as empty.
pub fn read_ledger<R: Read>(mut reader: R, config: &ReportConfig) -> Result<Vec<RawRow>> {
    let delimiter = config.delimiter_byte()?;

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode_latin1(&bytes);

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;
    debug!("Ledger columns resolved: {:?}", columns);

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let line = idx + 1;
        match record {
            Ok(record) => rows.push(columns.row(line, &record)),
            Err(e) => warn!("Skipping unreadable ledger row {}: {}", line, e),
        }
    }

    info!("Read {} ledger rows", rows.len());
    Ok(rows)
}

pub fn read_ledger_file(path: &Path, config: &ReportConfig) -> Result<Vec<RawRow>> {
    info!("Reading ledger from {}", path.display());
    let file = File::open(path)?;
    read_ledger(file, config)
}
