//! Source Reader: the five raw extracts, each restricted to its column allow-list.

use std::path::Path;

use crate::error::{EtlError, EtlResult};
use crate::ingestion::{ingest_from_path, CellPolicy, IngestionFormat, IngestionOptions};
use crate::types::{DataSet, DataType, Field, Schema};

use super::columns::RAW_KEY;

use DataType::{Float64, Int64};

/// One of the five survey extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Demographic,
    Dietary,
    Response,
    Questionnaire,
    Mortality,
}

impl SourceKind {
    /// All sources, in read order.
    pub const ALL: [SourceKind; 5] = [
        Self::Demographic,
        Self::Dietary,
        Self::Response,
        Self::Questionnaire,
        Self::Mortality,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Demographic => "demographic",
            Self::Dietary => "dietary",
            Self::Response => "response",
            Self::Questionnaire => "questionnaire",
            Self::Mortality => "mortality",
        }
    }

    /// File backing this source inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Demographic => "demographics_unclean.csv",
            Self::Dietary => "dietary_unclean.csv",
            Self::Response => "response_unclean.csv",
            Self::Questionnaire => "questionnaire_unclean.csv",
            Self::Mortality => "mortality_unclean.csv",
        }
    }

    /// Allow-listed raw columns (after the key) and the type each is parsed as.
    fn columns(self) -> &'static [(&'static str, DataType)] {
        match self {
            Self::Demographic => &[
                ("RIDRETH1", Int64),
                ("DMDEDUC2", Int64),
                ("DMDMARTL", Int64),
                ("DMDBORN4", Int64),
                ("WTMEC2YR", Float64),
                ("WTINT2YR", Float64),
                ("SDMVPSU", Float64),
                ("SDMVSTRA", Float64),
            ],
            Self::Dietary => &[("RIDAGEYR", Float64), ("RIAGENDR", Int64)],
            Self::Response => &[
                ("LBXSCR", Float64),
                ("URXUMA", Float64),
                ("URXUCR", Float64),
                ("BMXWT", Float64),
                ("BMXHT", Float64),
                ("BMXBMI", Float64),
                ("BPXSY1", Float64),
                ("BPXSY2", Float64),
                ("BPXSY3", Float64),
                ("BPXSY4", Float64),
                ("BPXDI1", Float64),
                ("BPXDI2", Float64),
                ("BPXDI3", Float64),
                ("BPXDI4", Float64),
            ],
            Self::Questionnaire => &[
                ("DIQ010", Int64),
                ("BPQ020", Int64),
                ("MCQ160B", Int64),
                ("MCQ160C", Int64),
                ("MCQ160F", Int64),
                ("MCQ160M", Int64),
                ("ALQ101", Int64),
                ("PAQ650", Int64),
                ("PAQ665", Int64),
            ],
            Self::Mortality => &[("MORTSTAT", Int64), ("UCOD_LEADING", Int64)],
        }
    }

    /// Schema used to read the raw file: the key as text followed by the allow-list.
    pub fn raw_schema(self) -> Schema {
        let mut fields = vec![Field::new(RAW_KEY, DataType::Utf8)];
        fields.extend(
            self.columns()
                .iter()
                .map(|&(name, data_type)| Field::new(name, data_type)),
        );
        Schema::new(fields)
    }
}

/// The five raw extracts of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTables {
    pub demographic: DataSet,
    pub dietary: DataSet,
    pub response: DataSet,
    pub questionnaire: DataSet,
    pub mortality: DataSet,
}

/// Read one source from `data_dir`.
///
/// Fails with [`EtlError::SourceNotFound`] naming the file when it is absent, and with
/// [`EtlError::SchemaMismatch`] when an allow-listed column is missing from its header.
/// Cells that do not parse as their column type are read as missing.
pub fn read_source(
    data_dir: &Path,
    kind: SourceKind,
    options: &IngestionOptions,
) -> EtlResult<DataSet> {
    let path = data_dir.join(kind.file_name());
    if !path.is_file() {
        tracing::error!(source = kind.name(), path = %path.display(), "source file not found");
        return Err(EtlError::SourceNotFound {
            source_name: kind.name().to_string(),
            path,
        });
    }

    let options = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        cell_policy: CellPolicy::Lenient,
        ..options.clone()
    };
    let ds = ingest_from_path(&path, &kind.raw_schema(), &options)?;
    tracing::debug!(source = kind.name(), rows = ds.row_count(), "source read");
    Ok(ds)
}

/// Read all five sources, failing on the first absent or malformed one.
pub fn read_sources(data_dir: &Path, options: &IngestionOptions) -> EtlResult<SourceTables> {
    Ok(SourceTables {
        demographic: read_source(data_dir, SourceKind::Demographic, options)?,
        dietary: read_source(data_dir, SourceKind::Dietary, options)?,
        response: read_source(data_dir, SourceKind::Response, options)?,
        questionnaire: read_source(data_dir, SourceKind::Questionnaire, options)?,
        mortality: read_source(data_dir, SourceKind::Mortality, options)?,
    })
}
