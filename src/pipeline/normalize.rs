//! Field Normalizer: raw code renames, categorical recodes, and weight rounding.

use crate::types::{DataSet, DataType, Value};

use super::columns::{
    DEMOGRAPHIC_RENAMES, DIETARY_RENAMES, EXAM_WEIGHT, INTERVIEW_WEIGHT, MARITAL_STATUS,
    MORTALITY_RENAMES, QUESTIONNAIRE_RENAMES, RESPONSE_RENAMES,
};
use super::derive::round1;
use super::recode::{
    self, RecodeMap, RemapPass, DEMOGRAPHIC_RECODES, DIETARY_RECODES, MORTALITY_RECODES,
    QUESTIONNAIRE_RECODES,
};
use super::sources::{SourceKind, SourceTables};

/// Columns rounded to one decimal during normalization.
const ROUNDED_WEIGHTS: &[&str] = &[EXAM_WEIGHT, INTERVIEW_WEIGHT];

impl SourceKind {
    fn renames(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Demographic => DEMOGRAPHIC_RENAMES,
            Self::Dietary => DIETARY_RENAMES,
            Self::Response => RESPONSE_RENAMES,
            Self::Questionnaire => QUESTIONNAIRE_RENAMES,
            Self::Mortality => MORTALITY_RENAMES,
        }
    }

    fn recodes(self) -> &'static [RecodeMap] {
        match self {
            Self::Demographic => DEMOGRAPHIC_RECODES,
            Self::Dietary => DIETARY_RECODES,
            Self::Questionnaire => QUESTIONNAIRE_RECODES,
            Self::Mortality => MORTALITY_RECODES,
            Self::Response => &[],
        }
    }
}

/// Normalize one raw source table: rename, remap marital status, apply labels, round weights.
pub fn normalize(kind: SourceKind, mut ds: DataSet) -> DataSet {
    ds.rename_columns(kind.renames());

    if let Some(idx) = ds.schema.index_of(MARITAL_STATUS) {
        remap_codes(&mut ds, idx, &recode::MARITAL_STATUS_REMAP);
    }

    for map in kind.recodes() {
        if let Some(idx) = ds.schema.index_of(map.column) {
            apply_recode(&mut ds, idx, map);
        }
    }

    for name in ROUNDED_WEIGHTS {
        if let Some(idx) = ds.schema.index_of(name) {
            ds.update_column(idx, DataType::Float64, |v| {
                Value::from_f64(v.as_f64().map(round1))
            });
        }
    }

    ds
}

/// Normalize all five sources.
pub fn normalize_all(tables: SourceTables) -> SourceTables {
    SourceTables {
        demographic: normalize(SourceKind::Demographic, tables.demographic),
        dietary: normalize(SourceKind::Dietary, tables.dietary),
        response: normalize(SourceKind::Response, tables.response),
        questionnaire: normalize(SourceKind::Questionnaire, tables.questionnaire),
        mortality: normalize(SourceKind::Mortality, tables.mortality),
    }
}

fn remap_codes(ds: &mut DataSet, idx: usize, passes: &[RemapPass]) {
    ds.update_column(idx, DataType::Int64, |v| match v.as_i64() {
        Some(code) => Value::Int64(recode::remap(code, passes)),
        None => Value::Null,
    });
}

fn apply_recode(ds: &mut DataSet, idx: usize, map: &RecodeMap) {
    let mut unmapped = 0usize;
    ds.update_column(idx, DataType::Utf8, |v| match v.as_i64() {
        Some(code) => {
            let label = map.label(code);
            if label.is_none() {
                unmapped += 1;
            }
            Value::from_label(label)
        }
        None => Value::Null,
    });
    if unmapped > 0 {
        tracing::warn!(column = map.column, unmapped, "codes without a label recoded to missing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::columns::{ETHNIC_GROUP, ID, SEX};
    use crate::types::{Field, Schema};

    fn raw_demographic(rows: Vec<Vec<Value>>) -> DataSet {
        DataSet::new(SourceKind::Demographic.raw_schema(), rows)
    }

    fn demo_row(id: &str, ethnic: i64, marital: Value, weight: f64) -> Vec<Value> {
        vec![
            Value::Utf8(id.into()),
            Value::Int64(ethnic),
            Value::Int64(3),
            marital,
            Value::Int64(1),
            Value::Float64(weight),
            Value::Float64(1234.56),
            Value::Float64(1.0),
            Value::Float64(83.0),
        ]
    }

    #[test]
    fn demographic_is_renamed_recoded_and_rounded() {
        let ds = raw_demographic(vec![
            demo_row("1", 3, Value::Int64(5), 10_000.04),
            demo_row("2", 8, Value::Int64(6), 0.25),
            demo_row("3", 1, Value::Null, 7.0),
        ]);

        let out = normalize(SourceKind::Demographic, ds);
        let col = |name: &str| out.schema.index_of(name).unwrap();

        assert_eq!(out.schema.fields[0].name, ID);
        assert_eq!(out.rows[0][col(ETHNIC_GROUP)], Value::Utf8("Non-Hispanic White".into()));
        assert_eq!(out.rows[1][col(ETHNIC_GROUP)], Value::Null);
        assert_eq!(out.rows[0][col(MARITAL_STATUS)], Value::Utf8("Never married".into()));
        assert_eq!(
            out.rows[1][col(MARITAL_STATUS)],
            Value::Utf8("Married/Living with partner".into())
        );
        assert_eq!(out.rows[2][col(MARITAL_STATUS)], Value::Null);
        assert_eq!(out.rows[0][col(EXAM_WEIGHT)], Value::Float64(10_000.0));
        assert_eq!(out.rows[1][col(EXAM_WEIGHT)], Value::Float64(0.2));
        assert_eq!(out.rows[0][col(INTERVIEW_WEIGHT)], Value::Float64(1234.6));
        assert_eq!(out.schema.field(MARITAL_STATUS).unwrap().data_type, DataType::Utf8);
    }

    #[test]
    fn dietary_sex_labels() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("SEQN_new", DataType::Utf8),
                Field::new("RIDAGEYR", DataType::Float64),
                Field::new("RIAGENDR", DataType::Int64),
            ]),
            vec![
                vec![Value::Utf8("1".into()), Value::Float64(40.0), Value::Int64(2)],
                vec![Value::Utf8("2".into()), Value::Float64(41.0), Value::Int64(3)],
            ],
        );
        let out = normalize(SourceKind::Dietary, ds);
        let sex = out.schema.index_of(SEX).unwrap();
        assert_eq!(out.rows[0][sex], Value::Utf8(recode::SEX_FEMALE.into()));
        assert_eq!(out.rows[1][sex], Value::Null);
    }

    #[test]
    fn response_only_renames() {
        let schema = SourceKind::Response.raw_schema();
        let row: Vec<Value> = (0..schema.fields.len())
            .map(|i| if i == 0 { Value::Utf8("9".into()) } else { Value::Float64(i as f64 + 0.04) })
            .collect();
        let out = normalize(SourceKind::Response, DataSet::new(schema, vec![row.clone()]));
        assert_eq!(out.rows[0], row);
        assert_eq!(out.schema.fields[1].name, "serum_creatinine_mg_dl");
        assert_eq!(out.schema.fields[7].name, "sbp_1");
    }
}
