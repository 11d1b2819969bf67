//! Derivation Engine: albumin-to-creatinine ratio (ACR) and estimated glomerular filtration
//! rate (eGFR), with their staging categories.
//!
//! Numeric edge cases (missing operands, a zero denominator, unrecognised sex) resolve to a
//! missing value and are filled later by the reconciler; they never abort the run.

use crate::error::{EtlError, EtlResult};
use crate::types::{DataSet, DataType, Field, Value};

use super::columns::{
    ACR, ACR_CATEGORY, AGE, EGFR, EGFR_CATEGORY, SERUM_CREATININE, SEX, URINARY_ALBUMIN,
    URINARY_CREATININE,
};
use super::recode::{SEX_FEMALE, SEX_MALE};

/// Round to one decimal, ties to even (the behaviour of the usual array-library `round(1)`).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// Albuminuria category (KDIGO A-stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlbuminuriaCategory {
    A1,
    A2,
    A3,
}

impl AlbuminuriaCategory {
    /// `< 30` → A1, `30..=300` → A2, `> 300` → A3.
    pub fn from_ratio(acr: f64) -> Self {
        if acr < 30.0 {
            Self::A1
        } else if acr <= 300.0 {
            Self::A2
        } else {
            Self::A3
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
        }
    }
}

/// Chronic kidney disease filtration category (KDIGO G-stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FiltrationCategory {
    G1,
    G2,
    G3a,
    G3b,
    G4,
    G5,
}

impl FiltrationCategory {
    pub fn from_egfr(egfr: f64) -> Self {
        if egfr >= 90.0 {
            Self::G1
        } else if egfr >= 60.0 {
            Self::G2
        } else if egfr >= 45.0 {
            Self::G3a
        } else if egfr >= 30.0 {
            Self::G3b
        } else if egfr >= 15.0 {
            Self::G4
        } else {
            Self::G5
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::G3a => "G3a",
            Self::G3b => "G3b",
            Self::G4 => "G4",
            Self::G5 => "G5",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Parse the recoded sex label. Anything else is unrecognised.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            SEX_MALE => Some(Self::Male),
            SEX_FEMALE => Some(Self::Female),
            _ => None,
        }
    }

    /// `(kappa, alpha, sex factor)` of the creatinine equation.
    fn egfr_coefficients(self) -> (f64, f64, f64) {
        match self {
            Self::Female => (0.7, -0.241, 1.012),
            Self::Male => (0.9, -0.302, 1.0),
        }
    }
}

/// Unit conversion applied to urinary creatinine before the ratio is taken.
pub fn rescale_urinary_creatinine(creatinine: f64) -> f64 {
    round1(creatinine * 0.01)
}

/// `albumin / creatinine` rounded to one decimal, where `creatinine` is already rescaled.
pub fn albumin_creatinine_ratio(albumin: Option<f64>, creatinine: Option<f64>) -> Option<f64> {
    let (albumin, creatinine) = (albumin?, creatinine?);
    if creatinine == 0.0 {
        return None;
    }
    let ratio = round1(albumin / creatinine);
    ratio.is_finite().then_some(ratio)
}

/// Race-free creatinine equation:
/// `142 · min(Scr/κ, 1)^α · max(Scr/κ, 1)^-1.200 · 0.9938^age · factor`, rounded to one decimal.
pub fn estimated_gfr(creatinine: Option<f64>, age: Option<f64>, sex: Option<Sex>) -> Option<f64> {
    let (creatinine, age, sex) = (creatinine?, age?, sex?);
    let (kappa, alpha, factor) = sex.egfr_coefficients();
    let rate = creatinine / kappa;
    let egfr = 142.0
        * rate.min(1.0).powf(alpha)
        * rate.max(1.0).powf(-1.200)
        * 0.9938_f64.powf(age)
        * factor;
    let egfr = round1(egfr);
    egfr.is_finite().then_some(egfr)
}

/// Rescale urinary creatinine in place and append `acr`, `acr_category`, `egfr` and
/// `egfr_category` to the linked table.
pub fn derive(mut ds: DataSet) -> EtlResult<DataSet> {
    let idx = |ds: &DataSet, name: &str| {
        ds.schema.index_of(name).ok_or_else(|| EtlError::SchemaMismatch {
            message: format!("derivation needs column '{name}'"),
        })
    };
    let creat_u = idx(&ds, URINARY_CREATININE)?;
    let albumin = idx(&ds, URINARY_ALBUMIN)?;
    let creat_s = idx(&ds, SERUM_CREATININE)?;
    let age = idx(&ds, AGE)?;
    let sex = idx(&ds, SEX)?;

    ds.update_column(creat_u, DataType::Float64, |v| {
        Value::from_f64(v.as_f64().map(rescale_urinary_creatinine))
    });

    let acr: Vec<Option<f64>> = ds
        .rows
        .iter()
        .map(|row| albumin_creatinine_ratio(row[albumin].as_f64(), row[creat_u].as_f64()))
        .collect();
    let egfr: Vec<Option<f64>> = ds
        .rows
        .iter()
        .map(|row| {
            let sex = row[sex].as_str().and_then(Sex::from_label);
            estimated_gfr(row[creat_s].as_f64(), row[age].as_f64(), sex)
        })
        .collect();

    let missing_acr = acr.iter().filter(|v| v.is_none()).count();
    let missing_egfr = egfr.iter().filter(|v| v.is_none()).count();
    tracing::debug!(rows = ds.row_count(), missing_acr, missing_egfr, "derived kidney indices");

    ds.push_column(
        Field::new(ACR_CATEGORY, DataType::Utf8),
        acr.iter()
            .map(|v| Value::from_label(v.map(|x| AlbuminuriaCategory::from_ratio(x).as_str())))
            .collect(),
    );
    ds.push_column(
        Field::new(ACR, DataType::Float64),
        acr.into_iter().map(Value::from_f64).collect(),
    );
    ds.push_column(
        Field::new(EGFR_CATEGORY, DataType::Utf8),
        egfr.iter()
            .map(|v| Value::from_label(v.map(|x| FiltrationCategory::from_egfr(x).as_str())))
            .collect(),
    );
    ds.push_column(
        Field::new(EGFR, DataType::Float64),
        egfr.into_iter().map(Value::from_f64).collect(),
    );

    Ok(ds)
}
