//! Column names: raw survey codes, their semantic names, and the fixed output order.

/// Subject identifier as it appears in every raw extract.
pub const RAW_KEY: &str = "SEQN_new";

pub const ID: &str = "id";

// Demographic
pub const ETHNIC_GROUP: &str = "ethnic_group";
pub const EDUCATION_LEVEL: &str = "education_level";
pub const MARITAL_STATUS: &str = "marital_status";
pub const BIRTH_COUNTRY: &str = "birth_country";
pub const EXAM_WEIGHT: &str = "exam_weight";
pub const INTERVIEW_WEIGHT: &str = "interview_weight";
pub const SAMPLING_PSU: &str = "sampling_psu";
pub const SAMPLING_STRATUM: &str = "sampling_stratum";

// Response (laboratory and examination)
pub const SERUM_CREATININE: &str = "serum_creatinine_mg_dl";
pub const URINARY_ALBUMIN: &str = "urinary_albumin_mg_l";
pub const URINARY_CREATININE: &str = "urinary_creatinine_g_l";
pub const WEIGHT: &str = "weight_kg";
pub const HEIGHT: &str = "height_cm";
pub const BMI: &str = "bmi";

// Questionnaire
pub const DIABETES: &str = "diabetes";
pub const HYPERTENSION: &str = "hypertension";
pub const HEART_FAILURE: &str = "heart_failure";
pub const CORONARY_DISEASE: &str = "coronary_disease";
pub const STROKE: &str = "stroke";
pub const CANCER: &str = "cancer";
pub const ALCOHOL_USE: &str = "alcohol_use";
pub const MODERATE_ACTIVITY: &str = "moderate_activity";
pub const VIGOROUS_ACTIVITY: &str = "vigorous_activity";

// Mortality
pub const MORTALITY: &str = "mortality";
pub const CAUSE_OF_DEATH: &str = "cause_of_death";

// Dietary
pub const AGE: &str = "age_years";
pub const SEX: &str = "sex";

// Derived
pub const ACR: &str = "acr";
pub const ACR_CATEGORY: &str = "acr_category";
pub const EGFR: &str = "egfr";
pub const EGFR_CATEGORY: &str = "egfr_category";

pub const DEMOGRAPHIC_RENAMES: &[(&str, &str)] = &[
    (RAW_KEY, ID),
    ("RIDRETH1", ETHNIC_GROUP),
    ("DMDEDUC2", EDUCATION_LEVEL),
    ("DMDMARTL", MARITAL_STATUS),
    ("DMDBORN4", BIRTH_COUNTRY),
    ("WTMEC2YR", EXAM_WEIGHT),
    ("WTINT2YR", INTERVIEW_WEIGHT),
    ("SDMVPSU", SAMPLING_PSU),
    ("SDMVSTRA", SAMPLING_STRATUM),
];

pub const RESPONSE_RENAMES: &[(&str, &str)] = &[
    (RAW_KEY, ID),
    ("LBXSCR", SERUM_CREATININE),
    ("URXUMA", URINARY_ALBUMIN),
    ("URXUCR", URINARY_CREATININE),
    ("BMXWT", WEIGHT),
    ("BMXHT", HEIGHT),
    ("BMXBMI", BMI),
    ("BPXSY1", "sbp_1"),
    ("BPXSY2", "sbp_2"),
    ("BPXSY3", "sbp_3"),
    ("BPXSY4", "sbp_4"),
    ("BPXDI1", "dbp_1"),
    ("BPXDI2", "dbp_2"),
    ("BPXDI3", "dbp_3"),
    ("BPXDI4", "dbp_4"),
];

pub const QUESTIONNAIRE_RENAMES: &[(&str, &str)] = &[
    (RAW_KEY, ID),
    ("DIQ010", DIABETES),
    ("BPQ020", HYPERTENSION),
    ("MCQ160B", HEART_FAILURE),
    ("MCQ160C", CORONARY_DISEASE),
    ("MCQ160F", STROKE),
    ("MCQ160M", CANCER),
    ("ALQ101", ALCOHOL_USE),
    ("PAQ650", MODERATE_ACTIVITY),
    ("PAQ665", VIGOROUS_ACTIVITY),
];

pub const MORTALITY_RENAMES: &[(&str, &str)] = &[
    (RAW_KEY, ID),
    ("MORTSTAT", MORTALITY),
    ("UCOD_LEADING", CAUSE_OF_DEATH),
];

pub const DIETARY_RENAMES: &[(&str, &str)] = &[(RAW_KEY, ID), ("RIDAGEYR", AGE), ("RIAGENDR", SEX)];

/// Output column order of the analytic table. Positional consumers depend on it.
pub const OUTPUT_COLUMNS: &[&str] = &[
    ID,
    AGE,
    SEX,
    ETHNIC_GROUP,
    SAMPLING_PSU,
    SAMPLING_STRATUM,
    INTERVIEW_WEIGHT,
    EXAM_WEIGHT,
    DIABETES,
    WEIGHT,
    HEIGHT,
    BMI,
    URINARY_CREATININE,
    URINARY_ALBUMIN,
    ACR,
    ACR_CATEGORY,
    MORTALITY,
    "sbp_1",
    "dbp_1",
    "sbp_2",
    "dbp_2",
    "sbp_3",
    "dbp_3",
    HYPERTENSION,
    MARITAL_STATUS,
    EGFR,
    EGFR_CATEGORY,
    SERUM_CREATININE,
    HEART_FAILURE,
    CORONARY_DISEASE,
    STROKE,
    EDUCATION_LEVEL,
    CANCER,
    BIRTH_COUNTRY,
    MODERATE_ACTIVITY,
    VIGOROUS_ACTIVITY,
    ALCOHOL_USE,
    CAUSE_OF_DEATH,
    "sbp_4",
    "dbp_4",
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn output_columns_are_unique_and_fixed_width() {
        assert_eq!(OUTPUT_COLUMNS.len(), 40);
        let unique: HashSet<_> = OUTPUT_COLUMNS.iter().collect();
        assert_eq!(unique.len(), OUTPUT_COLUMNS.len());
    }

    #[test]
    fn every_renamed_column_reaches_the_output() {
        for renames in [
            DEMOGRAPHIC_RENAMES,
            RESPONSE_RENAMES,
            QUESTIONNAIRE_RENAMES,
            MORTALITY_RENAMES,
            DIETARY_RENAMES,
        ] {
            for (_, semantic) in renames {
                assert!(OUTPUT_COLUMNS.contains(semantic), "{semantic} missing from output");
            }
        }
    }
}
