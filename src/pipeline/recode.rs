//! Static recode tables: survey integer codes to display labels.
//!
//! Each table is plain data so it can be checked on its own. Codes missing from a table
//! recode to a missing value, never to an error.

use super::columns;

pub const YES: &str = "Yes";
pub const NO: &str = "No";
pub const BORDERLINE: &str = "Borderline";
pub const REFUSED: &str = "Refused";
pub const DONT_KNOW: &str = "Don't know";

pub const SEX_MALE: &str = "Male";
pub const SEX_FEMALE: &str = "Female";

/// Integer code to label mapping for one categorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecodeMap {
    /// Semantic column the table applies to.
    pub column: &'static str,
    pub entries: &'static [(i64, &'static str)],
}

impl RecodeMap {
    pub fn label(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find_map(|&(c, label)| (c == code).then_some(label))
    }
}

/// One substitution pass over a code column. Every cell is rewritten at most once per pass,
/// so `{5 → 12, 12 → 3}` inside a single pass would not chain.
pub type RemapPass = &'static [(i64, i64)];

/// Marital status is collapsed in two passes before its labels are applied.
///
/// Pass one folds "living with partner" into "married" and "divorced"/"separated" into
/// "widowed", and parks "never married" on the unused code 12; pass two moves 12 to 3,
/// which pass one has already vacated.
pub const MARITAL_STATUS_REMAP: [RemapPass; 2] = [&[(6, 1), (5, 12), (3, 2), (4, 2)], &[(12, 3)]];

/// Apply `passes` to `code` in order.
pub fn remap(code: i64, passes: &[RemapPass]) -> i64 {
    passes.iter().fold(code, |code, pass| {
        pass.iter()
            .find_map(|&(from, to)| (from == code).then_some(to))
            .unwrap_or(code)
    })
}

pub const ETHNIC_GROUP: RecodeMap = RecodeMap {
    column: columns::ETHNIC_GROUP,
    entries: &[
        (1, "Mexican American"),
        (2, "Other Hispanic"),
        (3, "Non-Hispanic White"),
        (4, "Non-Hispanic Black"),
        (5, "Other race, including multi-racial"),
    ],
};

pub const EDUCATION_LEVEL: RecodeMap = RecodeMap {
    column: columns::EDUCATION_LEVEL,
    entries: &[
        (1, "Less than 9th grade"),
        (2, "9-11th grade (includes 12th grade with no diploma)"),
        (3, "High school graduate/GED"),
        (4, "Some college or AA degree"),
        (5, "College graduate or above"),
        (7, REFUSED),
        (9, DONT_KNOW),
    ],
};

pub const MARITAL_STATUS: RecodeMap = RecodeMap {
    column: columns::MARITAL_STATUS,
    entries: &[
        (1, "Married/Living with partner"),
        (2, "Widowed/Divorced/Separated"),
        (3, "Never married"),
        (77, REFUSED),
        (99, DONT_KNOW),
    ],
};

pub const BIRTH_COUNTRY: RecodeMap = RecodeMap {
    column: columns::BIRTH_COUNTRY,
    entries: &[
        (1, "United States/Washington DC"),
        (2, "Mexico"),
        (3, "Other country"),
        (7, REFUSED),
        (9, DONT_KNOW),
    ],
};

pub const DIABETES: RecodeMap = RecodeMap {
    column: columns::DIABETES,
    entries: &[(1, YES), (2, NO), (3, BORDERLINE), (7, REFUSED), (9, DONT_KNOW)],
};

pub const HYPERTENSION: RecodeMap = RecodeMap {
    column: columns::HYPERTENSION,
    entries: &[(1, YES), (2, NO), (9, DONT_KNOW)],
};

const YES_NO_REFUSED: &[(i64, &str)] = &[(1, YES), (2, NO), (7, REFUSED), (9, DONT_KNOW)];

pub const HEART_FAILURE: RecodeMap = RecodeMap {
    column: columns::HEART_FAILURE,
    entries: YES_NO_REFUSED,
};

pub const CORONARY_DISEASE: RecodeMap = RecodeMap {
    column: columns::CORONARY_DISEASE,
    entries: YES_NO_REFUSED,
};

pub const STROKE: RecodeMap = RecodeMap {
    column: columns::STROKE,
    entries: YES_NO_REFUSED,
};

pub const CANCER: RecodeMap = RecodeMap {
    column: columns::CANCER,
    entries: YES_NO_REFUSED,
};

pub const ALCOHOL_USE: RecodeMap = RecodeMap {
    column: columns::ALCOHOL_USE,
    entries: &[(1, YES), (2, NO), (9, DONT_KNOW)],
};

pub const MODERATE_ACTIVITY: RecodeMap = RecodeMap {
    column: columns::MODERATE_ACTIVITY,
    entries: YES_NO_REFUSED,
};

pub const VIGOROUS_ACTIVITY: RecodeMap = RecodeMap {
    column: columns::VIGOROUS_ACTIVITY,
    entries: YES_NO_REFUSED,
};

pub const MORTALITY: RecodeMap = RecodeMap {
    column: columns::MORTALITY,
    entries: &[(0, "Alive"), (1, "Deceased")],
};

pub const CAUSE_OF_DEATH: RecodeMap = RecodeMap {
    column: columns::CAUSE_OF_DEATH,
    entries: &[
        (1, "Diseases of heart"),
        (2, "Malignant neoplasms"),
        (3, "Chronic lower respiratory diseases"),
        (4, "Accidents (unintentional injuries)"),
        (5, "Cerebrovascular diseases"),
        (6, "Alzheimer's disease"),
        (7, "Diabetes mellitus"),
        (8, "Influenza and pneumonia"),
        (9, "Nephritis, nephrotic syndrome and nephrosis"),
        (10, "All other causes"),
    ],
};

pub const SEX: RecodeMap = RecodeMap {
    column: columns::SEX,
    entries: &[(1, SEX_MALE), (2, SEX_FEMALE)],
};

pub const DEMOGRAPHIC_RECODES: &[RecodeMap] =
    &[ETHNIC_GROUP, EDUCATION_LEVEL, MARITAL_STATUS, BIRTH_COUNTRY];

pub const QUESTIONNAIRE_RECODES: &[RecodeMap] = &[
    DIABETES,
    HYPERTENSION,
    HEART_FAILURE,
    CORONARY_DISEASE,
    STROKE,
    CANCER,
    ALCOHOL_USE,
    MODERATE_ACTIVITY,
    VIGOROUS_ACTIVITY,
];

pub const MORTALITY_RECODES: &[RecodeMap] = &[MORTALITY, CAUSE_OF_DEATH];

pub const DIETARY_RECODES: &[RecodeMap] = &[SEX];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marital_remap_keeps_intermediate_code_apart() {
        let final_code = |raw| remap(raw, &MARITAL_STATUS_REMAP);
        assert_eq!(final_code(1), 1);
        assert_eq!(final_code(6), 1);
        assert_eq!(final_code(2), 2);
        assert_eq!(final_code(3), 2);
        assert_eq!(final_code(4), 2);
        assert_eq!(final_code(5), 3);
        assert_eq!(final_code(77), 77);
        assert_eq!(final_code(99), 99);
    }

    #[test]
    fn a_single_pass_does_not_chain() {
        const ONE_PASS: [RemapPass; 1] = [&[(5, 12), (12, 3)]];
        assert_eq!(remap(5, &ONE_PASS), 12);
    }

    #[test]
    fn marital_labels_after_remap() {
        let label = |raw| MARITAL_STATUS.label(remap(raw, &MARITAL_STATUS_REMAP));
        assert_eq!(label(6), Some("Married/Living with partner"));
        assert_eq!(label(4), Some("Widowed/Divorced/Separated"));
        assert_eq!(label(5), Some("Never married"));
        assert_eq!(label(8), None);
    }

    #[test]
    fn unknown_codes_have_no_label() {
        assert_eq!(HYPERTENSION.label(7), None);
        assert_eq!(DIABETES.label(3), Some(BORDERLINE));
        assert_eq!(SEX.label(0), None);
        assert_eq!(CAUSE_OF_DEATH.label(10), Some("All other causes"));
    }

    #[test]
    fn yes_no_tables_share_labels() {
        for map in QUESTIONNAIRE_RECODES {
            assert_eq!(map.label(1), Some(YES), "{}", map.column);
            assert_eq!(map.label(2), Some(NO), "{}", map.column);
            assert_eq!(map.label(9), Some(DONT_KNOW), "{}", map.column);
        }
    }
}
