use extract::Field;
use regex::Regex;
use std::sync::LazyLock;

static STAGE_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bstage\s+([ivx]{1,3}[ab]?)\b").unwrap());
static ROMAN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([ivx]{1,3}[ab]?)\b").unwrap());

const TNM_STAGE_II: [&str; 2] = ["pt3n0m0", "t3n0m0"];

/// Canonical comparison form of a raw field value.
///
/// Total and pure: unrecognized values pass through trimmed and lower-cased.
pub fn normalize_for_field(field: Field, value: Option<&str>) -> Option<String> {
    match field {
        Field::ErStatus | Field::PrStatus | Field::Her2Status => {
            Some(normalize_biomarker(value))
        }
        Field::Stage => normalize_stage(value),
        Field::PrimarySite => normalize_primary_site(value),
        Field::Histology => normalize_histology(value),
    }
}

fn norm_str(value: Option<&str>) -> Option<String> {
    let s = value?.trim().to_lowercase();
    if s.is_empty() { None } else { Some(s) }
}

/// Missing status reads as `unknown`.
pub fn normalize_biomarker(value: Option<&str>) -> String {
    let Some(s) = norm_str(value) else {
        return "unknown".to_string();
    };

    if s.contains("pos") {
        "positive".to_string()
    } else if s.contains("neg") {
        "negative".to_string()
    } else if s == "unknown" || s == "unk" {
        "unknown".to_string()
    } else {
        s
    }
}

/// Lower-case roman-numeral code; absence stays absent.
pub fn normalize_stage(value: Option<&str>) -> Option<String> {
    let s = norm_str(value)?;

    if let Some(caps) = STAGE_PHRASE.captures(&s) {
        return Some(caps[1].to_string());
    }

    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if TNM_STAGE_II.iter().any(|tnm| compact.contains(tnm)) {
        return Some("ii".to_string());
    }

    if let Some(caps) = ROMAN_TOKEN.captures(&s) {
        return Some(caps[1].to_string());
    }

    Some(s)
}

pub fn normalize_primary_site(value: Option<&str>) -> Option<String> {
    let s = norm_str(value)?;

    let class = if s.contains("breast") {
        "breast"
    } else if s.contains("lung") || s.contains("lobe") {
        "lung"
    } else if s.contains("colon") || s.contains("sigmoid") {
        "colon"
    } else {
        return Some(s);
    };
    Some(class.to_string())
}

pub fn normalize_histology(value: Option<&str>) -> Option<String> {
    let s = norm_str(value)?;

    if s.contains("adenocarcinoma") {
        Some("adenocarcinoma".to_string())
    } else if s.contains("ductal carcinoma") {
        Some("invasive ductal carcinoma".to_string())
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(field: Field, value: &str) -> Option<String> {
        normalize_for_field(field, Some(value))
    }

    #[test]
    fn test_biomarker() {
        assert_eq!(norm(Field::ErStatus, "Strongly Positive").as_deref(), Some("positive"));
        assert_eq!(normalize_for_field(Field::ErStatus, None).as_deref(), Some("unknown"));
        assert_eq!(norm(Field::ErStatus, "Negative").as_deref(), Some("negative"));
        assert_eq!(norm(Field::PrStatus, "negative for PR").as_deref(), Some("negative"));
        assert_eq!(norm(Field::Her2Status, "  ").as_deref(), Some("unknown"));
        assert_eq!(norm(Field::Her2Status, "UNK").as_deref(), Some("unknown"));
        assert_eq!(norm(Field::Her2Status, " Equivocal ").as_deref(), Some("equivocal"));
    }

    #[test]
    fn test_stage() {
        assert_eq!(normalize_for_field(Field::Stage, None), None);
        assert_eq!(norm(Field::Stage, "  "), None);
        assert_eq!(norm(Field::Stage, "Stage IIA").as_deref(), Some("iia"));
        assert_eq!(norm(Field::Stage, "IIA").as_deref(), Some("iia"));
        assert_eq!(norm(Field::Stage, "pT3N0M0").as_deref(), Some("ii"));
        assert_eq!(norm(Field::Stage, "T3 N0 M0").as_deref(), Some("ii"));
        assert_eq!(norm(Field::Stage, "pT3\tN0M0").as_deref(), Some("ii"));
        assert_eq!(norm(Field::Stage, "T3\nN0\nM0").as_deref(), Some("ii"));
        assert_eq!(norm(Field::Stage, "clinical stage iv").as_deref(), Some("iv"));
        assert_eq!(norm(Field::Stage, "Pending").as_deref(), Some("pending"));
    }

    #[test]
    fn test_primary_site() {
        assert_eq!(norm(Field::PrimarySite, "Left Breast").as_deref(), Some("breast"));
        assert_eq!(norm(Field::PrimarySite, "right upper lobe").as_deref(), Some("lung"));
        assert_eq!(norm(Field::PrimarySite, "Sigmoid").as_deref(), Some("colon"));
        assert_eq!(norm(Field::PrimarySite, "Prostate").as_deref(), Some("prostate"));
        assert_eq!(normalize_for_field(Field::PrimarySite, None), None);
    }

    #[test]
    fn test_histology() {
        assert_eq!(
            norm(Field::Histology, "Mucinous adenocarcinoma").as_deref(),
            Some("adenocarcinoma")
        );
        assert_eq!(
            norm(Field::Histology, "ductal carcinoma").as_deref(),
            Some("invasive ductal carcinoma")
        );
        assert_eq!(
            norm(Field::Histology, "Invasive Ductal Carcinoma").as_deref(),
            Some("invasive ductal carcinoma")
        );
        assert_eq!(norm(Field::Histology, "Lymphoma").as_deref(), Some("lymphoma"));
    }

    fn any_field() -> impl Strategy<Value = Field> {
        prop::sample::select(Field::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(
            field in any_field(),
            value in proptest::option::of(".{0,40}"),
        ) {
            let once = normalize_for_field(field, value.as_deref());
            let twice = normalize_for_field(field, once.as_deref());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_clinical_phrases_are_idempotent(
            field in any_field(),
            value in concat!(
                "(stage|Stage|STG|pT|T)? ?[0-9IVXivxAB ]{0,6}",
                "(positive|negative|breast|lobe|carcinoma)?",
            ),
        ) {
            let once = normalize_for_field(field, Some(&value));
            let twice = normalize_for_field(field, once.as_deref());
            prop_assert_eq!(once, twice);
        }
    }
}
