use serde::{Deserialize, Serialize};

/// Keyword lists, labels and window sizes used by the extractors.
///
/// Plain data: it is compiled once into a [`FieldMapper`](crate::FieldMapper),
/// which owns the resulting matchers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub site: SiteConfig,
    pub histology: HistologyConfig,
    pub stage: StageConfig,
    pub biomarkers: BiomarkerConfig,
    pub evidence: EvidenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Most specific phrases first; the text fallback honours this order.
    pub keywords: Vec<String>,
    pub entity_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistologyConfig {
    pub terms: Vec<String>,
    pub entity_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub entity_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomarkerConfig {
    /// Regex alternatives naming each marker, matched case-insensitively.
    pub er_markers: Vec<String>,
    pub pr_markers: Vec<String>,
    pub her2_markers: Vec<String>,
    /// Characters inspected after the marker for a polarity word.
    pub window_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub context_chars: usize,
    pub max_extension_chars: usize,
    pub max_len: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&[
                "left breast",
                "right breast",
                "breast",
                "right upper lobe",
                "lung",
                "sigmoid colon",
                "sigmoid",
                "colon",
            ]),
            entity_labels: strings(&["Cancer", "Organ"]),
        }
    }
}

impl Default for HistologyConfig {
    fn default() -> Self {
        Self {
            terms: strings(&["carcinoma", "adenocarcinoma", "sarcoma", "lymphoma"]),
            entity_labels: strings(&["Cancer"]),
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            entity_labels: strings(&["Cancer"]),
        }
    }
}

impl Default for BiomarkerConfig {
    fn default() -> Self {
        Self {
            er_markers: strings(&["estrogen receptor", r"\bER\b"]),
            pr_markers: strings(&["progesterone receptor", r"\bPR\b"]),
            her2_markers: strings(&[r"\bHER2\b"]),
            window_chars: 120,
        }
    }
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            context_chars: 40,
            max_extension_chars: 80,
            max_len: 160,
        }
    }
}
