//! Name analysis types
//!
//! Mirrors the fixed JSON object the language model is asked to return.
//! Parsing is lenient: the model occasionally omits optional sections or
//! sends them as `null`, so every field defaults instead of failing the
//! whole analysis.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Longest name accepted for analysis, in characters
pub const MAX_NAME_LENGTH: usize = 50;

/// Treat an explicit `null` like a missing field
fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Complete linguistic analysis of a personal name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NameAnalysis {
    /// The name as given
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub etymology: Etymology,
    #[serde(deserialize_with = "null_default")]
    pub phonetics: Phonetics,
    #[serde(deserialize_with = "null_default")]
    pub morphology: Morphology,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_default")]
    pub phonaesthesia: Vec<Phonaesthesia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_web: Option<SemanticWeb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_register: Option<EmotionalRegister>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_quote: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub cross_linguistic: CrossLinguistic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Etymology {
    #[serde(deserialize_with = "null_default")]
    pub origin_language: String,
    /// Proto or root form, e.g. `*sh₂wen-`
    #[serde(deserialize_with = "null_default")]
    pub root_word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_meaning: Option<String>,
    /// Core meaning as a name (5-10 words)
    #[serde(deserialize_with = "null_default")]
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Oldest ancestor first, modern form last
    #[serde(deserialize_with = "null_default")]
    pub language_family_tree: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub cultural_significance: String,
    #[serde(deserialize_with = "null_default")]
    pub historical_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Phonetics {
    #[serde(deserialize_with = "null_default")]
    pub ipa: String,
    #[serde(deserialize_with = "null_default")]
    pub sounds: Vec<Sound>,
    #[serde(deserialize_with = "null_default")]
    pub stress_pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_description: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub rhythm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_journey: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub phonosemantic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sound {
    #[serde(deserialize_with = "null_default")]
    pub symbol: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Morphology {
    #[serde(deserialize_with = "null_default")]
    pub morphemes: Vec<Morpheme>,
    #[serde(deserialize_with = "null_default")]
    pub word_class: String,
    #[serde(deserialize_with = "null_default")]
    pub grammatical_journey: String,
    #[serde(deserialize_with = "null_default")]
    pub related_forms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Morpheme {
    #[serde(deserialize_with = "null_default")]
    pub part: String,
    /// root / prefix / suffix
    #[serde(rename = "type", deserialize_with = "null_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_default")]
    pub meaning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phonaesthesia {
    #[serde(deserialize_with = "null_default")]
    pub symbol: String,
    #[serde(deserialize_with = "null_default")]
    pub line1: String,
    #[serde(deserialize_with = "null_default")]
    pub line2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SemanticWeb {
    #[serde(deserialize_with = "null_default")]
    pub associations: Vec<String>,
    /// Middot-separated values, e.g. `life · growth · hope`
    #[serde(deserialize_with = "null_default")]
    pub core_values: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmotionalRegister {
    #[serde(deserialize_with = "null_default")]
    pub weather: String,
    #[serde(deserialize_with = "null_default")]
    pub personality: String,
    #[serde(deserialize_with = "null_default")]
    pub as_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrossLinguistic {
    #[serde(deserialize_with = "null_default")]
    pub cognates: Vec<Cognate>,
    #[serde(deserialize_with = "null_default")]
    pub famous_bearers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cognate {
    #[serde(deserialize_with = "null_default")]
    pub language: String,
    #[serde(deserialize_with = "null_default")]
    pub word: String,
}

impl NameAnalysis {
    /// Parse an analysis from the model's JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// One-sentence description of the name used in delivery emails
    pub fn meaning_sentence(&self, display_name: &str) -> String {
        if self.etymology.meaning.trim().is_empty() {
            format!(
                "The name \"{}\" has a fascinating linguistic history that we've captured in your poster.",
                display_name
            )
        } else {
            format!(
                "The name \"{}\" comes from {}, meaning \"{}\". A beautiful name with a rich history.",
                display_name, self.etymology.origin_language, self.etymology.meaning
            )
        }
    }
}

/// Validate a name submitted for analysis
///
/// Length is checked before trimming, matching what the browser sends.
/// Returns the trimmed name.
pub fn validate_name(raw: &str) -> Result<String> {
    if raw.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::InvalidInput(format!(
            "name longer than {} characters",
            MAX_NAME_LENGTH
        )));
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("name is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Luna",
        "etymology": {
            "originLanguage": "Latin",
            "rootWord": "*leuk-",
            "rootMeaning": "to shine",
            "meaning": "the light that guides the night",
            "languageFamilyTree": ["Proto-Indo-European *leuk-", "Latin lūna"],
            "culturalSignificance": "The Roman moon goddess.",
            "historicalNotes": "Stable for two millennia."
        },
        "phonetics": {
            "ipa": "/ˈluː.nə/",
            "sounds": [{"symbol": "/l/", "type": "lateral approximant", "description": "A liquid opening."}],
            "stressPattern": "STRONG-weak",
            "rhythm": "gliding",
            "phonosemantic": "soft and luminous"
        },
        "morphology": {
            "morphemes": [{"part": "lun", "type": "root", "meaning": "\"moon\""}],
            "wordClass": "noun",
            "grammaticalJourney": "A noun that became a name.",
            "relatedForms": ["Lunette"]
        },
        "crossLinguistic": {
            "cognates": [{"language": "Spanish", "word": "luna"}],
            "famousBearers": ["Luna Lovegood (fiction)"]
        }
    }"#;

    #[test]
    fn test_parse_model_output() {
        let analysis = NameAnalysis::from_json(SAMPLE).unwrap();
        assert_eq!(analysis.name, "Luna");
        assert_eq!(analysis.etymology.root_meaning.as_deref(), Some("to shine"));
        assert_eq!(analysis.phonetics.sounds[0].kind.as_deref(), Some("lateral approximant"));
        assert_eq!(analysis.morphology.morphemes[0].kind, "root");
        assert!(analysis.semantic_web.is_none());
        assert!(analysis.phonaesthesia.is_empty());
    }

    #[test]
    fn test_missing_sections_default() {
        let analysis = NameAnalysis::from_json(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(analysis.name, "Ada");
        assert!(analysis.etymology.language_family_tree.is_empty());
        assert!(analysis.cross_linguistic.cognates.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let analysis = NameAnalysis::from_json(
            r#"{
                "name": "Ada",
                "etymology": {"historicalNotes": null, "languageFamilyTree": null, "meaning": "noble"},
                "phonetics": null,
                "morphology": {"morphemes": [{"part": "ad", "type": null, "meaning": "noble"}]},
                "phonaesthesia": null,
                "semanticWeb": {"associations": null, "coreValues": "grace"},
                "crossLinguistic": {"cognates": null, "famousBearers": null}
            }"#,
        )
        .unwrap();
        assert_eq!(analysis.etymology.meaning, "noble");
        assert!(analysis.etymology.historical_notes.is_empty());
        assert!(analysis.etymology.language_family_tree.is_empty());
        assert_eq!(analysis.phonetics, Phonetics::default());
        assert!(analysis.morphology.morphemes[0].kind.is_empty());
        assert!(analysis.phonaesthesia.is_empty());
        let web = analysis.semantic_web.unwrap();
        assert!(web.associations.is_empty());
        assert_eq!(web.core_values, "grace");
        assert!(analysis.cross_linguistic.cognates.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let analysis = NameAnalysis::from_json(SAMPLE).unwrap();
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["etymology"]["originLanguage"], "Latin");
        assert_eq!(value["morphology"]["morphemes"][0]["type"], "root");
        assert!(value.get("summaryQuote").is_none());
    }

    #[test]
    fn test_meaning_sentence() {
        let analysis = NameAnalysis::from_json(SAMPLE).unwrap();
        let sentence = analysis.meaning_sentence("Luna");
        assert!(sentence.contains("comes from Latin"));
        assert!(sentence.contains("the light that guides the night"));

        let empty = NameAnalysis::default();
        assert!(empty.meaning_sentence("Zed").contains("fascinating linguistic history"));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Iris ").unwrap(), "Iris");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(51)).is_err());
        assert!(validate_name(&"a".repeat(50)).is_ok());
    }
}
