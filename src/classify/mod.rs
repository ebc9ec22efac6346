//! Attribute-driven coastline feature classification.
//!
//! Decides from tags alone whether a line is tidal coastline or an inland or
//! man-made water feature to leave out. The rule table comes from
//! configuration so other regions can bring their own attribute schema.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::LineFeature;

/// One attribute test. A feature without the key always passes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AttributeRule {
    /// Value, if present, must be one of `values`
    Require { key: String, values: Vec<String> },
    /// Value must not be one of `values`
    Exclude { key: String, values: Vec<String> },
    /// Value must not start with any of `prefixes`
    ExcludePrefix { key: String, prefixes: Vec<String> },
}

impl AttributeRule {
    pub fn key(&self) -> &str {
        match self {
            AttributeRule::Require { key, .. }
            | AttributeRule::Exclude { key, .. }
            | AttributeRule::ExcludePrefix { key, .. } => key,
        }
    }

    /// Whether the attribute map passes this rule
    pub fn passes(&self, properties: &HashMap<String, String>) -> bool {
        let Some(raw) = properties.get(self.key()) else {
            return true;
        };
        let value = normalize(raw);

        match self {
            AttributeRule::Require { values, .. } => values.iter().any(|v| normalize(v) == value),
            AttributeRule::Exclude { values, .. } => !values.iter().any(|v| normalize(v) == value),
            AttributeRule::ExcludePrefix { prefixes, .. } => {
                !prefixes.iter().any(|p| value.starts_with(&normalize(p)))
            }
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Ordered set of rules; every rule must pass
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureClassifier {
    pub rules: Vec<AttributeRule>,
}

impl Default for FeatureClassifier {
    /// Exclusion table for the New York harbor shoreline sources
    fn default() -> Self {
        Self {
            rules: vec![
                AttributeRule::Require {
                    key: "tidal".to_string(),
                    values: strings(&["yes"]),
                },
                AttributeRule::Exclude {
                    key: "ftype".to_string(),
                    values: strings(&["canal/ditch", "canalditch", "lake/pond", "lakepond", "reservoir"]),
                },
                AttributeRule::Exclude {
                    key: "water_type".to_string(),
                    values: strings(&[
                        "bridge over water",
                        "stream/canal",
                        "artificial lake",
                        "natural lake",
                    ]),
                },
                AttributeRule::Exclude {
                    key: "comment".to_string(),
                    values: strings(&["spillway", "dam spillway"]),
                },
                AttributeRule::ExcludePrefix {
                    key: "structure".to_string(),
                    prefixes: strings(&[
                        "breakwater",
                        "groin",
                        "jetty",
                        "man-made ramp",
                        "man-made slipway",
                        "man-made drydock",
                    ]),
                },
            ],
        }
    }
}

impl FeatureClassifier {
    /// A classifier that accepts every feature
    pub fn accept_all() -> Self {
        Self { rules: Vec::new() }
    }

    /// First rule the feature fails, if any
    pub fn rejection(&self, feature: &LineFeature) -> Option<&AttributeRule> {
        self.rules.iter().find(|rule| !rule.passes(&feature.properties))
    }

    pub fn is_coastline_candidate(&self, feature: &LineFeature) -> bool {
        self.rejection(feature).is_none()
    }

    /// Split features into accepted ones and a count of rejected ones
    pub fn partition<'a>(&self, features: &'a [LineFeature]) -> (Vec<&'a LineFeature>, usize) {
        let mut accepted = Vec::with_capacity(features.len());
        let mut rejected = 0;

        for feature in features {
            match self.rejection(feature) {
                None => accepted.push(feature),
                Some(rule) => {
                    log::debug!("Excluding line feature on '{}'", rule.key());
                    rejected += 1;
                }
            }
        }

        (accepted, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> LineFeature {
        LineFeature::from_coords(vec![(0.0, 0.0), (1.0, 1.0)])
    }

    #[test]
    fn test_untagged_feature_passes() {
        let classifier = FeatureClassifier::default();
        assert!(classifier.is_coastline_candidate(&line()));
    }

    #[test]
    fn test_tidal_flag() {
        let classifier = FeatureClassifier::default();
        assert!(classifier.is_coastline_candidate(&line().with_property("tidal", "Yes")));
        assert!(!classifier.is_coastline_candidate(&line().with_property("tidal", "no")));
    }

    #[test]
    fn test_excluded_feature_types() {
        let classifier = FeatureClassifier::default();
        assert!(!classifier.is_coastline_candidate(&line().with_property("ftype", "Reservoir")));
        assert!(!classifier.is_coastline_candidate(&line().with_property("ftype", "Lake/Pond")));
        assert!(classifier.is_coastline_candidate(&line().with_property("ftype", "Coastline")));
        assert!(
            !classifier
                .is_coastline_candidate(&line().with_property("water_type", "natural lake"))
        );
        assert!(!classifier.is_coastline_candidate(&line().with_property("comment", " SPILLWAY ")));
    }

    #[test]
    fn test_structure_prefixes() {
        let classifier = FeatureClassifier::default();
        let jetty = line().with_property("structure", "Jetty (stone)");
        let ramp = line().with_property("structure", "man-made ramp, concrete");
        let seawall = line().with_property("structure", "seawall");
        assert!(!classifier.is_coastline_candidate(&jetty));
        assert!(!classifier.is_coastline_candidate(&ramp));
        assert!(classifier.is_coastline_candidate(&seawall));
    }

    #[test]
    fn test_partition_counts() {
        let classifier = FeatureClassifier::default();
        let features = vec![
            line(),
            line().with_property("tidal", "no"),
            line().with_property("structure", "groin"),
        ];
        let (accepted, rejected) = classifier.partition(&features);
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_rules_from_toml() {
        let text = r#"
            [[rules]]
            rule = "exclude"
            key = "natural"
            values = ["water"]

            [[rules]]
            rule = "exclude_prefix"
            key = "man_made"
            prefixes = ["pier"]
        "#;
        let classifier: FeatureClassifier = toml::from_str(text).unwrap();
        assert_eq!(classifier.rules.len(), 2);
        assert!(!classifier.is_coastline_candidate(&line().with_property("natural", "water")));
        assert!(!classifier.is_coastline_candidate(&line().with_property("man_made", "pier_a")));
        assert!(classifier.is_coastline_candidate(&line().with_property("tidal", "no")));
        assert!(FeatureClassifier::accept_all().is_coastline_candidate(&line()));
    }
}
