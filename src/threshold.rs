//! Threshold evaluation.
//!
//! A domain is described by an ordered list of [`ThresholdRule`]s. A rule
//! fires when its flag column holds `Yes`; the resulting conditions keep the
//! rule order, so descriptions always read heart rate, blood pressure,
//! glucose, oxygen for vital signs.

use std::fmt;

use crate::record::Record;
use crate::record::columns::{health, safety};

/// One monitored signal.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdRule {
    /// Column holding the `Yes`/`No` threshold flag.
    pub flag: &'static str,
    /// Column holding the reading quoted in the description.
    pub reading: &'static str,
    /// Short label used when several signals are summarised together.
    pub label: &'static str,
    /// Builds the description from the reading.
    pub describe: fn(&str) -> String,
}

/// Vital-sign rules, in reporting order.
pub const HEALTH_RULES: [ThresholdRule; 4] = [
    ThresholdRule {
        flag: health::HEART_RATE_FLAG,
        reading: health::HEART_RATE,
        label: "heart rate",
        describe: |v| format!("Abnormal heart rate: {} bpm", v),
    },
    ThresholdRule {
        flag: health::BLOOD_PRESSURE_FLAG,
        reading: health::BLOOD_PRESSURE,
        label: "blood pressure",
        describe: |v| format!("Abnormal blood pressure: {}", v),
    },
    ThresholdRule {
        flag: health::GLUCOSE_FLAG,
        reading: health::GLUCOSE,
        label: "glucose level",
        describe: |v| format!("Abnormal glucose level: {} mg/dL", v),
    },
    ThresholdRule {
        flag: health::OXYGEN_FLAG,
        reading: health::OXYGEN,
        label: "oxygen saturation",
        describe: |v| format!("Low oxygen saturation: {}%", v),
    },
];

/// Fall rules.
pub const SAFETY_RULES: [ThresholdRule; 1] = [ThresholdRule {
    flag: safety::FALL_DETECTED,
    reading: safety::LOCATION,
    label: "fall",
    describe: |v| format!("Fall detected in {}", v),
}];

/// One abnormal signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCondition {
    /// Short signal label, e.g. "heart rate".
    pub label: &'static str,
    /// Human-readable description, e.g. "Abnormal heart rate: 145 bpm".
    pub description: String,
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Outcome of evaluating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub conditions: Vec<AlertCondition>,
}

impl Evaluation {
    /// At least one threshold fired.
    pub fn is_alert_worthy(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Labels of the fired rules, in rule order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.conditions.iter().map(|c| c.label)
    }

    /// Descriptions as a bulleted block.
    pub fn bullet_list(&self) -> String {
        self.conditions
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Evaluate a record against a domain's rules.
pub fn evaluate(record: &Record, rules: &[ThresholdRule]) -> Evaluation {
    let conditions = rules
        .iter()
        .filter(|rule| record.flag(rule.flag))
        .map(|rule| AlertCondition {
            label: rule.label,
            description: (rule.describe)(record.text(rule.reading)),
        })
        .collect();
    Evaluation { conditions }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals() -> Record {
        Record::new()
            .with("Heart Rate", "145")
            .with("Heart Rate Below/Above Threshold", "Yes")
            .with("Blood Pressure", "118/79")
            .with("Blood Pressure Below/Above Threshold", "No")
            .with("Glucose Levels", "190")
            .with("Glucose Levels Below/Above Threshold", "Yes")
            .with("Oxygen Saturation", "91")
            .with("SpO2 Below Threshold", "Yes")
    }

    #[test]
    fn test_health_conditions_in_rule_order() {
        let evaluation = evaluate(&vitals(), &HEALTH_RULES);
        assert!(evaluation.is_alert_worthy());

        let descriptions: Vec<_> = evaluation.conditions.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Abnormal heart rate: 145 bpm",
                "Abnormal glucose level: 190 mg/dL",
                "Low oxygen saturation: 91%",
            ]
        );
        assert_eq!(
            evaluation.labels().collect::<Vec<_>>(),
            vec!["heart rate", "glucose level", "oxygen saturation"]
        );
    }

    #[test]
    fn test_no_flags_not_alert_worthy() {
        let record = Record::new().with("Heart Rate", "72");
        let evaluation = evaluate(&record, &HEALTH_RULES);
        assert!(!evaluation.is_alert_worthy());
        assert_eq!(evaluation.bullet_list(), "");
    }

    #[test]
    fn test_missing_reading_uses_placeholder() {
        let record = Record::new().with("Heart Rate Below/Above Threshold", "Yes");
        let evaluation = evaluate(&record, &HEALTH_RULES);
        assert_eq!(evaluation.conditions[0].description, "Abnormal heart rate: N/A bpm");
    }

    #[test]
    fn test_fall_rule() {
        let record = Record::new().with("Fall Detected", "Yes").with("Location", "Bathroom");
        let evaluation = evaluate(&record, &SAFETY_RULES);
        assert_eq!(evaluation.bullet_list(), "- Fall detected in Bathroom");
    }
}
