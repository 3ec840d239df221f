//! Follow-up guidance derived from the latest processed entries.

use crate::persona::{Persona, Prompt};
use crate::processors::ProcessedEntry;
use crate::processors::safety::is_fall_entry;

/// Output cap for health insights.
const INSIGHTS_MAX_TOKENS: u32 = 400;

/// Output cap for fall analysis.
const FALL_ANALYSIS_MAX_TOKENS: u32 = 300;

/// Three personalised insights from the last health entry, if any.
pub async fn health_insights(entries: &[ProcessedEntry], persona: &Persona) -> Vec<String> {
    let Some(latest) = entries.last() else {
        return Vec::new();
    };

    let prompt = Prompt::new(format!(
        "Based on this health data: {}\n\nProvide 3 personalized health insights.",
        latest
    ))
    .max_output_tokens(INSIGHTS_MAX_TOKENS);

    let insight = persona
        .respond(prompt, || "Unable to generate health insights at this time.".to_string())
        .await;
    vec![insight]
}

/// Safety recommendations for the last fall entry, if any.
pub async fn safety_analysis(entries: &[ProcessedEntry], persona: &Persona) -> Vec<String> {
    let Some(latest_fall) = entries.iter().rev().find(|e| is_fall_entry(e)) else {
        return Vec::new();
    };

    let prompt = Prompt::new(format!(
        "Based on this fall incident: {}\n\nProvide safety recommendations.",
        latest_fall
    ))
    .max_output_tokens(FALL_ANALYSIS_MAX_TOKENS);

    let analysis = persona
        .respond(prompt, || {
            "Unable to analyze fall incident at this time. Please consult your caregiver.".to_string()
        })
        .await;
    vec![analysis]
}
