/// Closing sentence selected by score band.
pub(crate) fn band_summary(score: f64) -> &'static str {
    if score >= 0.8 {
        "This community appears to be an excellent match for your current needs and may provide valuable support and resources."
    } else if score >= 0.6 {
        "This community could be a good fit and may offer helpful support for your situation."
    } else if score >= 0.4 {
        "This community may provide some relevant support, though it might not be the most targeted for your specific needs."
    } else {
        "While this community offers general support, there may be other communities that are more specifically aligned with your assessment results."
    }
}

pub(crate) fn explain(community_name: &str, matching_factors: &[String], score: f64) -> String {
    let percentage = (score * 100.0).round() as u32;
    let mut reasoning = format!(
        "Based on your assessment results, you have a {percentage}% compatibility with {community_name}. "
    );

    if matching_factors.is_empty() {
        reasoning.push_str(
            "None of your completed assessments overlap with the focus areas of this community. ",
        );
    } else {
        reasoning.push_str(&format!(
            "This recommendation is based on your {} scores. ",
            matching_factors.join(", ")
        ));
    }

    reasoning.push_str(band_summary(score));
    reasoning
}
