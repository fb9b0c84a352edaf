use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mentara_matching::matching::{
    scores_from_pre_assessment, AssessmentChangeHandler, AssessmentCsvImporter, CommunityCsvImporter,
    CommunityId, CommunityMatchingService, InMemoryAssessmentStore, InMemoryCommunityCatalog,
    InMemoryRecommendationSink, MatchingConfig, UserId,
};
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn fixture_service() -> CommunityMatchingService<InMemoryAssessmentStore, InMemoryCommunityCatalog> {
    let assessments =
        AssessmentCsvImporter::from_path(fixture("assessments.csv")).expect("assessments import");
    let catalog =
        CommunityCsvImporter::from_path(fixture("communities.csv")).expect("communities import");
    CommunityMatchingService::new(
        Arc::new(assessments),
        Arc::new(catalog),
        Arc::new(MatchingConfig::standard()),
    )
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn csv_exports_rank_depression_and_anxiety_communities() {
    let service = fixture_service();

    let ranking = service
        .rank_with_report(&UserId("user-a".to_string()))
        .expect("ranking succeeds");

    assert_eq!(ranking.considered, 5);
    assert!(ranking.skipped.is_empty());

    let slugs: Vec<_> = ranking
        .recommendations
        .iter()
        .map(|result| result.community_slug.as_str())
        .collect();
    assert_eq!(
        slugs,
        ["depression-support", "anxiety-depression", "anxiety-support"]
    );

    let depression = &ranking.recommendations[0];
    assert_close(depression.compatibility_score, 1.0);
    assert_eq!(depression.matching_factors, ["PHQ9 (moderately severe)"]);

    let overlap = &ranking.recommendations[1];
    assert_close(overlap.compatibility_score, (0.8 + 0.6 * 0.7) / 1.5);
    assert_eq!(
        overlap.matching_factors,
        ["PHQ9 (moderately severe)", "GAD7 (mild)"]
    );
    assert_eq!(overlap.percentage(), 81);

    assert_close(ranking.recommendations[2].compatibility_score, 0.72);
}

#[test]
fn newer_rows_win_and_blank_scores_are_skipped() {
    let service = fixture_service();

    let profile = service
        .load_profile(&UserId("user-a".to_string()))
        .expect("store reachable")
        .expect("user-a has data");
    assert_eq!(profile.assessments["phq9"].score, 15.0);
    assert_eq!(profile.assessments["phq9"].severity, "moderately severe");

    let ptsd_only = service
        .load_profile(&UserId("user-b".to_string()))
        .expect("store reachable")
        .expect("user-b has data");
    assert_eq!(
        ptsd_only.assessments.keys().collect::<Vec<_>>(),
        ["ptsd5"]
    );
}

#[test]
fn low_severity_still_clears_cutoff_for_targeted_communities() {
    let service = fixture_service();

    let recommendations = service
        .rank_communities_for_user(&UserId("user-c".to_string()))
        .expect("ranking succeeds");

    let scored: Vec<_> = recommendations
        .iter()
        .map(|result| (result.community_slug.as_str(), result.percentage()))
        .collect();
    assert_eq!(scored, [("depression-support", 36), ("anxiety-depression", 30)]);
}

#[test]
fn unknown_user_gets_no_recommendations() {
    let service = fixture_service();

    let recommendations = service
        .rank_communities_for_user(&UserId("nobody".to_string()))
        .expect("missing user is not an error");
    assert!(recommendations.is_empty());
}

#[test]
fn scoring_a_single_unfocused_community_explains_the_gap() {
    let service = fixture_service();
    let profile = service
        .load_profile(&UserId("user-a".to_string()))
        .expect("store reachable")
        .expect("user-a has data");

    let result = service
        .score_community(&profile, &CommunityId("c-books".to_string()))
        .expect("community exists");

    assert_eq!(result.compatibility_score, 0.0);
    assert!(result.matching_factors.is_empty());
    assert!(result.reasoning.contains("0% compatibility with Book Club"));
    assert!(result
        .reasoning
        .contains("None of your completed assessments overlap"));
    assert!(result
        .reasoning
        .ends_with("more specifically aligned with your assessment results."));
}

#[test]
fn pre_assessment_answers_feed_the_change_handler() {
    let config = Arc::new(MatchingConfig::standard());
    let store = Arc::new(InMemoryAssessmentStore::default());
    let catalog = Arc::new(
        CommunityCsvImporter::from_path(fixture("communities.csv")).expect("communities import"),
    );
    let sink = Arc::new(InMemoryRecommendationSink::default());

    let user_id = UserId("user-new".to_string());
    let recorded_at = Utc
        .with_ymd_and_hms(2024, 4, 2, 10, 30, 0)
        .single()
        .expect("valid timestamp");
    let answers = json!({
        "scores": {"phq9Score": null, "gad7Score": 17, "ptsd5Score": 5},
        "severityLevels": {"gad7": "severe", "ptsd5": "mild"}
    });
    let scores = scores_from_pre_assessment(&answers, &config.instruments, recorded_at);
    store.record_all(&user_id, scores).expect("scores recorded");

    let service = Arc::new(CommunityMatchingService::new(
        Arc::clone(&store),
        catalog,
        config,
    ));
    let handler = AssessmentChangeHandler::new(service, Arc::clone(&sink));

    let forwarded = handler
        .handle_assessment_change(&user_id, "gad7")
        .expect("refresh succeeds");

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.user_id, user_id);
    assert_eq!(batch.trigger_instrument, "gad7");
    assert_eq!(batch.recommendations.len(), forwarded);

    let slugs: Vec<_> = batch
        .recommendations
        .iter()
        .map(|result| result.community_slug.as_str())
        .collect();
    assert_eq!(
        slugs,
        ["anxiety-support", "anxiety-depression", "ptsd-support"]
    );
}

#[test]
fn results_serialize_for_downstream_consumers() {
    let service = fixture_service();
    let recommendations = service
        .rank_communities_for_user(&UserId("user-b".to_string()))
        .expect("ranking succeeds");

    let value = serde_json::to_value(&recommendations).expect("serializes");
    let first = &value[0];
    assert_eq!(first["communityId"], "c-ptsd");
    assert_eq!(first["communitySlug"], "ptsd-support");
    assert_eq!(first["compatibilityScore"], 1.0);
    assert_eq!(first["matchingFactors"][0], "PTSD5 (severe)");
}
