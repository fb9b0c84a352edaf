use clap::{Args, Parser, Subcommand};
use mentara_matching::config::AppConfig;
use mentara_matching::error::AppError;
use mentara_matching::matching::{
    AssessmentCsvImporter, CommunityCsvImporter, CommunityId, CommunityMatchingService,
    CompatibilityResult, InMemoryAssessmentStore, InMemoryCommunityCatalog, MatchingConfig,
    MatchingError, Ranking, UserAssessmentProfile, UserId,
};
use mentara_matching::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

type FixtureService = CommunityMatchingService<InMemoryAssessmentStore, InMemoryCommunityCatalog>;

#[derive(Parser, Debug)]
#[command(
    name = "Mentara Community Matching",
    about = "Score and rank peer-support communities from assessment results",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one user against one community
    Score(ScoreArgs),
    /// Rank communities for one user, or for every user in the export
    Rank(RankArgs),
    /// Classify a raw instrument score into its severity band
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// CSV export with user_id,instrument,score,recorded_at columns
    #[arg(long)]
    assessments: PathBuf,
    /// CSV export with id,name,slug columns
    #[arg(long)]
    communities: PathBuf,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(long)]
    user: String,
    /// Community id as listed in the communities export
    #[arg(long)]
    community: String,
    /// Print JSON instead of a readable summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RankArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Restrict the ranking to a single user
    #[arg(long)]
    user: Option<String>,
    /// Print JSON instead of a readable summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Instrument key, e.g. phq9
    #[arg(long)]
    instrument: String,
    #[arg(long, allow_hyphen_values = true)]
    score: f64,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let matching = config.matching.load_matching_config()?;
    info!(
        environment = ?config.environment,
        instruments = matching.instruments.iter().count(),
        communities = matching.communities.len(),
        "matching tables loaded"
    );

    match cli.command {
        Command::Score(args) => run_score(args, matching),
        Command::Rank(args) => run_rank(args, matching),
        Command::Classify(args) => run_classify(args, &matching),
    }
}

fn load_service(data: &DataArgs, matching: Arc<MatchingConfig>) -> Result<FixtureService, AppError> {
    let assessments = AssessmentCsvImporter::from_path(&data.assessments)?;
    let catalog = CommunityCsvImporter::from_path(&data.communities)?;
    Ok(CommunityMatchingService::new(
        Arc::new(assessments),
        Arc::new(catalog),
        matching,
    ))
}

fn run_score(args: ScoreArgs, matching: Arc<MatchingConfig>) -> Result<(), AppError> {
    let service = load_service(&args.data, matching)?;
    let user_id = UserId(args.user);

    let profile = service
        .load_profile(&user_id)?
        .unwrap_or_else(|| UserAssessmentProfile::new(user_id.clone()));
    let result = service.score_community(&profile, &CommunityId(args.community))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&result);
    }
    Ok(())
}

fn run_rank(args: RankArgs, matching: Arc<MatchingConfig>) -> Result<(), AppError> {
    let rankings = collect_rankings(&args.data, args.user, matching)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rankings)?);
    } else {
        for ranking in &rankings {
            render_ranking(ranking);
        }
    }
    Ok(())
}

/// Rankings for one user, or for every user in the assessments export in id order.
fn collect_rankings(
    data: &DataArgs,
    user: Option<String>,
    matching: Arc<MatchingConfig>,
) -> Result<Vec<Ranking>, AppError> {
    let assessments = AssessmentCsvImporter::from_path(&data.assessments)?;
    let users = match user {
        Some(user) => vec![UserId(user)],
        None => assessments.users().map_err(MatchingError::from)?,
    };
    let catalog = CommunityCsvImporter::from_path(&data.communities)?;
    let service =
        CommunityMatchingService::new(Arc::new(assessments), Arc::new(catalog), matching);

    users
        .iter()
        .map(|user_id| service.rank_with_report(user_id).map_err(AppError::from))
        .collect()
}

fn run_classify(args: ClassifyArgs, matching: &MatchingConfig) -> Result<(), AppError> {
    let key = args.instrument.to_ascii_lowercase();
    let Some(instrument) = matching.instruments.get(&key) else {
        println!("Unknown instrument '{}'", args.instrument);
        println!(
            "Configured instruments: {}",
            matching.instruments.keys().collect::<Vec<_>>().join(", ")
        );
        return Ok(());
    };

    match instrument.classify(args.score) {
        Some(band) => println!(
            "{} score {} -> {} (severity multiplier {:.1}, weight {:.1})",
            instrument.name, args.score, band.label, band.multiplier, instrument.weight
        ),
        None => println!(
            "{} score {} is outside the valid range {}-{}",
            instrument.name, args.score, instrument.range.min, instrument.range.max
        ),
    }
    Ok(())
}

fn render_result(result: &CompatibilityResult) {
    println!(
        "{} ({}): {}% compatible",
        result.community_slug,
        result.community_id,
        result.percentage()
    );
    if result.assessment_contributions.is_empty() {
        println!("  no overlapping assessments");
    }
    for (instrument, detail) in &result.assessment_contributions {
        println!(
            "  - {}: score {}, weight {:.2}, contribution {:.3}",
            instrument, detail.score, detail.weight, detail.contribution
        );
    }
    println!("  {}", result.reasoning);
}

fn render_ranking(ranking: &Ranking) {
    println!("Recommendations for {}", ranking.user_id);

    if ranking.recommendations.is_empty() {
        println!("  none (no assessment data or no relevant communities)");
    }
    for (position, result) in ranking.recommendations.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:>3}%  {}",
            position + 1,
            result.community_slug,
            result.percentage(),
            result.matching_factors.join(", ")
        );
    }

    if !ranking.skipped.is_empty() {
        println!("  Skipped communities");
        for skipped in &ranking.skipped {
            println!("  - {}: {}", skipped.community_id, skipped.reason);
        }
    }
    println!();
}
