mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use smart_ads::config::AppConfig;
use smart_ads::{
    compute_budget, diagnose_with, format_number, generate_structure, BudgetInputs, BudgetReport,
    CampaignObjective, CampaignPhase, Currency, MetricsInput, PixelMaturity, StructureInputs,
    TrafficObjective,
};

#[derive(Parser)]
#[command(name = "smart-ads", about = "Meta ads budget planner, campaign architect and AI proxy")]
struct Cli {
    /// Path to a TOML config file (defaults to SMART_ADS_CONFIG_PATH or config/smart-ads.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Reverse-engineer the ad budget needed for a monthly revenue goal.
    Budget(BudgetArgs),
    /// Lay out a three-tier campaign structure for a daily budget.
    Structure(StructureArgs),
    /// Diagnose campaign metrics stage by stage.
    Diagnose(DiagnoseArgs),
    /// Run the HTTP backend.
    Serve(ServeArgs),
    /// Write the effective configuration to a TOML file.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct BudgetArgs {
    #[arg(long, default_value_t = 10_000.0)]
    revenue: f64,
    #[arg(long, default_value_t = 100.0)]
    price: f64,
    /// Conversion rate in percent.
    #[arg(long, default_value_t = 2.0)]
    conversion: f64,
    #[arg(long, default_value_t = 0.40)]
    cpc: f64,
    /// Click-through rate in percent.
    #[arg(long, default_value_t = 1.5)]
    ctr: f64,
    #[arg(long, default_value = "USD")]
    currency: String,
    #[arg(long, default_value = "web")]
    traffic: String,
    #[arg(long)]
    json: bool,
}

impl Default for BudgetArgs {
    fn default() -> Self {
        let inputs = BudgetInputs::default();
        Self {
            revenue: inputs.monthly_revenue_goal,
            price: inputs.unit_price,
            conversion: inputs.conversion_rate_pct,
            cpc: inputs.cost_per_click,
            ctr: inputs.ctr_pct,
            currency: inputs.currency.code().to_string(),
            traffic: "web".to_string(),
            json: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct StructureArgs {
    #[arg(long, default_value = "messages")]
    objective: String,
    #[arg(long, default_value_t = 20.0)]
    budget: f64,
    #[arg(long, default_value = "USD")]
    currency: String,
    #[arg(long, default_value = "cold")]
    pixel: String,
    #[arg(long, default_value = "testing")]
    phase: String,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct DiagnoseArgs {
    #[arg(long)]
    cpm: f64,
    /// Click-through rate in percent.
    #[arg(long)]
    ctr: f64,
    #[arg(long)]
    cpc: f64,
    #[arg(long, alias = "cpr")]
    cost_per_result: f64,
    #[arg(long)]
    results: f64,
    #[arg(long, default_value_t = 0.0)]
    spend: f64,
    #[arg(long)]
    roas: Option<f64>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    web_root: Option<String>,
    /// Keep workspace data in memory only.
    #[arg(long)]
    ephemeral: bool,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/smart-ads.toml")]
    output: PathBuf,
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, config_path) = AppConfig::load(cli.config).map_err(|err| err.to_string())?;
    if let Some(path) = config_path.as_ref().filter(|path| path.exists()) {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    let command = cli.command.unwrap_or(Command::Budget(BudgetArgs::default()));

    match command {
        Command::Budget(args) => run_budget(args),
        Command::Structure(args) => run_structure(args),
        Command::Diagnose(args) => run_diagnose(args, &config),
        Command::Serve(args) => run_serve(args, config).await,
        Command::InitConfig(args) => run_init_config(args, &config),
    }
}

fn run_budget(args: BudgetArgs) -> Result<(), String> {
    let inputs = BudgetInputs {
        monthly_revenue_goal: args.revenue,
        unit_price: args.price,
        conversion_rate_pct: args.conversion,
        cost_per_click: args.cpc,
        ctr_pct: args.ctr,
        currency: Currency::from_str(&args.currency)
            .ok_or_else(|| format!("invalid currency: {}", args.currency))?,
        traffic_objective: TrafficObjective::from_str(&args.traffic)
            .ok_or_else(|| format!("invalid traffic objective: {}", args.traffic))?,
    };

    let Some(result) = compute_budget(&inputs) else {
        println!("Not enough data: revenue, price, conversion rate, CPC and CTR must all be above zero.");
        return Ok(());
    };

    if args.json {
        return print_json(&result);
    }

    let report = BudgetReport::new(&inputs, &result);
    println!("Revenue goal: {}", report.revenue_goal);
    println!(
        "Funnel: {} sales <- {} {} <- {} impressions",
        format_number(result.sales_needed as f64),
        format_number(result.clicks_needed as f64),
        report.click_label,
        format_number(result.impressions_needed as f64)
    );
    println!(
        "Budget: {} per month ({} per day)",
        report.total_budget, report.daily_budget
    );
    println!("Max CPM: {} | ROAS: {}", report.cpm_ceiling, report.roas);
    println!(
        "Break-even: {} sales | minimum CTR: {}",
        format_number(result.break_even_sales as f64),
        report.min_ctr
    );
    println!("\nStress test:");
    println!(
        "  conversion rate drops 1 point: {}",
        report.budget_if_conversion_drops
    );
    println!(
        "  CPM rises 50% (to {}): {}",
        report.cpm_if_rises, report.budget_if_cpm_rises
    );

    Ok(())
}

fn run_structure(args: StructureArgs) -> Result<(), String> {
    let inputs = StructureInputs {
        objective: CampaignObjective::from_str(&args.objective)
            .ok_or_else(|| format!("invalid objective: {}", args.objective))?,
        daily_budget: args.budget,
        currency: Currency::from_str(&args.currency)
            .ok_or_else(|| format!("invalid currency: {}", args.currency))?,
        pixel_maturity: PixelMaturity::from_str(&args.pixel)
            .ok_or_else(|| format!("invalid pixel maturity: {}", args.pixel))?,
        phase: CampaignPhase::from_str(&args.phase)
            .ok_or_else(|| format!("invalid phase: {}", args.phase))?,
    };
    let structure = generate_structure(&inputs);

    if args.json {
        return print_json(&structure);
    }

    println!("{}", structure.objective_summary);
    println!("{}\n", structure.rationale);
    for campaign in &structure.campaigns {
        let mode = if campaign.cbo_eligible { "CBO" } else { "ABO" };
        println!(
            "{} ({}%): {} per day [{}]",
            campaign.title, campaign.share_pct, campaign.budget_label, mode
        );
        for ad_set in &campaign.ad_sets {
            println!(
                "  - {}: {} ({} ads at {} each)",
                ad_set.name,
                ad_set.budget_label,
                ad_set.ads.len(),
                ad_set
                    .ads
                    .first()
                    .map(|ad| ad.budget_label.as_str())
                    .unwrap_or("-")
            );
        }
    }

    Ok(())
}

fn run_diagnose(args: DiagnoseArgs, config: &AppConfig) -> Result<(), String> {
    let metrics = MetricsInput {
        cpm: args.cpm,
        ctr: args.ctr,
        cpc: args.cpc,
        cost_per_result: args.cost_per_result,
        results: args.results,
        spend: args.spend,
        roas: args.roas,
    };
    let diagnosis = diagnose_with(&metrics, &config.diagnosis);

    if args.json {
        return print_json(&diagnosis);
    }

    println!("Overall: {}", diagnosis.overall.label());
    println!("{}", diagnosis.summary);
    for verdict in diagnosis.stages() {
        println!("\n{} [{}]", verdict.name, verdict.status.label());
        println!("  {}", verdict.explanation);
        for recommendation in &verdict.recommendations {
            println!("  - {}", recommendation);
        }
    }

    Ok(())
}

async fn run_serve(args: ServeArgs, mut config: AppConfig) -> Result<(), String> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(web_root) = args.web_root {
        config.server.web_root = web_root;
    }
    server::serve(config, args.ephemeral).await
}

fn run_init_config(args: InitConfigArgs, config: &AppConfig) -> Result<(), String> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "{} already exists (pass --force to overwrite)",
            args.output.display()
        ));
    }
    config.write(&args.output).map_err(|err| err.to_string())?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SMART_ADS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
