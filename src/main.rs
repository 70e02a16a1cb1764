use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wms_velocity::{
    BaseInfo, DateForAnalysis, Env, ProjectService, Settings, TransformOptions, WeekendDateRule,
};

#[derive(Parser)]
#[command(name = "wms-velocity", version, about = "Warehouse velocity profiler and loader")]
struct Cli {
    /// Project number the command applies to
    #[arg(long, short, global = true)]
    project: Option<String>,

    /// Store environment
    #[arg(long, global = true, default_value = "dev")]
    env: Env,

    /// Settings file (TOML); WMS__* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Default)]
struct InfoArgs {
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    salesperson: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List project numbers in the store
    List,
    /// Create a project with no data
    Create(InfoArgs),
    /// Show a project as JSON
    Show,
    /// Update a project's descriptive fields
    Update(InfoArgs),
    /// Validate, transform and load a directory of CSV files
    Upload {
        dir: PathBuf,
        /// ship | pick | received
        #[arg(long, default_value = "ship")]
        date: DateForAnalysis,
        /// nearest-weekday | all-to-monday | all-to-friday | as-is
        #[arg(long, default_value = "as-is")]
        weekend: WeekendDateRule,
        #[arg(long)]
        skip_inbound: bool,
        #[arg(long)]
        skip_inventory: bool,
        #[arg(long)]
        skip_outbound: bool,
    },
    /// Delete the project's derived rows
    DeleteData,
    /// Delete the project (refused while data is uploaded)
    Delete,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    let project = match (&cli.command, &cli.project) {
        (Command::List, None) => String::new(),
        (_, Some(pn)) => pn.clone(),
        (_, None) => anyhow::bail!("--project is required for this command"),
    };
    let service = ProjectService::new(project, cli.env, settings)?;

    match cli.command {
        Command::List => run_list(&service)?,
        Command::Create(args) => run_create(&service, args)?,
        Command::Show => {
            let info = service.get_project()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Update(args) => run_update(&service, args)?,
        Command::Upload {
            dir,
            date,
            weekend,
            skip_inbound,
            skip_inventory,
            skip_outbound,
        } => {
            let options = TransformOptions {
                date_for_analysis: date,
                weekend_date_rule: weekend,
                process_inbound: !skip_inbound,
                process_inventory: !skip_inventory,
                process_outbound: !skip_outbound,
            };
            run_upload(&service, dir, options)?;
        }
        Command::DeleteData => {
            let deleted = service.delete_project_data()?;
            println!("🗑️  Deleted {} derived row(s) for {}", deleted, service.project_number());
        }
        Command::Delete => {
            service.delete_project()?;
            println!("🗑️  Project {} deleted", service.project_number());
        }
    }

    Ok(())
}

fn run_list(service: &ProjectService) -> Result<()> {
    let projects = service.list_projects()?;
    println!("📋 Projects ({}): {}", service.env(), projects.len());
    for pn in projects {
        println!("   {}", pn);
    }
    Ok(())
}

fn run_create(service: &ProjectService, args: InfoArgs) -> Result<()> {
    let info = BaseInfo {
        project_number: service.project_number().to_string(),
        company: args.company.unwrap_or_default(),
        location: args.location.unwrap_or_default(),
        salesperson: args.salesperson.unwrap_or_default(),
        email: args.email.unwrap_or_default(),
        start_date: args.start_date,
        notes: args.notes.unwrap_or_default(),
    };
    let created = service.create_project(info)?;
    println!("✓ Project {} created in {}", created.base.project_number, service.env());
    Ok(())
}

fn run_update(service: &ProjectService, args: InfoArgs) -> Result<()> {
    let mut info = service.get_project()?;
    let base = &mut info.base;
    if let Some(v) = args.company {
        base.company = v;
    }
    if let Some(v) = args.location {
        base.location = v;
    }
    if let Some(v) = args.salesperson {
        base.salesperson = v;
    }
    if let Some(v) = args.email {
        base.email = v;
    }
    if args.start_date.is_some() {
        base.start_date = args.start_date;
    }
    if let Some(v) = args.notes {
        base.notes = v;
    }
    service.update_project(info)?;
    println!("✓ Project {} updated", service.project_number());
    Ok(())
}

fn run_upload(service: &ProjectService, dir: PathBuf, options: TransformOptions) -> Result<()> {
    println!("🚚 Upload {} → project {} ({})", dir.display(), service.project_number(), service.env());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let response = service.transform_and_upload(&dir, options)?;
    println!("📝 Log: {}", response.log_file_path);

    if !response.success {
        eprintln!("❌ {}", response.message);
        std::process::exit(1);
    }

    let rows = &response.rows_inserted;
    println!("✓ SKUs:             {}", rows.skus);
    println!("✓ Inbound receipts: {}", rows.inbound_receipts);
    println!("✓ Inbound lines:    {}", rows.inbound_lines);
    println!("✓ Inventory lines:  {}", rows.inventory_lines);
    println!("✓ Outbound lines:   {}", rows.outbound_lines);
    println!("✓ Outbound orders:  {}", rows.outbound_orders);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🎉 {} rows inserted", rows.total);
    Ok(())
}
