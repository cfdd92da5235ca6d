use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod buckets;
mod db;
mod error;
mod filter;
mod http;
mod models;
mod query;
mod score;

use filter::{FilterCriteria, SortOrder};
use score::Metric;

#[derive(Parser)]
#[command(name = "student-rankings")]
#[command(about = "Ranking dashboard backend for the students table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import or refresh students from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Rank students by CGPA or overall score, with the bucket distribution
    Rank {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        starting_year: Option<i32>,
        #[arg(long)]
        ending_year: Option<i32>,
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        sort: SortOrder,
        #[arg(long, value_enum, default_value_t = Metric::Cgpa)]
        metric: Metric,
        /// Emit the response payload as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List students by LeetCode solved count
    Leaderboard {
        #[arg(long)]
        department: Option<String>,
        /// Batch (graduation year) to filter on
        #[arg(long)]
        batch: Option<i32>,
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        sort: SortOrder,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List distinct departments
    Departments,
    /// List distinct batches (ending years), newest first
    Batches,
    /// Serve the dashboard HTTP API
    Serve {
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to the students Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(&pool, &csv).await?;
            println!("Imported {imported} students from {}.", csv.display());
        }
        Commands::Rank {
            department,
            starting_year,
            ending_year,
            sort,
            metric,
            json,
        } => {
            let criteria =
                FilterCriteria::new(department, starting_year, ending_year, sort, None);
            let data = query::fetch_ranking(&pool, &criteria, metric).await?;
            let stats = query::fetch_score_distribution(&pool, &criteria, metric).await?;

            if json {
                let payload = serde_json::json!({ "data": data, "stats": stats });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            if data.is_empty() {
                println!("No students matched these filters.");
                return Ok(());
            }

            for (place, row) in data.iter().enumerate() {
                match row.score {
                    Some(score) => {
                        println!("{:>3}. {} ({}) {score:.2}", place + 1, row.name, row.rno)
                    }
                    None => println!("{:>3}. {} ({}) no score", place + 1, row.name, row.rno),
                }
            }

            println!();
            println!("Distribution:");
            for bucket in &stats {
                println!("- {}: {}", bucket.label, bucket.count);
            }
        }
        Commands::Leaderboard {
            department,
            batch,
            sort,
            search,
            json,
        } => {
            let criteria = FilterCriteria::new(department, None, batch, sort, search);
            let rows = query::fetch_leaderboard(&pool, &criteria).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            if rows.is_empty() {
                println!("No students matched these filters.");
                return Ok(());
            }

            for row in &rows {
                let solved = row
                    .lc
                    .map(|count| count.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} ({}) solved {solved}",
                    row.name,
                    row.lc_id.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Departments => {
            for department in query::fetch_departments(&pool).await? {
                println!("{department}");
            }
        }
        Commands::Batches => {
            for batch in query::fetch_batches(&pool).await? {
                println!("{batch}");
            }
        }
        Commands::Serve { port } => http::serve(pool, port).await?,
    }

    Ok(())
}
