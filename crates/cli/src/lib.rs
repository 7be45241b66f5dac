pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pazaryeri_core::config::{ConfigOverrides, LoadOptions};
use pazaryeri_core::domain::query::{
    BrandCategoryParams, BudgetParams, CategoryParams, PriceRangeParams, QueryRequest,
    SearchParams, ShopperParams, StockLevelParams,
};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "pazaryeri",
    about = "Pazaryeri catalog query CLI",
    long_about = "Query the marketplace product catalog and get budget or needs-based recommendations.",
    after_help = "Examples:\n  pazaryeri search laptop\n  pazaryeri stock-level out_of_stock\n  pazaryeri budget 1000 --category Mutfak\n  pazaryeri shopper \"laptop gaming için\" --budget 45000\n  pazaryeri config"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Load configuration from this TOML file")]
    config_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Read the catalog from a saved JSON envelope instead of the API"
    )]
    snapshot: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List every product in the catalog")]
    Products,
    #[command(about = "Find products whose name, description or brand contains the text")]
    Search { query: String },
    #[command(about = "List products whose primary category contains the name")]
    Category { category: String },
    #[command(about = "List products priced within an inclusive range, cheapest first")]
    PriceRange {
        #[arg(long)]
        min: Decimal,
        #[arg(long)]
        max: Decimal,
    },
    #[command(about = "List products in a stock tier (low, medium, high, out_of_stock)")]
    StockLevel { level: String },
    #[command(about = "List products of a brand within a category")]
    BrandCategory { brand: String, category: String },
    #[command(about = "List featured products")]
    Featured,
    #[command(about = "Recommend up to five in-stock products that each fit the budget")]
    Budget {
        budget: Decimal,
        #[arg(long)]
        category: Option<String>,
    },
    #[command(about = "Recommend up to three products for a free-text need")]
    Shopper {
        need: String,
        #[arg(long)]
        budget: Option<Decimal>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

impl Command {
    fn into_request(self) -> Option<QueryRequest> {
        let request = match self {
            Self::Products => QueryRequest::ListAll,
            Self::Search { query } => QueryRequest::Search(SearchParams { query }),
            Self::Category { category } => QueryRequest::ByCategory(CategoryParams { category }),
            Self::PriceRange { min, max } => {
                QueryRequest::ByPriceRange(PriceRangeParams { min_price: min, max_price: max })
            }
            Self::StockLevel { level } => {
                QueryRequest::ByStockLevel(StockLevelParams { stock_level: level })
            }
            Self::BrandCategory { brand, category } => {
                QueryRequest::ByBrandAndCategory(BrandCategoryParams { brand, category })
            }
            Self::Featured => QueryRequest::FeaturedOnly,
            Self::Budget { budget, category } => {
                QueryRequest::BudgetRecommendation(BudgetParams { budget, category })
            }
            Self::Shopper { need, budget } => {
                QueryRequest::PersonalShopper(ShopperParams { need, budget })
            }
            Self::Config => return None,
        };
        Some(request)
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config_file.is_some(),
        config_path: cli.config_file,
        overrides: ConfigOverrides { snapshot_path: cli.snapshot, ..ConfigOverrides::default() },
    };

    let result = match cli.command.into_request() {
        Some(request) => commands::query::run(&request, options),
        None => commands::CommandResult { exit_code: 0, output: commands::config::run(options) },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
