use pazaryeri_core::config::{AppConfig, LoadOptions};
use pazaryeri_core::query::new_correlation_id;
use pazaryeri_core::{CatalogError, CatalogQueryService, QueryRequest, QueryResponse};
use pazaryeri_provider::build_provider;

use crate::commands::{init_logging, CommandResult};

pub fn run(request: &QueryRequest, options: LoadOptions) -> CommandResult {
    let command = request.operation().as_str();

    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let correlation_id = new_correlation_id();
    let result = runtime.block_on(async {
        let provider = build_provider(&config.provider)?;
        let service = CatalogQueryService::new(provider);
        service.execute_with_correlation(request, &correlation_id).await
    });

    match result {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(data) => CommandResult::success(command, summarize(&response), data),
            Err(error) => CommandResult::failure(
                command,
                "serialization",
                format!("failed to serialize query response: {error}"),
                3,
            ),
        },
        Err(error) => {
            let error_class = error.error_class();
            let exit_code = exit_code(&error);
            let interface = error.into_interface(correlation_id.clone());
            CommandResult::failure_with_correlation(
                command,
                error_class,
                interface.user_message(),
                exit_code,
                Some(correlation_id),
            )
        }
    }
}

fn exit_code(error: &CatalogError) -> u8 {
    match error {
        CatalogError::ProviderUnavailable { .. } => 4,
        CatalogError::ProviderTimeout { .. } => 5,
        CatalogError::ProviderBadResponse { .. } => 6,
    }
}

fn summarize(response: &QueryResponse) -> String {
    if let Some(reason) = response.empty_reason() {
        return reason.message();
    }

    match response {
        QueryResponse::Listing(report) => match report.stock_tier {
            Some(tier) => format!(
                "{} {}: {} products",
                tier.emoji(),
                tier.display_name(),
                report.total_matched
            ),
            None => format!("{} products matched", report.total_matched),
        },
        QueryResponse::Budget(recommendation) => {
            let report = &recommendation.report;
            let remaining = report
                .remaining_budget
                .map(|remaining| remaining.to_string())
                .unwrap_or_default();
            format!(
                "{} of {} affordable products recommended for budget {}: total {}, remaining {}",
                report.ranked_top_n.len(),
                report.total_considered,
                recommendation.budget,
                report.total_of_top_n,
                remaining
            )
        }
        QueryResponse::Shopper(recommendation) => format!(
            "{} of {} products recommended for \"{}\" ({} rule)",
            recommendation.report.ranked_top_n.len(),
            recommendation.report.total_considered,
            recommendation.need,
            recommendation.rule.as_str()
        ),
    }
}
