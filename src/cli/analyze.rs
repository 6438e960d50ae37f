use super::ui;
use crate::core::analysis::request::validate_batch;
use crate::core::analysis::{
    AnalysisError, AnalysisRequest, AnalysisResponse, Analyzer, EscalationRule, StartDatePreset,
};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::Cell;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Parameters shared by every fund of one `analyze` invocation.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub codes: Vec<String>,
    pub start_date: StartDatePreset,
    pub initial_investment: f64,
    pub monthly_investment: f64,
    pub yearly_increase: EscalationRule,
    pub include_monthly_details: bool,
    pub format: OutputFormat,
}

impl AnalyzeOptions {
    fn normalized_codes(&self) -> Vec<String> {
        self.codes.iter().map(|c| c.trim().to_uppercase()).collect()
    }

    fn request_for(&self, code: &str) -> AnalysisRequest {
        AnalysisRequest {
            fund_code: code.to_string(),
            start_date: self.start_date,
            initial_investment: self.initial_investment,
            monthly_investment: self.monthly_investment,
            yearly_increase: self.yearly_increase,
            include_monthly_details: self.include_monthly_details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailedAnalysis {
    pub code: String,
    pub status: u16,
    pub error: String,
}

impl FailedAnalysis {
    fn new(code: &str, error: &AnalysisError) -> Self {
        Self {
            code: code.to_string(),
            status: error.status_code(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FundOutcome {
    Analyzed(AnalysisResponse),
    Failed(FailedAnalysis),
}

impl FundOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FundOutcome::Failed(_))
    }
}

/// Analyzes all requested funds concurrently, in request order.
pub async fn analyze_all(
    options: &AnalyzeOptions,
    analyzer: &Analyzer<'_>,
    today: NaiveDate,
    on_done: &(dyn Fn() + Sync),
) -> Result<Vec<FundOutcome>> {
    let codes = options.normalized_codes();
    validate_batch(&codes)?;

    let futures = codes.iter().map(|code| {
        let request = options.request_for(code);
        async move {
            let outcome = match analyzer.analyze(&request, today).await {
                Ok(response) => FundOutcome::Analyzed(response),
                Err(e) => {
                    warn!("Analysis of {} failed: {}", code, e);
                    FundOutcome::Failed(FailedAnalysis::new(code, &e))
                }
            };
            on_done();
            outcome
        }
    });
    Ok(join_all(futures).await)
}

pub async fn run(options: &AnalyzeOptions, analyzer: &Analyzer<'_>, today: NaiveDate) -> Result<()> {
    let pb = ui::new_progress_bar(options.codes.len() as u64, true);
    pb.set_message("Analyzing funds...");
    let outcomes = analyze_all(options, analyzer, today, &|| pb.inc(1)).await;
    pb.finish_and_clear();
    let outcomes = outcomes?;

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Table => {
            for (i, outcome) in outcomes.iter().enumerate() {
                if i > 0 {
                    ui::print_separator();
                }
                println!("{}", render_outcome(outcome));
            }
        }
    }

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    debug!("{} of {} analyses failed", failed, outcomes.len());
    if failed == outcomes.len() {
        bail!("All {} fund analyses failed", failed);
    }
    Ok(())
}

pub fn render_outcome(outcome: &FundOutcome) -> String {
    match outcome {
        FundOutcome::Analyzed(response) => render_response(response),
        FundOutcome::Failed(failed) => format!(
            "Fund: {}\n\n{}",
            ui::style_text(&failed.code, ui::StyleType::Title),
            ui::style_text(
                &format!("Error {}: {}", failed.status, failed.error),
                ui::StyleType::Error
            )
        ),
    }
}

fn render_response(response: &AnalysisResponse) -> String {
    let summary = &response.summary;
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Total Investment"),
        ui::header_cell("Current Value"),
        ui::header_cell("Total Yield"),
        ui::header_cell("Yield (%)"),
    ]);
    table.add_row(vec![
        ui::money_cell(summary.total_investment),
        ui::money_cell(summary.current_value),
        ui::signed_money_cell(summary.total_yield),
        ui::change_cell(summary.total_yield_percentage),
    ]);

    let mut output = format!(
        "Fund: {} {}\n{}\n\n",
        ui::style_text(&response.code, ui::StyleType::Title),
        ui::style_text(&response.title, ui::StyleType::Label),
        ui::style_text(
            &format!("Management company: {}", response.management_company_id),
            ui::StyleType::Subtle
        )
    );
    output.push_str(&table.to_string());

    if let Some(details) = &response.monthly_details {
        let mut monthly = ui::new_styled_table();
        monthly.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Investment"),
            ui::header_cell("Total Investment"),
            ui::header_cell("Unit Price"),
            ui::header_cell("Units"),
            ui::header_cell("Total Units"),
            ui::header_cell("Value"),
            ui::header_cell("Yield"),
            ui::header_cell("Yield (%)"),
        ]);
        for detail in details {
            monthly.add_row(vec![
                Cell::new(detail.date.format("%Y-%m-%d")),
                ui::money_cell(detail.investment),
                ui::money_cell(detail.total_investment),
                ui::number_cell(detail.unit_price, 6),
                ui::number_cell(detail.units, 4),
                ui::number_cell(detail.total_units, 4),
                ui::money_cell(detail.value),
                ui::signed_money_cell(detail.yield_amount),
                ui::change_cell(detail.yield_percentage),
            ]);
        }
        output.push_str("\n\nMonthly details\n");
        output.push_str(&monthly.to_string());
    }

    output.push_str(&format!(
        "\n\nTotal Yield: {}",
        ui::style_text(
            &format!("{:.2}%", summary.total_yield_percentage),
            ui::signed_style(summary.total_yield_percentage)
        )
    ));
    output
}
