//! FinStart CLI - microfinance calculators from the command line
//!
//! Usage:
//! ```bash
//! finstart emi 100000 12 1 --schedule
//! finstart eligibility --income 50000 --credit-score 820 --debt 1000 --years 5
//! finstart budget 5000 6000 --goal 500
//! finstart growth 10000 10 3
//! finstart locate Mumbai --lat 19.13 --lon 72.85
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finstart::{
    amortization_schedule, evaluate_eligibility, parse_amount, parse_years, plan_budget,
    project_growth, summarize, BankLocator, BudgetInput, Config, EligibilityInput,
    EligibilityOutcome, GeoPoint, GrowthInput, LoanTerms, LookupState, SerpApiClient,
};

/// FinStart - financial literacy tools for microfinance users
#[derive(Parser)]
#[command(name = "finstart")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

// Numbers are taken as text so bad input is reported per field
#[derive(Subcommand)]
enum Commands {
    /// Monthly installment for a loan
    Emi {
        /// Amount borrowed
        principal: String,
        /// Annual interest rate in percent
        rate: String,
        /// Term in years
        years: String,
        /// Print the month-by-month amortization table
        #[arg(long)]
        schedule: bool,
    },

    /// Check loan eligibility and the largest affordable loan
    Eligibility {
        #[arg(long)]
        income: String,
        #[arg(long)]
        credit_score: u16,
        /// Existing monthly debt repayments
        #[arg(long, default_value = "0")]
        debt: String,
        #[arg(long)]
        years: String,
    },

    /// Monthly savings or overspend
    Budget {
        income: String,
        expenses: String,
        #[arg(long, default_value = "0")]
        goal: String,
    },

    /// Compound growth of an investment, year by year
    Growth {
        investment: String,
        /// Annual growth rate in percent
        rate: String,
        years: String,
    },

    /// Find microfinance banks near a location (needs SERP_API_KEY)
    Locate {
        location: String,
        /// Your latitude, to sort results by distance
        #[arg(long, requires = "lon")]
        lat: Option<f64>,
        /// Your longitude
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finstart=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Emi {
            principal,
            rate,
            years,
            schedule,
        } => run_emi(&principal, &rate, &years, schedule, cli.json),
        Commands::Eligibility {
            income,
            credit_score,
            debt,
            years,
        } => run_eligibility(&income, credit_score, &debt, &years, cli.json),
        Commands::Budget {
            income,
            expenses,
            goal,
        } => run_budget(&income, &expenses, &goal, cli.json),
        Commands::Growth {
            investment,
            rate,
            years,
        } => run_growth(&investment, &rate, &years, cli.json),
        Commands::Locate { location, lat, lon } => {
            let origin = lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon));
            run_locate(&location, origin, cli.json)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_emi(principal: &str, rate: &str, years: &str, schedule: bool, json: bool) -> Result<()> {
    let terms = LoanTerms::new(
        parse_amount("principal", principal)?,
        parse_amount("annual_rate_percent", rate)?,
        parse_amount("term_years", years)?,
    );
    let summary = summarize(&terms)?;
    let rows = if schedule {
        amortization_schedule(&terms)?
    } else {
        Vec::new()
    };

    if json {
        return print_json(&serde_json::json!({ "summary": summary, "schedule": rows }));
    }

    println!("💸 EMI: {:.2}", summary.emi);
    println!("   Total payment:  {:.2}", summary.total_payment);
    println!("   Total interest: {:.2}", summary.total_interest);

    if schedule {
        println!(
            "\n{:>5} {:>14} {:>12} {:>12} {:>12} {:>14}",
            "Month", "Opening", "Payment", "Interest", "Principal", "Closing"
        );
        for row in &rows {
            println!(
                "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                row.month,
                row.opening_balance,
                row.payment,
                row.interest,
                row.principal,
                row.closing_balance
            );
        }
    }
    Ok(())
}

fn run_eligibility(
    income: &str,
    credit_score: u16,
    debt: &str,
    years: &str,
    json: bool,
) -> Result<()> {
    let input = EligibilityInput {
        monthly_income: parse_amount("monthly_income", income)?,
        credit_score,
        existing_monthly_debt: parse_amount("existing_monthly_debt", debt)?,
        requested_term_years: parse_amount("requested_term_years", years)?,
    };
    let outcome = evaluate_eligibility(&input)?;

    if json {
        return print_json(&outcome);
    }

    match outcome {
        EligibilityOutcome::Rejected { reason } => {
            println!("❌ Not eligible: {}", reason);
        }
        EligibilityOutcome::Approved(offer) => {
            println!("✅ Eligible");
            println!("   Max loan amount: {:.0}", offer.max_loan_amount);
            println!("   Max monthly EMI: {:.0}", offer.max_monthly_emi);
            println!("   Interest rate:   {}%", offer.interest_rate_percent);
            println!("   Tenure:          {} years", offer.tenure_years);
            println!("   Total interest:  {:.0}", offer.total_interest);
            println!("   Approval chance: {}", offer.approval_chance);
        }
    }
    Ok(())
}

fn run_budget(income: &str, expenses: &str, goal: &str, json: bool) -> Result<()> {
    let result = plan_budget(&BudgetInput {
        monthly_income: parse_amount("monthly_income", income)?,
        monthly_expenses: parse_amount("monthly_expenses", expenses)?,
        savings_goal: parse_amount("savings_goal", goal)?,
    })?;

    if json {
        return print_json(&result);
    }

    println!("📒 {}", result.message);
    if result.savings_goal > 0.0 {
        if result.goal_met {
            println!("   Savings goal of {:.2} is within reach.", result.savings_goal);
        } else {
            println!("   {:.2} short of the savings goal.", result.goal_gap);
        }
    }
    Ok(())
}

fn run_growth(investment: &str, rate: &str, years: &str, json: bool) -> Result<()> {
    let result = project_growth(&GrowthInput::new(
        parse_amount("initial_investment", investment)?,
        parse_amount("annual_growth_rate_percent", rate)?,
        parse_years("years", years)?,
    ))?;

    if json {
        return print_json(&result);
    }

    for (year, value) in result.yearly_projected_values.iter().enumerate() {
        println!("   Year {:>3}: {:.2}", year, value);
    }
    println!("📈 {}", result.summary());
    Ok(())
}

fn run_locate(location: &str, origin: Option<GeoPoint>, json: bool) -> Result<()> {
    let config = Config::from_env()?;
    let api_key = config.require_api_key()?;
    let client = SerpApiClient::new(&config.search_base_url, api_key, config.upstream_timeout)?;
    let locator = BankLocator::new(Arc::new(client));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let state = runtime.block_on(locator.run(location, origin));

    match state {
        LookupState::Success(banks) => {
            if json {
                return print_json(&banks);
            }
            println!("🏦 {} microfinance banks near {}\n", banks.len(), location.trim());
            for bank in &banks {
                println!("• {}", bank.name);
                println!("  📍 {}", bank.address);
                println!("  ⭐ Rating: {}", bank.rating);
                if let Some(km) = bank.distance_km {
                    println!("  📏 Distance: {:.2} km", km);
                }
                println!("  🧭 {}", bank.directions_url());
            }
            Ok(())
        }
        LookupState::Empty => {
            println!("No microfinance banks found for this location.");
            Ok(())
        }
        LookupState::Failed(reason) => anyhow::bail!(reason),
        LookupState::Idle | LookupState::Querying { .. } => {
            anyhow::bail!("lookup did not finish")
        }
    }
}
