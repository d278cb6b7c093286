//! Interactive command-line interface for the stock advisor
//!
//! Runs the full conversation loop against offline demo collaborators, so
//! the pipeline can be exercised end to end without network access.

mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use advisor_chat::ConversationManager;
use advisor_core::AdvisorConfig;
use advisor_workflow::WorkflowEngine;

use demo::{
    DemoFundamentalsAgent, DemoLanguageModel, DemoNewsAgent, DemoPriceAgent, FileReportSink,
};

#[derive(Parser, Debug)]
#[command(name = "advisor-cli")]
#[command(about = "Interactive stock analysis advisor", long_about = None)]
struct Args {
    /// Default symbol when a query names none
    #[arg(long, default_value = "AAPL")]
    default_symbol: String,

    /// Default price history period (e.g. 1y, 6m, 30d)
    #[arg(long, default_value = "1y")]
    default_period: String,

    /// Default news lookback in days
    #[arg(long, default_value_t = 7)]
    default_news_days: u32,

    /// Directory where generated reports are written
    #[arg(long, default_value = "reports")]
    report_dir: PathBuf,

    /// Process one message and exit instead of starting the REPL
    #[arg(short, long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    advisor_utils::init_tracing();

    let args = Args::parse();

    let config = Arc::new(
        AdvisorConfig::builder()
            .default_symbol(&args.default_symbol)
            .default_period(&args.default_period)
            .default_news_days(args.default_news_days)
            .build()
            .context("invalid configuration")?,
    );

    let llm = Arc::new(DemoLanguageModel);
    let price = Arc::new(DemoPriceAgent);

    let engine = WorkflowEngine::new(
        llm.clone(),
        price.clone(),
        Arc::new(DemoNewsAgent),
        Arc::new(DemoFundamentalsAgent),
        Arc::new(FileReportSink::new(args.report_dir)),
        config.clone(),
    );

    let mut manager = ConversationManager::new(llm, engine, price, config);

    info!("advisor ready");

    if let Some(query) = args.query {
        let response = manager.process_message(&query).await;
        println!("{}", response.message);
        return Ok(());
    }

    run_repl(&mut manager).await
}

async fn run_repl(manager: &mut ConversationManager) -> anyhow::Result<()> {
    println!("Stock Advisor (demo mode)");
    println!("Try: 'Analyze AAPL', 'Compare AAPL and MSFT', or a general question.");
    println!("Commands: /reset, /summary, /quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" | "quit" | "exit" => break,
            "/reset" => {
                let response = manager.reset_conversation();
                println!("{}\n", response.message);
            }
            "/summary" => {
                let summary = manager.conversation_summary();
                println!("{}\n", serde_json::to_string_pretty(&summary)?);
            }
            _ => {
                let response = manager.process_message(input).await;
                println!("{}\n", response.message);
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}
