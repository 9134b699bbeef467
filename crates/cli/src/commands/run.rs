//! `climactl run`: the dual-input control loop.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use climactl_agent::{InferenceDriver, Session};
use climactl_core::provider::Provider;
use climactl_workflow::{ExitReason, Scheduler, TerminalInput, Trigger, TurnExecutor};
use tracing::warn;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Prints the transcript around each turn of the session.
struct ConsoleExecutor {
    session: Session,
    button_prompt: String,
}

#[async_trait]
impl TurnExecutor for ConsoleExecutor {
    async fn execute(&mut self, trigger: Trigger) -> Result<(), climactl_core::Error> {
        let prompt = match trigger {
            Trigger::Terminal(line) => line,
            Trigger::Button => {
                println!();
                println!("[DETECTED: BUTTON PRESSED] -> Starting automatic control mode via SLM.");
                self.button_prompt.clone()
            }
        };

        println!("Assistant: [Analyzing and Controlling...]");
        let report = self.session.run_turn(prompt).await?;
        println!("Assistant: {}", report.reply);
        println!("{}", report.status);
        Ok(())
    }

    fn ready(&mut self) {
        print!("You: ");
        let _ = std::io::stdout().flush();
    }
}

async fn preload(provider: &dyn Provider, model: &str) {
    println!("Pre-loading model {model}...");
    match provider.warm_up(model).await {
        Ok(()) => println!("Model {model} loaded successfully!"),
        Err(e) => {
            println!("{THIN_RULE}");
            println!("WARNING: Could not pre-load the model {model}.");
            println!("Make sure Ollama is running and the model is downloaded.");
            println!("Error details: {e}");
            println!("{THIN_RULE}");
            println!("The model will be loaded on the first interaction, causing initial latency.");
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    // Startup failures are fatal: nothing below can run without its backends.
    let board = climactl_hardware::build_from_config(&config.hardware)
        .map_err(|e| format!("Failed to initialise hardware: {e}"))?;
    let provider: Arc<dyn Provider> = Arc::new(
        climactl_providers::build_from_config(&config)
            .map_err(|e| format!("Failed to create model backend: {e}"))?,
    );
    let tools = Arc::new(climactl_tools::default_registry(&board));

    let model = config.slm.model_name.clone();
    println!();
    println!("{RULE}");
    println!("INTELLIGENT CLIMATE CONTROL SYSTEM");
    println!("Model: {model}");
    println!("{RULE}");
    println!("Input Modes: 1. Terminal (Type a command) | 2. Button (Press for automatic control)");
    println!();

    if config.slm.preload {
        preload(provider.as_ref(), &model).await;
    }

    let driver = InferenceDriver::from_config(provider, &config.slm, tools);
    let session = Session::new(
        driver,
        config.slm.system_prompt.clone(),
        config.slm.max_history_length,
        board.clone(),
    );
    let mut executor = ConsoleExecutor {
        session,
        button_prompt: config.control.button_control_prompt.clone(),
    };

    let mut scheduler =
        Scheduler::from_config(TerminalInput::stdin(), board.button(), &config.system);

    executor.ready();
    let reason = scheduler.run_until(&mut executor, ctrl_c()).await;
    if reason == ExitReason::Interrupted {
        println!();
    }
    println!();
    println!("Shutting down the system. Goodbye!");
    Ok(())
}
