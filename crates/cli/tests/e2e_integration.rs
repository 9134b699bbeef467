//! End-to-end integration tests for the climactl control loop.
//!
//! These tests run the whole pipeline: scheduler trigger → session →
//! inference driver → capability registry → simulated board, with a
//! scripted model standing in for Ollama.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use climactl_agent::{InferenceDriver, Session, TurnReport};
use climactl_config::AppConfig;
use climactl_core::error::{Error, ProviderError};
use climactl_core::hardware::{LedColor, LedState};
use climactl_core::message::{Message, Role, ToolRequest};
use climactl_core::provider::{Provider, ProviderRequest, ProviderResponse, Timings};
use climactl_hardware::SimulatedRig;
use climactl_tools::default_registry;
use climactl_workflow::{ExitReason, Scheduler, TerminalInput, Trigger, TurnExecutor};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted outcomes in sequence and keeps
/// every request it saw.
struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(outcomes: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, i: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[i].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            panic!("ScriptedProvider exhausted: call #{}", self.calls());
        }
        self.requests.lock().unwrap().push(request);
        outcomes.remove(0)
    }
}

fn timings() -> Timings {
    Timings {
        total_duration: Some(2_000_000_000),
        eval_count: Some(24),
        eval_duration: Some(1_200_000_000),
        ..Timings::default()
    }
}

fn text_response(text: &str) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant(text),
        model: "mock".into(),
        timings: timings(),
    })
}

fn tool_response(calls: Vec<ToolRequest>) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant_with_tools("", calls),
        model: "mock".into(),
        timings: timings(),
    })
}

fn set_led(color: &str, state: &str) -> ToolRequest {
    ToolRequest::new("set_led_state", serde_json::json!({"color": color, "state": state}))
}

// ── Executor ─────────────────────────────────────────────────────────────

const BUTTON_PROMPT: &str = "Button pressed: check the room and set the LEDs.";

/// Runs turns through a session and keeps the reports instead of printing.
struct RecordingExecutor {
    session: Session,
    triggers: Vec<Trigger>,
    reports: Vec<TurnReport>,
}

#[async_trait::async_trait]
impl TurnExecutor for RecordingExecutor {
    async fn execute(&mut self, trigger: Trigger) -> Result<(), Error> {
        self.triggers.push(trigger.clone());
        let prompt = match trigger {
            Trigger::Terminal(line) => line,
            Trigger::Button => BUTTON_PROMPT.to_string(),
        };
        let report = self.session.run_turn(prompt).await?;
        self.reports.push(report);
        Ok(())
    }
}

fn executor(provider: Arc<ScriptedProvider>, rig: &SimulatedRig, config: &AppConfig) -> RecordingExecutor {
    let tools = Arc::new(default_registry(&rig.board));
    let driver = InferenceDriver::from_config(provider, &config.slm, tools);
    RecordingExecutor {
        session: Session::new(
            driver,
            config.slm.system_prompt.clone(),
            config.slm.max_history_length,
            rig.board.clone(),
        ),
        triggers: Vec::new(),
        reports: Vec::new(),
    }
}

// ── E2E: terminal turn ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn e2e_terminal_turn_on_red_light() {
    let rig = SimulatedRig::comfortable();
    let config = AppConfig::default();
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![set_led("red", "on")]),
        text_response("Done, the red light is on."),
    ]));
    let mut exec = executor(provider.clone(), &rig, &config);

    let (tx, input) = TerminalInput::channel();
    tx.send("turn on red light".into()).await.unwrap();
    tx.send("exit".into()).await.unwrap();
    let mut scheduler = Scheduler::from_config(input, rig.board.button(), &config.system);

    let reason = scheduler.run(&mut exec).await;
    assert_eq!(reason, ExitReason::ExitKeyword);

    // One turn, two backend requests.
    assert_eq!(exec.reports.len(), 1);
    assert_eq!(provider.calls(), 2);

    let report = &exec.reports[0];
    assert_eq!(report.reply, "Done, the red light is on.");
    assert_eq!(report.status.leds.red_led_status, LedState::On);
    assert!(report.status.to_string().contains("Red LED:    ON"));
    assert!(report.status.to_string().contains("Eval Rate: 20.00 tokens/s"));

    // The follow-up request carried the tool result.
    let follow_up = provider.request(1);
    let tool_msg = follow_up.messages.last().unwrap();
    assert_eq!(tool_msg.role, Role::Tool);
    assert_eq!(tool_msg.tool_name.as_deref(), Some("set_led_state"));
    assert_eq!(tool_msg.content, "\"LED RED turned on successfully.\"");

    // system, user, assistant(tool call), tool, assistant
    let history = exec.session.conversation().messages();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].content, config.slm.system_prompt);
    assert_eq!(history[4].content, "Done, the red light is on.");
}

// ── E2E: button turn ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn e2e_held_button_runs_one_automatic_turn() {
    let rig = SimulatedRig::comfortable();
    let config = AppConfig::default();
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![
            ToolRequest::new("read_environment_data", serde_json::json!({})),
            set_led("green", "on"),
        ]),
        text_response("Comfortable room; green is on."),
    ]));
    let mut exec = executor(provider.clone(), &rig, &config);

    let (tx, input) = TerminalInput::channel();
    let mut scheduler = Scheduler::from_config(input, rig.board.button(), &config.system);

    rig.button.press();
    let button = rig.button.clone();
    let reason = scheduler
        .run_until(&mut exec, async move {
            // Held for many ticks, then released.
            tokio::time::sleep(Duration::from_secs(2)).await;
            button.release();
            tokio::time::sleep(Duration::from_secs(1)).await;
            drop(tx);
        })
        .await;

    assert_eq!(reason, ExitReason::Interrupted);
    assert_eq!(exec.triggers, [Trigger::Button]);
    assert_eq!(provider.calls(), 2);
    assert_eq!(provider.request(0).messages[1].content, BUTTON_PROMPT);

    // The sensor read saw the button held down.
    let env_msg = &provider.request(1).messages[3];
    assert_eq!(env_msg.tool_name.as_deref(), Some("read_environment_data"));
    assert!(env_msg.content.contains(r#""button_pressed":true"#));

    assert_eq!(rig.board.led_status().get(LedColor::Green), LedState::On);
}

// ── E2E: backend failure ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn e2e_backend_failure_does_not_stop_loop() {
    let rig = SimulatedRig::comfortable();
    let config = AppConfig::default();
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderError::Network("connection refused".into())),
        text_response("Hello again."),
    ]));
    let mut exec = executor(provider.clone(), &rig, &config);

    let (tx, input) = TerminalInput::channel();
    tx.send("hello".into()).await.unwrap();
    tx.send("hello?".into()).await.unwrap();
    tx.send("QUIT".into()).await.unwrap();
    let mut scheduler = Scheduler::from_config(input, rig.board.button(), &config.system);

    assert_eq!(scheduler.run(&mut exec).await, ExitReason::ExitKeyword);
    assert_eq!(exec.triggers.len(), 2);
    assert_eq!(exec.reports.len(), 1);
    assert_eq!(exec.reports[0].reply, "Hello again.");

    // system, user (failed), user, assistant
    assert_eq!(exec.session.conversation().len(), 4);
}

// ── E2E: history cap from config ─────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn e2e_history_cap_comes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[slm]
model_name = "qwen2.5:0.5b"
max_history_length = 5

[system]
check_interval_s = 0.05
"#,
    )
    .unwrap();
    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.slm.max_history_length, 5);

    let rig = SimulatedRig::comfortable();
    let outcomes = (0..4).map(|i| text_response(&format!("answer {i}"))).collect();
    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let mut exec = executor(provider.clone(), &rig, &config);

    let (tx, input) = TerminalInput::channel();
    for i in 0..4 {
        tx.send(format!("question {i}")).await.unwrap();
    }
    tx.send("q".into()).await.unwrap();
    let mut scheduler = Scheduler::from_config(input, rig.board.button(), &config.system);
    assert_eq!(scheduler.period(), Duration::from_millis(50));

    scheduler.run(&mut exec).await;

    assert_eq!(provider.request(0).model, "qwen2.5:0.5b");
    let history = exec.session.conversation().messages();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].role, Role::System);
    assert_eq!(history[1].content, "question 2");
    assert_eq!(history[4].content, "answer 3");
}
