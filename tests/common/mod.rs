#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::oneshot;

use jira_wizard::error::{Result, WizardError};
use jira_wizard::remote::{CredentialsRequest, ProfilePayload, ProfileService};
use jira_wizard::types::{Field, JiraProject};
use jira_wizard::wizard::{ProfileWizard, WizardOptions};

pub const VALID_TOKEN: &str = "valid-token";

/// Helper struct to run jira-wizard commands in an isolated temp directory
pub struct WizardCli {
    pub temp_dir: TempDir,
}

impl WizardCli {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        WizardCli { temp_dir }
    }

    /// Same as `new`, with the name check debounce disabled
    pub fn fast() -> Self {
        let cli = Self::new();
        cli.run_success(&["config", "set", "name_check_debounce_ms", "0"]);
        cli
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join(".jira-wizard")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_jira-wizard"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("JIRA_WIZARD_ROOT", self.root())
            .env_remove("JIRA_API_TOKEN")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute jira-wizard command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} unexpectedly succeeded\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut full: Vec<&str> = args.to_vec();
        full.push("--json");
        let stdout = self.run_success(&full);
        serde_json::from_str(&stdout).expect("command output should be JSON")
    }

    pub fn read_root_file(&self, name: &str) -> String {
        fs::read_to_string(self.root().join(name)).expect("Failed to read file")
    }
}

/// In-memory [`ProfileService`] with call counters and gates that hold a call
/// until the test releases it.
pub struct FakeService {
    projects: Mutex<Vec<JiraProject>>,
    taken_names: Mutex<Vec<String>>,
    name_responses: Mutex<VecDeque<oneshot::Receiver<bool>>>,
    credential_gate: Mutex<Option<oneshot::Receiver<()>>>,
    project_gate: Mutex<Option<oneshot::Receiver<()>>>,
    save_gate: Mutex<Option<oneshot::Receiver<()>>>,
    network_down: AtomicBool,
    fail_names: AtomicBool,
    fail_projects: AtomicBool,
    fail_save: Mutex<Option<String>>,
    pub name_calls: AtomicUsize,
    pub credential_calls: AtomicUsize,
    pub project_calls: AtomicUsize,
    pub saves: Mutex<Vec<(Option<String>, ProfilePayload)>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            projects: Mutex::new(vec![
                JiraProject::new("ZED", "Zed platform"),
                JiraProject::new("OPS", "Operations"),
            ]),
            taken_names: Mutex::new(vec!["Existing".to_string()]),
            name_responses: Mutex::new(VecDeque::new()),
            credential_gate: Mutex::new(None),
            project_gate: Mutex::new(None),
            save_gate: Mutex::new(None),
            network_down: AtomicBool::new(false),
            fail_names: AtomicBool::new(false),
            fail_projects: AtomicBool::new(false),
            fail_save: Mutex::new(None),
            name_calls: AtomicUsize::new(0),
            credential_calls: AtomicUsize::new(0),
            project_calls: AtomicUsize::new(0),
            saves: Mutex::new(Vec::new()),
        })
    }

    /// The next name check that reaches the service answers with what is sent here.
    pub fn queue_name_response(&self) -> oneshot::Sender<bool> {
        let (tx, rx) = oneshot::channel();
        self.name_responses.lock().push_back(rx);
        tx
    }

    /// Hold the next credential check until the sender fires.
    pub fn gate_credentials(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.credential_gate.lock() = Some(rx);
        tx
    }

    pub fn gate_projects(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.project_gate.lock() = Some(rx);
        tx
    }

    pub fn gate_save(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.save_gate.lock() = Some(rx);
        tx
    }

    pub fn set_network_down(&self, down: bool) {
        self.network_down.store(down, Ordering::SeqCst);
    }

    pub fn set_fail_names(&self, fail: bool) {
        self.fail_names.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_projects(&self, fail: bool) {
        self.fail_projects.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, message: Option<&str>) {
        *self.fail_save.lock() = message.map(str::to_string);
    }

    pub fn name_calls(&self) -> usize {
        self.name_calls.load(Ordering::SeqCst)
    }

    pub fn credential_calls(&self) -> usize {
        self.credential_calls.load(Ordering::SeqCst)
    }

    pub fn project_calls(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> Vec<(Option<String>, ProfilePayload)> {
        self.saves.lock().clone()
    }

    async fn pass_gate(gate: &Mutex<Option<oneshot::Receiver<()>>>) {
        let pending = gate.lock().take();
        if let Some(rx) = pending {
            let _ = rx.await;
        }
    }

    async fn save(&self, id: Option<&str>, payload: &ProfilePayload) -> Result<String> {
        Self::pass_gate(&self.save_gate).await;
        let failure = self.fail_save.lock().clone();
        if let Some(message) = failure {
            return Err(WizardError::Other(message));
        }
        self.saves
            .lock()
            .push((id.map(str::to_string), payload.clone()));
        Ok(payload.name().to_string())
    }
}

#[async_trait]
impl ProfileService for FakeService {
    async fn check_name_availability(&self, name: &str) -> Result<bool> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.name_responses.lock().pop_front();
        if let Some(rx) = queued {
            return rx
                .await
                .map_err(|_| WizardError::Other("response dropped".to_string()));
        }
        if self.fail_names.load(Ordering::SeqCst) {
            return Err(WizardError::Network("connection reset".to_string()));
        }
        let wanted = name.trim().to_lowercase();
        Ok(!self
            .taken_names
            .lock()
            .iter()
            .any(|taken| taken.to_lowercase() == wanted))
    }

    async fn check_credentials(&self, request: &CredentialsRequest) -> Result<()> {
        self.credential_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass_gate(&self.credential_gate).await;
        if self.network_down.load(Ordering::SeqCst) {
            return Err(WizardError::Network("connection refused".to_string()));
        }
        if request.api_token != VALID_TOKEN {
            return Err(WizardError::InvalidCredentials(
                "401 Unauthorized".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_projects(&self, _request: &CredentialsRequest) -> Result<Vec<JiraProject>> {
        self.project_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass_gate(&self.project_gate).await;
        if self.fail_projects.load(Ordering::SeqCst) {
            return Err(WizardError::Api("500 Internal Server Error".to_string()));
        }
        Ok(self.projects.lock().clone())
    }

    async fn create_profile(&self, payload: &ProfilePayload) -> Result<String> {
        self.save(None, payload).await
    }

    async fn update_profile(&self, id: &str, payload: &ProfilePayload) -> Result<String> {
        self.save(Some(id), payload).await
    }
}

/// Options with the debounce disabled so checks run immediately
pub fn immediate() -> WizardOptions {
    WizardOptions {
        name_check_debounce: Duration::ZERO,
    }
}

/// New-profile wizard with every credential field filled in
pub fn filled_wizard(service: Arc<FakeService>) -> ProfileWizard {
    let wizard = ProfileWizard::builder(service).options(immediate()).build();
    fill_credentials(&wizard);
    wizard.update_field(Field::Name, "Team board");
    wizard
}

pub fn fill_credentials(wizard: &ProfileWizard) {
    wizard.update_field(Field::JiraServer, "https://acme.atlassian.net");
    wizard.update_field(Field::JiraEmail, "dev@acme.io");
    wizard.update_field(Field::JiraApiToken, VALID_TOKEN);
}

/// Yield to the scheduler until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
