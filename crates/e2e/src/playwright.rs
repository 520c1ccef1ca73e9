//! Playwright browser automation
//!
//! Each browser context is a long-lived `node` process running a generated
//! bridge script. The script launches the browser once, then serves one JSON
//! command per stdin line and answers with one JSON line on stdout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use hrm_common::HarnessConfig;

use crate::driver::{BrowserLauncher, Driver, Locator, WaitState};
use crate::error::{E2eError, E2eResult};

/// Browser startup, including the download check Playwright does on launch
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Grace period between the close command and a forced kill
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(hrm_common::Error::InvalidConfig(format!(
                "unknown browser '{}'",
                other
            )))),
        }
    }
}

/// Launch options baked into each bridge script
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl PlaywrightConfig {
    pub fn from_harness(config: &HarnessConfig) -> E2eResult<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            browser: config.browser.parse()?,
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        })
    }
}

/// One bridge command; `op` selects the Playwright call
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeCommand {
    Goto { path: String, timeout: u64 },
    Fill { locator: Locator, value: String, timeout: u64 },
    Click { locator: Locator, timeout: u64 },
    WaitFor { locator: Locator, state: WaitState, timeout: u64 },
    NetworkIdle { timeout: u64 },
    Count { locator: Locator },
    TextContent { locator: Locator, timeout: u64 },
    SetInputFiles { locator: Locator, file: PathBuf, timeout: u64 },
    Url,
    Screenshot { path: PathBuf, full_page: bool },
    Close,
}

impl BridgeCommand {
    /// Translate a Playwright failure for this command into a harness error
    fn failure(&self, error: BridgeFailure) -> E2eError {
        if error.name != "TimeoutError" {
            return E2eError::Playwright(error.message);
        }
        match self {
            BridgeCommand::Goto { path, timeout } => {
                E2eError::Timeout(format!("navigation to {} ({} ms)", path, timeout))
            }
            BridgeCommand::NetworkIdle { timeout } => {
                E2eError::Timeout(format!("network idle ({} ms)", timeout))
            }
            BridgeCommand::WaitFor { locator, state: WaitState::Hidden | WaitState::Detached, timeout } => {
                E2eError::Timeout(format!("{} to disappear ({} ms)", locator, timeout))
            }
            BridgeCommand::Fill { locator, timeout, .. }
            | BridgeCommand::Click { locator, timeout }
            | BridgeCommand::WaitFor { locator, timeout, .. }
            | BridgeCommand::TextContent { locator, timeout }
            | BridgeCommand::SetInputFiles { locator, timeout, .. } => E2eError::ElementNotFound {
                locator: locator.to_string(),
                waited_ms: *timeout,
            },
            _ => E2eError::Timeout(error.message),
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a BridgeCommand,
}

#[derive(Debug, Deserialize)]
struct BridgeFailure {
    name: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    id: u64,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<BridgeFailure>,
}

/// Check if Playwright is installed
pub fn check_playwright_installed() -> E2eResult<()> {
    let output = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// Opens a bridge process per browser context
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed()?;
        info!(
            "Using Playwright {} (headless: {}) against {}",
            config.browser.as_str(),
            config.headless,
            config.base_url
        );
        Ok(Self { config })
    }
}

#[async_trait]
impl BrowserLauncher for PlaywrightLauncher {
    async fn new_context(&self) -> E2eResult<Box<dyn Driver>> {
        Ok(Box::new(PlaywrightDriver::spawn(&self.config).await?))
    }
}

struct BridgeIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// Driver backed by one bridge process
pub struct PlaywrightDriver {
    io: Mutex<BridgeIo>,
    child: Mutex<Child>,
    pid: Option<u32>,
    next_id: AtomicU64,
    closed: AtomicBool,
    // removed on drop, after the process is gone
    _script_dir: tempfile::TempDir,
}

impl PlaywrightDriver {
    pub async fn spawn(config: &PlaywrightConfig) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_script(config)?)?;

        debug!("Starting Playwright bridge: {}", script_path.display());

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(script_dir.path())
            .env("NODE_PATH", node_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let pid = child.id();
        let (Some(stdin), Some(stdout), Some(stderr)) = (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(E2eError::Playwright("bridge stdio not captured".to_string()));
        };

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("[bridge] {}", line);
            }
        });

        let mut stdout = BufReader::new(stdout).lines();
        match tokio::time::timeout(LAUNCH_TIMEOUT, stdout.next_line()).await {
            Ok(Ok(Some(line))) if is_ready(&line) => {}
            Ok(Ok(Some(line))) => {
                return Err(E2eError::Playwright(format!("bridge failed to start: {}", line)));
            }
            Ok(Ok(None)) => {
                return Err(E2eError::Playwright("bridge exited during startup".to_string()));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(E2eError::Timeout(format!(
                    "{} launch ({} s)",
                    config.browser.as_str(),
                    LAUNCH_TIMEOUT.as_secs()
                )));
            }
        }

        info!("Browser context ready (bridge pid: {:?})", pid);

        Ok(Self {
            io: Mutex::new(BridgeIo { stdin, stdout }),
            child: Mutex::new(child),
            pid,
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            _script_dir: script_dir,
        })
    }

    async fn call(&self, command: BridgeCommand) -> E2eResult<serde_json::Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(E2eError::Playwright("browser context has been closed".to_string()));
        }
        self.send(command).await
    }

    async fn send(&self, command: BridgeCommand) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut line = serde_json::to_string(&Envelope { id, command: &command })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let reply = io
            .stdout
            .next_line()
            .await?
            .ok_or_else(|| E2eError::Playwright("bridge process exited".to_string()))?;
        let reply: BridgeReply = serde_json::from_str(&reply)?;

        if reply.id != id {
            return Err(E2eError::Playwright(format!(
                "bridge answered request {} while {} was pending",
                reply.id, id
            )));
        }
        match reply.error {
            Some(failure) => Err(command.failure(failure)),
            None => Ok(reply.value),
        }
    }
}

fn ms(timeout: Duration) -> u64 {
    timeout.as_millis() as u64
}

fn is_ready(line: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(line)
        .map(|v| v.get("ready") == Some(&serde_json::Value::Bool(true)))
        .unwrap_or(false)
}

/// Let the bridge resolve `playwright` from the directory the run started in
fn node_path() -> String {
    if let Ok(path) = std::env::var("NODE_PATH") {
        if !path.is_empty() {
            return path;
        }
    }
    std::env::current_dir()
        .map(|dir| dir.join("node_modules").to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(unix)]
fn terminate(pid: Option<u32>) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
}

#[cfg(not(unix))]
fn terminate(_pid: Option<u32>) {}

#[async_trait]
impl Driver for PlaywrightDriver {
    async fn goto(&self, path: &str, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::Goto { path: path.to_string(), timeout: ms(timeout) }).await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::Fill {
            locator: locator.clone(),
            value: value.to_string(),
            timeout: ms(timeout),
        })
        .await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::Click { locator: locator.clone(), timeout: ms(timeout) }).await?;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::WaitFor { locator: locator.clone(), state, timeout: ms(timeout) })
            .await?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::NetworkIdle { timeout: ms(timeout) }).await?;
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let value = self.call(BridgeCommand::Count { locator: locator.clone() }).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Playwright(format!("count returned {}", value)))
    }

    async fn text_content(&self, locator: &Locator, timeout: Duration) -> E2eResult<String> {
        let value = self
            .call(BridgeCommand::TextContent { locator: locator.clone(), timeout: ms(timeout) })
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn set_input_files(&self, locator: &Locator, file: &Path, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::SetInputFiles {
            locator: locator.clone(),
            file: file.to_path_buf(),
            timeout: ms(timeout),
        })
        .await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let value = self.call(BridgeCommand::Url).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.call(BridgeCommand::Screenshot { path: path.to_path_buf(), full_page }).await?;
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Closing browser context (bridge pid: {:?})", self.pid);

        if let Err(e) = self.send(BridgeCommand::Close).await {
            warn!("Bridge close command failed: {}", e);
        }

        let mut child = self.child.lock().await;
        if tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await.is_err() {
            warn!("Bridge did not exit in time, terminating");
            terminate(self.pid);
            let _ = child.kill().await;
        }
        Ok(())
    }
}

impl Drop for PlaywrightDriver {
    fn drop(&mut self) {
        // kill_on_drop reaps the process; SIGTERM first lets node close the browser
        if !self.closed.load(Ordering::SeqCst) {
            terminate(self.pid);
        }
    }
}

/// Build the bridge script for one browser context
pub fn build_script(config: &PlaywrightConfig) -> E2eResult<String> {
    let options = serde_json::to_string(config)?;
    Ok(format!(
        r#"
const playwright = require('playwright');
const readline = require('readline');

const options = {options};

function build(page, loc) {{
  let base = loc.parent ? build(page, loc.parent) : page;
  let l = base.locator(loc.selector);
  if (loc.has_text !== undefined) l = l.filter({{ hasText: loc.has_text }});
  return loc.index !== undefined ? l.nth(loc.index) : l;
}}

// unindexed locators act on the first match
function single(page, loc) {{
  const l = build(page, loc);
  return loc.index !== undefined ? l : l.first();
}}

async function handle(page, cmd) {{
  switch (cmd.op) {{
    case 'goto':
      await page.goto(options.baseUrl + cmd.path, {{ timeout: cmd.timeout }});
      return null;
    case 'fill':
      await single(page, cmd.locator).fill(cmd.value, {{ timeout: cmd.timeout }});
      return null;
    case 'click':
      await single(page, cmd.locator).click({{ timeout: cmd.timeout }});
      return null;
    case 'wait_for':
      await single(page, cmd.locator).waitFor({{ state: cmd.state, timeout: cmd.timeout }});
      return null;
    case 'network_idle':
      await page.waitForLoadState('networkidle', {{ timeout: cmd.timeout }});
      return null;
    case 'count':
      return await build(page, cmd.locator).count();
    case 'text_content':
      return await single(page, cmd.locator).textContent({{ timeout: cmd.timeout }});
    case 'set_input_files':
      await single(page, cmd.locator).setInputFiles(cmd.file, {{ timeout: cmd.timeout }});
      return null;
    case 'url':
      return page.url();
    case 'screenshot':
      await page.screenshot({{ path: cmd.path, fullPage: cmd.full_page }});
      return null;
    default:
      throw new Error('unknown op ' + cmd.op);
  }}
}}

(async () => {{
  const browser = await playwright[options.browser].launch({{ headless: options.headless }});
  const context = await browser.newContext({{
    viewport: {{ width: options.viewportWidth, height: options.viewportHeight }}
  }});
  const page = await context.newPage();
  const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
  reply({{ ready: true }});

  const rl = readline.createInterface({{ input: process.stdin }});
  for await (const line of rl) {{
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    if (cmd.op === 'close') {{
      await context.close().catch(() => {{}});
      await browser.close().catch(() => {{}});
      reply({{ id: cmd.id, value: null }});
      process.exit(0);
    }}
    try {{
      const value = await handle(page, cmd);
      reply({{ id: cmd.id, value: value === undefined ? null : value }});
    }} catch (error) {{
      reply({{ id: cmd.id, error: {{ name: error.name || 'Error', message: error.message }} }});
    }}
  }}
  await browser.close();
}})().catch((error) => {{
  process.stdout.write(JSON.stringify({{ ready: false, error: error.message }}) + '\n');
  process.exit(1);
}});
"#,
        options = options
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout_failure() -> BridgeFailure {
        BridgeFailure {
            name: "TimeoutError".to_string(),
            message: "Timeout 5000ms exceeded.".to_string(),
        }
    }

    #[test]
    fn test_browser_parse() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("lynx".parse::<Browser>().is_err());
    }

    #[test]
    fn test_command_envelope() {
        let command = BridgeCommand::WaitFor {
            locator: Locator::css("h6").with_text("Dashboard"),
            state: WaitState::Visible,
            timeout: 5000,
        };
        let json = serde_json::to_value(Envelope { id: 7, command: &command }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "op": "wait_for",
                "locator": { "selector": "h6", "has_text": "Dashboard" },
                "state": "visible",
                "timeout": 5000
            })
        );
    }

    #[test]
    fn test_locator_timeouts_map_to_element_not_found() {
        let click = BridgeCommand::Click { locator: Locator::css("button"), timeout: 5000 };
        assert!(matches!(
            click.failure(timeout_failure()),
            E2eError::ElementNotFound { waited_ms: 5000, .. }
        ));
    }

    #[test]
    fn test_navigation_and_hidden_timeouts_map_to_timeout() {
        let goto = BridgeCommand::Goto { path: "/".to_string(), timeout: 10_000 };
        assert!(matches!(goto.failure(timeout_failure()), E2eError::Timeout(_)));

        let hidden = BridgeCommand::WaitFor {
            locator: Locator::css(".oxd-dialog-container"),
            state: WaitState::Hidden,
            timeout: 3000,
        };
        assert!(matches!(hidden.failure(timeout_failure()), E2eError::Timeout(_)));
    }

    #[test]
    fn test_other_failures_are_bridge_errors() {
        let click = BridgeCommand::Click { locator: Locator::css("button"), timeout: 5000 };
        let failure = BridgeFailure {
            name: "Error".to_string(),
            message: "strict mode violation".to_string(),
        };
        assert!(matches!(click.failure(failure), E2eError::Playwright(_)));
    }

    #[test]
    fn test_script_embeds_options() {
        let config = PlaywrightConfig {
            base_url: "http://127.0.0.1:8080".to_string(),
            browser: Browser::Webkit,
            headless: false,
            viewport_width: 1920,
            viewport_height: 1080,
        };
        let script = build_script(&config).unwrap();
        assert!(script.contains(r#""browser":"webkit""#));
        assert!(script.contains(r#""baseUrl":"http://127.0.0.1:8080""#));
        assert!(script.contains("waitForLoadState('networkidle'"));
        assert!(is_ready(r#"{"ready":true}"#));
        assert!(!is_ready(r#"{"ready":false,"error":"no browser"}"#));
    }
}
