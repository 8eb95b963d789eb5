use super::{ConfigError, Oracle, OracleConfig, OracleFault, OracleRequest};
use recon_core::Move;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{Level, event};

const QUIT_POLLS: u32 = 20;
const QUIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

struct Channel {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Long-lived UCI engine process. One handle per game; not shared across threads.
pub struct UciEngine {
    path: PathBuf,
    channel: Option<Channel>,
}

impl UciEngine {
    /// Launches the engine and completes the `uci` / `isready` handshake.
    pub fn spawn(config: &OracleConfig) -> Result<Self, ConfigError> {
        let path = config.executable().to_path_buf();
        let launch = |source: OracleFault| ConfigError::Launch {
            path: path.clone(),
            source,
        };

        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| launch(OracleFault::Io(err)))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| launch(OracleFault::Protocol("stdin unavailable".into())))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| launch(OracleFault::Protocol("stdout unavailable".into())))?;

        let mut engine = Self {
            path: path.clone(),
            channel: Some(Channel {
                child,
                stdin,
                stdout: BufReader::new(stdout),
            }),
        };
        engine.handshake().map_err(launch)?;

        event!(
            target: "recon_bot::oracle",
            Level::INFO,
            path = %path.display(),
            "engine ready"
        );
        Ok(engine)
    }

    fn handshake(&mut self) -> Result<(), OracleFault> {
        self.send("uci")?;
        self.read_until(|line| line == "uciok")?;
        self.send("isready")?;
        self.read_until(|line| line == "readyok")?;
        Ok(())
    }

    fn channel(&mut self) -> Result<&mut Channel, OracleFault> {
        self.channel.as_mut().ok_or(OracleFault::Released)
    }

    fn send(&mut self, command: &str) -> Result<(), OracleFault> {
        let channel = self.channel()?;
        writeln!(channel.stdin, "{command}")?;
        channel.stdin.flush()?;
        Ok(())
    }

    fn read_until<P>(&mut self, mut matches: P) -> Result<String, OracleFault>
    where
        P: FnMut(&str) -> bool,
    {
        let channel = self.channel()?;
        let mut line = String::new();
        loop {
            line.clear();
            if channel.stdout.read_line(&mut line)? == 0 {
                return Err(OracleFault::Terminated);
            }
            let trimmed = line.trim();
            if matches(trimmed) {
                return Ok(trimmed.to_string());
            }
        }
    }

    /// Sends `quit` and reaps the process, killing it if it lingers.
    pub fn quit(&mut self) {
        let Some(mut channel) = self.channel.take() else {
            return;
        };
        let _ = writeln!(channel.stdin, "quit");
        let _ = channel.stdin.flush();
        drop(channel.stdin);

        for _ in 0..QUIT_POLLS {
            match channel.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(QUIT_POLL_INTERVAL),
                Err(_) => break,
            }
        }
        event!(
            target: "recon_bot::oracle",
            Level::WARN,
            path = %self.path.display(),
            "engine ignored quit; killing"
        );
        let _ = channel.child.kill();
        let _ = channel.child.wait();
    }

    pub fn is_released(&self) -> bool {
        self.channel.is_none()
    }
}

impl Oracle for UciEngine {
    fn best_move(&mut self, request: &OracleRequest) -> Result<Option<Move>, OracleFault> {
        let movetime = request.budget.as_millis().max(1);
        self.send(&format!("position fen {}", request.fen))?;
        self.send(&format!("go movetime {movetime}"))?;
        let line = self.read_until(|line| line.starts_with("bestmove"))?;
        parse_bestmove(&line)
    }

    fn release(&mut self) {
        self.quit();
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.quit();
    }
}

/// Parses `bestmove <uci> [ponder <uci>]`; `(none)` and `0000` mean no move.
pub(crate) fn parse_bestmove(line: &str) -> Result<Option<Move>, OracleFault> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return Err(OracleFault::Protocol(format!("unexpected reply '{line}'")));
    }
    match parts.next() {
        None | Some("(none)") => Ok(None),
        Some(raw) => Move::parse_or_null(raw)
            .map_err(|err| OracleFault::Protocol(format!("bad bestmove '{raw}': {err}"))),
    }
}
