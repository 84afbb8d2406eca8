use std::path::Path;

use tracing::{debug, error, info, trace};

use super::context::ExecutionContext;
use super::dispatch;
use crate::backend::AutomationBackend;
use crate::config::Settings;
use crate::error::{EngineError, Result};
use crate::script::{Command, ParsedScript, parse_file};

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every command succeeded.
    Completed { executed: usize },
    /// The command at `index` failed; nothing after it ran.
    Halted {
        index: usize,
        command: Command,
        error: EngineError,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Runtime is responsible for:
/// - owning the execution context for one run
/// - dispatching commands strictly in script order
/// - applying handler effects (attachment, typing delay)
/// - halting at the first failure
pub struct Runtime {
    ctx: ExecutionContext,
}

impl Runtime {
    /// Create a new runtime on top of `backend`.
    pub fn new(backend: Box<dyn AutomationBackend>, settings: &Settings) -> Self {
        Self {
            ctx: ExecutionContext::new(backend, settings),
        }
    }

    /// Returns a reference to the execution context (variables, last error, ...).
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Returns a mutable reference to the execution context (e.g., to seed variables).
    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.ctx
    }

    /// Parse `path` and run it. Only a script that cannot be read is an `Err`.
    pub fn run_file<P: AsRef<Path>>(&mut self, path: P) -> Result<RunOutcome> {
        let script = parse_file(path)?;
        Ok(self.run(&script))
    }

    /// Execute every command in order, stopping at the first failure.
    ///
    /// An open HTML log is left open on halt.
    pub fn run(&mut self, script: &ParsedScript) -> RunOutcome {
        info!(
            target: "uiscript::runtime",
            commands = script.len(),
            "Starting script"
        );

        for (index, cmd) in script.commands().iter().enumerate() {
            trace!(
                target: "uiscript::runtime",
                index, line = cmd.line(), command = cmd.name(),
                "Executing step"
            );
            match dispatch::dispatch(&mut self.ctx, cmd) {
                Ok(effect) => self.ctx.apply(effect),
                Err(err) => {
                    error!(
                        target: "uiscript::runtime",
                        index, line = cmd.line(), command = %cmd, error = %err,
                        "Command failed; halting"
                    );
                    return RunOutcome::Halted {
                        index,
                        command: cmd.clone(),
                        error: err,
                    };
                }
            }
        }

        debug!(target: "uiscript::runtime", "Script completed");
        RunOutcome::Completed {
            executed: script.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeBackend, FakeElement, InputEvent};
    use crate::backend::{Key, Rect};
    use crate::executor::variables::IF_CONDITION;
    use crate::script::parse_str;

    fn runtime(fake: &FakeBackend) -> Runtime {
        let settings = Settings {
            click_settle_ms: 0,
            poll_interval_ms: 10,
            ..Settings::default()
        };
        Runtime::new(Box::new(fake.clone()), &settings)
    }

    #[test]
    fn halts_on_attach_failure_before_later_commands() {
        let fake = FakeBackend::new();
        let mut rt = runtime(&fake);
        let script = parse_str(
            "AttachProcess \"notepad.exe\"\nSleep 1000\nSendKeystroke \"Hello World\"\n",
        );
        assert_eq!(script.len(), 3);

        let outcome = rt.run(&script);
        match &outcome {
            RunOutcome::Halted {
                index,
                command,
                error,
            } => {
                assert_eq!(*index, 0);
                assert_eq!(command.name(), "AttachProcess");
                assert_eq!(command.param(0), "notepad.exe");
                assert!(matches!(error, EngineError::Attach(_)));
            }
            other => panic!("expected halt, got {other:?}"),
        }
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(rt.context().last_error(), Some("Process 'notepad.exe' not found"));
        assert!(fake.events().is_empty());
    }

    #[test]
    fn notepad_script_runs_in_order() {
        let fake = FakeBackend::new().with_process("notepad.exe", 300);
        let mut rt = runtime(&fake);
        let script = parse_str("AttachProcess \"notepad.exe\"\nSleep 1\nSendKeystroke \"Hi\"\n");

        let outcome = rt.run(&script);
        assert!(matches!(outcome, RunOutcome::Completed { executed: 3 }));
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(rt.context().attachment().map(|t| t.pid), Some(300));
        assert_eq!(
            fake.events(),
            vec![InputEvent::Key(Key::Char('H')), InputEvent::Key(Key::Char('i'))]
        );
    }

    #[test]
    fn if_block_does_not_skip_commands() {
        let fake = FakeBackend::new().with_process("app.exe", 5).with_element(
            FakeElement::new("present", "Button", 50000).bounded(Rect::new(0, 0, 20, 20)),
        );
        let mut rt = runtime(&fake);
        let script = parse_str(
            "AttachProcess app.exe\n\
             IF ElementExists \"missing_id\"\n\
             ClickElementByProperties present null -1\n\
             ENDIF\n\
             Click 1 2\n",
        );

        assert!(rt.run(&script).is_success());
        assert_eq!(
            fake.events(),
            vec![InputEvent::Click(10, 10), InputEvent::Click(1, 2)]
        );
        assert_eq!(rt.context().vars().get(IF_CONDITION), Some("true"));
    }

    #[test]
    fn set_delay_and_attach_are_applied_between_commands() {
        let fake = FakeBackend::new().with_process("app.exe", 5);
        let mut rt = runtime(&fake);
        let script = parse_str("SetDelay 1\nAttachPid 5\nBringToFront\n");
        assert!(rt.run(&script).is_success());
        assert_eq!(rt.context().typing_delay().as_millis(), 1);
        assert_eq!(fake.events(), vec![InputEvent::BringToFront(5)]);
    }

    #[test]
    fn halting_reports_the_failing_command() {
        let fake = FakeBackend::new();
        let mut rt = runtime(&fake);
        let script = parse_str("SET x 1\n# comment\n\nClick 1\nClick 3 4\n");
        let outcome = rt.run(&script);
        let RunOutcome::Halted { index, command, .. } = outcome else {
            panic!("expected halt");
        };
        assert_eq!(index, 1);
        assert_eq!(command.line(), 4);
        assert!(fake.events().is_empty());
        assert_eq!(rt.context().vars().get("x"), Some("1"));
    }

    #[test]
    fn missing_script_file_is_an_error() {
        let fake = FakeBackend::new();
        let mut rt = runtime(&fake);
        let dir = tempfile::tempdir().unwrap();
        let err = rt.run_file(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, EngineError::ScriptFile { .. }));
    }

    #[test]
    fn run_file_reads_and_executes() {
        let fake = FakeBackend::new();
        let mut rt = runtime(&fake);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        std::fs::write(&path, "RightClick 7 8 # context menu\n").unwrap();
        let outcome = rt.run_file(&path).unwrap();
        assert!(outcome.is_success());
        assert_eq!(fake.events(), vec![InputEvent::RightClick(7, 8)]);
    }
}
