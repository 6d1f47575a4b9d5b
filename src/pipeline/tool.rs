//! Invocation of external programs (signer, obfuscators).

use crate::config::ToolConfig;
use crate::core::path::ensure_dir;
use crate::core::{PackError, PackResult};
use std::path::Path;
use std::process::Command;

/// Values substituted into a tool's argument placeholders.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub certificate: Option<&'a str>,
}

impl<'a> ToolArgs<'a> {
    pub fn new(input: &'a Path, output: &'a Path) -> Self {
        Self {
            input,
            output,
            certificate: None,
        }
    }

    pub fn with_certificate(mut self, certificate: &'a str) -> Self {
        self.certificate = Some(certificate);
        self
    }

    fn substitute(&self, arg: &str) -> String {
        arg.replace("{input}", &self.input.to_string_lossy())
            .replace("{output}", &self.output.to_string_lossy())
            .replace("{certificate}", self.certificate.unwrap_or_default())
    }
}

/// Run `tool` for `action`, waiting for it to finish.
///
/// The output's parent directory is created first. A program that cannot be
/// found on `PATH` is [`PackError::ToolNotFound`]; a non-zero exit is
/// [`PackError::ToolFailed`] with the captured output.
pub fn run_tool(action: &str, tool: &ToolConfig, args: ToolArgs<'_>) -> PackResult<()> {
    let program = which::which(&tool.program).map_err(|_| PackError::ToolNotFound {
        action: action.to_string(),
        tool: tool.program.clone(),
    })?;

    if let Some(parent) = args.output.parent() {
        ensure_dir(parent)?;
    }

    let argv: Vec<String> = tool.args.iter().map(|a| args.substitute(a)).collect();
    tracing::debug!(action, program = %program.display(), args = ?argv, "running tool");

    let output = Command::new(&program).args(&argv).output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(PackError::ToolFailed {
            tool: tool.program.clone(),
            code: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
        });
    }

    if !stdout.trim().is_empty() {
        tracing::trace!(action, "{}", stdout.trim());
    }

    if !args.output.exists() {
        return Err(PackError::Package(format!(
            "'{}' did not write {}",
            tool.program,
            args.output.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_substitute_placeholders() {
        let args = ToolArgs::new(Path::new("in.dll"), Path::new("out/in.dll"))
            .with_certificate("Lab Cert");
        assert_eq!(args.substitute("--in={input}"), "--in=in.dll");
        assert_eq!(args.substitute("{output}"), "out/in.dll");
        assert_eq!(args.substitute("{certificate}"), "Lab Cert");
        assert_eq!(args.substitute("-n"), "-n");
    }

    #[test]
    fn test_missing_tool() {
        let tool = ToolConfig::new("plugpack-no-such-tool", &[]);
        let result = run_tool(
            "sign",
            &tool,
            ToolArgs::new(Path::new("a"), Path::new("b")),
        );
        match result {
            Err(PackError::ToolNotFound { action, tool }) => {
                assert_eq!(action, "sign");
                assert_eq!(tool, "plugpack-no-such-tool");
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_writes_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.dll");
        fs::write(&input, b"bytes").unwrap();
        let output = temp.path().join("out/a.dll");

        let tool = ToolConfig::new("sh", &["-c", "cp \"$0\" \"$1\"", "{input}", "{output}"]);
        run_tool("obfuscar", &tool, ToolArgs::new(&input, &output)).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_captures_output() {
        let temp = TempDir::new().unwrap();
        let tool = ToolConfig::new("sh", &["-c", "echo working; echo broken >&2; exit 3"]);
        let result = run_tool(
            "sign",
            &tool,
            ToolArgs::new(&temp.path().join("a"), &temp.path().join("b")),
        );
        match result {
            Err(PackError::ToolFailed {
                code, stdout, stderr, ..
            }) => {
                assert_eq!(code, 3);
                assert!(stdout.contains("working"));
                assert!(stderr.contains("broken"));
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }
}
