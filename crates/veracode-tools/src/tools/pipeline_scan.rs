//! `pipeline-static-scan` tool: local scan through the pipeline scanner
//!
//! The tool picks the scan target, prepares the output directory, hands the
//! request to the [`PipelineScanner`](crate::PipelineScanner) collaborator
//! and turns the captured process output into a report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde::Deserialize;

use super::{Flow, Session, require_application_path};
use crate::Result;
use crate::collaborators::{Collaborators, PipelineScanRequest, ScanProcessOutput};
use crate::dispatch::{
    HandlerDispatch, HandlerOutcome, Params, RequestContext, handler, parse_params,
};
use crate::error::HandlerError;
use crate::lifecycle::ToolLifecycle;
use crate::registry::ToolRegistry;

pub const NAME: &str = "pipeline-static-scan";

const DESCRIPTION: &str =
    "Run a local Veracode pipeline static scan against a packaged application artifact";

/// Directory (under the application path) receiving scan results
pub const OUTPUT_DIR: &str = ".veracode_pipeline";

/// Directory (under the application path) holding packaged artifacts
pub const PACKAGING_DIR: &str = ".veracode_packaging";

/// Register the `pipeline-static-scan` tool.
pub fn register(registry: &ToolRegistry, collaborators: &Collaborators) {
    let collaborators = collaborators.clone();
    registry.register_tool(NAME, move || {
        Box::new(PipelineScanTool::new(collaborators.clone())) as Box<dyn ToolLifecycle>
    });
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PipelineScanParams {
    application_path: Option<String>,
    filename: Option<String>,
    verbose: bool,
}

pub struct PipelineScanTool {
    session: Session,
}

impl PipelineScanTool {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            session: Session::new(collaborators),
        }
    }
}

impl ToolLifecycle for PipelineScanTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn initialize(&mut self) -> Result<()> {
        self.session.activate(NAME);
        Ok(())
    }

    fn register_handlers(&self, dispatch: &mut dyn HandlerDispatch) -> Result<()> {
        let collaborators = self.session.active(NAME)?;
        tracing::debug!(tool = NAME, "Registering handlers");
        dispatch.register_handler(
            NAME,
            handler(move |ctx, params| {
                handle_pipeline_scan(&collaborators, ctx, params).unwrap_or_else(|done| done)
            }),
        );
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.session.release(NAME);
        Ok(())
    }
}

/// How to present a scanner exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeInfo {
    pub exit_code: i32,
    pub icon: &'static str,
    pub message: &'static str,
    pub next_steps: &'static str,
    /// Completed with findings or warnings rather than failing outright
    pub is_warning: bool,
}

/// Interpret a Veracode CLI exit code.
pub fn interpret_exit_code(exit_code: i32) -> ExitCodeInfo {
    let (icon, message, next_steps, is_warning) = match exit_code {
        0 => (
            "✓",
            "Command completed successfully",
            "Review the output and proceed with next steps",
            false,
        ),
        1 => (
            "❌",
            "Generic error occurred",
            "Next steps:\n- Review the error output above\n- Check Veracode CLI documentation\n- Verify input parameters and retry",
            false,
        ),
        2 => (
            "❌",
            "Parser error - check command input and user permissions",
            "Next steps:\n- Verify paths are accessible\n- Check file and directory permissions\n- Ensure all required parameters are valid",
            false,
        ),
        3 => (
            "⚠",
            "Command completed, but application did not pass policy",
            "Next steps:\n- Review the results\n- Check policy violations\n- Address policy issues before submission",
            true,
        ),
        4 => (
            "⚠",
            "Command completed with warnings or no artifacts found",
            "Next steps:\n- Check if --strict flag was used (causes warnings to fail)\n- Verify source files are present\n- Review build output for warnings\n- Check for compilation errors",
            true,
        ),
        125 => (
            "❌",
            "Out of memory error",
            "Next steps:\n- Reduce workspace size or exclude large files\n- Increase available system memory\n- Contact system administrator",
            false,
        ),
        126 => (
            "❌",
            "Command failed - check local system configuration",
            "Next steps:\n- Verify Veracode CLI is properly installed\n- Check system dependencies\n- Review system logs for configuration issues",
            false,
        ),
        127 => (
            "❌",
            "Command not found - check PATH configuration",
            "Next steps:\n- Verify 'veracode' command is in system PATH\n- Reinstall Veracode CLI if necessary\n- Check command syntax is correct",
            false,
        ),
        128 => (
            "❌",
            "Invalid argument - retry the command",
            "Next steps:\n- Review command arguments\n- Check for typos in parameters\n- Verify argument format matches CLI expectations",
            false,
        ),
        130 => (
            "❌",
            "Command terminated by user",
            "Next steps:\n- Retry the operation\n- Allow sufficient time for completion\n- Check if any prompts need to be answered",
            false,
        ),
        _ => (
            "❌",
            "Command failed with unexpected exit code",
            "Next steps:\n- Review error output\n- Consult Veracode CLI documentation\n- Contact Veracode support if issue persists",
            false,
        ),
    };

    ExitCodeInfo {
        exit_code,
        icon,
        message,
        next_steps,
        is_warning,
    }
}

fn handle_pipeline_scan(
    collaborators: &Arc<Collaborators>,
    ctx: &RequestContext,
    params: &Params,
) -> Flow<HandlerOutcome> {
    ctx.ensure_active()?;

    let params: PipelineScanParams = parse_params(params)?;
    let application_path = PathBuf::from(require_application_path(params.application_path)?);

    match fs::metadata(&application_path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(HandlerOutcome::business(format!(
                "Application path does not exist: {}",
                application_path.display()
            )));
        }
        Err(e) => {
            return Err(HandlerOutcome::business(format!(
                "Failed to access application path: {e}"
            )));
        }
    }

    let output_dir = application_path.join(OUTPUT_DIR);
    fs::create_dir_all(&output_dir).map_err(|e| HandlerOutcome::from(HandlerError::Io(e)))?;

    let target = scan_target(&application_path, params.filename.as_deref())?;
    let results_file = output_dir.join(format!(
        "results-{}.json",
        Local::now().format("%Y%m%d-%H%M%S")
    ));

    let request = PipelineScanRequest {
        target,
        results_file,
        verbose: params.verbose,
    };

    ctx.ensure_active()?;
    tracing::info!(scan_target = %request.target.display(), "Starting pipeline scan");

    let output = collaborators
        .scanner
        .scan(ctx, &request)
        .map_err(|e| HandlerOutcome::from_collaborator("Failed to run pipeline scan", e))?;

    tracing::info!(exit_code = output.exit_code, "Pipeline scan finished");
    Ok(scan_report(&application_path, &request, &output))
}

/// Explicit `filename` (relative to the application path unless absolute),
/// otherwise the largest packaged artifact.
fn scan_target(application_path: &Path, filename: Option<&str>) -> Flow<PathBuf> {
    match filename.filter(|f| !f.is_empty()) {
        Some(filename) => {
            let target = application_path.join(filename);
            if target.exists() {
                Ok(target)
            } else {
                Err(HandlerOutcome::business(format!(
                    "Specified file does not exist: {}",
                    target.display()
                )))
            }
        }
        None => largest_file(&application_path.join(PACKAGING_DIR)).map_err(|e| {
            HandlerOutcome::business(format!(
                "Failed to find file to scan: {e}. Either specify a filename parameter or ensure {PACKAGING_DIR} contains packaged files."
            ))
        }),
    }
}

/// Largest regular file directly inside `dir`.
pub fn largest_file(dir: &Path) -> io::Result<PathBuf> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("directory does not exist: {}", dir.display()),
        ));
    }

    let mut largest: Option<(u64, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        if largest.as_ref().is_none_or(|(size, _)| metadata.len() > *size) {
            largest = Some((metadata.len(), entry.path()));
        }
    }

    largest.map(|(_, path)| path).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no files found in directory: {}", dir.display()),
        )
    })
}

fn scan_report(
    application_path: &Path,
    request: &PipelineScanRequest,
    output: &ScanProcessOutput,
) -> HandlerOutcome {
    let info = interpret_exit_code(output.exit_code);
    let results_file = request.results_file.display();

    let next_steps = match output.exit_code {
        0 => format!(
            "Next steps:\n- Review scan results in: {results_file}\n- Analyze identified vulnerabilities\n- Integrate findings into your development workflow"
        ),
        3 => format!(
            "Next steps:\n- Review scan results in: {results_file}\n- Check policy violations\n- Address critical vulnerabilities before deployment"
        ),
        4 => "Next steps:\n- Review warnings in scan output\n- Verify build artifacts are available\n- Check if source files were properly compiled".to_string(),
        _ => info.next_steps.to_string(),
    };

    let mut report = format!(
        "Veracode Pipeline Static Scan\n\
         ============================\n\n\
         Application Path: {app}\n\
         Scan Target: {target}\n\
         Results File: {results_file}\n\
         Duration: {duration:?}\n\
         Exit Code: {code}\n\n\
         Command executed:\n\
         veracode {command}\n\n\
         {icon} {message}\n\n",
        app = application_path.display(),
        target = request.target.display(),
        duration = output.duration,
        code = output.exit_code,
        command = request.args().join(" "),
        icon = info.icon,
        message = info.message,
    );

    if !output.stdout.is_empty() {
        report.push_str(&format!("\nOutput:\n{}\n", output.stdout));
    }
    if !output.stderr.is_empty() {
        report.push_str(&format!("\nError output:\n{}\n", output.stderr));
    }
    report.push_str(&format!("\n{next_steps}"));

    if request.results_file.exists() {
        report.push_str(&format!(
            "\n\n✓ Results file created successfully: {results_file}"
        ));
    }

    if output.exit_code != 0 && !info.is_warning {
        HandlerOutcome::BusinessError(report)
    } else {
        HandlerOutcome::text(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(0, false, "✓")]
    #[case(1, false, "❌")]
    #[case(3, true, "⚠")]
    #[case(4, true, "⚠")]
    #[case(127, false, "❌")]
    #[case(42, false, "❌")]
    fn test_interpret_exit_code(#[case] code: i32, #[case] warning: bool, #[case] icon: &str) {
        let info = interpret_exit_code(code);
        assert_eq!(info.exit_code, code);
        assert_eq!(info.is_warning, warning);
        assert_eq!(info.icon, icon);
    }

    #[test]
    fn test_unexpected_exit_code_message() {
        assert_eq!(
            interpret_exit_code(99).message,
            "Command failed with unexpected exit code"
        );
    }

    #[test]
    fn test_largest_file_picks_biggest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("small.zip"), vec![0u8; 10]).unwrap();
        fs::write(temp.path().join("large.jar"), vec![0u8; 1000]).unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();

        let largest = largest_file(temp.path()).unwrap();
        assert_eq!(largest, temp.path().join("large.jar"));
    }

    #[test]
    fn test_largest_file_empty_dir() {
        let temp = TempDir::new().unwrap();
        let err = largest_file(temp.path()).unwrap_err();
        assert!(err.to_string().contains("no files found"));
    }

    #[test]
    fn test_largest_file_missing_dir() {
        let temp = TempDir::new().unwrap();
        let err = largest_file(&temp.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
