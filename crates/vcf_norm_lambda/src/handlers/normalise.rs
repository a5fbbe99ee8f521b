use std::path::{Path, PathBuf};
use std::time::Instant;

use vcf_norm_core::command::{parse_norm_summary, NormCommand};

use crate::adapters::command_runner::CommandRunner;
use crate::error::HandlerError;

/// Runs `bcftools norm` once against a downloaded input and reference.
pub struct Normaliser<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    program: &'a str,
    workspace_dir: &'a Path,
}

impl<'a, R: CommandRunner + ?Sized> Normaliser<'a, R> {
    pub fn new(runner: &'a R, program: &'a str, workspace_dir: &'a Path) -> Self {
        Self {
            runner,
            program,
            workspace_dir,
        }
    }

    /// Returns `<workspace>/normalised_<input file name>`. Not retried: a failed
    /// run may leave a partial output file behind.
    pub fn normalise(&self, input_path: &Path, genome_path: &Path) -> Result<PathBuf, HandlerError> {
        let command = NormCommand::new(self.program, self.workspace_dir, input_path, genome_path)
            .map_err(|error| {
                HandlerError::KeyWithoutFileName(error.0.to_string_lossy().into_owned())
            })?;

        let started_at = Instant::now();
        tracing::info!(
            component = "normaliser",
            event = "bcftools_started",
            command = %command.display(),
        );

        let output = self
            .runner
            .run(&command.program, &command.args())
            .map_err(|source| HandlerError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.success() {
            tracing::error!(
                component = "normaliser",
                event = "bcftools_failed",
                exit = %output.describe_exit(),
                stderr = %output.stderr,
            );
            return Err(HandlerError::Normalisation {
                exit: output.describe_exit(),
                stderr: output.stderr,
            });
        }

        if !command.output_path.is_file() {
            return Err(HandlerError::OutputMissing {
                path: command.output_path,
            });
        }

        let duration_ms = started_at.elapsed().as_millis() as u64;
        let lines = parse_norm_summary(&output.stderr).unwrap_or_default();
        let count = |label: &str| lines.get(label).copied();
        tracing::info!(
            component = "normaliser",
            event = "bcftools_completed",
            duration_ms,
            lines_total = count("total"),
            lines_split = count("split"),
            lines_joined = count("joined"),
            lines_realigned = count("realigned"),
            lines_skipped = count("skipped"),
        );

        Ok(command.output_path)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::fs;
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::adapters::command_runner::CommandOutput;

    /// Replays a fixed result and, on success, writes the `-o` target the way
    /// bcftools would.
    struct ScriptedRunner {
        exit_code: Option<i32>,
        stderr: &'static str,
        write_output: bool,
        calls: Mutex<Vec<(String, Vec<OsString>)>>,
    }

    impl ScriptedRunner {
        fn succeeding() -> Self {
            Self {
                exit_code: Some(0),
                stderr: "Lines   total/split/joined/realigned/skipped:\t100/10/5/0/0\n",
                write_output: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(stderr: &'static str) -> Self {
            Self {
                exit_code: Some(1),
                stderr,
                write_output: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<OsString>)> {
            self.calls.lock().expect("poisoned mutex").clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push((program.to_string(), args.to_vec()));

            if self.write_output {
                let output_index = args
                    .iter()
                    .position(|arg| arg == "-o")
                    .expect("output flag should be present");
                fs::write(&args[output_index + 1], b"BGZF")?;
            }

            Ok(CommandOutput {
                exit_code: self.exit_code,
                stdout: String::new(),
                stderr: self.stderr.to_string(),
            })
        }
    }

    struct UnlaunchableRunner;

    impl CommandRunner for UnlaunchableRunner {
        fn run(&self, _program: &str, _args: &[OsString]) -> io::Result<CommandOutput> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    fn staged_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let input = dir.join("sample.vcf.gz");
        let genome = dir.join("genome.fa");
        fs::write(&input, b"input").expect("input file");
        fs::write(&genome, b">chr1").expect("genome file");
        (input, genome)
    }

    #[test]
    fn success_returns_prefixed_output_path() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let (input, genome) = staged_inputs(dir.path());
        let runner = ScriptedRunner::succeeding();

        let output = Normaliser::new(&runner, "bcftools", dir.path())
            .normalise(&input, &genome)
            .expect("normalisation should succeed");

        assert_eq!(output, dir.path().join("normalised_sample.vcf.gz"));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        let (program, args) = &calls[0];
        assert_eq!(program, "bcftools");
        assert_eq!(args[0], OsString::from("norm"));
        let flag_value = |flag: &str| {
            args.iter()
                .position(|arg| arg == flag)
                .map(|index| args[index + 1].clone())
        };
        assert_eq!(flag_value("-f"), Some(genome.clone().into_os_string()));
        assert!(flag_value("--keep-sum").is_some());
        assert!(args.contains(&OsString::from("-Oz")));
        assert_eq!(args.last(), Some(&input.clone().into_os_string()));
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let (input, genome) = staged_inputs(dir.path());
        let runner = ScriptedRunner::failing("error: genome mismatch");

        let error = Normaliser::new(&runner, "bcftools", dir.path())
            .normalise(&input, &genome)
            .expect_err("non-zero exit should fail");

        let message = error.to_string();
        assert!(message.contains("bcftools norm failed"));
        assert!(message.contains("error: genome mismatch"));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn zero_exit_without_output_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let (input, genome) = staged_inputs(dir.path());
        let runner = ScriptedRunner {
            write_output: false,
            ..ScriptedRunner::succeeding()
        };

        let error = Normaliser::new(&runner, "bcftools", dir.path())
            .normalise(&input, &genome)
            .expect_err("missing output should fail");

        assert!(
            matches!(error, HandlerError::OutputMissing { ref path } if path.ends_with("normalised_sample.vcf.gz"))
        );
    }

    #[test]
    fn launch_failure_is_a_spawn_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let (input, genome) = staged_inputs(dir.path());

        let error = Normaliser::new(&UnlaunchableRunner, "/opt/missing/bcftools", dir.path())
            .normalise(&input, &genome)
            .expect_err("spawn failure should surface");

        assert!(
            matches!(error, HandlerError::Spawn { ref program, .. } if program == "/opt/missing/bcftools")
        );
    }
}
