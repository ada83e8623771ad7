//! unary-tb CLI
//!
//! Runs admission-circuit scenarios and prints a pass/fail summary.
//!
//! ```text
//! unary-tb -s 7 -v 1 -t design=u,test=FullyRandomizedTestCase,options=n:1000
//! ```
//!
//! Exit status is `1` for `--help`, malformed arguments and scenarios that
//! cannot be built, and `0` otherwise, including when test cases fail.

use std::fmt::Write as _;
use std::process::ExitCode;

use clap::Parser;
use unary_core::{
    design_registry, test_case_registry, Program, ProgramReport, RejectedValue, RunConfig, Scenario,
};
use unary_tracing::{init_global_tracing, DiagnosticTally, TracingConfig};

#[derive(Parser, Debug)]
#[command(name = "unary-tb")]
#[command(version, about = "Testbench for unary (thermometer-code) admission circuits")]
#[command(long_about = "
Each --test builds one scenario from comma-separated tokens:

  design=<name> | d=<name>     device under test (one per scenario)
  test=<name>   | t=<name>     append a test case
  options=<kv>  | o=<kv>       configure the last test case, kv = key:value;key:value

Environment: UNARY_TB_SEED, UNARY_TB_VERBOSITY, UNARY_TB_DEBUG, UNARY_TB_VCD,
UNARY_TB_TRACE_DIR, UNARY_TRACING_PROFILE, UNARY_TRACING_FORMAT,
UNARY_TRACING_DIRECTIVES. Flags override the environment.
")]
struct Cli {
    /// List registered designs and exit
    #[arg(long = "list_designs")]
    list_designs: bool,

    /// List registered test cases and exit
    #[arg(long = "list_tests")]
    list_tests: bool,

    /// Stimulus seed
    #[arg(short, long, value_name = "UINT")]
    seed: Option<u64>,

    /// Verbosity: 0 warnings, 1 info, 2 debug, 3 trace
    #[arg(short, long, value_name = "UINT")]
    verbose: Option<u8>,

    /// Force debug logging
    #[arg(short, long)]
    debug: bool,

    /// Capture a VCD waveform per scenario
    #[arg(long)]
    vcd: bool,

    /// Scenario to run; repeat for more scenarios
    #[arg(short, long = "test", value_name = "SPEC")]
    tests: Vec<String>,
}

impl Cli {
    /// Layer the command line over `base`.
    fn run_config(&self, base: RunConfig) -> RunConfig {
        let mut config = base;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(verbose) = self.verbose {
            config.verbosity = verbose;
        }
        config.debug |= self.debug;
        config.vcd |= self.vcd;
        config
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if cli.list_designs || cli.list_tests {
        print!("{}", render_listing(&cli));
        return ExitCode::SUCCESS;
    }

    let (env_config, rejected) = RunConfig::from_env();
    let config = cli.run_config(env_config);
    let tally = match init_global_tracing(&TracingConfig::from_env().with_default_directive(config.log_directive())) {
        Ok(tally) => tally,
        Err(e) => {
            eprintln!("warning: {e}");
            DiagnosticTally::new()
        }
    };
    warn_rejected(&rejected);

    let mut program = match build_program(config, &cli.tests) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = program.run();
    print!("{}", render_summary(&report, &tally));
    ExitCode::SUCCESS
}

/// Report environment values `RunConfig::from_env` could not parse.
fn warn_rejected(rejected: &[RejectedValue]) {
    for r in rejected {
        tracing::warn!(key = r.key, value = %r.value, "ignoring unparsable environment value");
    }
}

fn build_program(config: RunConfig, specs: &[String]) -> unary_core::Result<Program> {
    let mut program = Program::new(config);
    for spec in specs {
        program.add(Scenario::parse(spec, design_registry(), test_case_registry())?)?;
    }
    Ok(program)
}

fn render_listing(cli: &Cli) -> String {
    let mut out = String::new();
    if cli.list_designs {
        out.push_str("designs:\n");
        for name in design_registry().names() {
            let _ = writeln!(out, "  {name}");
        }
    }
    if cli.list_tests {
        out.push_str("tests:\n");
        for name in test_case_registry().names() {
            let _ = writeln!(out, "  {name}");
        }
    }
    out
}

fn render_summary(report: &ProgramReport, tally: &DiagnosticTally) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "seed: {}", report.seed);
    for scenario in &report.scenarios {
        let device = scenario.device.as_deref().unwrap_or("-");
        let _ = writeln!(out, "scenario {} (design {device})", scenario.spec);
        for test in &scenario.tests {
            let verdict = if test.passed() {
                "PASS"
            } else if test.failed() {
                "FAIL"
            } else {
                "SKIP"
            };
            let _ = writeln!(out, "  [{verdict}] {} mismatches={}", test.name, test.mismatches);
        }
    }
    let _ = writeln!(
        out,
        "tests: {} passed, {} failed, {} skipped; mismatches: {}; warnings: {}; errors: {}",
        report.passed(),
        report.failed(),
        report.skipped(),
        report.mismatches(),
        tally.warnings(),
        tally.errors()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use unary_tracing::build_subscriber;

    #[test]
    fn parses_every_flag() {
        let cli = Cli::try_parse_from([
            "unary-tb", "-s", "9", "-v", "2", "-d", "--vcd", "-t", "d=u,t=FullyRandomizedTestCase", "--test",
            "d=e,t=DirectedExhaustiveTestCase",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.verbose, Some(2));
        assert!(cli.debug && cli.vcd);
        assert_eq!(cli.tests.len(), 2);
    }

    #[test]
    fn listing_flags_use_underscores() {
        let cli = Cli::try_parse_from(["unary-tb", "--list_designs", "--list_tests"]).unwrap();
        let listing = render_listing(&cli);
        assert!(listing.contains("designs:\n  e\n  p\n  reference\n  u\n"));
        assert!(listing.contains("  FullyRandomizedTestCase\n"));
    }

    #[test]
    fn help_and_bad_values_are_errors() {
        let help = Cli::try_parse_from(["unary-tb", "-h"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        assert!(Cli::try_parse_from(["unary-tb", "--seed", "-3"]).is_err());
        assert!(Cli::try_parse_from(["unary-tb", "--bogus"]).is_err());
    }

    #[test]
    fn flags_override_environment_config() {
        let base = RunConfig {
            seed: 1,
            verbosity: 3,
            vcd: true,
            ..RunConfig::default()
        };
        let cli = Cli::try_parse_from(["unary-tb", "-s", "5"]).unwrap();
        let config = cli.run_config(base);
        assert_eq!(config.seed, 5);
        assert_eq!(config.verbosity, 3);
        assert!(config.vcd);
        assert!(!config.debug);
    }

    #[test]
    fn rejected_environment_values_are_tallied() {
        let tally = DiagnosticTally::new();
        let config = TracingConfig {
            directives: Some("warn".to_string()),
            ansi: false,
            ..TracingConfig::for_local()
        };
        let subscriber = build_subscriber(&config, tally.clone()).unwrap();
        let rejected = [
            RejectedValue { key: "UNARY_TB_SEED", value: "lots".to_string() },
            RejectedValue { key: "UNARY_TB_VCD", value: "sometimes".to_string() },
        ];

        tracing::subscriber::with_default(subscriber, || warn_rejected(&rejected));

        assert_eq!(tally.warnings(), 2);
        assert_eq!(tally.errors(), 0);
    }

    #[test]
    fn bad_scenario_fails_to_build() {
        let specs = vec!["d=u".to_string()];
        assert!(matches!(
            build_program(RunConfig::default(), &specs),
            Err(unary_core::Error::IncompleteScenario(_))
        ));
    }

    #[test]
    fn summary_lists_verdicts_and_totals() {
        let specs = vec![
            "d=reference,t=DirectedExhaustiveTestCase".to_string(),
            "d=u,t=DirectedExhaustiveComplementTestCase".to_string(),
        ];
        let report = build_program(RunConfig::default(), &specs).unwrap().run();
        let summary = render_summary(&report, &DiagnosticTally::new());

        assert!(summary.starts_with("seed: 0\n"));
        assert!(summary.contains("  [PASS] DirectedExhaustiveTestCase mismatches=0\n"));
        assert!(summary.contains("  [FAIL] DirectedExhaustiveComplementTestCase mismatches=1\n"));
        assert!(summary.ends_with("tests: 1 passed, 1 failed, 0 skipped; mismatches: 1; warnings: 0; errors: 0\n"));
    }
}
