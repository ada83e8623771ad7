//! End-to-end scenario runs against the registered designs

use serial_test::serial;
use unary_core::{design_registry, test_case_registry, Program, RunConfig, Scenario, TestState};
use unary_tracing::{build_subscriber, DiagnosticTally, TracingConfig};

fn parse(spec: &str) -> unary_core::Result<Scenario> {
    Scenario::parse(spec, design_registry(), test_case_registry())
}

#[test]
fn reference_design_passes_every_strategy() -> unary_core::Result<()> {
    let mut program = Program::new(RunConfig::default());
    program.add(parse(
        "d=reference,t=FullyRandomizedTestCase,o=n:300;unary_prob:0.5,\
         t=DirectedExhaustiveTestCase,t=DirectedExhaustiveComplementTestCase",
    )?)?;

    let report = program.run();
    assert_eq!(report.total(), 3);
    assert!(report.all_passed());
    assert_eq!(report.mismatches(), 0);
    Ok(())
}

#[test]
fn circuits_disagree_only_on_boundary_vectors() -> unary_core::Result<()> {
    // Directed runs stop at the boundary vector; randomized runs with only
    // inner run lengths and random non-unary vectors agree throughout.
    for design in ["u", "e", "p"] {
        let mut program = Program::new(RunConfig::default());
        program.add(parse(&format!(
            "design={design},test=DirectedExhaustiveTestCase,\
             test=DirectedExhaustiveComplementTestCase,\
             test=FullyRandomizedTestCase,options=n:200;unary_prob:0"
        ))?)?;

        let report = program.run();
        let states: Vec<TestState> = report.tests().map(|t| t.state).collect();
        assert_eq!(
            states,
            [TestState::Failed, TestState::Failed, TestState::Passed],
            "design {design}"
        );
        assert_eq!(report.mismatches(), 2, "design {design}");
    }
    Ok(())
}

#[test]
fn same_seed_same_report() -> unary_core::Result<()> {
    let run = |seed| -> unary_core::Result<_> {
        let mut program = Program::new(RunConfig {
            seed,
            ..RunConfig::default()
        });
        program.add(parse("d=u,t=FullyRandomizedTestCase,o=n:500;unary_prob:0.3")?)?;
        Ok(program.run())
    };
    assert_eq!(run(17)?, run(17)?);
    Ok(())
}

#[test]
fn vcd_written_per_design() -> unary_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut program = Program::new(RunConfig {
        vcd: true,
        trace_dir: dir.path().to_path_buf(),
        ..RunConfig::default()
    });
    program.add(parse("d=p,t=FullyRandomizedTestCase,o=n:10")?)?;
    program.add(parse("d=reference,t=FullyRandomizedTestCase,o=n:10")?)?;
    program.run();

    let text = std::fs::read_to_string(dir.path().join("p.vcd"))?;
    assert!(text.contains("$scope module p $end"));
    assert!(text.contains("$var wire 32 ! i_x [31:0] $end"));
    // The reference design is not simulated and leaves no waveform.
    assert!(!dir.path().join("reference.vcd").exists());
    Ok(())
}

#[test]
#[serial]
fn tally_counts_mismatch_errors() -> unary_core::Result<()> {
    let tally = DiagnosticTally::new();
    let config = TracingConfig {
        directives: Some("warn".to_string()),
        ansi: false,
        ..TracingConfig::for_local()
    };
    let subscriber = build_subscriber(&config, tally.clone()).expect("valid directive");

    let report = tracing::subscriber::with_default(subscriber, || -> unary_core::Result<_> {
        let mut program = Program::new(RunConfig::default());
        program.add(parse("d=e,t=DirectedExhaustiveTestCase")?)?;
        Ok(program.run())
    })?;

    assert_eq!(report.failed(), 1);
    assert_eq!(tally.errors(), 1);
    assert_eq!(tally.warnings(), 0);
    Ok(())
}
