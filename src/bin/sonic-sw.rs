use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sonic_sw::{CalibratedFrame, CalibrationMethod, SaturationReport, SwConfig, ZoneInput};
use tracing::info;

/// Output mode for the report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Water saturation from sonic logs (Gassmann + Wood).
#[derive(Debug, Parser)]
#[command(name = "sonic-sw", version, about)]
struct Cli {
    /// Brine-filled calibration zone as DTC,DTS,RHO,PHI (us/ft, us/ft, g/cc, fraction)
    #[arg(long, value_name = "DTC,DTS,RHO,PHI")]
    water: ZoneInput,

    /// Target zone as DTC,DTS,RHO,PHI, repeat for several zones
    #[arg(long, value_name = "DTC,DTS,RHO,PHI", required = true)]
    target: Vec<ZoneInput>,

    /// Mineral bulk modulus in GPa
    #[arg(long)]
    km: Option<f64>,

    /// Brine bulk modulus in GPa
    #[arg(long)]
    kw: Option<f64>,

    /// Hydrocarbon bulk modulus in GPa
    #[arg(long)]
    khc: Option<f64>,

    /// Kdry search: bisection or scan
    #[arg(long)]
    method: Option<CalibrationMethod>,

    /// TOML configuration file (defaults to ./sonic-sw.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Configuration with command-line overrides applied last.
    fn config(&self) -> anyhow::Result<SwConfig> {
        let mut config = SwConfig::load(self.config.as_deref()).context("failed to load configuration")?;
        if let Some(km) = self.km {
            config.moduli.mineral = km;
        }
        if let Some(kw) = self.kw {
            config.moduli.brine = kw;
        }
        if let Some(khc) = self.khc {
            config.moduli.hydrocarbon = khc;
        }
        if let Some(method) = self.method {
            config.calibration.method = method;
        }
        Ok(config)
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("sonic-sw error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = cli.config()?;
    info!(moduli = ?config.moduli, method = %config.calibration.method, "configuration loaded");

    let reports = evaluate_targets(&cli.water, &cli.target, &config)?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            println!("=== Sonic-based Sw estimation (Gassmann + Wood) ===");
            for (index, report) in reports.iter().enumerate() {
                if reports.len() > 1 {
                    println!("--- target zone {index} ---");
                }
                println!("{report}");
            }
        }
    }
    Ok(())
}

/// Calibrate once on the water zone, then report every target.
///
/// Nothing is returned unless every target succeeds.
fn evaluate_targets(
    water: &ZoneInput,
    targets: &[ZoneInput],
    config: &SwConfig,
) -> anyhow::Result<Vec<SaturationReport>> {
    let frame = CalibratedFrame::calibrate(water, &config.moduli, &config.calibration)
        .context("water zone calibration failed")?;
    targets
        .iter()
        .enumerate()
        .map(|(index, target)| {
            frame
                .report(target, &config.moduli)
                .with_context(|| format!("target zone {index} failed"))
        })
        .collect()
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SONIC_SW_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{evaluate_targets, Cli, OutputFormat};
    use sonic_sw::{
        estimate_saturation, CalibrationMethod, RockFluidModuli, SwConfig, ZoneInput,
    };

    fn water() -> ZoneInput {
        ZoneInput::new(90.0, 170.0, 2.32, 0.25)
    }

    #[test]
    fn targets_share_one_calibration() {
        let config = SwConfig::default();
        let targets = [
            ZoneInput::new(92.0, 170.0, 2.30, 0.25),
            ZoneInput::new(95.0, 172.0, 2.28, 0.27),
        ];
        let reports = evaluate_targets(&water(), &targets, &config).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].kdry, reports[1].kdry);
        for (report, target) in reports.iter().zip(&targets) {
            let single =
                estimate_saturation(&water(), target, &config.moduli, &config.calibration).unwrap();
            assert_eq!(*report, single);
        }
    }

    #[test]
    fn failing_target_error_names_zone_and_stage_once() {
        let targets = [
            ZoneInput::new(92.0, 170.0, 2.30, 0.25),
            ZoneInput::new(0.0, 170.0, 2.30, 0.25),
        ];
        let err = evaluate_targets(&water(), &targets, &SwConfig::default()).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "target zone 1 failed: sonic conversion failed: \
             compressional slowness must be positive, got 0 us/ft"
        );
    }

    #[test]
    fn calibration_failure_is_reported_before_any_target() {
        let config = SwConfig {
            moduli: RockFluidModuli::new(0.0, 2.6, 0.9),
            ..SwConfig::default()
        };
        let targets = [ZoneInput::new(92.0, 170.0, 2.30, 0.25)];
        let err = evaluate_targets(&water(), &targets, &config).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "water zone calibration failed: unable to calibrate Kdry, check inputs: \
             mineral modulus must be positive, got 0 GPa"
        );
    }

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn zones_and_overrides_parse() {
        let cli = Cli::try_parse_from([
            "sonic-sw",
            "--water",
            "90,170,2.32,0.25",
            "--target",
            "92,170,2.30,0.25",
            "--target",
            "95,172,2.28,0.27",
            "--khc",
            "0.12",
            "--method",
            "scan",
            "--format",
            "json",
        ])
        .expect("cli should parse");

        assert_eq!(cli.water, ZoneInput::new(90.0, 170.0, 2.32, 0.25));
        assert_eq!(cli.target.len(), 2);
        assert_eq!(cli.khc, Some(0.12));
        assert_eq!(cli.method, Some(CalibrationMethod::Scan));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn target_is_required() {
        assert!(Cli::try_parse_from(["sonic-sw", "--water", "90,170,2.32,0.25"]).is_err());
    }

    #[test]
    fn malformed_zone_is_rejected() {
        assert!(Cli::try_parse_from([
            "sonic-sw",
            "--water",
            "90,170,2.32",
            "--target",
            "92,170,2.30,0.25",
        ])
        .is_err());
    }
}
