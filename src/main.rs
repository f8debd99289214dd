use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ipv4_block::{Address, Block, MaskSpec, PrefixMask, SubnetMask};
use serde::Serialize;
use std::io::{self, BufRead, Cursor, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Network, broadcast and address counts for IPv4 CIDR blocks
#[derive(Parser)]
#[command(name = "ipv4-block")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Blocks as a.b.c.d/n or a.b.c.d/mask, or bare addresses with --mask.
    /// One per line from stdin when none are given.
    #[arg(value_name = "BLOCK")]
    blocks: Vec<String>,

    /// Mask for inputs without a slash suffix: a prefix length or a dotted mask
    #[arg(short, long, value_name = "MASK")]
    mask: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Log rejected inputs and mask resolution to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Human,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct BlockSummary<'a> {
    input: &'a str,
    network: Address,
    broadcast: Address,
    mask: SubnetMask,
    prefix_len: u8,
    host_bits: u8,
    contiguous: bool,
    address_count: u64,
    usable_address_count: i64,
}

impl<'a> BlockSummary<'a> {
    fn new(input: &'a str, block: &Block) -> Self {
        let mask = block.subnet_mask();
        BlockSummary {
            input,
            network: block.network_address(),
            broadcast: block.broadcast_address(),
            mask,
            prefix_len: mask.network_bits_count(),
            host_bits: mask.host_bits_count(),
            contiguous: mask.is_contiguous(),
            address_count: block.address_count(),
            usable_address_count: block.usable_address_count(),
        }
    }
}

/// Inputs seen and inputs rejected by [`run`].
#[derive(Debug, Default, PartialEq, Eq)]
struct Report {
    processed: usize,
    failures: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let spec = cli
        .mask
        .as_deref()
        .map(str::parse::<MaskSpec>)
        .transpose()
        .context("invalid --mask")?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let (mut out, mut err) = (stdout.lock(), stderr.lock());
    let report = if cli.blocks.is_empty() {
        run(io::stdin().lock(), spec.as_ref(), cli.output, &mut out, &mut err)?
    } else {
        let args = Cursor::new(cli.blocks.join("\n"));
        run(args, spec.as_ref(), cli.output, &mut out, &mut err)?
    };

    if report.failures > 0 {
        bail!(
            "{} of {} inputs could not be parsed",
            report.failures,
            report.processed
        );
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Summarize one block per non-blank line. Rejected lines are reported on
/// `err` and do not stop the rest.
fn run<R: BufRead, W: Write, E: Write>(
    inputs: R,
    spec: Option<&MaskSpec>,
    format: OutputFormat,
    out: &mut W,
    err: &mut E,
) -> Result<Report> {
    let mut report = Report::default();
    for line in inputs.lines() {
        let line = line.context("failed to read input")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        report.processed += 1;
        match Block::parse(input, spec.cloned()) {
            Ok(block) => print_summary(out, &BlockSummary::new(input, &block), format)?,
            Err(e) => {
                report.failures += 1;
                debug!(input, error = %e, "skipping input");
                writeln!(err, "{}: {}", input, e)?;
            }
        }
    }
    debug!(processed = report.processed, failures = report.failures, "done");
    Ok(report)
}

fn print_summary<W: Write>(
    out: &mut W,
    summary: &BlockSummary<'_>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            writeln!(out, "{}", summary.input)?;
            writeln!(out, "  network    {}", summary.network)?;
            writeln!(out, "  broadcast  {}", summary.broadcast)?;
            writeln!(
                out,
                "  mask       {} (/{}, {} host bits)",
                summary.mask, summary.prefix_len, summary.host_bits
            )?;
            if !summary.contiguous {
                writeln!(out, "  warning    mask bits are not contiguous")?;
            }
            writeln!(
                out,
                "  addresses  {} ({} usable)",
                summary.address_count, summary.usable_address_count
            )?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string(summary)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_str(input: &str, spec: Option<MaskSpec>, format: OutputFormat) -> (Report, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = run(Cursor::new(input), spec.as_ref(), format, &mut out, &mut err).unwrap();
        (
            report,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (report, out, err) = run_str("\n192.168.0.0/24\n\n   \n", None, OutputFormat::Human);
        assert_eq!(Report { processed: 1, failures: 0 }, report);
        assert!(err.is_empty());
        assert_eq!(
            "192.168.0.0/24\n  network    192.168.0.0\n  broadcast  192.168.0.255\n  \
             mask       255.255.255.0 (/24, 8 host bits)\n  addresses  256 (254 usable)\n",
            out
        );
    }

    #[test]
    fn failures_are_reported_once_and_the_rest_still_print() {
        let (report, out, err) = run_str(
            "192.168.0.0/24\n\n  \nbogus\n10.0.0.0/8\n",
            None,
            OutputFormat::Human,
        );
        assert_eq!(Report { processed: 3, failures: 1 }, report);
        assert!(out.contains("network    192.168.0.0"));
        assert!(out.contains("network    10.0.0.0"));
        assert!(!out.contains("bogus"));
        assert_eq!(
            "bogus: Invalid IPv4 address: bogus (expected aaa.bbb.ccc.ddd)\n",
            err
        );
    }

    #[test]
    fn mask_applies_to_bare_addresses_only() {
        let spec = Some(MaskSpec::CidrPrefix(16));
        let (report, out, _) = run_str("172.16.9.9\n10.1.2.3/8\n", spec, OutputFormat::Json);
        assert_eq!(Report { processed: 2, failures: 0 }, report);
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(2, lines.len());
        assert_eq!("172.16.0.0", lines[0]["network"]);
        assert_eq!(16, lines[0]["prefix_len"]);
        assert_eq!("10.0.0.0", lines[1]["network"]);
        assert_eq!(16777214, lines[1]["usable_address_count"]);
    }

    #[test]
    fn bare_address_without_mask_fails() {
        let (report, out, err) = run_str("10.0.0.1\n", None, OutputFormat::Human);
        assert_eq!(Report { processed: 1, failures: 1 }, report);
        assert!(out.is_empty());
        assert!(err.starts_with("10.0.0.1: Could not derive a subnet mask"), "{}", err);
    }

    #[test]
    fn non_contiguous_mask_is_flagged() {
        let (_, out, _) = run_str("10.1.2.3/255.0.255.0\n", None, OutputFormat::Human);
        assert!(out.contains("warning    mask bits are not contiguous"), "{}", out);
    }
}
