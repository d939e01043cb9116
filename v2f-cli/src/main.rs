use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use v2f_codec::{Codec, CodecOverrides, Header};
use v2f_io::QuantizerMode;
use v2f_predict::DecorrelatorMode;

#[derive(Parser)]
#[command(name = "v2f", about = "Variable-to-fixed raster image codec")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Compress(CodecArgs),
    Decompress(CodecArgs),
}

#[derive(Parser)]
struct CodecArgs {
    /// Raw (compress) or compressed (decompress) input path.
    input: PathBuf,
    /// Codec-definition header file.
    header: PathBuf,
    /// Output path.
    output: PathBuf,

    /// Override the header's quantizer mode (0=none, 1=uniform).
    #[arg(short = 'q', long)]
    quantizer_mode: Option<u8>,
    /// Override the header's quantizer step size.
    #[arg(short = 's', long)]
    step: Option<u16>,
    /// Override the header's decorrelator mode (0..4).
    #[arg(short = 'd', long)]
    decorrelator_mode: Option<u16>,
    /// Override samples per row.
    #[arg(short = 'w', long)]
    samples_per_row: Option<usize>,
    /// Non-overlapping, non-decreasing, even-length shadow row range list
    /// (passed through, not yet consulted by the core).
    #[arg(short = 'y', long)]
    shadow_rows: Vec<usize>,
    /// Timing output path.
    #[arg(short = 't', long)]
    timing: Option<PathBuf>,
}

fn parse_quantizer_mode(raw: u8) -> Result<QuantizerMode, Box<dyn Error>> {
    match raw {
        0 => Ok(QuantizerMode::None),
        1 => Ok(QuantizerMode::Uniform),
        other => Err(format!("quantizer mode {} out of range [0,1]", other).into()),
    }
}

fn parse_decorrelator_mode(raw: u16) -> Result<DecorrelatorMode, Box<dyn Error>> {
    match raw {
        0 => Ok(DecorrelatorMode::None),
        1 => Ok(DecorrelatorMode::Left),
        2 => Ok(DecorrelatorMode::TwoLeft),
        3 => Ok(DecorrelatorMode::JpegLs),
        4 => Ok(DecorrelatorMode::Fgij),
        other => Err(format!("decorrelator mode {} out of range [0,4]", other).into()),
    }
}

fn overrides_from_args(args: &CodecArgs) -> Result<CodecOverrides, Box<dyn Error>> {
    if !args.shadow_rows.is_empty() {
        log::info!("shadow row ranges {:?} recorded but not yet consulted", args.shadow_rows);
    }
    Ok(CodecOverrides {
        quantizer_mode: args.quantizer_mode.map(parse_quantizer_mode).transpose()?,
        quantizer_step_size: args.step,
        decorrelator_mode: args
            .decorrelator_mode
            .map(parse_decorrelator_mode)
            .transpose()?,
        samples_per_row: args.samples_per_row,
    })
}

fn run_codec(args: &CodecArgs, compress: bool) -> Result<(), Box<dyn Error>> {
    let start = std::time::Instant::now();

    let header_file = File::open(&args.header)?;
    let header = Header::read(&mut BufReader::new(header_file))?;
    let overrides = overrides_from_args(args)?;
    let codec = Codec::new(header, &overrides)?;

    let input_file = File::open(&args.input)?;
    let mut reader = BufReader::new(input_file);
    let output_file = File::create(&args.output)?;
    let mut writer = BufWriter::new(output_file);

    if compress {
        codec.compress(&mut reader, &mut writer)?;
    } else {
        codec.decompress(&mut reader, &mut writer)?;
    }

    if let Some(timing_path) = &args.timing {
        let elapsed = start.elapsed();
        std::fs::write(timing_path, format!("{:.6}\n", elapsed.as_secs_f64()))?;
    }

    Ok(())
}

fn run(opts: Opts) -> Result<(), Box<dyn Error>> {
    match &opts.command {
        Command::Compress(args) => run_codec(args, true),
        Command::Decompress(args) => run_codec(args, false),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(err) => {
            // clap itself exits 0 for --help/--version and 2 for a usage
            // error; the CLI contract calls for 64 on help/version.
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{}", err);
                    64
                }
                _ => {
                    eprint!("{}", err);
                    1
                }
            };
            return ExitCode::from(code);
        }
    };

    match run(opts) {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(1)
        }
    }
}
