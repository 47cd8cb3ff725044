//! # Barforge CLI
//!
//! Command-line interface for encoding and rendering barcodes.
//!
//! ## Usage
//!
//! ```bash
//! # List symbologies and their capabilities
//! barforge types
//!
//! # QR Code to PNG, 4 pixels per module pair
//! barforge encode --barcode QRCODE -d "Hello" --scale 2 -o hello.png
//!
//! # Code 128 rotated and boxed, written as a GIF
//! barforge encode -d "ABC-123" --rotate 90 --box --border 2 -o code.gif
//!
//! # Hex dump of the module grid
//! barforge dump --barcode CODE39 -d "AB12"
//!
//! # Job from a JSON file
//! barforge encode --config job.json -d "Hello"
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use barforge::{
    Error, Format, InputMode, OutputOptions, Registry, Segment, Symbol, Symbology, WarnLevel,
    config::SymbologyConfig, symbology::CapabilityFlags,
};

/// Barforge - Barcode encoder and renderer
#[derive(Parser, Debug)]
#[command(name = "barforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode data and write an image file
    Encode {
        #[command(flatten)]
        symbol: SymbolArgs,

        /// Output file; the extension selects the format
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the output to stdout
        #[arg(long)]
        direct: bool,

        /// Rotation in degrees clockwise (0, 90, 180, 270)
        #[arg(long, default_value = "0")]
        rotate: i32,

        /// Print the output file and image size
        #[arg(short, long)]
        verbose: bool,
    },

    /// List symbologies with id, name and capabilities
    Types,

    /// Print a hex dump of the module grid
    Dump {
        #[command(flatten)]
        symbol: SymbolArgs,
    },
}

#[derive(Args, Debug)]
struct SymbolArgs {
    /// Symbology id or name (e.g. 58 or QRCODE)
    #[arg(short, long, value_name = "ID|NAME")]
    barcode: Option<String>,

    /// Data to encode
    #[arg(short, long)]
    data: Option<String>,

    /// Read data from a file ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// JSON job configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra segment as ECI,DATA (repeatable)
    #[arg(long = "seg", value_name = "ECI,DATA")]
    segs: Vec<String>,

    /// Module size multiplier
    #[arg(long)]
    scale: Option<f32>,

    /// Symbol height in modules
    #[arg(long)]
    height: Option<f32>,

    /// Horizontal whitespace in modules
    #[arg(long)]
    whitesp: Option<i32>,

    /// Vertical whitespace in modules
    #[arg(long)]
    vwhitesp: Option<i32>,

    /// Border width in modules
    #[arg(long)]
    border: Option<i32>,

    /// Draw a box around the symbol
    #[arg(long = "box")]
    boxed: bool,

    /// Draw boundary bars above and below
    #[arg(long)]
    bind: bool,

    /// Render modules as dots
    #[arg(long)]
    dotty: bool,

    /// Dot diameter in modules
    #[arg(long)]
    dotsize: Option<f32>,

    /// Foreground colour (RRGGBB or RRGGBBAA)
    #[arg(long)]
    fg: Option<String>,

    /// Background colour (RRGGBB or RRGGBBAA)
    #[arg(long)]
    bg: Option<String>,

    /// ECI of the data
    #[arg(long)]
    eci: Option<i32>,

    /// Treat data as raw bytes
    #[arg(long, conflicts_with = "gs1")]
    binary: bool,

    /// Treat data as GS1 AI syntax
    #[arg(long)]
    gs1: bool,

    /// GS1 AIs are in parentheses
    #[arg(long)]
    gs1parens: bool,

    /// Skip GS1 data validation
    #[arg(long)]
    gs1nocheck: bool,

    /// Process backslash escape sequences
    #[arg(long)]
    esc: bool,

    /// Hide the human readable text
    #[arg(long)]
    notext: bool,

    /// Small human readable text
    #[arg(long)]
    small: bool,

    /// Bold human readable text
    #[arg(long)]
    bold: bool,

    /// Add default quiet zones
    #[arg(long, conflicts_with = "noquietzones")]
    quietzones: bool,

    /// Suppress quiet zones
    #[arg(long)]
    noquietzones: bool,

    /// Error correction / security level (option 1)
    #[arg(long)]
    secure: Option<i32>,

    /// Version or size (option 2)
    #[arg(long)]
    vers: Option<i32>,

    /// Mode (option 3)
    #[arg(long)]
    mode: Option<i32>,

    /// Primary message for composite and MaxiCode symbols
    #[arg(long)]
    primary: Option<String>,

    /// Treat warnings as errors
    #[arg(long)]
    werror: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Types => {
            let registry = Registry::shared();
            for &s in Symbology::ALL {
                let encoder = if registry.has_encoder(s) { "*" } else { " " };
                println!("{:>3} {} {:<28} {}", s.id(), encoder, s.name(), flag_names(s.caps()));
            }
            println!("\n* built-in encoder");
            Ok(())
        }

        Commands::Encode {
            symbol: args,
            output,
            direct,
            rotate,
            verbose,
        } => {
            let mut symbol = build_symbol(&args)?;
            if let Some(path) = output {
                symbol.options.outfile = path;
            }
            if direct {
                symbol.options.output_options |= OutputOptions::STDOUT;
            }
            encode(&mut symbol, &args)?;
            report(symbol.print(rotate)?);
            if verbose && !direct {
                eprintln!(
                    "Wrote {} ({} x {} modules)",
                    symbol.options.outfile.display(),
                    symbol.width(),
                    symbol.rows()
                );
            }
            Ok(())
        }

        Commands::Dump { symbol: args } => {
            let mut symbol = build_symbol(&args)?;
            encode(&mut symbol, &args)?;
            let dump = symbol.render_to_vec(Format::Txt, 0)?;
            print!("{}", String::from_utf8_lossy(&dump));
            Ok(())
        }
    }
}

fn report(warning: Option<barforge::Warning>) {
    if let Some(w) = warning {
        eprintln!("{}", w);
    }
}

fn parse_symbology(s: &str) -> Result<i32, Error> {
    if let Ok(id) = s.trim().parse::<i32>() {
        return Ok(id);
    }
    Symbology::from_name(s)
        .map(Symbology::id)
        .ok_or_else(|| Error::invalid_option(206, format!("Symbology out of range ({})", s)))
}

fn parse_seg(s: &str) -> Result<Segment, Error> {
    let malformed = || Error::invalid_option(779, format!("Malformed segment argument ({})", s));
    let (eci, data) = s.split_once(',').ok_or_else(malformed)?;
    let eci = eci.trim().parse::<i32>().map_err(|_| malformed())?;
    Ok(Segment::new(data.as_bytes(), eci))
}

/// Options from the config file (if any), overridden by explicit flags.
fn build_symbol(args: &SymbolArgs) -> Result<Symbol, Error> {
    let mut o = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                Error::new(
                    barforge::ErrorKind::FileAccess,
                    229,
                    format!("Unable to read input file ({})", e),
                )
            })?;
            SymbologyConfig::from_json(&json)?.to_options()?
        }
        None => barforge::Options::default(),
    };

    if let Some(b) = &args.barcode {
        o.symbology = parse_symbology(b)?;
    }
    if let Some(v) = args.scale {
        o.scale = v;
    }
    if let Some(v) = args.height {
        o.height = v;
    }
    if let Some(v) = args.whitesp {
        o.whitespace_width = v;
    }
    if let Some(v) = args.vwhitesp {
        o.whitespace_height = v;
    }
    if let Some(v) = args.border {
        o.border_width = v;
    }
    if let Some(v) = args.dotsize {
        o.dot_size = v;
    }
    if let Some(v) = &args.fg {
        o.fg_colour = v.clone();
    }
    if let Some(v) = &args.bg {
        o.bg_colour = v.clone();
    }
    if let Some(v) = args.eci {
        o.eci = v;
    }
    if let Some(v) = args.secure {
        o.option_1 = v;
    }
    if let Some(v) = args.vers {
        o.option_2 = v;
    }
    if let Some(v) = args.mode {
        o.option_3 = v;
    }
    if let Some(v) = &args.primary {
        o.primary = v.clone();
    }

    let flags = [
        (args.boxed, OutputOptions::BOX),
        (args.bind, OutputOptions::BIND),
        (args.dotty, OutputOptions::DOTTY_MODE),
        (args.small, OutputOptions::SMALL_TEXT),
        (args.bold, OutputOptions::BOLD_TEXT),
        (args.quietzones, OutputOptions::QUIET_ZONES),
        (args.noquietzones, OutputOptions::NO_QUIET_ZONES),
    ];
    for (set, flag) in flags {
        if set {
            o.output_options |= flag;
        }
    }

    if args.gs1 {
        o.input_mode = InputMode::Gs1;
    } else if args.binary {
        o.input_mode = InputMode::Data;
    } else if args.config.is_none() {
        o.input_mode = InputMode::Unicode;
    }
    o.escape |= args.esc;
    o.gs1_parens |= args.gs1parens;
    o.gs1_nocheck |= args.gs1nocheck;
    if args.notext {
        o.show_hrt = false;
    }
    if args.werror {
        o.warn_level = WarnLevel::FailAll;
    }

    Ok(Symbol::with_options(o))
}

fn encode(symbol: &mut Symbol, args: &SymbolArgs) -> Result<(), Error> {
    let warning = match (&args.data, &args.input) {
        (Some(data), _) if !args.segs.is_empty() => {
            let mut segs = vec![Segment::new(data.as_bytes(), symbol.options.eci)];
            for s in &args.segs {
                segs.push(parse_seg(s)?);
            }
            symbol.encode_segs(&segs)?
        }
        (Some(data), _) => symbol.encode(data)?,
        (None, Some(path)) => symbol.encode_file(path)?,
        (None, None) => return Err(Error::invalid_option(778, "No input data specified")),
    };
    report(warning);
    Ok(())
}

fn flag_names(caps: CapabilityFlags) -> String {
    caps.iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}
