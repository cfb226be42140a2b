use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use cfgbind::{parse_str, BindOptions, EncodeOptions, LineEnding};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cfgbind", version, about = "Configuration text <-> JSON")]
struct Args {
    /// Input file path (.json or configuration text). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Force encode mode: JSON in, configuration text out.
    #[arg(short = 'e', long, conflicts_with = "decode")]
    encode: bool,

    /// Force decode mode: configuration text in, JSON out.
    #[arg(short = 'd', long)]
    decode: bool,

    /// Print the last value written under a key.
    #[arg(long, value_name = "key", conflicts_with = "all")]
    get: Option<String>,

    /// Print every value written under a key, one per line.
    #[arg(long, value_name = "key")]
    all: Option<String>,

    /// Separator for list values written on one line.
    #[arg(long, value_name = "char", default_value_t = ',')]
    separator: char,

    /// JSON indentation when decoding (0 for a single line).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,

    /// Write `key=value` without spaces when encoding.
    #[arg(long)]
    compact: bool,

    /// Use CRLF line endings when encoding.
    #[arg(long)]
    crlf: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let (input_text, input_source) = read_input(args.input.as_deref())?;

    if let Some(key) = args.get.as_deref().or(args.all.as_deref()) {
        return run_query(&args, key, &input_text);
    }

    let mode = resolve_mode(&args, &input_source);
    debug!(?mode, ?input_source, "resolved mode");
    match mode {
        Mode::Encode => run_encode(&args, &input_text),
        Mode::Decode => run_decode(&args, &input_text),
    }
}

fn run_query(args: &Args, key: &str, input: &str) -> Result<(), Box<dyn Error>> {
    let lookup = parse_str(input).lookup();
    let mut out = String::new();
    if args.all.is_some() {
        for value in lookup.all(key) {
            out.push_str(value.as_str().unwrap_or_default());
            out.push('\n');
        }
    } else {
        let Some(value) = lookup.value(key) else {
            return Err(format!("no value for `{key}`").into());
        };
        out.push_str(value);
        out.push('\n');
    }
    write_output(args.output.as_deref(), out.as_bytes())
}

fn run_encode(args: &Args, input: &str) -> Result<(), Box<dyn Error>> {
    let value: Value = serde_json::from_str(input)?;
    let line_ending = if args.crlf {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };
    let options = EncodeOptions::new()
        .with_compact(args.compact)
        .with_line_ending(line_ending);
    let text = cfgbind::to_string_with_options(&value, &options)?;
    write_output(args.output.as_deref(), text.as_bytes())
}

fn run_decode(args: &Args, input: &str) -> Result<(), Box<dyn Error>> {
    let options = BindOptions::new().with_separator(args.separator);
    let value: Value = cfgbind::from_str_with_options(input, &options)?;
    with_output_writer(args.output.as_deref(), |writer| {
        write_json(writer, &value, args.indent)?;
        writer.write_all(b"\n")?;
        Ok(())
    })
}

/// Stdin is read as configuration text unless `--encode` is given.
fn resolve_mode(args: &Args, input_source: &InputSource) -> Mode {
    if args.encode {
        return Mode::Encode;
    }
    if args.decode {
        return Mode::Decode;
    }
    match input_source {
        InputSource::Stdin => Mode::Decode,
        InputSource::File(path) => match Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Mode::Encode,
            _ => Mode::Decode,
        },
    }
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{path}`: {err}"))?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) if path != "-" => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    with_output_writer(path, |writer| {
        writer.write_all(data)?;
        Ok(())
    })
}

fn write_json(writer: &mut dyn Write, value: &Value, indent: usize) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }

    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}
