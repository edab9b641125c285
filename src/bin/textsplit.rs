//! textsplit - split an HTML fragment into char/word/line wrappers.
//!
//! Reads markup from a file or stdin, lays it out with the reference flow
//! layout, splits the selected elements, and prints the resulting markup.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::PathBuf;

use regex::Regex;
use textsplit::{
    AriaMode, Collection, Delimiter, Document, FlowLayout, Ignore, LogLevel, Selector,
    SpecialChars, SplitConfig, SplitType, TextSplit, set_log_callback,
};

// ============================================================================
// CLI Parsing
// ============================================================================

const HELP_TEXT: &str = "textsplit - split text into character, word, and line wrappers

USAGE:
    textsplit [OPTIONS] [FILE]

Reads an HTML fragment from FILE (or stdin when omitted) and prints the
split markup followed by a summary line.

OPTIONS:
    -h, --help              Print this help message and exit
    --selector <SEL>        Elements to split (default: top-level elements)
    --type <LIST>           Comma-separated: chars, words, lines
                            (default: chars,words,lines)
    --tag <TAG>             Wrapper tag (default: div)
    --aria <MODE>           auto, hidden, none (default: auto)
    --prop-index            Expose --char/--word/--line index properties
    --no-smart-wrap         Disable mid-word wrap correction
    --keep-whitespace       Do not collapse whitespace runs
    --delimiter <TEXT>      Literal word delimiter (default: a space)
    --delimiter-pattern <RE>
                            Regular-expression word delimiter
    --special <TOKEN>       Token kept as one character (repeatable)
    --ignore <SEL>          Subtrees left intact inside their word
    --mask <NAME>           Mask collection: chars, words, lines
    --width <N>             Layout viewport width (default: 600)
    --revert                Revert afterwards and print the restored markup
    -v, --verbose           Log diagnostics to stderr

EXAMPLES:
    textsplit page.html
    echo '<p>Hi there</p>' | textsplit --type words --tag span
    textsplit --type lines --width 120 --revert page.html
";

/// Command-line configuration.
#[derive(Clone, Debug)]
#[allow(clippy::struct_excessive_bools)] // One flag per switch
struct Config {
    input: Option<PathBuf>,
    selector: Option<String>,
    split: SplitConfig,
    ignore: Option<String>,
    special: Vec<String>,
    width: f32,
    revert: bool,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            selector: None,
            split: SplitConfig::default(),
            ignore: None,
            special: Vec::new(),
            width: 600.0,
            revert: false,
            verbose: false,
        }
    }
}

/// Result of CLI parsing.
enum ParseResult {
    Config(Box<Config>),
    Help,
    Error(String),
}

fn value_of<I>(args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = OsString>,
{
    args.next()
        .map(|v| v.to_string_lossy().to_string())
        .ok_or_else(|| format!("{flag} requires a value"))
}

impl Config {
    fn from_args<I>(args: I) -> ParseResult
    where
        I: IntoIterator<Item = OsString>,
    {
        match Self::parse(args) {
            Ok(Some(config)) => ParseResult::Config(Box::new(config)),
            Ok(None) => ParseResult::Help,
            Err(message) => ParseResult::Error(message),
        }
    }

    fn parse<I>(args: I) -> Result<Option<Self>, String>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        // Skip program name
        args.next();

        while let Some(arg) = args.next() {
            let arg_str = arg.to_string_lossy();

            match arg_str.as_ref() {
                "-h" | "--help" => return Ok(None),

                "--selector" => config.selector = Some(value_of(&mut args, "--selector")?),

                "--type" => {
                    let value = value_of(&mut args, "--type")?;
                    let split_type = SplitType::parse(&value);
                    if split_type.is_empty() {
                        return Err(format!(
                            "Invalid --type: {value} (use chars, words, lines)"
                        ));
                    }
                    config.split.split_type = split_type;
                }

                "--tag" => config.split.tag = value_of(&mut args, "--tag")?,

                "--aria" => {
                    let value = value_of(&mut args, "--aria")?;
                    config.split.aria = AriaMode::parse(&value).ok_or_else(|| {
                        format!("Unknown --aria: {value} (valid: auto, hidden, none)")
                    })?;
                }

                "--prop-index" => config.split.prop_index = true,
                "--no-smart-wrap" => config.split.smart_wrap = false,
                "--keep-whitespace" => config.split.reduce_white_space = false,

                "--delimiter" => {
                    let value = value_of(&mut args, "--delimiter")?;
                    config.split.word_delimiter = Delimiter::Literal(value);
                }

                "--delimiter-pattern" => {
                    let value = value_of(&mut args, "--delimiter-pattern")?;
                    let pattern = Regex::new(&value)
                        .map_err(|e| format!("Invalid --delimiter-pattern: {e}"))?;
                    config.split.word_delimiter = Delimiter::Pattern(pattern);
                }

                "--special" => config.special.push(value_of(&mut args, "--special")?),

                "--ignore" => config.ignore = Some(value_of(&mut args, "--ignore")?),

                "--mask" => {
                    let value = value_of(&mut args, "--mask")?;
                    config.split.mask = Some(Collection::parse(&value).ok_or_else(|| {
                        format!("Unknown --mask: {value} (valid: chars, words, lines)")
                    })?);
                }

                "--width" => {
                    let value = value_of(&mut args, "--width")?;
                    match value.parse::<f32>() {
                        Ok(n) if n > 0.0 => config.width = n,
                        _ => {
                            return Err(format!(
                                "Invalid --width value: {value} (must be positive)"
                            ));
                        }
                    }
                }

                "--revert" => config.revert = true,
                "-v" | "--verbose" => config.verbose = true,

                other => {
                    if other.starts_with('-') {
                        return Err(format!("Unknown option: {other}"));
                    }
                    if config.input.is_some() {
                        return Err(format!("Unexpected argument: {other}"));
                    }
                    config.input = Some(PathBuf::from(arg));
                }
            }
        }

        if !config.special.is_empty() {
            config.split.special_chars = Some(SpecialChars::tokens(config.special.clone()));
        }
        if let Some(source) = &config.ignore {
            let selector = Selector::parse(source).map_err(|e| format!("--ignore: {e}"))?;
            config.split.ignore = Some(Ignore::Selector(selector));
        }
        Ok(Some(config))
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() {
    match Config::from_args(std::env::args_os()) {
        ParseResult::Config(config) => {
            if let Err(e) = run(&config) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        ParseResult::Help => print!("{HELP_TEXT}"),
        ParseResult::Error(msg) => {
            eprintln!("Error: {msg}");
            eprintln!("Run with --help for usage information.");
            std::process::exit(2);
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut markup = String::new();
            io::stdin().read_to_string(&mut markup)?;
            Ok(markup)
        }
    }
}

fn run(config: &Config) -> textsplit::Result<()> {
    if config.verbose {
        set_log_callback(|level, message| {
            let tag = match level {
                LogLevel::Debug => "debug",
                LogLevel::Info => "info",
                LogLevel::Warn => "warn",
                LogLevel::Error => "error",
            };
            eprintln!("[{tag}] {message}");
        });
    }

    let markup = read_input(config.input.as_ref())?;
    let mut doc = Document::parse(&markup)?;
    let mut layout = FlowLayout::new(config.width);
    let root = doc.root();

    let mut split = match &config.selector {
        Some(selector) => TextSplit::new(&doc, selector.as_str(), config.split.clone()),
        None => {
            let targets = doc.element_children(root);
            TextSplit::new(&doc, targets, config.split.clone())
        }
    };
    split.split(&mut doc, &mut layout);
    for error in split.errors() {
        eprintln!("warning: {error}");
    }

    println!("{}", doc.inner_html(root));
    println!(
        "chars={} words={} lines={}",
        split.chars().len(),
        split.words().len(),
        split.lines().len()
    );

    if config.revert {
        split.revert(&mut doc);
        println!("{}", doc.inner_html(root));
    }
    Ok(())
}
