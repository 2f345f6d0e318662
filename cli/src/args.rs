//! Command-line options

use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "output.swf";

pub const USAGE: &str = "\
Usage: swfbbox [-OS] file.swf

-h , --help                    Print help and exit
-b , --bbox                    Show movie bounding box (default)
-B , --newbbox                 Show recalculated (optimized/expanded) bounding box
-e , --expand                  Write out a new file using the recalculated bounding box
-O , --optimize                Recalculate bounding boxes
-S , --swifty                  Print out transformed bounding boxes
-o , --output <filename>       Set output filename to <filename> (for -O)
-c , --config <file.json>      Read engine options from a JSON file
-v , --verbose                 Be more verbose
-q , --quiet                   Be less verbose
-V , --version                 Print program version and exit
";

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Run(Options),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub show_original: bool,
    pub show_computed: bool,
    pub expand: bool,
    pub optimize: bool,
    pub swifty: bool,
    /// Net count of -v minus -q
    pub verbosity: i32,
}

impl Options {
    fn new(input: PathBuf) -> Self {
        Self {
            input,
            output: PathBuf::from(DEFAULT_OUTPUT),
            config: None,
            show_original: true,
            show_computed: false,
            expand: false,
            optimize: false,
            swifty: false,
            verbosity: 0,
        }
    }

    pub fn quiet(&self) -> bool {
        self.verbosity < 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    UnknownOption(String),
    MissingValue(String),
    MissingInput,
    TooManyInputs(String, String),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::UnknownOption(name) => write!(f, "Unknown option: {}", name),
            UsageError::MissingValue(name) => write!(f, "Option {} needs a value", name),
            UsageError::MissingInput => write!(f, "You must supply a filename."),
            UsageError::TooManyInputs(first, second) => write!(
                f,
                "Only one file allowed. You supplied at least two. ({} and {})",
                first, second
            ),
        }
    }
}

impl std::error::Error for UsageError {}

/// Parse everything after the program name
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut input: Option<String> = None;
    let mut flags = Vec::new();
    let mut output = None;
    let mut config = None;

    while let Some(arg) = args.next() {
        let names: Vec<String> = if let Some(long) = arg.strip_prefix("--") {
            vec![long_to_short(long).ok_or_else(|| UsageError::UnknownOption(arg.clone()))?]
        } else if let Some(short) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
            short.chars().map(String::from).collect()
        } else {
            if let Some(first) = &input {
                return Err(UsageError::TooManyInputs(first.clone(), arg));
            }
            input = Some(arg);
            continue;
        };

        for name in names {
            match name.as_str() {
                "h" => return Ok(Command::Help),
                "V" => return Ok(Command::Version),
                "o" | "c" => {
                    let value = args
                        .next()
                        .ok_or_else(|| UsageError::MissingValue(format!("-{}", name)))?;
                    if name == "o" {
                        output = Some(PathBuf::from(value));
                    } else {
                        config = Some(PathBuf::from(value));
                    }
                }
                "b" | "B" | "e" | "O" | "S" | "v" | "q" => flags.push(name),
                other => return Err(UsageError::UnknownOption(format!("-{}", other))),
            }
        }
    }

    let input = input.ok_or(UsageError::MissingInput)?;
    let mut options = Options::new(PathBuf::from(input));
    for flag in flags {
        match flag.as_str() {
            "b" => options.show_original = true,
            "B" => options.show_computed = true,
            "e" => options.expand = true,
            "O" => options.optimize = true,
            "S" => options.swifty = true,
            "v" => options.verbosity += 1,
            "q" => options.verbosity -= 1,
            _ => {}
        }
    }
    if let Some(output) = output {
        options.output = output;
    }
    options.config = config;
    Ok(Command::Run(options))
}

fn long_to_short(name: &str) -> Option<String> {
    let short = match name {
        "help" => "h",
        "version" => "V",
        "bbox" => "b",
        "newbbox" => "B",
        "expand" => "e",
        "optimize" => "O",
        "swifty" => "S",
        "output" => "o",
        "config" => "c",
        "verbose" => "v",
        "quiet" => "q",
        _ => return None,
    };
    Some(short.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    fn options(args: &[&str]) -> Options {
        match parse(args).unwrap() {
            Command::Run(options) => options,
            other => panic!("expected a run, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let options = options(&["movie.swf"]);
        assert_eq!(options.input, PathBuf::from("movie.swf"));
        assert_eq!(options.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(options.show_original);
        assert!(!options.show_computed);
        assert!(!options.expand);
        assert!(!options.optimize);
        assert!(!options.quiet());
    }

    #[test]
    fn test_short_and_long_flags() {
        let options = options(&["-OB", "--swifty", "-o", "small.swf", "in.swf", "--quiet"]);
        assert!(options.optimize);
        assert!(options.show_computed);
        assert!(options.swifty);
        assert_eq!(options.output, PathBuf::from("small.swf"));
        assert!(options.quiet());
    }

    #[test]
    fn test_config_path() {
        let options = options(&["--config", "bbox.json", "-e", "in.swf"]);
        assert_eq!(options.config, Some(PathBuf::from("bbox.json")));
        assert!(options.expand);
    }

    #[test]
    fn test_verbosity_accumulates() {
        assert_eq!(options(&["-vv", "in.swf"]).verbosity, 2);
        assert_eq!(options(&["-v", "-q", "-q", "in.swf"]).verbosity, -1);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["in.swf", "--version"]).unwrap(), Command::Version);
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(parse(&[]), Err(UsageError::MissingInput));
        assert_eq!(
            parse(&["a.swf", "b.swf"]),
            Err(UsageError::TooManyInputs("a.swf".to_string(), "b.swf".to_string()))
        );
        assert_eq!(parse(&["-x", "a.swf"]), Err(UsageError::UnknownOption("-x".to_string())));
        assert_eq!(parse(&["--frobnicate"]), Err(UsageError::UnknownOption("--frobnicate".to_string())));
        assert_eq!(parse(&["a.swf", "-o"]), Err(UsageError::MissingValue("-o".to_string())));
    }
}
