mod lisp;

use anyhow::{Context, Result, anyhow, bail};
use bovinator_config::{Config, Preset};
use bovinator_engine::ParserSession;
use bovinator_syntax::TokenStream;
use std::{
    env,
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "Usage: bovinator [--config PATH] [--verbose] <lex FILE|parse FILE|init>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print one line per lexical token
    Lex(PathBuf),
    /// Print one line per tag found by the Lisp demo grammar
    Parse(PathBuf),
    /// Write a default config file
    Init,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    verbose: bool,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut config = None;
    let mut verbose = false;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                config = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => verbose = true,
            flag if flag.starts_with('-') => bail!("unknown option {flag}"),
            _ => positional.push(arg.as_str()),
        }
    }

    let command = match positional.as_slice() {
        ["lex", file] => Command::Lex(PathBuf::from(*file)),
        ["parse", file] => Command::Parse(PathBuf::from(*file)),
        ["init"] => Command::Init,
        [other, ..] if !matches!(*other, "lex" | "parse" | "init") => {
            bail!("unknown command {other}")
        }
        _ => bail!("expected `lex FILE`, `parse FILE` or `init`"),
    };

    Ok(Args {
        config,
        verbose,
        command,
    })
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)?
            .ok_or_else(|| anyhow!("config file '{}' not found", path.display())),
        None => {
            let config = Config::load()?;
            if config.is_none() {
                log::debug!(
                    "No config file at {}, using defaults",
                    Config::config_path().display()
                );
            }
            Ok(config.unwrap_or_default())
        }
    }
}

/// Write the default config to `path`, or the standard location.
/// An existing file is left alone.
fn init(path: Option<&Path>) -> Result<PathBuf> {
    let target = path.map_or_else(Config::config_path, Path::to_path_buf);
    if target.exists() {
        bail!("config file '{}' already exists", target.display());
    }
    match path {
        Some(path) => Config::default().save_to_path(path)?,
        None => Config::default().save()?,
    }
    Ok(target)
}

fn lex(config: &Config, text: &str) -> Result<TokenStream> {
    let lexer = config.lexer.lexer()?;
    Ok(lexer.lex(text, 0..text.len(), config.parser.max_depth)?)
}

fn parse(config: &Config, text: &str) -> Result<Vec<String>> {
    let mut lexer_config = config.lexer.clone();
    if lexer_config.preset != Preset::Lisp {
        log::info!("parse always uses the lisp syntax preset");
        lexer_config.preset = Preset::Lisp;
    }

    let mut session = ParserSession::builder(lisp::grammar()?)
        .with_lexer(lexer_config.lexer()?)
        .with_options(config.parser.parse_options()?)
        .with_progress(|progress| log::trace!("parsing: {}%", progress.percent()))
        .build();

    let tokens = session.parse_all(text)?;
    Ok(tokens.iter().map(ToString::to_string).collect())
}

fn main() -> Result<()> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let file = match &args.command {
        Command::Init => {
            let path = init(args.config.as_deref())?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(());
        }
        Command::Lex(file) | Command::Parse(file) => file,
    };

    let config = load_config(args.config.as_deref())?;
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;

    if let Command::Parse(_) = args.command {
        let tags = parse(&config, &text)?;
        for tag in &tags {
            println!("{tag}");
        }
        log::info!("{} tags in {}", tags.len(), file.display());
    } else {
        print!("{}", lex(&config, &text)?.render(&text));
    }

    Ok(())
}
