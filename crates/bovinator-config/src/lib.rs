use bovinator_engine::{Limits, MAX_RECURSION_LIMIT, ParseOptions};
use bovinator_syntax::{CustomRule, LexError, LexOptions, Lexer, SyntaxTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Bracket pair {0:?} must be exactly two characters, e.g. \"()\"")]
    InvalidBracket(String),

    #[error("Invalid lexer token rule `{name}`: {source}")]
    InvalidTokenRule { name: String, source: LexError },

    #[error("recursion_limit {0} is above the maximum of {MAX_RECURSION_LIMIT}")]
    RecursionLimitTooHigh(usize),
}

/// Base syntax table a [`LexerConfig`] starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    C,
    Lisp,
}

/// A custom lexer rule emitting a named token kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRule {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    pub preset: Preset,
    /// Replaces the preset's extra symbol characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_chars: Option<String>,
    /// Replaces the preset's bracket pairs, written as `"()"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brackets: Option<Vec<String>>,
    /// Replaces the preset's string quote characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_quotes: Option<String>,
    /// Extra line comment prefixes.
    pub line_comments: Vec<String>,
    /// Extra block comment delimiters as `[open, close]`.
    pub block_comments: Vec<[String; 2]>,
    pub tokens: Vec<TokenRule>,
    pub emit_newlines: bool,
    pub keep_comments: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            symbol_chars: None,
            brackets: None,
            string_quotes: None,
            line_comments: Vec::new(),
            block_comments: Vec::new(),
            tokens: Vec::new(),
            emit_newlines: false,
            keep_comments: true,
        }
    }
}

impl LexerConfig {
    pub fn syntax_table(&self) -> Result<SyntaxTable, ConfigError> {
        let mut table = match self.preset {
            Preset::C => SyntaxTable::default(),
            Preset::Lisp => SyntaxTable::lisp(),
        };

        if let Some(chars) = &self.symbol_chars {
            table = table.with_symbol_chars(chars);
        }
        if let Some(brackets) = &self.brackets {
            let pairs = brackets
                .iter()
                .map(|pair| parse_bracket(pair))
                .collect::<Result<Vec<_>, _>>()?;
            table = table.with_brackets(pairs);
        }
        if let Some(quotes) = &self.string_quotes {
            table = table.with_string_quotes(quotes.chars().collect());
        }
        for open in &self.line_comments {
            table = table.with_line_comment(open);
        }
        for [open, close] in &self.block_comments {
            table = table.with_block_comment(open, close);
        }

        Ok(table)
    }

    pub fn lex_options(&self) -> LexOptions {
        LexOptions {
            emit_newlines: self.emit_newlines,
            keep_comments: self.keep_comments,
        }
    }

    /// A lexer with this table, these options and the configured token rules.
    pub fn lexer(&self) -> Result<Lexer, ConfigError> {
        let mut lexer = Lexer::new(self.syntax_table()?).with_options(self.lex_options());
        for rule in &self.tokens {
            let custom = CustomRule::token(&rule.name, &rule.pattern).map_err(|source| {
                ConfigError::InvalidTokenRule {
                    name: rule.name.clone(),
                    source,
                }
            })?;
            lexer = lexer.with_rule(custom);
        }
        Ok(lexer)
    }
}

fn parse_bracket(pair: &str) -> Result<(char, char), ConfigError> {
    let mut chars = pair.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(open), Some(close), None) if open != close => Ok((open, close)),
        _ => Err(ConfigError::InvalidBracket(pair.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_depth: usize,
    pub skip_comments: bool,
    pub recursion_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_budget: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let options = ParseOptions::default();
        Self {
            max_depth: options.max_depth,
            skip_comments: options.skip_comments,
            recursion_limit: options.limits.recursion_limit,
            step_budget: options.limits.step_budget,
            timeout_ms: None,
        }
    }
}

impl ParserConfig {
    pub fn parse_options(&self) -> Result<ParseOptions, ConfigError> {
        if self.recursion_limit > MAX_RECURSION_LIMIT {
            return Err(ConfigError::RecursionLimitTooHigh(self.recursion_limit));
        }
        Ok(ParseOptions {
            max_depth: self.max_depth,
            skip_comments: self.skip_comments,
            limits: Limits {
                recursion_limit: self.recursion_limit,
                step_budget: self.step_budget,
                timeout: self.timeout_ms.map(Duration::from_millis),
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lexer: LexerConfig,
    pub parser: ParserConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        // Expand shell variables and tilde in paths given on the command line
        let config_path =
            Self::expand_path(config_path).unwrap_or_else(|| config_path.to_path_buf());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/bovinator");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
