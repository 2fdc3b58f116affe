use std::fmt;
use std::str::FromStr;

use storage::repository::DEFAULT_PAGE_SIZE;
use study_core::model::{BankId, QuestionId};
use study_core::quiz::{
    DEFAULT_MAX_QUESTIONS, DEFAULT_TIME_LIMIT_SECS, QuizSettings, QuizSettingsError,
};

use crate::confirm::BANK_DELETE_WORD;

pub const DEFAULT_DB_URL: &str = "sqlite://study.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidEnv { var: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    InvalidConfirm { raw: String },
    Settings(QuizSettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidEnv { var, raw } => write!(f, "invalid {var} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidConfirm { raw } => {
                write!(f, "--confirm expects {BANK_DELETE_WORD}, got: {raw}")
            }
            ArgsError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<QuizSettingsError> for ArgsError {
    fn from(err: QuizSettingsError) -> Self {
        Self::Settings(err)
    }
}

/// Runtime knobs shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub quiz: QuizSettings,
    pub page_size: u32,
}

/// Content flags for `add-question` / `edit-question`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInput {
    pub bank_id: BankId,
    pub text: String,
    pub options: Vec<String>,
    /// 0-based; the command line takes 1-based numbers.
    pub correct: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Banks,
    CreateBank { title: String },
    RenameBank { bank_id: BankId, title: String },
    /// `confirmed` skips the typed confirmation.
    DeleteBank { bank_id: BankId, confirmed: bool },
    /// Correct options stay hidden unless `reveal` is set.
    Questions { bank_id: BankId, page: u32, reveal: bool },
    AddQuestion(QuestionInput),
    EditQuestion { question_id: QuestionId, input: QuestionInput },
    DeleteQuestion { bank_id: BankId, question_id: QuestionId, confirmed: bool },
    Quiz { bank_id: BankId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub config: Config,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app banks");
    eprintln!("  app create-bank <title>");
    eprintln!("  app rename-bank --bank-id <id> <title>");
    eprintln!("  app delete-bank --bank-id <id> [--confirm {BANK_DELETE_WORD}]");
    eprintln!("  app questions --bank-id <id> [--page <n>] [--reveal]");
    eprintln!("  app add-question --bank-id <id> --text <text> --option <o>... --correct <n>...");
    eprintln!(
        "  app edit-question --bank-id <id> --question-id <id> --text <text> --option <o>... --correct <n>..."
    );
    eprintln!("  app delete-question --bank-id <id> --question-id <id> [--yes]");
    eprintln!("  app quiz --bank-id <id>");
    eprintln!();
    eprintln!("Options (any subcommand):");
    eprintln!("  --db <sqlite_url>        default {DEFAULT_DB_URL}");
    eprintln!("  --seconds <n>            quiz time limit, default {DEFAULT_TIME_LIMIT_SECS}");
    eprintln!("  --max-questions <n>      questions per quiz, default {DEFAULT_MAX_QUESTIONS}");
    eprintln!("  --page-size <n>          questions per listing page, default {DEFAULT_PAGE_SIZE}");
    eprintln!();
    eprintln!("--correct numbers are 1-based and match the option order.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_QUIZ_SECONDS, STUDY_QUIZ_MAX_QUESTIONS, STUDY_PAGE_SIZE, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_flag<T: FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_env<T: FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ArgsError> {
    match env(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ArgsError::InvalidEnv { var, raw }),
    }
}

/// Parse `argv` (without the program name), falling back to `env` lookups.
///
/// # Errors
///
/// Returns `ArgsError` for unknown or malformed arguments.
pub fn parse(
    argv: impl IntoIterator<Item = String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Invocation, ArgsError> {
    let mut args = argv.into_iter();

    let mut db_url =
        normalize_sqlite_url(env("STUDY_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_owned()));
    let mut seconds: u32 = parse_env(&env, "STUDY_QUIZ_SECONDS", DEFAULT_TIME_LIMIT_SECS)?;
    let mut max_questions: usize =
        parse_env(&env, "STUDY_QUIZ_MAX_QUESTIONS", DEFAULT_MAX_QUESTIONS)?;
    let mut page_size: u32 = parse_env(&env, "STUDY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

    let name = match args.next() {
        None => String::from("--help"),
        Some(first) => first,
    };

    let mut bank_id: Option<BankId> = None;
    let mut question_id: Option<QuestionId> = None;
    let mut page: u32 = 1;
    let mut text: Option<String> = None;
    let mut options: Vec<String> = Vec::new();
    let mut correct: Vec<usize> = Vec::new();
    let mut positional: Vec<String> = Vec::new();
    let mut confirmed = false;
    let mut reveal = false;
    let mut help = matches!(name.as_str(), "--help" | "-h" | "help");

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            }
            "--seconds" => seconds = parse_flag(require_value(&mut args, "--seconds")?, "--seconds")?,
            "--max-questions" => {
                max_questions =
                    parse_flag(require_value(&mut args, "--max-questions")?, "--max-questions")?;
            }
            "--page-size" => {
                page_size = parse_flag(require_value(&mut args, "--page-size")?, "--page-size")?;
            }
            "--bank-id" => {
                bank_id = Some(parse_flag(require_value(&mut args, "--bank-id")?, "--bank-id")?);
            }
            "--question-id" => {
                question_id = Some(parse_flag(
                    require_value(&mut args, "--question-id")?,
                    "--question-id",
                )?);
            }
            "--page" => page = parse_flag(require_value(&mut args, "--page")?, "--page")?,
            "--text" => text = Some(require_value(&mut args, "--text")?),
            "--option" => options.push(require_value(&mut args, "--option")?),
            "--correct" => {
                let raw = require_value(&mut args, "--correct")?;
                let n: usize = parse_flag(raw.clone(), "--correct")?;
                let idx = n
                    .checked_sub(1)
                    .ok_or(ArgsError::InvalidNumber { flag: "--correct", raw })?;
                correct.push(idx);
            }
            "--confirm" => {
                let raw = require_value(&mut args, "--confirm")?;
                if raw != BANK_DELETE_WORD {
                    return Err(ArgsError::InvalidConfirm { raw });
                }
                confirmed = true;
            }
            "--yes" | "-y" => confirmed = true,
            "--reveal" => reveal = true,
            "--help" | "-h" => help = true,
            flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
            _ => positional.push(arg),
        }
    }

    let config = Config {
        db_url,
        quiz: QuizSettings::new(max_questions, seconds)?,
        page_size,
    };
    if help {
        return Ok(Invocation {
            command: Command::Help,
            config,
        });
    }

    let need_bank = |bank_id: Option<BankId>| bank_id.ok_or(ArgsError::MissingArg { what: "--bank-id" });
    let need_question =
        |question_id: Option<QuestionId>| question_id.ok_or(ArgsError::MissingArg { what: "--question-id" });
    let takes_title = matches!(name.as_str(), "create-bank" | "rename-bank");
    if !takes_title {
        if let Some(extra) = positional.first() {
            return Err(ArgsError::UnknownArg(extra.clone()));
        }
    }
    let title = || {
        if positional.is_empty() {
            Err(ArgsError::MissingArg { what: "<title>" })
        } else {
            Ok(positional.join(" "))
        }
    };
    let question_input = |bank_id: BankId, text: Option<String>, options, correct| {
        Ok::<_, ArgsError>(QuestionInput {
            bank_id,
            text: text.ok_or(ArgsError::MissingArg { what: "--text" })?,
            options,
            correct,
        })
    };

    let command = match name.as_str() {
        "banks" => Command::Banks,
        "create-bank" => Command::CreateBank { title: title()? },
        "rename-bank" => Command::RenameBank {
            bank_id: need_bank(bank_id)?,
            title: title()?,
        },
        "delete-bank" => Command::DeleteBank {
            bank_id: need_bank(bank_id)?,
            confirmed,
        },
        "questions" => Command::Questions {
            bank_id: need_bank(bank_id)?,
            page: page.max(1),
            reveal,
        },
        "add-question" => {
            Command::AddQuestion(question_input(need_bank(bank_id)?, text, options, correct)?)
        }
        "edit-question" => Command::EditQuestion {
            question_id: need_question(question_id)?,
            input: question_input(need_bank(bank_id)?, text, options, correct)?,
        },
        "delete-question" => Command::DeleteQuestion {
            bank_id: need_bank(bank_id)?,
            question_id: need_question(question_id)?,
            confirmed,
        },
        "quiz" => Command::Quiz {
            bank_id: need_bank(bank_id)?,
        },
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    Ok(Invocation { command, config })
}

/// Turn relative paths and `sqlite:` URLs into an absolute `sqlite://` URL.
///
/// A `?query` suffix is carried over untouched.
pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_owned();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

/// Create the database file (and parent directories) so `sqlx` can open it.
///
/// # Errors
///
/// Returns an error for a malformed URL or if the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_flags() {
        let inv = parse(argv(&["banks"]), no_env).unwrap();
        assert_eq!(inv.command, Command::Banks);
        assert!(inv.config.db_url.starts_with("sqlite:///"));
        assert!(inv.config.db_url.ends_with("/study.sqlite3"));
        assert_eq!(inv.config.quiz, QuizSettings::default());
        assert_eq!(inv.config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn flags_override_environment() {
        let env = |key: &str| match key {
            "STUDY_QUIZ_SECONDS" => Some("120".to_owned()),
            "STUDY_PAGE_SIZE" => Some("5".to_owned()),
            _ => None,
        };
        let inv = parse(argv(&["quiz", "--bank-id", "3", "--seconds", "30"]), env).unwrap();
        assert_eq!(
            inv.command,
            Command::Quiz {
                bank_id: BankId::new(3)
            }
        );
        assert_eq!(inv.config.quiz.time_limit_secs(), 30);
        assert_eq!(inv.config.page_size, 5);
    }

    #[test]
    fn add_question_collects_repeated_flags() {
        let inv = parse(
            argv(&[
                "add-question",
                "--bank-id",
                "1",
                "--text",
                "Which are primes?",
                "--option",
                "2",
                "--option",
                "4",
                "--option",
                "5",
                "--correct",
                "1",
                "--correct",
                "3",
            ]),
            no_env,
        )
        .unwrap();
        let Command::AddQuestion(input) = inv.command else {
            panic!("expected add-question");
        };
        assert_eq!(input.options, ["2", "4", "5"]);
        assert_eq!(input.correct, [0, 2]);
    }

    #[test]
    fn title_joins_positionals() {
        let inv = parse(argv(&["rename-bank", "--bank-id", "2", "Rust", "basics"]), no_env).unwrap();
        assert_eq!(
            inv.command,
            Command::RenameBank {
                bank_id: BankId::new(2),
                title: "Rust basics".into()
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(argv(&["quiz"]), no_env),
            Err(ArgsError::MissingArg { what: "--bank-id" })
        ));
        assert!(matches!(
            parse(argv(&["add-question", "--bank-id", "1", "--text", "t", "--correct", "0"]), no_env),
            Err(ArgsError::InvalidNumber { flag: "--correct", .. })
        ));
        assert!(matches!(
            parse(argv(&["banks", "--verbose"]), no_env),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(argv(&["frobnicate"]), no_env),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse(argv(&["banks", "--seconds", "0"]), no_env),
            Err(ArgsError::Settings(_))
        ));
        assert!(matches!(
            parse(argv(&["banks"]), |_: &str| Some("many".to_owned())),
            Err(ArgsError::InvalidEnv { .. })
        ));
    }

    #[test]
    fn no_arguments_means_help() {
        assert_eq!(parse(Vec::new(), no_env).unwrap().command, Command::Help);
    }

    #[test]
    fn normalize_keeps_memory_and_absolute_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/x.db".into()),
            "sqlite:///tmp/x.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/y.db".into()), "sqlite:///tmp/y.db");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/z.db?mode=rwc".into()),
            "sqlite:///tmp/z.db?mode=rwc"
        );
    }

    #[test]
    fn normalize_anchors_relative_urls_at_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let expected = format!("sqlite://{}", cwd.join("rel.db").display());
        assert_eq!(normalize_sqlite_url("sqlite://rel.db".into()), expected);
        assert_eq!(normalize_sqlite_url("rel.db".into()), expected);
    }

    #[test]
    fn delete_bank_needs_exact_confirm_word() {
        let inv = parse(argv(&["delete-bank", "--bank-id", "4"]), no_env).unwrap();
        assert_eq!(
            inv.command,
            Command::DeleteBank {
                bank_id: BankId::new(4),
                confirmed: false
            }
        );
        let inv = parse(
            argv(&["delete-bank", "--bank-id", "4", "--confirm", "DELETE"]),
            no_env,
        )
        .unwrap();
        assert_eq!(
            inv.command,
            Command::DeleteBank {
                bank_id: BankId::new(4),
                confirmed: true
            }
        );
        assert!(matches!(
            parse(argv(&["delete-bank", "--bank-id", "4", "--confirm", "delete"]), no_env),
            Err(ArgsError::InvalidConfirm { .. })
        ));
    }

    #[test]
    fn delete_question_yes_skips_prompt() {
        let base = ["delete-question", "--bank-id", "1", "--question-id", "9"];
        let Command::DeleteQuestion { confirmed, .. } = parse(argv(&base), no_env).unwrap().command
        else {
            panic!("expected delete-question");
        };
        assert!(!confirmed);

        let mut with_yes = base.to_vec();
        with_yes.push("--yes");
        assert_eq!(
            parse(argv(&with_yes), no_env).unwrap().command,
            Command::DeleteQuestion {
                bank_id: BankId::new(1),
                question_id: QuestionId::new(9),
                confirmed: true
            }
        );
    }

    #[test]
    fn questions_hide_answers_unless_revealed() {
        let hidden = parse(argv(&["questions", "--bank-id", "2"]), no_env).unwrap();
        assert_eq!(
            hidden.command,
            Command::Questions {
                bank_id: BankId::new(2),
                page: 1,
                reveal: false
            }
        );
        let shown = parse(argv(&["questions", "--bank-id", "2", "--reveal"]), no_env).unwrap();
        assert!(matches!(shown.command, Command::Questions { reveal: true, .. }));
    }
}
