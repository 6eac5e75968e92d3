use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::model::OptionLetter;
use services::QuizController;
use services::quiz::{QuizAction, action_for_key};

use crate::render::{HELP, render_view};

const ANSWERS_FILE: &str = "my-answers.json";
const ANSWER_KEY_FILE: &str = "answer_key.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Action(QuizAction),
    ImportAnswers(PathBuf),
    ImportKey(PathBuf),
    ExportAnswers(PathBuf),
    ExportKey(PathBuf),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    MissingValue { command: &'static str },
    InvalidLetter(String),
    InvalidPosition(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Unknown(raw) => write!(f, "unknown command: {raw} (try help)"),
            ParseError::MissingValue { command } => write!(f, "{command} requires a value"),
            ParseError::InvalidLetter(raw) => write!(f, "invalid option letter: {raw}"),
            ParseError::InvalidPosition(raw) => write!(f, "invalid position: {raw}"),
        }
    }
}

impl std::error::Error for ParseError {}

fn required_path(arg: Option<&str>, command: &'static str) -> Result<PathBuf, ParseError> {
    arg.map(PathBuf::from)
        .ok_or(ParseError::MissingValue { command })
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns `ParseError` for unknown commands or bad arguments.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match head {
        "quit" | "exit" | "q" => ReplCommand::Quit,
        "help" | "?" => ReplCommand::Help,
        "left" => ReplCommand::Action(QuizAction::Go(-1)),
        "right" => ReplCommand::Action(QuizAction::Go(1)),
        "keymode" => ReplCommand::Action(QuizAction::ToggleKeySettingMode),
        "pick" => {
            let raw = arg.ok_or(ParseError::MissingValue { command: "pick" })?;
            let letter: OptionLetter = raw
                .parse()
                .map_err(|_| ParseError::InvalidLetter(raw.to_owned()))?;
            ReplCommand::Action(QuizAction::Select(letter))
        }
        "goto" => {
            let raw = arg.ok_or(ParseError::MissingValue { command: "goto" })?;
            let position = raw
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| ParseError::InvalidPosition(raw.to_owned()))?;
            ReplCommand::Action(QuizAction::SetIndex(position))
        }
        "import-answers" => ReplCommand::ImportAnswers(required_path(arg, "import-answers")?),
        "import-key" => ReplCommand::ImportKey(required_path(arg, "import-key")?),
        "export-answers" => ReplCommand::ExportAnswers(PathBuf::from(arg.unwrap_or(ANSWERS_FILE))),
        "export-key" => ReplCommand::ExportKey(PathBuf::from(arg.unwrap_or(ANSWER_KEY_FILE))),
        other => action_for_key(other)
            .map(ReplCommand::Action)
            .ok_or_else(|| ParseError::Unknown(other.to_owned()))?,
    };
    Ok(Some(command))
}

async fn write_export(path: &Path, contents: String) -> Result<(), std::io::Error> {
    tokio::fs::write(path, contents).await
}

/// Apply one command. Returns `false` when the loop should stop.
async fn apply(
    quiz: &mut QuizController,
    command: ReplCommand,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        ReplCommand::Quit => return Ok(false),
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Action(action) => {
            let outcome = quiz.dispatch(action).await?;
            tracing::debug!(?outcome, "handled action");
        }
        ReplCommand::ImportAnswers(path) => {
            let count = quiz.import_answers_file(&path).await?;
            println!("imported {count} answers from {}", path.display());
        }
        ReplCommand::ImportKey(path) => {
            let count = quiz.import_answer_key_file(&path).await?;
            println!("imported {count} answer key entries from {}", path.display());
        }
        ReplCommand::ExportAnswers(path) => {
            write_export(&path, quiz.export_answers()?).await?;
            println!("wrote {}", path.display());
        }
        ReplCommand::ExportKey(path) => {
            write_export(&path, quiz.export_answer_key()?).await?;
            println!("wrote {}", path.display());
        }
    }
    Ok(true)
}

fn print_view(quiz: &QuizController) {
    if let Some(view) = quiz.view() {
        println!("{}\n", render_view(&view));
    }
}

/// Read commands from stdin until `quit` or end of input.
///
/// Command failures are reported on stderr and the loop continues.
///
/// # Errors
///
/// Returns an error only if stdin cannot be read.
pub async fn run(quiz: &mut QuizController) -> Result<(), std::io::Error> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_view(quiz);

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        let redraw = matches!(command, ReplCommand::Action(_));
        match apply(quiz, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        }
        if redraw {
            print_view(quiz);
        }
    }
    Ok(())
}
