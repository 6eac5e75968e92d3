//! Plain-text rendering of a [`QuizView`].

use std::fmt::Write as _;

use services::quiz::{OptionState, QuizView};

const BAR_WIDTH: usize = 20;

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn progress_bar(progress: f64) -> String {
    let filled = ((progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn option_marker(state: OptionState) -> &'static str {
    match state {
        OptionState::Neutral => " ",
        OptionState::Selected => "*",
        OptionState::Correct => "+",
        OptionState::Incorrect => "x",
    }
}

/// Draw the whole screen for the current question.
#[must_use]
pub fn render_view(view: &QuizView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {}",
        view.position_label,
        progress_bar(view.progress),
        view.question_alt
    );
    let _ = writeln!(out, "  question: {}", view.question_image);
    if let Some(answer) = &view.answer {
        if answer.visible {
            let _ = writeln!(out, "  answer:   {}", answer.image);
        } else {
            let _ = writeln!(out, "  answer:   (hidden, press a)");
        }
    }
    let _ = writeln!(out, "  [{}]", view.badge.label());

    let options: Vec<String> = view
        .options
        .iter()
        .map(|o| format!("{}{}", o.letter, option_marker(o.state)))
        .collect();
    let _ = writeln!(out, "  options: {}", options.join(" "));
    if view.key_setting_mode {
        let _ = writeln!(out, "  key-setting mode: picks set the correct answer");
    }

    let thumbs: Vec<String> = view
        .thumbnails
        .iter()
        .map(|t| {
            if t.current {
                format!("[{}]", t.label)
            } else {
                t.label.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "  {}", thumbs.join(" "));
    let _ = write!(out, "{}", view.stats_label);
    out
}

pub const HELP: &str = "\
commands:
  left | right | ArrowLeft | ArrowRight   previous / next question
  s                                      shuffle
  a                                      show / hide answer
  k | j                                  mark correct / incorrect
  pick <letter>                          select an option
  keymode                                toggle key-setting mode
  goto <n>                               jump to position n
  import-answers <file>                  replace answers from a file
  import-key <file>                      replace the answer key from a file
  export-answers [file]                  write answers (default my-answers.json)
  export-key [file]                      write the answer key (default answer_key.json)
  help | quit";
