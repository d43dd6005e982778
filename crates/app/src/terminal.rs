//! Line-oriented presenter for playing in a terminal.

use async_trait::async_trait;
use quiz_core::scoring::LevelResult;
use services::{LevelIntro, Presenter, PresenterEvent, QuestionView, SessionProgress};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const BAR_WIDTH: usize = 20;

/// What is on screen, used to give Enter a meaning.
#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Idle,
    Summary,
    Question { view: QuestionView, answered: bool },
    Result { has_next: bool },
}

pub struct TerminalPresenter {
    input: Lines<BufReader<Stdin>>,
    screen: Screen,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            screen: Screen::Idle,
        }
    }

    fn show_answer(&mut self, option: usize) {
        let Screen::Question { view, answered } = &mut self.screen else {
            return;
        };
        if *answered || option >= view.question.options().len() {
            return;
        }
        *answered = true;
        if option == view.question.correct_index() {
            println!("Correct!");
        } else {
            let correct = &view.question.options()[view.question.correct_index()];
            println!("Not quite. The answer was: {correct}");
        }
        println!("[enter] continue");
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn render_summary(&mut self, intro: &LevelIntro) {
        println!();
        println!("=== {} ===", intro.heading);
        if intro.is_degraded() {
            println!("(Questions could not be loaded; playing offline practice questions.)");
        }
        if let Some(summary) = &intro.summary {
            println!("{summary}");
        }
        println!("{} questions. [enter] start  [q] quit", intro.question_count);
        self.screen = Screen::Summary;
    }

    async fn render_question(&mut self, view: &QuestionView) {
        println!();
        println!("{} {}/{}", progress_bar(&view.progress), view.index + 1, view.total);
        println!("{}", view.question.prompt());
        for (i, option) in view.question.options().iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        self.screen = Screen::Question {
            view: view.clone(),
            answered: false,
        };
    }

    async fn render_result(&mut self, result: &LevelResult) {
        println!();
        println!(
            "Level {} complete: {}/{} ({}%)",
            result.level,
            result.score,
            result.total,
            result.display_percent()
        );
        println!("{}", result.feedback.message());
        match result.next_level {
            Some(next) => println!("[enter] continue to level {next}  [restart]  [q] quit"),
            None if result.passed && result.level.next().is_none() => {
                println!("You finished the last level!  [restart]  [q] quit");
            }
            None => println!("[restart]  [q] quit"),
        }
        self.screen = Screen::Result {
            has_next: result.next_level.is_some(),
        };
    }

    async fn prompt_volunteer(&mut self) {
        println!();
        println!("You scored 80% or more. Would you like to volunteer? Reach out to the team!");
    }

    async fn next_event(&mut self) -> PresenterEvent {
        loop {
            let line = match self.input.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return PresenterEvent::Quit,
                Err(err) => {
                    tracing::warn!(%err, "stdin closed");
                    return PresenterEvent::Quit;
                }
            };
            match parse_input(&line, &self.screen) {
                Some(PresenterEvent::OptionSelected(option)) => {
                    self.show_answer(option);
                    return PresenterEvent::OptionSelected(option);
                }
                Some(event) => return event,
                None => println!("?"),
            }
        }
    }
}

/// Map one input line to an event for the current screen.
///
/// Options are typed 1-based.
fn parse_input(line: &str, screen: &Screen) -> Option<PresenterEvent> {
    let input = line.trim().to_ascii_lowercase();
    match input.as_str() {
        "q" | "quit" => return Some(PresenterEvent::Quit),
        "restart" => return Some(PresenterEvent::Restart),
        "next" => return Some(PresenterEvent::NextLevel),
        "" | "n" => {
            return match screen {
                Screen::Summary => Some(PresenterEvent::Begin),
                Screen::Question { answered: true, .. } => Some(PresenterEvent::Advance),
                Screen::Result { has_next: true } => Some(PresenterEvent::NextLevel),
                _ => None,
            };
        }
        _ => {}
    }
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => Some(PresenterEvent::OptionSelected(n - 1)),
        _ => None,
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn progress_bar(progress: &SessionProgress) -> String {
    let filled = ((progress.fraction() * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_depends_on_screen() {
        assert_eq!(parse_input("", &Screen::Summary), Some(PresenterEvent::Begin));
        assert_eq!(
            parse_input("", &Screen::Result { has_next: true }),
            Some(PresenterEvent::NextLevel)
        );
        assert_eq!(parse_input("", &Screen::Result { has_next: false }), None);
        assert_eq!(parse_input("", &Screen::Idle), None);
    }

    #[test]
    fn options_are_one_based() {
        assert_eq!(
            parse_input(" 2 ", &Screen::Idle),
            Some(PresenterEvent::OptionSelected(1))
        );
        assert_eq!(parse_input("0", &Screen::Idle), None);
        assert_eq!(parse_input("abc", &Screen::Idle), None);
    }

    #[test]
    fn commands_work_anywhere() {
        assert_eq!(parse_input("Q", &Screen::Summary), Some(PresenterEvent::Quit));
        assert_eq!(parse_input("restart", &Screen::Idle), Some(PresenterEvent::Restart));
        assert_eq!(parse_input("next", &Screen::Idle), Some(PresenterEvent::NextLevel));
    }

    fn progress(position: usize, total: usize) -> SessionProgress {
        SessionProgress {
            total,
            answered: position,
            remaining: total - position,
            position,
            score: 0,
        }
    }

    #[test]
    fn progress_bar_fills_with_position() {
        assert_eq!(
            progress_bar(&progress(0, 2)),
            format!("[{}{}]", "#".repeat(10), "-".repeat(10))
        );
        assert_eq!(
            progress_bar(&progress(2, 10)),
            format!("[{}{}]", "#".repeat(6), "-".repeat(14))
        );
        assert_eq!(progress_bar(&progress(9, 10)), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(&progress(0, 0)), format!("[{}]", "#".repeat(20)));
    }
}
