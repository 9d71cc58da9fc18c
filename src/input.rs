//! Keyboard input handling.
//!
//! Maps terminal key events to game actions. Adding a new keybinding is a
//! single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`Game`] or [`App`] for the action.
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help line in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::game::Game;
use crate::source::Category;

/// Process a single key event.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress is at most one guess.
pub fn handle_key_event(app: &mut App, game: &mut Game, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('o') | KeyCode::Char('1') | KeyCode::Left => {
            game.submit_guess(Category::TheOnion, app);
        }
        KeyCode::Char('n') | KeyCode::Char('2') | KeyCode::Right => {
            game.submit_guess(Category::NotTheOnion, app);
        }
        KeyCode::Char('r') => game.retry(app),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, KeyModifiers};
    use tokio::sync::mpsc;

    use super::*;
    use crate::game::{Phase, Presenter};
    use crate::select::SelectMsg;
    use crate::source::Candidate;
    use crate::tally::MemoryTally;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (App, Game, mpsc::UnboundedReceiver<crate::select::NextCandidate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let game = Game::new(Box::new(MemoryTally::default()), tx);
        (App::new(), game, rx)
    }

    fn deal(app: &mut App, game: &mut Game, category: Category) {
        let candidate = Candidate {
            title: "Headline".into(),
            source_category: category,
            link: None,
            image_url: None,
        };
        game.on_select_msg(SelectMsg::Ready(candidate), app);
    }

    #[test]
    fn q_quits() {
        let (mut app, mut game, _rx) = setup();
        handle_key_event(&mut app, &mut game, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn o_guesses_the_onion() {
        let (mut app, mut game, _rx) = setup();
        deal(&mut app, &mut game, Category::TheOnion);

        handle_key_event(&mut app, &mut game, press(KeyCode::Char('o')));
        assert_eq!(app.last_outcome, Some(true));
        assert_eq!(app.streak, 1);
        assert_eq!(app.attempts, 1);
    }

    #[test]
    fn n_guesses_not_the_onion() {
        let (mut app, mut game, _rx) = setup();
        deal(&mut app, &mut game, Category::TheOnion);

        handle_key_event(&mut app, &mut game, press(KeyCode::Char('n')));
        assert_eq!(app.last_outcome, Some(false));
        assert_eq!(app.streak, 0);
        assert_eq!(app.attempts, 1);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, mut game, _rx) = setup();
        deal(&mut app, &mut game, Category::TheOnion);

        let release = KeyEvent {
            code: KeyCode::Char('o'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, &mut game, release);
        assert_eq!(app.attempts, 0);
        assert_eq!(game.phase(), &Phase::AwaitingGuess);
    }

    #[test]
    fn r_retries_after_failure() {
        let (mut app, mut game, mut rx) = setup();
        game.on_select_msg(SelectMsg::Failed("gave up".into()), &mut app);

        handle_key_event(&mut app, &mut game, press(KeyCode::Char('r')));
        assert!(rx.try_recv().is_ok());
        assert!(app.is_waiting());
    }

    #[test]
    fn guess_before_any_article_does_nothing() {
        let (mut app, mut game, _rx) = setup();
        app.show_waiting();
        handle_key_event(&mut app, &mut game, press(KeyCode::Char('o')));
        assert_eq!(app.attempts, 0);
        assert!(app.last_outcome.is_none());
    }
}
