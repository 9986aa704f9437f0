//! Play command - interactive terminal game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: Session::run(), placement_phase(), battle_phase()
//! - Level 3: human_turn(), opponent_turn(), choose_target()
//! - Level 4: input parsing

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gridconquer_core::{
    ActionKind, Engine, EngineError, Player, Policy, Position, RandomPolicy, Rules,
};

use crate::render::{format_targets, render_board, unit_info, RenderStyle};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Draw units as letters instead of emoji
    #[arg(long)]
    pub ascii: bool,

    /// Disable ANSI colours
    #[arg(long)]
    pub no_color: bool,

    /// Let a random policy control player 2
    #[arg(long)]
    pub vs_random: bool,
}

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Won(Player),
    Quit,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Square(Position),
    EndTurn,
    Quit,
    Blank,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, rules: Rules, seed: Option<u64>) -> Result<()> {
    let engine = Engine::new(rules)?;
    let style = RenderStyle {
        ascii: args.ascii,
        color: !args.no_color,
    };
    let opponent = args
        .vs_random
        .then(|| RandomPolicy::from_rng(create_rng(seed)));

    tracing::info!(vs_random = args.vs_random, "starting interactive game");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(engine, stdin.lock(), stdout.lock(), style, opponent);
    let end = session.run()?;
    tracing::info!(?end, turns = session.engine().turn(), "session ended");
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// A terminal game over arbitrary input and output streams
pub struct Session<R, W> {
    engine: Engine,
    input: R,
    output: W,
    style: RenderStyle,
    /// Controls player 2 when present
    opponent: Option<RandomPolicy>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        engine: Engine,
        input: R,
        output: W,
        style: RenderStyle,
        opponent: Option<RandomPolicy>,
    ) -> Self {
        Self {
            engine,
            input,
            output,
            style,
            opponent,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Play until a crown falls or the player quits
    pub fn run(&mut self) -> Result<SessionEnd> {
        writeln!(self.output, "Welcome to Grid Conquer!")?;
        writeln!(
            self.output,
            "A turn-based strategy game where you battle to destroy the enemy's Crown."
        )?;

        if self.placement_phase()? == Some(SessionEnd::Quit) {
            return Ok(SessionEnd::Quit);
        }
        self.battle_phase()
    }

    /// Returns `Some(Quit)` if the player gave up during placement
    fn placement_phase(&mut self) -> Result<Option<SessionEnd>> {
        if self.engine.next_placement().is_none() {
            return Ok(None);
        }

        writeln!(self.output, "\n=== PLACEMENT PHASE ===")?;
        for player in Player::ALL {
            let rows = self.engine.home_rows(player);
            writeln!(
                self.output,
                "Player {} places in rows {}-{}",
                player,
                rows.start + 1,
                rows.end
            )?;
        }

        while let Some((player, kind)) = self.engine.next_placement() {
            if let (Player::Two, Some(policy)) = (player, self.opponent.as_mut()) {
                let Some(square) = policy.choose_placement(&self.engine, player, kind) else {
                    anyhow::bail!("no room left to place player {player}'s {kind}");
                };
                self.engine.place_unit(kind, square, player)?;
                writeln!(self.output, "Player 2 placed {kind} at {square}")?;
                continue;
            }

            self.show_board()?;
            writeln!(
                self.output,
                "Player {player}: place your {kind} ({})",
                kind.stats().symbol
            )?;
            match self.read_command("Enter position (e.g. A1) or Q to quit: ")? {
                Command::Quit => return Ok(Some(SessionEnd::Quit)),
                Command::Square(square) => {
                    if let Err(e) = self.engine.place_unit(kind, square, player) {
                        writeln!(self.output, "Invalid placement: {e}")?;
                    }
                }
                Command::EndTurn | Command::Blank => {}
            }
        }

        self.engine.start_game()?;
        Ok(None)
    }

    fn battle_phase(&mut self) -> Result<SessionEnd> {
        writeln!(self.output, "\n=== BATTLE PHASE ===")?;
        writeln!(self.output, "Select one of your units, then a square to move to, attack or heal.")?;
        writeln!(self.output, "E ends the turn, Q quits.")?;

        while let Some(player) = self.engine.current_player() {
            let computer = player == Player::Two && self.opponent.is_some();
            let quit = if computer {
                self.opponent_turn(player)?;
                false
            } else {
                self.human_turn(player)?
            };
            if quit {
                return Ok(SessionEnd::Quit);
            }
        }

        self.show_board()?;
        match self.engine.winner() {
            Some(winner) => {
                writeln!(self.output, "\nGame over! Player {winner} wins!")?;
                Ok(SessionEnd::Won(winner))
            }
            None => Ok(SessionEnd::Quit),
        }
    }

    // ========================================================================
    // LEVEL 3 - STEPS
    // ========================================================================

    /// One prompt cycle for a human player; returns true on quit
    fn human_turn(&mut self, player: Player) -> Result<bool> {
        self.show_board()?;

        if self.engine.selection().is_none() {
            writeln!(self.output, "Player {player}'s turn")?;
            match self.read_command("Select your unit (e.g. A1), E to end turn or Q to quit: ")? {
                Command::Quit => return Ok(true),
                Command::EndTurn => {
                    self.engine.end_turn()?;
                    return Ok(false);
                }
                Command::Blank => return Ok(false),
                Command::Square(square) => {
                    if let Err(e) = self.engine.select_unit(square) {
                        writeln!(self.output, "Invalid selection: {e}")?;
                        return Ok(false);
                    }
                }
            }
        }

        self.choose_target()?;
        Ok(false)
    }

    /// Show the selected unit's options and act on the chosen square
    fn choose_target(&mut self) -> Result<()> {
        let Some(selection) = self.engine.selection().cloned() else {
            return Ok(());
        };
        if let Some(unit) = self.engine.unit_at(selection.unit) {
            writeln!(self.output, "\n{}", unit_info(unit))?;
        }

        let legality = &selection.legality;
        if legality.is_empty() {
            writeln!(self.output, "No actions available for this unit")?;
        }
        for (label, targets) in [
            ("Valid moves", &legality.moves),
            ("Valid attacks", &legality.attacks),
            ("Valid heals", &legality.heals),
        ] {
            if !targets.is_empty() {
                writeln!(self.output, "{label}: {}", format_targets(targets))?;
            }
        }

        let target = match self.read_command("Select action position, or Q to cancel: ")? {
            Command::Square(target) => target,
            Command::EndTurn => {
                self.engine.end_turn()?;
                return Ok(());
            }
            Command::Quit | Command::Blank => {
                self.engine.clear_selection();
                writeln!(self.output, "Selection cancelled")?;
                return Ok(());
            }
        };

        let Some(kind) = ActionKind::ALL
            .into_iter()
            .find(|&kind| legality.contains(kind, target))
        else {
            writeln!(self.output, "Invalid action! Try again.")?;
            return Ok(());
        };

        let result: Result<(), EngineError> = match kind {
            ActionKind::Move => self.engine.move_unit(target),
            ActionKind::Attack => self.engine.attack_unit(target),
            ActionKind::Heal => self.engine.heal_unit(target),
        };
        match result {
            Ok(()) => writeln!(self.output, "{} {kind} {target}", selection.unit)?,
            Err(e) => writeln!(self.output, "Action rejected: {e}")?,
        }
        Ok(())
    }

    fn opponent_turn(&mut self, player: Player) -> Result<()> {
        let Some(policy) = self.opponent.as_mut() else {
            return Ok(());
        };
        match policy.choose_action(&self.engine, player) {
            Some(action) => {
                self.engine.apply_action(action)?;
                writeln!(self.output, "Player {player}: {action}")?;
            }
            None => writeln!(self.output, "Player {player} passes")?,
        }
        if self.engine.current_player() == Some(player) {
            self.engine.end_turn()?;
        }
        Ok(())
    }

    // ========================================================================
    // LEVEL 4 - INPUT
    // ========================================================================

    fn show_board(&mut self) -> Result<()> {
        writeln!(self.output)?;
        write!(self.output, "{}", render_board(&self.engine, self.style))?;
        Ok(())
    }

    /// Prompt until the line parses; end of input counts as quit
    fn read_command(&mut self, prompt: &str) -> Result<Command> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Command::Quit);
            }

            match parse_command(&line, self.engine.board_size()) {
                Ok(command) => return Ok(command),
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_command(line: &str, board_size: i8) -> Result<Command, String> {
    let text = line.trim();
    if text.is_empty() {
        return Ok(Command::Blank);
    }
    if text.eq_ignore_ascii_case("q") {
        return Ok(Command::Quit);
    }
    if text.eq_ignore_ascii_case("e") {
        return Ok(Command::EndTurn);
    }

    let square: Position = text
        .parse()
        .map_err(|e| format!("Invalid input ({e})! Use a square like A1, or Q to quit"))?;
    if !square.in_bounds(board_size) {
        return Err(format!("Position {square} is out of bounds"));
    }
    Ok(Command::Square(square))
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
