//! Campaign state machine.
//!
//! [`Game`] owns every piece of mutable session state: the live level, the
//! timer queue, the message line, the magic gate and the timing ledger.
//! Front ends feed it discrete triggers (a move, a typed answer, a clock
//! tick) and read back a [`Frame`] plus the message and history lines.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::Rules;
use crate::error::GenerationError;
use crate::grid::{Dir, Pos, Tile};
use crate::hazards::MagicGate;
use crate::level::LevelState;
use crate::timers::{Scheduler, TimerKind};
use crate::timing::{BestTimeStore, CampaignSummary, MemoryStore, TimingLedger};

pub const MAGIC_SENTENCES: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog",
    "Pack my box with five dozen liquor jugs",
    "Sphinx of black quartz, judge my vow",
    "How vexingly quick daft zebras jump",
    "The five boxing wizards jump quickly",
];

pub const MSG_TRAPPED: &str = "You are trapped!";
pub const MSG_FROZEN: &str = "You are frozen for 2 seconds!";
pub const MSG_TRAP_NEAR: &str = "Warning: A trap is near you!";
pub const MSG_MAGIC_WRONG: &str = "Incorrect! You must continue playing.";
pub const MSG_MAGIC_RIGHT: &str = "Correct! You've unlocked the magic ending. Game over.";
pub const MSG_DECLINED: &str = "Come back when you're ready!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    Exit,
    Magic,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// Waiting on the yes/no gate before level 1.
    AwaitingStart,
    Declined,
    Playing,
    Frozen,
    MagicChallenge { sentence: &'static str },
    CampaignComplete {
        summary: CampaignSummary,
        ending: Ending,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    LevelStarted { level: u32, grid_size: usize },
    Moved { from: Pos, to: Pos },
    LevelCompleted { level: u32, seconds: f64 },
    TrapSprung { at: Pos },
    Froze { at: Pos },
    Thawed,
    TrapBlinked { visible: bool },
    MagicChallengeStarted { sentence: &'static str },
    MagicChallengeFailed,
    CampaignCompleted {
        summary: CampaignSummary,
        ending: Ending,
    },
}

/// Snapshot handed to the render sink.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub level: u32,
    pub grid_size: usize,
    pub tiles: Vec<Tile>,
    pub player: Pos,
    pub trap_visible: bool,
}

/// Single message line. Locked messages carry a token so a release timer only
/// clears the message it put up.
#[derive(Debug, Default)]
struct MessageSlot {
    text: Option<String>,
    lock: Option<u64>,
    next_token: u64,
}

impl MessageSlot {
    fn show_locked(&mut self, text: &str) -> u64 {
        self.next_token += 1;
        self.text = Some(text.to_string());
        self.lock = Some(self.next_token);
        self.next_token
    }

    fn show(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn clear(&mut self) {
        self.text = None;
    }

    fn release(&mut self, token: u64) -> bool {
        if self.lock != Some(token) {
            return false;
        }
        self.lock = None;
        self.text = None;
        true
    }

    fn locked(&self) -> bool {
        self.lock.is_some()
    }

    fn reset(&mut self) {
        self.text = None;
        self.lock = None;
    }
}

pub struct Game<S = MemoryStore> {
    rules: Rules,
    rng: StdRng,
    phase: Phase,
    level: Option<LevelState>,
    epoch: u64,
    gate: MagicGate,
    magic_activated: bool,
    ledger: TimingLedger<S>,
    message: MessageSlot,
    scheduler: Scheduler,
}

impl<S: BestTimeStore> Game<S> {
    pub fn new(rules: Rules, store: S) -> Self {
        Self::with_rng(rules, store, StdRng::from_entropy())
    }

    pub fn with_seed(rules: Rules, store: S, seed: u64) -> Self {
        Self::with_rng(rules, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rules: Rules, store: S, rng: StdRng) -> Self {
        let gate = MagicGate::new(rules.magic_window.clone());
        Self {
            rules,
            rng,
            phase: Phase::AwaitingStart,
            level: None,
            epoch: 0,
            gate,
            magic_activated: false,
            ledger: TimingLedger::new(store),
            message: MessageSlot::default(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn level(&self) -> Option<&LevelState> {
        self.level.as_ref()
    }

    pub fn level_number(&self) -> Option<u32> {
        self.level.as_ref().map(|l| l.number)
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == Phase::Frozen
    }

    pub fn message(&self) -> Option<&str> {
        self.message.text.as_deref()
    }

    pub fn times(&self) -> &[f64] {
        self.ledger.times()
    }

    pub fn best_total(&self) -> Option<f64> {
        self.ledger.best()
    }

    pub fn store(&self) -> &S {
        self.ledger.store()
    }

    pub fn history(&self) -> Vec<String> {
        self.ledger.history(self.rules.campaign_levels as usize)
    }

    pub fn next_timer(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    pub fn frame(&self) -> Option<Frame> {
        self.level.as_ref().map(|level| Frame {
            level: level.number,
            grid_size: level.grid_size(),
            tiles: level.tiles(),
            player: level.player,
            trap_visible: level.trap_visible,
        })
    }

    /// Answers the start-of-session gate. Accepting builds level 1.
    pub fn confirm_start(
        &mut self,
        accept: bool,
        now: Instant,
        events: &mut Vec<Event>,
    ) -> Result<(), GenerationError> {
        if self.phase != Phase::AwaitingStart {
            return Ok(());
        }
        if !accept {
            tracing::info!("player declined to start");
            self.phase = Phase::Declined;
            self.message.show(MSG_DECLINED);
            return Ok(());
        }
        self.start_level(1, now, events)?;
        self.phase = Phase::Playing;
        self.update_proximity();
        Ok(())
    }

    /// Throws the finished campaign away and returns to the start gate. Only
    /// the best total survives.
    pub fn restart(&mut self) {
        tracing::info!("campaign reset");
        self.phase = Phase::AwaitingStart;
        self.level = None;
        self.gate = MagicGate::new(self.rules.magic_window.clone());
        self.magic_activated = false;
        self.ledger.reset();
        self.message.reset();
        self.scheduler.clear();
    }

    pub fn move_dir(
        &mut self,
        dir: Dir,
        now: Instant,
        events: &mut Vec<Event>,
    ) -> Result<bool, GenerationError> {
        let (dx, dy) = dir.delta();
        self.move_by(dx, dy, now, events)
    }

    /// Attempts to move the player by `(dx, dy)`. Returns `Ok(false)` when the
    /// move is refused: wrong phase, off the grid, or into a blocking tile.
    pub fn move_by(
        &mut self,
        dx: isize,
        dy: isize,
        now: Instant,
        events: &mut Vec<Event>,
    ) -> Result<bool, GenerationError> {
        if self.phase != Phase::Playing {
            return Ok(false);
        }
        let frozen = self.is_frozen();
        let Some(level) = self.level.as_mut() else {
            return Ok(false);
        };
        let (x, y) = (level.player.x as isize + dx, level.player.y as isize + dy);
        if !level.in_bounds(x, y) {
            return Ok(false);
        }
        let target = Pos::new(x as usize, y as usize);
        if level.is_blocked(target, frozen) {
            return Ok(false);
        }

        let from = level.player;
        level.player = target;
        events.push(Event::Moved { from, to: target });

        if level.on_exit() {
            self.complete_level(now, events)?;
            self.update_proximity();
            return Ok(true);
        }

        if !self.magic_activated && level.on_magic() {
            self.open_magic_challenge(events);
        }
        if self.level.as_ref().is_some_and(LevelState::on_visible_trap) {
            self.spring_trap(now, events);
        }
        if self.level.as_ref().is_some_and(LevelState::on_freeze) {
            self.freeze(now, events);
        }
        self.update_proximity();
        Ok(true)
    }

    /// Checks a typed answer to the open magic challenge. Leading and trailing
    /// whitespace is ignored; anything else must match exactly. A wrong answer
    /// closes the challenge for good and play continues.
    pub fn answer_magic(&mut self, answer: &str, now: Instant, events: &mut Vec<Event>) -> bool {
        let Phase::MagicChallenge { sentence } = self.phase else {
            return false;
        };
        if answer.trim() != sentence {
            tracing::info!("magic challenge failed");
            self.phase = Phase::Playing;
            self.message.show(MSG_MAGIC_WRONG);
            events.push(Event::MagicChallengeFailed);
            return false;
        }

        if let Some(level) = self.level.as_ref() {
            self.ledger.record(level.elapsed(now));
        }
        self.finish_campaign(Ending::Magic, events);
        self.message.reset();
        self.message.show(MSG_MAGIC_RIGHT);
        true
    }

    /// Fires every timer due at `now`.
    pub fn tick(&mut self, now: Instant, events: &mut Vec<Event>) {
        loop {
            let due = self.scheduler.drain_due(now);
            if due.is_empty() {
                break;
            }
            for timer in due {
                match timer.kind {
                    TimerKind::Blink { epoch } => self.blink(epoch, timer.due, events),
                    TimerKind::Thaw { token } => self.thaw(token, events),
                    TimerKind::ReleaseMessage { token } => {
                        let _ = self.message.release(token);
                    }
                }
            }
        }
    }

    fn start_level(
        &mut self,
        number: u32,
        now: Instant,
        events: &mut Vec<Event>,
    ) -> Result<(), GenerationError> {
        let epoch = self.epoch + 1;
        let level = LevelState::generate(number, epoch, &mut self.gate, &mut self.rng, now)?;
        tracing::info!(
            level = number,
            epoch,
            grid_size = level.grid_size(),
            magic = level.magic.is_some(),
            "level generated"
        );
        events.push(Event::LevelStarted {
            level: number,
            grid_size: level.grid_size(),
        });
        self.epoch = epoch;
        self.level = Some(level);
        self.scheduler
            .schedule(now, self.rules.blink_interval, TimerKind::Blink { epoch });
        Ok(())
    }

    fn complete_level(&mut self, now: Instant, events: &mut Vec<Event>) -> Result<(), GenerationError> {
        let Some(level) = self.level.as_ref() else {
            return Ok(());
        };
        let number = level.number;
        let seconds = level.elapsed(now);
        self.ledger.record(seconds);
        tracing::info!(level = number, seconds, "level complete");
        events.push(Event::LevelCompleted {
            level: number,
            seconds,
        });

        if number >= self.rules.campaign_levels {
            self.finish_campaign(Ending::Exit, events);
            return Ok(());
        }
        self.start_level(number + 1, now, events)
    }

    fn finish_campaign(&mut self, ending: Ending, events: &mut Vec<Event>) {
        let summary = self.ledger.finish();
        tracing::info!(
            total = summary.total,
            new_best = summary.new_best,
            ?ending,
            "campaign complete"
        );
        self.message.reset();
        self.message.show(&format!(
            "Congratulations! You've completed all levels in {:.2} seconds!",
            summary.total
        ));
        self.phase = Phase::CampaignComplete { summary, ending };
        events.push(Event::CampaignCompleted { summary, ending });
    }

    fn open_magic_challenge(&mut self, events: &mut Vec<Event>) {
        self.magic_activated = true;
        let sentence = MAGIC_SENTENCES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(MAGIC_SENTENCES[0]);
        tracing::info!(sentence, "magic challenge opened");
        self.phase = Phase::MagicChallenge { sentence };
        events.push(Event::MagicChallengeStarted { sentence });
    }

    fn spring_trap(&mut self, now: Instant, events: &mut Vec<Event>) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let at = level.player;
        level.player = Pos::new(0, 0);
        tracing::debug!(x = at.x, y = at.y, "trap sprung");
        events.push(Event::TrapSprung { at });
        let token = self.message.show_locked(MSG_TRAPPED);
        self.scheduler.schedule(
            now,
            self.rules.trap_message_duration,
            TimerKind::ReleaseMessage { token },
        );
    }

    fn freeze(&mut self, now: Instant, events: &mut Vec<Event>) {
        if self.is_frozen() {
            return;
        }
        let Some(at) = self.level.as_ref().map(|l| l.player) else {
            return;
        };
        tracing::debug!(x = at.x, y = at.y, "player frozen");
        self.phase = Phase::Frozen;
        events.push(Event::Froze { at });
        let token = self.message.show_locked(MSG_FROZEN);
        self.scheduler
            .schedule(now, self.rules.freeze_duration, TimerKind::Thaw { token });
    }

    fn thaw(&mut self, token: u64, events: &mut Vec<Event>) {
        if self.phase == Phase::Frozen {
            self.phase = Phase::Playing;
            events.push(Event::Thawed);
        }
        let _ = self.message.release(token);
    }

    fn blink(&mut self, epoch: u64, due: Instant, events: &mut Vec<Event>) {
        let Some(level) = self.level.as_mut().filter(|l| l.epoch == epoch) else {
            tracing::trace!(epoch, live = self.epoch, "dropping stale blink timer");
            return;
        };
        level.trap_visible = !level.trap_visible;
        events.push(Event::TrapBlinked {
            visible: level.trap_visible,
        });
        self.scheduler
            .schedule_at(due + self.rules.blink_interval, TimerKind::Blink { epoch });
    }

    /// Shows or clears the proximity warning unless a locked message holds the
    /// line.
    fn update_proximity(&mut self) {
        if self.phase != Phase::Playing || self.message.locked() {
            return;
        }
        if self.level.as_ref().is_some_and(LevelState::trap_nearby) {
            self.message.show(MSG_TRAP_NEAR);
        } else {
            self.message.clear();
        }
    }
}
