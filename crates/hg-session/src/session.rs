use super::*;
use hg_core::*;

/// State machine for one game, from seating to confirmed results.
///
/// Every operation checks all of its preconditions before touching any
/// state, so a rejected call leaves the session exactly as it was. The
/// `check_*` methods expose those checks on their own, letting a caller
/// validate, persist elsewhere, and only then apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    game: Game,
    ledger: Ledger,
    lifecycle: Lifecycle,
}

impl GameSession {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            ledger: Ledger::default(),
            lifecycle: Lifecycle::Pending,
        }
    }
    pub fn game(&self) -> &Game {
        &self.game
    }
    pub fn settings(&self) -> &GameSettings {
        self.game.settings()
    }
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }
    pub fn status(&self) -> Status {
        self.phase().status()
    }
    pub fn is_locked(&self) -> bool {
        self.phase().is_locked()
    }
    pub fn started(&self) -> Option<Timestamp> {
        self.lifecycle.started()
    }
    pub fn duration(&self) -> Option<Seconds> {
        self.lifecycle.duration()
    }
    pub fn elapsed(&self, now: Timestamp) -> Seconds {
        self.lifecycle.elapsed(now)
    }
    /// Candidate results while settling, confirmed results once finished.
    pub fn settlement(&self) -> Option<&Settlement> {
        self.lifecycle.settlement()
    }
    /// Confirmed results; only present once the game is finished.
    pub fn results(&self) -> Option<&[Standing]> {
        match self.lifecycle {
            Lifecycle::Finished { ref settlement, .. } => Some(settlement.standings()),
            _ => None,
        }
    }
}

/// Status transitions.
impl GameSession {
    pub fn check_start(&self) -> Result<(), SessionError> {
        match self.lifecycle {
            Lifecycle::Pending => Ok(()),
            _ => Err(SessionError::IllegalTransition {
                from: self.phase(),
                to: Status::Active,
            }),
        }
    }
    /// Pending to active; the start instant anchors all elapsed time.
    pub fn start(&mut self, at: Timestamp) -> Result<(), SessionError> {
        self.check_start()?;
        self.lifecycle = Lifecycle::Active { started: at };
        log::info!("[game {}] started", self.game.id());
        Ok(())
    }
    /// Validates a requested status change. Only `pending → active` and
    /// `settling → finished` are legal; finishing an active game needs a
    /// locked settlement first.
    pub fn check_status(&self, to: Status) -> Result<(), SessionError> {
        match (self.phase(), to) {
            (Phase::Pending, Status::Active) => Ok(()),
            (Phase::Settling, Status::Finished) => Ok(()),
            (Phase::Active, Status::Finished) => Err(SessionError::NotLocked),
            (from, to) => Err(SessionError::IllegalTransition { from, to }),
        }
    }
    /// Applies a requested status change.
    pub fn transition(&mut self, to: Status, at: Timestamp) -> Result<(), SessionError> {
        self.check_status(to)?;
        match to {
            Status::Active => self.start(at),
            Status::Finished => self.confirm(at).map(|_| ()),
            Status::Pending => Err(SessionError::IllegalTransition {
                from: self.phase(),
                to,
            }),
        }
    }
    pub fn check_confirm(&self) -> Result<(), SessionError> {
        self.check_status(Status::Finished)
    }
    /// Settling to finished. Freezes the duration at `at - startedAt`.
    pub fn confirm(&mut self, at: Timestamp) -> Result<&Settlement, SessionError> {
        self.check_confirm()?;
        self.lifecycle = match std::mem::take(&mut self.lifecycle) {
            Lifecycle::Settling {
                started,
                settlement,
            } => Lifecycle::Finished {
                started,
                duration: elapsed(started, at),
                settlement,
            },
            other => other,
        };
        log::info!(
            "[game {}] finished after {}",
            self.game.id(),
            hms(self.elapsed(at))
        );
        self.settlement().ok_or(SessionError::NotLocked)
    }
    /// Settling back to active, discarding the candidate results.
    pub fn reopen(&mut self) -> Result<(), SessionError> {
        match self.lifecycle {
            Lifecycle::Settling { started, .. } => {
                self.lifecycle = Lifecycle::Active { started };
                log::info!("[game {}] settlement discarded", self.game.id());
                Ok(())
            }
            Lifecycle::Active { .. } => Err(SessionError::NotLocked),
            _ => Err(SessionError::NotActive(self.phase())),
        }
    }
}

/// Rebuys.
impl GameSession {
    /// Checks a rebuy in rule order; the first failing rule is reported.
    pub fn check_rebuy(&self, player: ID<Player>, amount: Chips) -> Result<(), SessionError> {
        match self.lifecycle {
            Lifecycle::Active { .. } => {}
            Lifecycle::Settling { .. } => return Err(SessionError::Locked),
            _ => return Err(SessionError::NotActive(self.phase())),
        }
        let rules = self
            .settings()
            .rebuys()
            .ok_or(SessionError::RebuysDisabled)?;
        if !self.game.seats(player) {
            return Err(SessionError::UnknownPlayer(player));
        }
        if let Some(limit) = rules.limit() {
            if self.ledger.tally(player).count() >= limit {
                return Err(SessionError::RebuyLimit { player, limit });
            }
        }
        if let RebuyKind::FixedRange { min, max } = rules.kind {
            if amount < min || amount > max {
                return Err(SessionError::RebuyOutOfRange { amount, min, max });
            }
        }
        if amount <= 0 {
            return Err(SessionError::NonPositiveRebuy(amount));
        }
        match self.pot().and_then(|pot| pot.checked_add(amount)) {
            Some(_) => Ok(()),
            None => Err(SessionError::AmountTooLarge(amount)),
        }
    }
    /// Appends an already-identified rebuy event after checking it.
    pub fn record(&mut self, rebuy: Rebuy) -> Result<(), SessionError> {
        self.check_rebuy(rebuy.player(), rebuy.amount())?;
        log::debug!(
            "[game {}] rebuy {} for {} at +{}s",
            self.game.id(),
            rebuy.amount(),
            rebuy.player(),
            rebuy.offset()
        );
        self.ledger.record(rebuy)
    }
    /// Records a rebuy stamped with the current elapsed time.
    pub fn rebuy(
        &mut self,
        player: ID<Player>,
        amount: Chips,
        now: Timestamp,
    ) -> Result<Rebuy, SessionError> {
        let rebuy = Rebuy::new(ID::default(), player, amount, self.elapsed(now));
        self.record(rebuy.clone())?;
        Ok(rebuy)
    }
    /// Amount to prefill when opening the rebuy input.
    ///
    /// Fixed-range games suggest the minimum. Percentage games suggest
    /// `floor(average * percent / 100)` where the average stack counts
    /// every buy-in and every rebuy recorded so far.
    pub fn suggest(&self) -> Result<Chips, SessionError> {
        let rules = self
            .settings()
            .rebuys()
            .ok_or(SessionError::RebuysDisabled)?;
        match rules.kind {
            RebuyKind::FixedRange { min, .. } => Ok(min),
            RebuyKind::Percentage { percent } => {
                let pot = self
                    .pot()
                    .ok_or(SessionError::AmountTooLarge(self.ledger.total()))?;
                let n = self.game.players().len() as i128;
                let amount = i128::from(pot) * i128::from(percent) / (100 * n);
                Chips::try_from(amount).map_err(|_| SessionError::AmountTooLarge(pot))
            }
        }
    }
    /// Everything paid in so far: every buy-in plus every rebuy.
    /// `None` if the total does not fit in [`Chips`].
    pub fn pot(&self) -> Option<Chips> {
        Chips::try_from(self.game.players().len())
            .ok()?
            .checked_mul(self.settings().buy_in)?
            .checked_add(self.ledger.total())
    }
}

/// Settlement.
impl GameSession {
    /// Computes candidate results without locking them.
    pub fn reconcile(&self, stacks: &Stacks) -> Result<Settlement, SessionError> {
        match self.lifecycle {
            Lifecycle::Active { .. } => Settlement::reconcile(&self.game, &self.ledger, stacks),
            Lifecycle::Settling { .. } => Err(SessionError::Locked),
            _ => Err(SessionError::NotActive(self.phase())),
        }
    }
    /// Active to settling: reconciles and locks the candidate results.
    /// On failure the game stays active and unlocked.
    pub fn settle(&mut self, stacks: &Stacks) -> Result<&Settlement, SessionError> {
        let settlement = self.reconcile(stacks)?;
        if let Lifecycle::Active { started } = self.lifecycle {
            self.lifecycle = Lifecycle::Settling {
                started,
                settlement,
            };
            log::info!("[game {}] settlement locked", self.game.id());
        }
        self.settlement().ok_or(SessionError::NotLocked)
    }
}

/// Tournament clock.
impl GameSession {
    /// Current blind level, for tournaments that have started.
    pub fn level(&self, now: Timestamp) -> Option<u32> {
        self.started()?;
        self.settings()
            .tournament_rules()
            .map(|rules| rules.level(self.elapsed(now)))
    }
    pub fn late_registration_open(&self, now: Timestamp) -> bool {
        self.started().is_some()
            && self.status() == Status::Active
            && self
                .settings()
                .tournament_rules()
                .is_some_and(|rules| rules.late_registration_open(self.elapsed(now)))
    }
}
