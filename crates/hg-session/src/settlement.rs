use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Final chip counts reported by the operator, keyed by player.
pub type Stacks = BTreeMap<ID<Player>, Chips>;

/// One player's line in the final results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    #[serde(rename = "playerId")]
    player: ID<Player>,
    money_in: Chips,
    money_out: Chips,
    profit: Chips,
}

impl Standing {
    pub fn new(player: ID<Player>, money_in: Chips, money_out: Chips) -> Self {
        Self {
            player,
            money_in,
            money_out,
            profit: money_out - money_in,
        }
    }
    pub fn player(&self) -> ID<Player> {
        self.player
    }
    pub fn money_in(&self) -> Chips {
        self.money_in
    }
    pub fn money_out(&self) -> Chips {
        self.money_out
    }
    pub fn profit(&self) -> Chips {
        self.profit
    }
}

/// Results that passed the chip-conservation check, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    standings: Vec<Standing>,
}

impl Settlement {
    /// Reconciles final stacks against everything paid in.
    ///
    /// Every seated player needs a non-negative stack, and stacks must sum
    /// exactly to buy-ins plus rebuys. The table is a closed system, so
    /// there is no tolerance.
    pub fn reconcile(game: &Game, ledger: &Ledger, stacks: &Stacks) -> Result<Self, SessionError> {
        if let Some(stranger) = stacks.keys().find(|p| !game.seats(**p)) {
            return Err(SessionError::UnknownPlayer(*stranger));
        }
        let buy_in = game.settings().buy_in;
        let mut standings = Vec::with_capacity(game.players().len());
        for player in game.players().iter().map(|p| p.id()) {
            let stack = *stacks
                .get(&player)
                .ok_or(SessionError::MissingStack(player))?;
            if stack < 0 {
                return Err(SessionError::NegativeStack { player, stack });
            }
            let money_in = ledger
                .money_in(player, buy_in)
                .ok_or(SessionError::AmountTooLarge(buy_in))?;
            standings.push(Standing::new(player, money_in, stack));
        }
        let actual = sum(standings.iter().map(Standing::money_out))?;
        let expected = sum(standings.iter().map(Standing::money_in))?;
        if actual != expected {
            log::debug!("reconcile rejected: {} out vs {} in", actual, expected);
            return Err(SessionError::ChipMismatch { expected, actual });
        }
        Ok(Self { standings })
    }
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }
    /// Chips paid out, equal to chips paid in.
    pub fn total(&self) -> Chips {
        self.standings.iter().map(Standing::money_out).sum()
    }
}

/// Sums amounts, rejecting the first one that overflows the running total.
fn sum(mut amounts: impl Iterator<Item = Chips>) -> Result<Chips, SessionError> {
    amounts.try_fold(0 as Chips, |total, amount| {
        total
            .checked_add(amount)
            .ok_or(SessionError::AmountTooLarge(amount))
    })
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    impl Schema for Standing {
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                RESULTS,
                " (
                    game_id     UUID NOT NULL REFERENCES ",
                GAMES,
                "(id),
                    player_id   UUID NOT NULL,
                    seat        SMALLINT NOT NULL,
                    money_in    BIGINT NOT NULL,
                    money_out   BIGINT NOT NULL,
                    profit      BIGINT NOT NULL,
                    PRIMARY KEY (game_id, player_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_results_player ON ",
                RESULTS,
                " (player_id);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn game(buy_in: Chips, n: usize) -> Game {
        let players = (0..n)
            .map(|i| Player::new(ID::default(), format!("p{}", i)))
            .collect();
        Game::new(
            ID::default(),
            ID::default(),
            ID::default(),
            0,
            GameSettings::cash().with_buy_in(buy_in),
            players,
        )
        .unwrap()
    }
    fn stacks(game: &Game, chips: &[Chips]) -> Stacks {
        game.players()
            .iter()
            .map(|p| p.id())
            .zip(chips.iter().copied())
            .collect()
    }
    #[test]
    fn balanced_stacks_settle() {
        let game = game(20, 2);
        let ref stacks = stacks(&game, &[25, 15]);
        let settlement = Settlement::reconcile(&game, &Ledger::default(), stacks).unwrap();
        let profits = settlement
            .standings()
            .iter()
            .map(Standing::profit)
            .collect::<Vec<_>>();
        assert_eq!(profits, vec![5, -5]);
        assert_eq!(settlement.total(), 40);
    }
    #[test]
    fn short_stacks_report_mismatch() {
        let game = game(20, 2);
        let ref stacks = stacks(&game, &[25, 14]);
        assert_eq!(
            Settlement::reconcile(&game, &Ledger::default(), stacks),
            Err(SessionError::ChipMismatch {
                expected: 40,
                actual: 39
            })
        );
    }
    #[test]
    fn rebuys_count_toward_money_in() {
        let game = game(20, 3);
        let rebuyer = game.players()[2].id();
        let ledger = Ledger::try_from(vec![
            Rebuy::new(ID::default(), rebuyer, 10, 60),
            Rebuy::new(ID::default(), rebuyer, 25, 120),
        ])
        .unwrap();
        let ref stacks = stacks(&game, &[0, 50, 45]);
        let settlement = Settlement::reconcile(&game, &ledger, stacks).unwrap();
        let standing = &settlement.standings()[2];
        assert_eq!(standing.money_in(), 55);
        assert_eq!(standing.profit(), -10);
        assert_eq!(
            settlement
                .standings()
                .iter()
                .map(Standing::profit)
                .sum::<Chips>(),
            0
        );
    }
    #[test]
    fn every_player_needs_a_stack() {
        let game = game(20, 2);
        let mut stacks = stacks(&game, &[40, 0]);
        let missing = game.players()[1].id();
        stacks.remove(&missing);
        assert_eq!(
            Settlement::reconcile(&game, &Ledger::default(), &stacks),
            Err(SessionError::MissingStack(missing))
        );
    }
    #[test]
    fn negative_and_foreign_stacks_rejected() {
        let game = game(20, 2);
        let ref negative = stacks(&game, &[45, -5]);
        assert!(matches!(
            Settlement::reconcile(&game, &Ledger::default(), negative),
            Err(SessionError::NegativeStack { stack: -5, .. })
        ));
        let mut foreign = stacks(&game, &[20, 20]);
        foreign.insert(ID::default(), 0);
        assert!(matches!(
            Settlement::reconcile(&game, &Ledger::default(), &foreign),
            Err(SessionError::UnknownPlayer(_))
        ));
    }
    #[test]
    fn oversized_stacks_cannot_balance_the_books() {
        let game = game(20, 3);
        let ref oversized = stacks(&game, &[Chips::MAX, Chips::MAX, 62]);
        assert_eq!(
            Settlement::reconcile(&game, &Ledger::default(), oversized),
            Err(SessionError::AmountTooLarge(Chips::MAX))
        );
        let ref huge = stacks(&game, &[Chips::MAX, 0, 0]);
        assert_eq!(
            Settlement::reconcile(&game, &Ledger::default(), huge),
            Err(SessionError::ChipMismatch {
                expected: 60,
                actual: Chips::MAX
            })
        );
    }
}
