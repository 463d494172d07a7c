use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;

/// Rules fixed when a game is created.
///
/// The game type tag selects which rule set applies, so cash-only and
/// tournament-only fields never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Display symbol only; amounts carry no currency semantics.
    pub currency: String,
    pub buy_in: Chips,
    #[serde(flatten)]
    pub format: Format,
    #[serde(flatten)]
    pub table: TableRules,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gameType", rename_all = "camelCase")]
pub enum Format {
    Cash(CashRules),
    Tournament(TournamentRules),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashRules {
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Present exactly when rebuys are allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebuys: Option<RebuyRules>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuyRules {
    #[serde(flatten)]
    pub kind: RebuyKind,
    /// Zero means unlimited.
    #[serde(default)]
    pub max_rebuys_allowed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rebuyType", rename_all = "camelCase")]
pub enum RebuyKind {
    FixedRange {
        #[serde(rename = "minRebuy")]
        min: Chips,
        #[serde(rename = "maxRebuy")]
        max: Chips,
    },
    #[serde(rename = "percentageOfAverageStack")]
    Percentage {
        #[serde(rename = "rebuyPercent")]
        percent: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRules {
    pub starting_chips: Chips,
    pub level_duration_minutes: u32,
    pub starting_small_blind: Chips,
    pub starting_big_blind: Chips,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_registration: Option<LateRegistration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LateRegistration {
    ByMinutes(u32),
    ByLevel(u32),
}

/// House rules shown to players; they do not affect accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableRules {
    pub allow_straddle: bool,
    pub allow_run_it_twice: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::cash()
    }
}

impl Default for RebuyRules {
    fn default() -> Self {
        Self {
            kind: RebuyKind::fixed(),
            max_rebuys_allowed: REBUY_LIMIT,
        }
    }
}

impl Default for TournamentRules {
    fn default() -> Self {
        Self {
            starting_chips: STARTING_CHIPS,
            level_duration_minutes: LEVEL_MINUTES,
            starting_small_blind: STARTING_S_BLIND,
            starting_big_blind: STARTING_B_BLIND,
            late_registration: None,
        }
    }
}

impl GameSettings {
    /// Cash game with the configuration screen's preselected values.
    pub fn cash() -> Self {
        Self {
            currency: CURRENCY.to_string(),
            buy_in: CASH_BUY_IN,
            format: Format::Cash(CashRules {
                small_blind: CASH_S_BLIND,
                big_blind: CASH_B_BLIND,
                rebuys: Some(RebuyRules::default()),
            }),
            table: TableRules::default(),
            notes: String::new(),
        }
    }
    /// Tournament with the configuration screen's preselected values.
    pub fn tournament() -> Self {
        Self {
            currency: CURRENCY.to_string(),
            buy_in: TOURNAMENT_BUY_IN,
            format: Format::Tournament(TournamentRules::default()),
            table: TableRules::default(),
            notes: String::new(),
        }
    }
    pub fn with_buy_in(mut self, buy_in: Chips) -> Self {
        self.buy_in = buy_in;
        self
    }
    /// Replaces the rebuy rules of a cash game; no effect on tournaments.
    pub fn with_rebuys(mut self, rebuys: Option<RebuyRules>) -> Self {
        if let Format::Cash(ref mut cash) = self.format {
            cash.rebuys = rebuys;
        }
        self
    }
    pub fn game_type(&self) -> &'static str {
        match self.format {
            Format::Cash(_) => "cash",
            Format::Tournament(_) => "tournament",
        }
    }
    /// Rebuy rules, if this is a cash game that allows rebuys.
    pub fn rebuys(&self) -> Option<&RebuyRules> {
        match self.format {
            Format::Cash(ref cash) => cash.rebuys.as_ref(),
            Format::Tournament(_) => None,
        }
    }
    pub fn allows_rebuy(&self) -> bool {
        self.rebuys().is_some()
    }
    pub fn tournament_rules(&self) -> Option<&TournamentRules> {
        match self.format {
            Format::Tournament(ref rules) => Some(rules),
            Format::Cash(_) => None,
        }
    }
    /// Rejects settings no game could be run with.
    pub fn validate(&self) -> Result<(), SessionError> {
        let invalid = |s: &str| Err(SessionError::InvalidSettings(s.to_string()));
        if self.buy_in < 0 {
            return invalid("buy-in cannot be negative");
        }
        match self.format {
            Format::Cash(ref cash) => {
                if cash.small_blind <= 0 || cash.big_blind <= 0 {
                    return invalid("blinds must be positive");
                }
                if cash.small_blind > cash.big_blind {
                    return invalid("small blind exceeds big blind");
                }
                match cash.rebuys.as_ref().map(|r| r.kind) {
                    Some(RebuyKind::FixedRange { min, .. }) if min <= 0 => {
                        return invalid("minimum rebuy must be positive");
                    }
                    Some(RebuyKind::FixedRange { min, max }) if min > max => {
                        return invalid("minimum rebuy exceeds maximum rebuy");
                    }
                    Some(RebuyKind::Percentage { percent: 0 }) => {
                        return invalid("rebuy percentage must be positive");
                    }
                    _ => {}
                }
            }
            Format::Tournament(ref rules) => {
                if rules.starting_chips <= 0 {
                    return invalid("starting chips must be positive");
                }
                if rules.level_duration_minutes == 0 {
                    return invalid("level duration must be positive");
                }
                if rules.starting_small_blind <= 0 || rules.starting_big_blind <= 0 {
                    return invalid("blinds must be positive");
                }
                if rules.starting_small_blind > rules.starting_big_blind {
                    return invalid("small blind exceeds big blind");
                }
                match rules.late_registration {
                    Some(LateRegistration::ByMinutes(0)) | Some(LateRegistration::ByLevel(0)) => {
                        return invalid("late registration window must be positive");
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl RebuyRules {
    pub fn limit(&self) -> Option<u32> {
        (self.max_rebuys_allowed > 0).then_some(self.max_rebuys_allowed)
    }
}

impl RebuyKind {
    /// Fixed range with the default bounds.
    pub fn fixed() -> Self {
        Self::FixedRange {
            min: REBUY_MIN,
            max: REBUY_MAX,
        }
    }
    /// Full average stack.
    pub fn percentage() -> Self {
        Self::Percentage {
            percent: REBUY_PERCENT,
        }
    }
}

impl LateRegistration {
    pub fn minutes() -> Self {
        Self::ByMinutes(LATE_REG_MINUTES)
    }
    pub fn levels() -> Self {
        Self::ByLevel(LATE_REG_LEVEL)
    }
}

impl TournamentRules {
    /// Blind level in play after `elapsed` seconds, starting at 1.
    pub fn level(&self, elapsed: Seconds) -> u32 {
        let length = Seconds::from(self.level_duration_minutes.max(1)) * 60;
        u32::try_from(elapsed / length)
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }
    pub fn late_registration_open(&self, elapsed: Seconds) -> bool {
        match self.late_registration {
            None => false,
            Some(LateRegistration::ByMinutes(minutes)) => elapsed < Seconds::from(minutes) * 60,
            Some(LateRegistration::ByLevel(level)) => self.level(elapsed) <= level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_match_configuration_screen() {
        let cash = GameSettings::default();
        assert_eq!(cash.buy_in, 20);
        assert_eq!(cash.currency, "₪");
        let rebuys = cash.rebuys().unwrap();
        assert_eq!(rebuys.kind, RebuyKind::FixedRange { min: 10, max: 25 });
        assert_eq!(rebuys.limit(), Some(5));
        let tour = GameSettings::tournament();
        assert_eq!(tour.buy_in, 50);
        assert!(!tour.allows_rebuy());
        assert!(cash.validate().is_ok());
        assert!(tour.validate().is_ok());
    }
    #[test]
    fn unlimited_rebuys_have_no_limit() {
        let rules = RebuyRules {
            kind: RebuyKind::Percentage { percent: 50 },
            max_rebuys_allowed: 0,
        };
        assert_eq!(rules.limit(), None);
    }
    #[test]
    fn validation_catches_inverted_range() {
        let settings = GameSettings::cash().with_rebuys(Some(RebuyRules {
            kind: RebuyKind::FixedRange { min: 30, max: 10 },
            max_rebuys_allowed: 0,
        }));
        assert!(matches!(
            settings.validate(),
            Err(SessionError::InvalidSettings(_))
        ));
        assert!(GameSettings::cash().with_buy_in(-1).validate().is_err());
    }
    #[test]
    fn tournament_levels_advance_with_time() {
        let rules = TournamentRules::default();
        assert_eq!(rules.level(0), 1);
        assert_eq!(rules.level(15 * 60 - 1), 1);
        assert_eq!(rules.level(15 * 60), 2);
        assert_eq!(rules.level(46 * 60), 4);
    }
    #[test]
    fn late_registration_windows() {
        let minutes = TournamentRules {
            late_registration: Some(LateRegistration::minutes()),
            ..TournamentRules::default()
        };
        assert!(minutes.late_registration_open(19 * 60));
        assert!(!minutes.late_registration_open(20 * 60));
        let level = TournamentRules {
            late_registration: Some(LateRegistration::levels()),
            ..TournamentRules::default()
        };
        assert!(level.late_registration_open(29 * 60));
        assert!(!level.late_registration_open(30 * 60));
        assert!(!TournamentRules::default().late_registration_open(0));
    }
    #[test]
    fn settings_are_tagged_by_game_type() {
        let json = serde_json::to_value(GameSettings::cash()).unwrap();
        assert_eq!(json["gameType"], "cash");
        assert_eq!(json["rebuys"]["rebuyType"], "fixedRange");
        assert_eq!(json["rebuys"]["minRebuy"], 10);
        let parsed: GameSettings = serde_json::from_value(serde_json::json!({
            "currency": "$",
            "buyIn": 50,
            "gameType": "tournament",
            "startingChips": 10000,
            "levelDurationMinutes": 20,
            "startingSmallBlind": 50,
            "startingBigBlind": 100,
            "lateRegistration": { "byLevel": 3 },
            "allowStraddle": true
        }))
        .unwrap();
        assert_eq!(parsed.game_type(), "tournament");
        assert!(parsed.table.allow_straddle);
        assert_eq!(
            parsed.tournament_rules().unwrap().late_registration,
            Some(LateRegistration::ByLevel(3))
        );
    }
    #[test]
    fn percentage_rebuys_use_average_stack_tag() {
        let settings = GameSettings::cash().with_rebuys(Some(RebuyRules {
            kind: RebuyKind::percentage(),
            max_rebuys_allowed: 0,
        }));
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["rebuys"]["rebuyType"], "percentageOfAverageStack");
        assert_eq!(json["rebuys"]["rebuyPercent"], 100);
        let parsed: GameSettings = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, settings);
    }
}
