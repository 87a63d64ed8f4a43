//! XP award service.
//!
//! Wraps the ledger port with the bonus rules. "Today" comes from the injected
//! clock so day boundaries are testable.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{XpCommand, XpLedgerRepository};
use crate::domain::service_support::map_ledger_error;
use crate::domain::{
    DAILY_LOGIN_BONUS_XP, DAILY_LOGIN_DESCRIPTION, DailyBonusOutcome, Error,
    REGISTRATION_BONUS_DESCRIPTION, REGISTRATION_BONUS_XP, TimeWindow, UserId, XpAward,
    XpAwardOutcome, level_for,
};

/// XP service implementing [`XpCommand`].
#[derive(Clone)]
pub struct XpService<L> {
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L> XpService<L> {
    /// Create a service over the ledger repository.
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }
}

fn log_level_up(user_id: &UserId, outcome: &XpAwardOutcome) {
    if outcome.leveled_up {
        info!(
            user_id = %user_id,
            new_level = outcome.new_level,
            total_xp = outcome.new_total_xp,
            "user leveled up"
        );
    }
}

#[async_trait]
impl<L> XpCommand for XpService<L>
where
    L: XpLedgerRepository,
{
    async fn award_xp(&self, award: XpAward) -> Result<XpAwardOutcome, Error> {
        let outcome = self
            .ledger
            .award(&award, self.clock.utc())
            .await
            .map_err(map_ledger_error)?;
        log_level_up(&award.user_id, &outcome);
        Ok(outcome)
    }

    async fn award_registration_bonus(&self, user_id: &UserId) -> Result<XpAwardOutcome, Error> {
        self.award_xp(XpAward::new(
            user_id.clone(),
            REGISTRATION_BONUS_XP,
            REGISTRATION_BONUS_DESCRIPTION,
        ))
        .await
    }

    async fn award_daily_login_bonus(&self, user_id: &UserId) -> Result<DailyBonusOutcome, Error> {
        let now = self.clock.utc();
        let award = XpAward::new(user_id.clone(), DAILY_LOGIN_BONUS_XP, DAILY_LOGIN_DESCRIPTION);
        let awarded = self
            .ledger
            .award_once_within(&award, TimeWindow::day_containing(now), now)
            .await
            .map_err(map_ledger_error)?;

        match awarded {
            Some(outcome) => {
                log_level_up(user_id, &outcome);
                Ok(DailyBonusOutcome {
                    awarded: true,
                    outcome,
                })
            }
            None => {
                let total = self
                    .ledger
                    .total_for_user(user_id)
                    .await
                    .map_err(map_ledger_error)?;
                Ok(DailyBonusOutcome {
                    awarded: false,
                    outcome: XpAwardOutcome::unchanged(total, level_for(total)),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "xp_service_tests.rs"]
mod tests;
