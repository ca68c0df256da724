//! Single-zero roulette with a colour call and a number call on every ticket.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{ROULETTE_COLOR_PAYOUT, ROULETTE_NUMBER_PAYOUT, ROULETTE_POCKETS};
use crate::error::CasinoError;
use crate::wallet::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PocketColor {
    Red,
    Black,
    Green,
}

impl PocketColor {
    const CYCLE: [Self; 3] = [Self::Red, Self::Black, Self::Green];

    /// Colours repeat red, black, green around the wheel starting at pocket 0.
    #[must_use]
    pub const fn of_pocket(pocket: u8) -> Self {
        Self::CYCLE[(pocket % 3) as usize]
    }
}

/// A wager on one colour and one pocket number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouletteTicket {
    pub wager: u64,
    pub color: PocketColor,
    pub number: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouletteWin {
    Color,
    Number,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouletteOutcome {
    pub pocket: u8,
    pub color: PocketColor,
    pub win: RouletteWin,
    pub payout: u64,
}

/// Price a ticket against a landed pocket. A colour hit takes precedence.
#[must_use]
pub fn settle(ticket: &RouletteTicket, pocket: u8) -> RouletteOutcome {
    let color = PocketColor::of_pocket(pocket);
    let (win, payout) = if color == ticket.color {
        (
            RouletteWin::Color,
            ticket.wager.saturating_mul(ROULETTE_COLOR_PAYOUT),
        )
    } else if pocket == ticket.number {
        (
            RouletteWin::Number,
            ticket.wager.saturating_mul(ROULETTE_NUMBER_PAYOUT),
        )
    } else {
        (RouletteWin::Lost, 0)
    };
    RouletteOutcome {
        pocket,
        color,
        win,
        payout,
    }
}

/// Debit the ticket, spin, and credit any winnings.
///
/// # Errors
///
/// Returns [`CasinoError::ZeroWager`], [`CasinoError::InvalidPocket`] for a
/// number off the wheel, or [`CasinoError::InsufficientEggs`].
pub fn play_roulette<R: Rng + ?Sized>(
    ticket: &RouletteTicket,
    wallet: &mut Wallet,
    rng: &mut R,
) -> Result<RouletteOutcome, CasinoError> {
    if ticket.wager == 0 {
        return Err(CasinoError::ZeroWager);
    }
    if ticket.number >= ROULETTE_POCKETS {
        return Err(CasinoError::InvalidPocket {
            number: ticket.number,
            pockets: ROULETTE_POCKETS,
        });
    }
    wallet.debit(ticket.wager)?;
    let pocket = rng.gen_range(0..ROULETTE_POCKETS);
    let outcome = settle(ticket, pocket);
    wallet.credit(outcome.payout);
    log::debug!(
        "roulette landed {pocket} ({:?}) -> {:?}, payout {}",
        outcome.color,
        outcome.win,
        outcome.payout
    );
    Ok(outcome)
}
