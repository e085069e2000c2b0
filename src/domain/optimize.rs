//! Entry/exit timing search.
//!
//! [`minimize_bounded`] is Brent's method for a scalar function on a closed
//! interval: golden-section steps, accelerated by parabolic interpolation
//! when the last three points allow it.

use crate::domain::error::AuctionPnlError;
use crate::domain::pnl::{all_trades, TradeBook};
use crate::domain::spread::SpreadSeries;
use crate::domain::window::WindowSpec;
use chrono::NaiveDateTime;
use tracing::info;

/// Default search range for the holding period, in days.
pub const ENTRY_DAY_BOUNDS: (f64, f64) = (1.0, 20.0);

#[derive(Debug, Clone, Copy)]
pub struct MinimizeConfig {
    /// Absolute tolerance on x.
    pub x_tolerance: f64,
    /// Maximum number of function evaluations.
    pub max_evaluations: u32,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            x_tolerance: 1e-5,
            max_evaluations: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
    pub evaluations: u32,
    pub converged: bool,
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Minimises `f` on `[lower, upper]`.
pub fn minimize_bounded<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    config: &MinimizeConfig,
) -> Result<Minimum, AuctionPnlError>
where
    F: FnMut(f64) -> f64,
{
    if !lower.is_finite() || !upper.is_finite() {
        return Err(AuctionPnlError::Optimization {
            reason: format!("bounds must be finite, got [{lower}, {upper}]"),
        });
    }
    if lower > upper {
        return Err(AuctionPnlError::Optimization {
            reason: format!("lower bound {lower} exceeds upper bound {upper}"),
        });
    }
    if config.x_tolerance <= 0.0 || config.max_evaluations == 0 {
        return Err(AuctionPnlError::Optimization {
            reason: "tolerance and evaluation budget must be positive".into(),
        });
    }

    let sqrt_eps = f64::EPSILON.sqrt();
    let golden_mean = 0.5 * (3.0 - 5.0_f64.sqrt());

    let (mut a, mut b) = (lower, upper);
    let mut fulc = a + golden_mean * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat = 0.0_f64;
    let mut e = 0.0_f64;

    let mut fx = f(xf);
    let mut evaluations = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + config.x_tolerance / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;

        if e.abs() > tol1 {
            golden = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    let si = sign(xm - xf) + if xm == xf { 1.0 } else { 0.0 };
                    rat = tol1 * si;
                }
            } else {
                golden = true;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden_mean * e;
        }

        let si = sign(rat) + if rat == 0.0 { 1.0 } else { 0.0 };
        let x = xf + si * rat.abs().max(tol1);
        let fu = f(x);
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + config.x_tolerance / 3.0;
        tol2 = 2.0 * tol1;

        if evaluations >= config.max_evaluations {
            converged = false;
            break;
        }
    }

    if !fx.is_finite() {
        return Err(AuctionPnlError::Optimization {
            reason: format!("objective is not finite at x = {xf}"),
        });
    }

    Ok(Minimum {
        x: xf,
        value: fx,
        evaluations,
        converged,
    })
}

/// Best holding period(s) found by [`optimize_entry_time`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryTiming {
    /// Same number of days on both sides of the auction.
    Symmetric { days: f64, pnl: f64 },
    /// Each leg optimised on its own.
    Asymmetric {
        days_before: f64,
        pnl_before: f64,
        days_after: f64,
        pnl_after: f64,
    },
}

fn book_for(
    series: &SpreadSeries,
    auctions: &[NaiveDateTime],
    days: f64,
    multiplier: f64,
) -> TradeBook {
    // every n inside validated bounds is a valid window length
    let spec = WindowSpec {
        days_before: days,
        days_after: days,
    };
    all_trades(series, auctions, spec, multiplier)
}

/// Both ends of the search must themselves be valid holding periods.
fn check_bounds(lower: f64, upper: f64) -> Result<(), AuctionPnlError> {
    WindowSpec::new(lower, upper).map_err(|e| AuctionPnlError::Optimization {
        reason: format!("search bounds [{lower}, {upper}] are not valid window lengths: {e}"),
    })?;
    Ok(())
}

/// Searches `bounds` for the holding period that maximises total PnL.
///
/// With `symmetric`, one `n` is used before and after the auction. Otherwise
/// the pre-auction PnL is maximised over `days_before` and the post-auction
/// PnL over `days_after`, independently.
pub fn optimize_entry_time(
    series: &SpreadSeries,
    auctions: &[NaiveDateTime],
    symmetric: bool,
    multiplier: f64,
    bounds: (f64, f64),
    config: &MinimizeConfig,
) -> Result<EntryTiming, AuctionPnlError> {
    if auctions.is_empty() {
        return Err(AuctionPnlError::NoAuctions);
    }
    let (lower, upper) = bounds;
    check_bounds(lower, upper)?;

    if symmetric {
        let best = minimize_bounded(
            |n| -book_for(series, auctions, n, multiplier).total(),
            lower,
            upper,
            config,
        )?;
        let pnl = -best.value;
        info!(
            "Optimal entry/exit time: {:.2} days before/after the auction. PnL: ${:.2}",
            best.x, pnl
        );
        return Ok(EntryTiming::Symmetric { days: best.x, pnl });
    }

    let pre = minimize_bounded(
        |n| -book_for(series, auctions, n, multiplier).total_pre(),
        lower,
        upper,
        config,
    )?;
    let post = minimize_bounded(
        |n| -book_for(series, auctions, n, multiplier).total_post(),
        lower,
        upper,
        config,
    )?;
    info!(
        "Optimal entry/exit time: {:.2} days before the auction and {:.2} days after the auction. \
         PnL before auction: ${:.2}. PnL after auction: ${:.2}.",
        pre.x, post.x, -pre.value, -post.value
    );

    Ok(EntryTiming::Asymmetric {
        days_before: pre.x,
        pnl_before: -pre.value,
        days_after: post.x,
        pnl_after: -post.value,
    })
}
