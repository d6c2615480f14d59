//! Black-Scholes option pricing.
//!
//! European closed form under lognormal diffusion. The cumulative normal is
//! built on the Abramowitz & Stegun 7.1.26 polynomial erf approximation,
//! absolute error <= 1.5e-7; expected test values were validated against
//! standard references under that approximation.

use serde::Serialize;

use super::error::MatraderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionKind {
    Call,
    Put,
}

/// Price a European option.
///
/// `expiry` is in years, `rate` and `volatility` annualized. Fails when
/// spot, strike, expiry, or volatility is non-positive; the rate may be
/// zero or negative.
pub fn black_scholes(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    volatility: f64,
    kind: OptionKind,
) -> Result<f64, MatraderError> {
    for (parameter, value) in [
        ("spot", spot),
        ("strike", strike),
        ("expiry", expiry),
        ("volatility", volatility),
    ] {
        if value <= 0.0 || !value.is_finite() {
            return Err(MatraderError::Domain { parameter, value });
        }
    }

    let sqrt_t = expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * expiry)
        / (volatility * sqrt_t);
    let d2 = d1 - volatility * sqrt_t;
    let discount = (-rate * expiry).exp();

    let price = match kind {
        OptionKind::Call => spot * normal_cdf(d1) - strike * discount * normal_cdf(d2),
        OptionKind::Put => strike * discount * normal_cdf(-d2) - spot * normal_cdf(-d1),
    };
    Ok(price)
}

/// Standard normal CDF via erf: Phi(x) = (1 + erf(x/sqrt(2))) / 2.
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26, |error| <= 1.5e-7.
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = x.signum();
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
