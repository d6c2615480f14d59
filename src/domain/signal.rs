//! Crossover signal generation.
//!
//! A bar is Long when the fast average strictly exceeds the slow average,
//! Flat otherwise (ties are Flat), and undefined while either average is
//! still warming up. Crossover events are the first difference of the
//! defined-signal sequence: a bar whose signal differs from the previous
//! defined signal emits one event. The first defined signal never emits.

use super::error::MatraderError;
use super::indicator::{self, MaKind, MaSeries};
use super::series::PriceSeries;

/// Per-bar signal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Long,
    Flat,
}

/// Direction of a crossover event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossDirection {
    BuyCross,
    SellCross,
}

/// A signal transition at a bar index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverEvent {
    pub index: usize,
    pub direction: CrossDirection,
}

/// Validated crossover-strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalConfig {
    fast_period: usize,
    slow_period: usize,
    kind: MaKind,
}

impl SignalConfig {
    /// Fails unless 1 <= fast_period < slow_period.
    pub fn new(fast_period: usize, slow_period: usize, kind: MaKind) -> Result<Self, MatraderError> {
        if fast_period < 1 || slow_period < 1 {
            return Err(MatraderError::Configuration {
                reason: format!(
                    "periods must be at least 1, got fast {fast_period} slow {slow_period}"
                ),
            });
        }
        if fast_period >= slow_period {
            return Err(MatraderError::Configuration {
                reason: format!(
                    "fast_period {fast_period} must be less than slow_period {slow_period}"
                ),
            });
        }
        Ok(Self {
            fast_period,
            slow_period,
            kind,
        })
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    pub fn kind(&self) -> MaKind {
        self.kind
    }
}

/// Both moving averages plus the per-bar signal, aligned to the input index.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub fast: MaSeries,
    pub slow: MaSeries,
    pub signals: Vec<Option<SignalState>>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Lazy, restartable event stream. A pure function of the series: every
    /// call yields the identical sequence, in ascending index order.
    pub fn crossovers(&self) -> impl Iterator<Item = CrossoverEvent> + '_ {
        self.signals
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| match (pair[0], pair[1]) {
                (Some(prev), Some(curr)) if prev != curr => Some(CrossoverEvent {
                    index: i + 1,
                    direction: if curr == SignalState::Long {
                        CrossDirection::BuyCross
                    } else {
                        CrossDirection::SellCross
                    },
                }),
                _ => None,
            })
    }
}

/// Compute both averages and the per-bar signal for a series.
pub fn generate_signals(series: &PriceSeries, config: &SignalConfig) -> SignalSeries {
    let fast = indicator::calculate(config.kind, series, config.fast_period);
    let slow = indicator::calculate(config.kind, series, config.slow_period);

    let signals = (0..series.len())
        .map(|i| match (fast.value_at(i), slow.value_at(i)) {
            (Some(f), Some(s)) => Some(if f > s {
                SignalState::Long
            } else {
                SignalState::Flat
            }),
            _ => None,
        })
        .collect();

    SignalSeries {
        fast,
        slow,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PriceBar;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                close,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn config_rejects_fast_ge_slow() {
        assert!(SignalConfig::new(3, 3, MaKind::Simple).is_err());
        assert!(SignalConfig::new(5, 3, MaKind::Simple).is_err());
        assert!(SignalConfig::new(2, 3, MaKind::Simple).is_ok());
    }

    #[test]
    fn config_rejects_zero_period() {
        assert!(SignalConfig::new(0, 3, MaKind::Simple).is_err());
        assert!(SignalConfig::new(1, 0, MaKind::Simple).is_err());
    }

    #[test]
    fn signal_undefined_during_warmup() {
        let series = make_series(&[10.0, 12.0, 8.0, 14.0, 9.0, 15.0]);
        let config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &config);

        assert_eq!(signals.signals[0], None);
        assert_eq!(signals.signals[1], None);
        assert!(signals.signals[2].is_some());
    }

    #[test]
    fn hand_computed_crossovers() {
        // fast = [-, 11, 10, 11, 11.5, 12], slow = [-, -, 10, 34/3, 31/3, 38/3]
        // signal: Flat, Flat, Long, Flat from index 2
        let series = make_series(&[10.0, 12.0, 8.0, 14.0, 9.0, 15.0]);
        let config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &config);

        assert_eq!(signals.signals[2], Some(SignalState::Flat));
        assert_eq!(signals.signals[3], Some(SignalState::Flat));
        assert_eq!(signals.signals[4], Some(SignalState::Long));
        assert_eq!(signals.signals[5], Some(SignalState::Flat));

        let events: Vec<CrossoverEvent> = signals.crossovers().collect();
        assert_eq!(
            events,
            vec![
                CrossoverEvent {
                    index: 4,
                    direction: CrossDirection::BuyCross,
                },
                CrossoverEvent {
                    index: 5,
                    direction: CrossDirection::SellCross,
                },
            ]
        );
    }

    #[test]
    fn ties_are_flat_and_never_cross() {
        let series = make_series(&[10.0; 6]);
        let config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &config);

        for signal in signals.signals.iter().skip(2) {
            assert_eq!(*signal, Some(SignalState::Flat));
        }
        assert_eq!(signals.crossovers().count(), 0);
    }

    #[test]
    fn first_defined_signal_does_not_cross() {
        // fast above slow on the first defined bar: no event may fire there
        let series = make_series(&[10.0, 10.0, 20.0, 20.0]);
        let config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &config);

        assert_eq!(signals.signals[2], Some(SignalState::Long));
        let events: Vec<CrossoverEvent> = signals.crossovers().collect();
        assert!(events.iter().all(|e| e.index != 2));
    }

    #[test]
    fn crossovers_are_restartable() {
        let series = make_series(&[10.0, 12.0, 8.0, 14.0, 9.0, 15.0]);
        let config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &config);

        let first: Vec<CrossoverEvent> = signals.crossovers().collect();
        let second: Vec<CrossoverEvent> = signals.crossovers().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn exponential_signals_defined_from_start() {
        let series = make_series(&[10.0, 12.0, 8.0, 14.0]);
        let config = SignalConfig::new(2, 3, MaKind::Exponential).unwrap();
        let signals = generate_signals(&series, &config);

        assert!(signals.signals.iter().all(|s| s.is_some()));
    }

    #[test]
    fn empty_series_yields_no_signals() {
        let series = make_series(&[]);
        let config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &config);

        assert!(signals.is_empty());
        assert_eq!(signals.crossovers().count(), 0);
    }
}
