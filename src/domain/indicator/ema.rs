//! Exponential Moving Average.
//!
//! k = 2/(period+1), seeded with the first close, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Valid from the first bar: the recursive
//! decay needs no warmup window.

use crate::domain::indicator::{MaKind, MaPoint, MaSeries};
use crate::domain::series::PriceSeries;

pub fn calculate_ema(series: &PriceSeries, period: usize) -> MaSeries {
    let bars = series.bars();
    if period == 0 || bars.is_empty() {
        return MaSeries {
            kind: MaKind::Exponential,
            period,
            values: Vec::new(),
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = bars[0].close;

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            ema = bar.close * k + ema * (1.0 - k);
        }
        values.push(MaPoint {
            date: bar.date,
            valid: true,
            value: ema,
        });
    }

    MaSeries {
        kind: MaKind::Exponential,
        period,
        values,
    }
}
