//! Simple Moving Average.
//!
//! Unweighted mean of the last `period` closes; the first (period - 1) bars
//! are invalid.

use crate::domain::indicator::{MaKind, MaPoint, MaSeries};
use crate::domain::series::PriceSeries;

pub fn calculate_sma(series: &PriceSeries, period: usize) -> MaSeries {
    let bars = series.bars();
    if period == 0 || bars.is_empty() {
        return MaSeries {
            kind: MaKind::Simple,
            period,
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }
        if i + 1 < period {
            values.push(MaPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        } else {
            values.push(MaPoint {
                date: bar.date,
                valid: true,
                value: window_sum / period as f64,
            });
        }
    }

    MaSeries {
        kind: MaKind::Simple,
        period,
        values,
    }
}
