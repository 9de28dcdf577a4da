/// Simple Moving Average (SMA) for every point of a series
///
/// Values before index `period - 1` are `None`.
pub fn calculate_sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    for (i, window) in prices.windows(period).enumerate() {
        let sum: f64 = window.iter().sum();
        values[i + period - 1] = Some(sum / period as f64);
    }

    values
}

/// Exponential Moving Average (EMA) for every point of a series
///
/// Multiplier `2 / (period + 1)`. The first defined value, at index
/// `period - 1`, is the SMA of the first `period` prices.
pub fn calculate_ema_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Start with SMA
    let mut ema = prices[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(ema);

    for (i, price) in prices.iter().enumerate().skip(period) {
        ema = (price - ema) * multiplier + ema;
        values[i] = Some(ema);
    }

    values
}
