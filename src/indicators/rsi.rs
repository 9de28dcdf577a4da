/// Calculate the Relative Strength Index (RSI) for every point of a series
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Gains and losses are smoothed with Wilder's recursion
/// (`avg = avg_prev + (x - avg_prev) / period`), seeded from the first point.
/// The first point has no predecessor and counts as an unchanged close.
/// Values before index `period - 1` are `None`.
///
/// When the average loss is zero the RSI is 100.
pub fn calculate_rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; prices.len()];
    if period == 0 {
        return values;
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 0..prices.len() {
        let change = if i == 0 { 0.0 } else { prices[i] - prices[i - 1] };
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain += (gain - avg_gain) * alpha;
            avg_loss += (loss - avg_loss) * alpha;
        }

        if i + 1 >= period {
            values[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
