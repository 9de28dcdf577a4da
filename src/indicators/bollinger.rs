/// Bollinger Bands series: middle SMA with upper/lower envelopes
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands for every point of a series
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * standard deviation)
/// Lower Band = Middle - (std_dev * standard deviation)
///
/// Uses the population standard deviation (divides by N).
pub fn calculate_bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    let mut bands = BollingerSeries {
        upper: vec![None; prices.len()],
        lower: vec![None; prices.len()],
        middle: vec![None; prices.len()],
    };
    if period == 0 || prices.len() < period {
        return bands;
    }

    for (i, window) in prices.windows(period).enumerate() {
        let idx = i + period - 1;
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|p| {
                let diff = p - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let width = std_dev * variance.sqrt();

        bands.middle[idx] = Some(mean);
        bands.upper[idx] = Some(mean + width);
        bands.lower[idx] = Some(mean - width);
    }

    bands
}
