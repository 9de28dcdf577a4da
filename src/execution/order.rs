use crate::error::RotabotError;
use crate::models::TradeSide;
use crate::Result;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Market order ready to hand to an executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub usd_amount: f64,
    pub profit: Option<f64>,
}

impl TradeOrder {
    pub fn summary(&self) -> String {
        let mut message = format!(
            "Order: {:?} {} {} (≈ ${:.2})",
            self.side, self.quantity, self.symbol, self.usd_amount
        );
        if let Some(profit) = self.profit {
            message.push_str(&format!(", profit ${:.2}", profit));
        }
        message
    }
}

/// Orders that carry out one cycle's decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderPlan {
    /// Sell the held asset and buy the target with the proceeds
    Rotate { sell: TradeOrder, buy: TradeOrder },
    /// Sell the held asset into the quote asset
    ExitToCash { sell: TradeOrder },
}

impl OrderPlan {
    pub fn orders(&self) -> Vec<&TradeOrder> {
        match self {
            Self::Rotate { sell, buy } => vec![sell, buy],
            Self::ExitToCash { sell } => vec![sell],
        }
    }
}

/// What the held position is worth right now
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValuation {
    pub asset: String,
    pub balance: f64,
    pub spot_price: f64,
    pub entry_price: f64,
}

impl HoldingValuation {
    pub fn value(&self) -> f64 {
        self.balance * self.spot_price
    }

    /// Gain against what the balance cost at entry
    pub fn profit(&self) -> f64 {
        self.value() - self.entry_price * self.balance
    }
}

/// Builds orders for the full held balance
#[derive(Debug, Clone)]
pub struct OrderFactory {
    quote_asset: String,
    quantity_precision: u32,
}

impl OrderFactory {
    pub fn new(quote_asset: impl Into<String>, quantity_precision: u32) -> Self {
        Self {
            quote_asset: quote_asset.into(),
            quantity_precision,
        }
    }

    pub fn create_order(
        &self,
        symbol: String,
        side: TradeSide,
        quantity: f64,
        usd_amount: f64,
        profit: Option<f64>,
    ) -> Result<TradeOrder> {
        let quantity = Decimal::from_f64(quantity)
            .ok_or_else(|| {
                RotabotError::InvariantViolation(format!(
                    "order quantity {} for {} is not a number",
                    quantity, symbol
                ))
            })?
            .round_dp_with_strategy(self.quantity_precision, RoundingStrategy::ToZero);

        Ok(TradeOrder {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol,
            side,
            quantity,
            usd_amount,
            profit,
        })
    }

    /// Sell the whole holding and buy `target` at `target_price` with the proceeds
    pub fn rotation(
        &self,
        holding: &HoldingValuation,
        target: &str,
        target_price: f64,
    ) -> Result<OrderPlan> {
        let sell = self.sell_all(holding)?;

        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(RotabotError::data_unavailable(
                format!("{}{}", target, self.quote_asset),
                format!("cannot size an order at price {}", target_price),
            ));
        }
        let equivalent_volume = holding.value() / target_price;

        let buy = self.create_order(
            format!("{}{}", target, self.quote_asset),
            TradeSide::Buy,
            equivalent_volume,
            holding.value(),
            None,
        )?;

        Ok(OrderPlan::Rotate { sell, buy })
    }

    /// Sell the whole holding into the quote asset
    pub fn exit_to_cash(&self, holding: &HoldingValuation) -> Result<OrderPlan> {
        Ok(OrderPlan::ExitToCash {
            sell: self.sell_all(holding)?,
        })
    }

    fn sell_all(&self, holding: &HoldingValuation) -> Result<TradeOrder> {
        if holding.balance.is_nan() || holding.balance <= 0.0 {
            return Err(RotabotError::Account {
                asset: holding.asset.clone(),
                reason: format!("no balance to sell ({})", holding.balance),
            });
        }

        self.create_order(
            format!("{}{}", holding.asset, self.quote_asset),
            TradeSide::Sell,
            holding.balance,
            holding.value(),
            Some(holding.profit()),
        )
    }
}
