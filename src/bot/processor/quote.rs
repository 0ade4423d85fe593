use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::bot::api::{PriceError, PriceSource, TradingPair};

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteLine {
    Priced {
        pair: TradingPair,
        exchange_price: f64,
        price: f64,
    },
    ComingSoon {
        pair: TradingPair,
    },
}

/* Combines the internal exchange price of each pair with the reference price
 * of its quote asset. A single failed fetch aborts the whole quote.
 */
pub struct PriceQuoter {
    pairs: Vec<TradingPair>,
    exchange: Arc<dyn PriceSource>,
    reference: Arc<dyn PriceSource>,
    fetch_timeout: Duration,
}

impl PriceQuoter {
    pub fn new(
        pairs: Vec<TradingPair>,
        exchange: Arc<dyn PriceSource>,
        reference: Arc<dyn PriceSource>,
        fetch_timeout: Duration,
    ) -> PriceQuoter {
        PriceQuoter {
            pairs,
            exchange,
            reference,
            fetch_timeout,
        }
    }

    pub fn has_pairs(&self) -> bool {
        !self.pairs.is_empty()
    }

    pub async fn quote(&self) -> Result<Vec<QuoteLine>, PriceError> {
        let mut lines = Vec::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            if !pair.active {
                lines.push(QuoteLine::ComingSoon { pair: pair.clone() });
                continue;
            }

            let exchange_price = self.fetch(self.exchange.as_ref(), pair).await?;
            let reference_price = self.fetch(self.reference.as_ref(), pair).await?;
            lines.push(QuoteLine::Priced {
                pair: pair.clone(),
                exchange_price,
                price: exchange_price * reference_price,
            });
        }

        Ok(lines)
    }

    async fn fetch(&self, source: &dyn PriceSource, pair: &TradingPair) -> Result<f64, PriceError> {
        timeout(self.fetch_timeout, source.fetch_price(pair))
            .await
            .map_err(|_| PriceError::Timeout)?
    }
}
