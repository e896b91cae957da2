//! Block subsidy schedule.
//!
//! The subsidy halves once per [`NetworkParams::subsidy_interval`] blocks:
//! `initial_subsidy >> (height / subsidy_interval)`. With mainnet
//! parameters that is 50 coins for heights 0–209,999, 25 coins for
//! 210,000–419,999, and so on until the shifted value truncates to zero.

use crate::params::NetworkParams;

/// Base subsidy (in satoshis) for a block at the given height.
///
/// Returns 0 once the epoch reaches 64 (shift-overflow guard) or the
/// halved amount truncates to zero.
pub fn block_subsidy(height: u64, params: &NetworkParams) -> u64 {
    epoch_subsidy(subsidy_epoch(height, params), params)
}

/// Which halving epoch a height falls in.
///
/// Epoch 0 spans heights `[0, subsidy_interval)`, epoch 1 spans
/// `[subsidy_interval, 2 * subsidy_interval)`, etc.
pub fn subsidy_epoch(height: u64, params: &NetworkParams) -> u64 {
    height / params.subsidy_interval
}

/// Subsidy (in satoshis) for a given halving epoch.
pub fn epoch_subsidy(epoch: u64, params: &NetworkParams) -> u64 {
    if epoch >= 64 {
        return 0;
    }
    params.initial_subsidy >> epoch
}

/// The height of the next halving after `height`, or `None` once the
/// subsidy is exhausted.
pub fn next_halving_height(height: u64, params: &NetworkParams) -> Option<u64> {
    let epoch = subsidy_epoch(height, params);
    if epoch_subsidy(epoch, params) == 0 {
        return None;
    }
    (epoch + 1).checked_mul(params.subsidy_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::COIN;
    use proptest::prelude::*;

    fn mainnet() -> NetworkParams {
        NetworkParams::mainnet()
    }

    #[test]
    fn initial_epoch_pays_full_subsidy() {
        let params = mainnet();
        assert_eq!(block_subsidy(0, &params), 50 * COIN);
        assert_eq!(block_subsidy(100, &params), 50 * COIN);
        assert_eq!(block_subsidy(209_999, &params), 50 * COIN);
    }

    #[test]
    fn subsidy_halves_at_each_boundary() {
        let params = mainnet();
        assert_eq!(block_subsidy(210_000, &params), 25 * COIN);
        assert_eq!(block_subsidy(420_000, &params), 25 * COIN / 2);
        assert_eq!(block_subsidy(630_000, &params), 25 * COIN / 4);
    }

    #[test]
    fn subsidy_exhausts() {
        let params = mainnet();
        // 50 * COIN < 2^64, so 64 halvings always truncate to zero.
        assert_eq!(block_subsidy(64 * 210_000, &params), 0);
        assert_eq!(epoch_subsidy(64, &params), 0);
        assert_eq!(epoch_subsidy(1000, &params), 0);
    }

    #[test]
    fn halving_heights() {
        let params = mainnet();
        assert_eq!(next_halving_height(0, &params), Some(210_000));
        assert_eq!(next_halving_height(209_999, &params), Some(210_000));
        assert_eq!(next_halving_height(210_000, &params), Some(420_000));
        assert_eq!(next_halving_height(64 * 210_000, &params), None);
    }

    proptest! {
        // Constant within an interval: every height maps to the same
        // subsidy as the first height of its epoch.
        #[test]
        fn constant_within_epoch(height in 0u64..10_000_000) {
            let params = mainnet();
            let epoch_start = subsidy_epoch(height, &params) * params.subsidy_interval;
            prop_assert_eq!(
                block_subsidy(height, &params),
                block_subsidy(epoch_start, &params)
            );
        }

        // Monotone: subsidy never increases with height.
        #[test]
        fn never_increases(height in 0u64..10_000_000) {
            let params = mainnet();
            prop_assert!(block_subsidy(height + 1, &params) <= block_subsidy(height, &params));
        }
    }
}
