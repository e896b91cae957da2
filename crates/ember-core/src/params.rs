//! Network parameters. All monetary values in satoshis (1 coin = 10^8).
//!
//! These are engine/network constants the RPC layer consumes but never
//! derives: the subsidy schedule, block resource limits, and the protocol
//! version and rule names advertised in mining templates.

pub const COIN: u64 = 100_000_000;

/// Default TCP port for the JSON-RPC server (mainnet).
pub const DEFAULT_RPC_PORT: u16 = 8332;

/// Network type: Mainnet, Testnet, or Regtest.
///
/// Selects the parameter set and the default RPC port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local regression-test network with a short subsidy schedule.
    Regtest,
}

impl Network {
    /// Default TCP port for the JSON-RPC server.
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Self::Mainnet => DEFAULT_RPC_PORT,
            Self::Testnet => 18332,
            Self::Regtest => 18443,
        }
    }

    /// The parameter set for this network.
    pub fn params(&self) -> NetworkParams {
        match self {
            Self::Mainnet => NetworkParams::mainnet(),
            Self::Testnet => NetworkParams::testnet(),
            Self::Regtest => NetworkParams::regtest(),
        }
    }
}

/// Consensus constants the template builder needs.
///
/// Owned by the engine side of the boundary; the RPC layer treats them as
/// opaque inputs to subsidy math and template limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    /// Base block subsidy before any halving, in satoshis.
    pub initial_subsidy: u64,
    /// Blocks between halvings of the base subsidy.
    pub subsidy_interval: u64,
    /// Maximum signature operations per block.
    pub max_block_sigops: u64,
    /// Maximum serialized block size in bytes.
    pub max_block_size: u64,
    /// Protocol version advertised in block templates.
    pub block_version: u32,
    /// Active soft-fork rule names advertised in block templates.
    pub rules: &'static [&'static str],
}

impl NetworkParams {
    /// Production parameters.
    pub fn mainnet() -> Self {
        Self {
            initial_subsidy: 50 * COIN,
            subsidy_interval: 210_000,
            max_block_sigops: 20_000,
            max_block_size: 1_000_000,
            block_version: 0x2000_0000,
            rules: &["csv"],
        }
    }

    /// Test network parameters. Same schedule as mainnet.
    pub fn testnet() -> Self {
        Self::mainnet()
    }

    /// Regression-test parameters: a 150-block subsidy interval so halving
    /// behavior is reachable in tests.
    pub fn regtest() -> Self {
        Self {
            subsidy_interval: 150,
            ..Self::mainnet()
        }
    }
}
