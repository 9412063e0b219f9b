//! Network definitions and the per-network prefix table.

/// Known network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Production network
    Mainnet,
    /// Public test network
    Testnet,
    /// Local regression-test network
    Regtest,
}

impl Network {
    /// All networks with built-in parameters.
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Regtest];

    /// Built-in chain parameters for this network.
    pub fn params(&self) -> &'static ChainParams {
        match self {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
            Network::Regtest => &REGTEST,
        }
    }

    /// Parse network from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }

    /// Get network name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

/// Encoding prefixes for one network.
///
/// Constructed once at startup and passed by reference into every codec
/// call; nothing in this crate mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// Which network these parameters describe.
    pub network: Network,
    /// Base58 version byte of pay-to-public-key-hash addresses.
    pub pubkey_address_prefix: u8,
    /// Base58 version byte of pay-to-script-hash addresses.
    pub script_address_prefix: u8,
    /// Base58 version byte of exported private keys.
    pub secret_key_prefix: u8,
    /// Version bytes of serialized extended public keys.
    pub ext_public_key_prefix: [u8; 4],
    /// Version bytes of serialized extended private keys.
    pub ext_secret_key_prefix: [u8; 4],
    /// Human-readable part shared by all segwit addresses.
    pub bech32_hrp: &'static str,
}

/// Mainnet parameters.
pub const MAINNET: ChainParams = ChainParams {
    network: Network::Mainnet,
    pubkey_address_prefix: 0x00,
    script_address_prefix: 0x05,
    secret_key_prefix: 0x80,
    ext_public_key_prefix: [0x04, 0x88, 0xb2, 0x1e],
    ext_secret_key_prefix: [0x04, 0x88, 0xad, 0xe4],
    bech32_hrp: "bc",
};

/// Testnet parameters.
pub const TESTNET: ChainParams = ChainParams {
    network: Network::Testnet,
    pubkey_address_prefix: 0x6f,
    script_address_prefix: 0xc4,
    secret_key_prefix: 0xef,
    ext_public_key_prefix: [0x04, 0x35, 0x87, 0xcf],
    ext_secret_key_prefix: [0x04, 0x35, 0x83, 0x94],
    bech32_hrp: "tb",
};

/// Regtest parameters; Base58 prefixes are shared with testnet.
pub const REGTEST: ChainParams = ChainParams {
    network: Network::Regtest,
    bech32_hrp: "bcrt",
    ..TESTNET
};

impl ChainParams {
    /// Network whose segwit addresses use `hrp`, if any known one does.
    pub fn identify_hrp(hrp: &str) -> Option<Network> {
        Network::ALL
            .into_iter()
            .find(|n| n.params().bech32_hrp.eq_ignore_ascii_case(hrp))
    }

    /// Network whose legacy addresses start with `version`.
    ///
    /// Testnet and regtest share Base58 prefixes; testnet wins.
    pub fn identify_address_prefix(version: u8) -> Option<Network> {
        Network::ALL.into_iter().find(|n| {
            let params = n.params();
            params.pubkey_address_prefix == version || params.script_address_prefix == version
        })
    }

    /// Network whose exported private keys start with `version`.
    pub fn identify_secret_key_prefix(version: u8) -> Option<Network> {
        Network::ALL
            .into_iter()
            .find(|n| n.params().secret_key_prefix == version)
    }

    /// Network whose extended keys (either role) start with `version`.
    pub fn identify_ext_key_prefix(version: &[u8]) -> Option<Network> {
        Network::ALL.into_iter().find(|n| {
            let params = n.params();
            params.ext_public_key_prefix == version || params.ext_secret_key_prefix == version
        })
    }

    /// True when `hrp` is this network's segwit prefix (case-insensitive).
    pub fn is_own_hrp(&self, hrp: &str) -> bool {
        self.bech32_hrp.eq_ignore_ascii_case(hrp)
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Network::default().params().clone()
    }
}

impl From<Network> for ChainParams {
    fn from(network: Network) -> Self {
        network.params().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("mainnet"), Some(Network::Mainnet));
        assert_eq!(Network::from_str("MAINNET"), Some(Network::Mainnet));
        assert_eq!(Network::from_str("test"), Some(Network::Testnet));
        assert_eq!(Network::from_str("regtest"), Some(Network::Regtest));
        assert_eq!(Network::from_str("invalid"), None);
    }

    #[test]
    fn test_regtest_shares_base58_prefixes() {
        assert_eq!(REGTEST.pubkey_address_prefix, TESTNET.pubkey_address_prefix);
        assert_eq!(REGTEST.ext_secret_key_prefix, TESTNET.ext_secret_key_prefix);
        assert_ne!(REGTEST.bech32_hrp, TESTNET.bech32_hrp);
    }

    #[test]
    fn test_identify_prefixes() {
        assert_eq!(ChainParams::identify_hrp("TB"), Some(Network::Testnet));
        assert_eq!(ChainParams::identify_hrp("bcrt"), Some(Network::Regtest));
        assert_eq!(ChainParams::identify_hrp("ltc"), None);
        assert_eq!(ChainParams::identify_address_prefix(0x05), Some(Network::Mainnet));
        assert_eq!(ChainParams::identify_address_prefix(0xc4), Some(Network::Testnet));
        assert_eq!(ChainParams::identify_secret_key_prefix(0xef), Some(Network::Testnet));
        assert_eq!(
            ChainParams::identify_ext_key_prefix(&[0x04, 0x88, 0xb2, 0x1e]),
            Some(Network::Mainnet)
        );
        assert_eq!(ChainParams::identify_ext_key_prefix(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn test_default_is_mainnet() {
        assert_eq!(ChainParams::default(), MAINNET);
        assert_eq!(ChainParams::from(Network::Regtest).bech32_hrp, "bcrt");
    }
}
