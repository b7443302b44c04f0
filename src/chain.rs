use bitcoin::Network;
use clap::ValueEnum;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Mainnet,
    Testnet,
    Signet,
    Regtest,
}

impl Chain {
    /// Network whose address prefixes are used for `e.a`.
    pub fn network(&self) -> Network {
        match self {
            Chain::Mainnet => Network::Bitcoin,
            Chain::Testnet => Network::Testnet,
            Chain::Signet => Network::Signet,
            Chain::Regtest => Network::Regtest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_networks() {
        assert_eq!(Chain::Mainnet.network(), Network::Bitcoin);
        assert_eq!(Chain::Testnet.network(), Network::Testnet);
        assert_eq!(
            Chain::from_str("regtest", true).unwrap().network(),
            Network::Regtest
        );
        assert!(Chain::from_str("bsv", true).is_err());
    }
}
