use crate::math::SwapFee;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Serde adapter for u128 ↔ TOML: serialize as string, deserialize from string or integer.
/// TOML crate doesn't natively support u128, so we round-trip through strings.
mod u128_toml {
    use super::*;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        use serde::de::{self, Visitor};
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}

/// Engine-wide configuration
/// One instance is handed to `DexState::new` and shared by every contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexConfig {
    /// Chain id bound into permit domain separators
    pub chain_id: u64,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub wrapper: WrapperConfig,
    #[serde(default)]
    pub router: RouterSettings,
    #[serde(default)]
    pub access: AccessConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(with = "u128_toml")]
    pub swap_fee_numerator: u128,
    #[serde(with = "u128_toml")]
    pub swap_fee_denominator: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperConfig {
    pub name_prefix: String,
    pub symbol_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Measure actual received balances after every pull
    pub fee_on_transfer_aware: bool,
    /// Only accounts registered on the router may call it
    pub restrict_accounts: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Pair mint/burn/swap only from contracts permitted on the pair factory
    pub restrict_pair_callers: bool,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            swap_fee_numerator: SwapFee::DEFAULT.numerator,
            swap_fee_denominator: SwapFee::DEFAULT.denominator,
        }
    }
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Few Wrapped ".to_string(),
            symbol_prefix: "fw".to_string(),
        }
    }
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            fees: FeeConfig::default(),
            wrapper: WrapperConfig::default(),
            router: RouterSettings::default(),
            access: AccessConfig::default(),
        }
    }
}

impl DexConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DexConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from `FEW_*` environment variables, falling back to defaults
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from a variable lookup; unset variables keep their default.
    ///
    /// | Variable                    | Field                           |
    /// |-----------------------------|---------------------------------|
    /// | `FEW_CHAIN_ID`              | `chain_id`                      |
    /// | `FEW_SWAP_FEE_NUMERATOR`    | `fees.swap_fee_numerator`       |
    /// | `FEW_SWAP_FEE_DENOMINATOR`  | `fees.swap_fee_denominator`     |
    /// | `FEW_WRAPPER_NAME_PREFIX`   | `wrapper.name_prefix`           |
    /// | `FEW_WRAPPER_SYMBOL_PREFIX` | `wrapper.symbol_prefix`         |
    /// | `FEW_FEE_ON_TRANSFER_AWARE` | `router.fee_on_transfer_aware`  |
    /// | `FEW_RESTRICT_ACCOUNTS`     | `router.restrict_accounts`      |
    /// | `FEW_RESTRICT_PAIR_CALLERS` | `access.restrict_pair_callers`  |
    pub fn from_vars<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let chain_id: u64 = lookup("FEW_CHAIN_ID")
            .unwrap_or_else(|| defaults.chain_id.to_string())
            .parse()?;

        let swap_fee_numerator: u128 = lookup("FEW_SWAP_FEE_NUMERATOR")
            .unwrap_or_else(|| defaults.fees.swap_fee_numerator.to_string())
            .parse()?;

        let swap_fee_denominator: u128 = lookup("FEW_SWAP_FEE_DENOMINATOR")
            .unwrap_or_else(|| defaults.fees.swap_fee_denominator.to_string())
            .parse()?;

        let name_prefix =
            lookup("FEW_WRAPPER_NAME_PREFIX").unwrap_or(defaults.wrapper.name_prefix);
        let symbol_prefix =
            lookup("FEW_WRAPPER_SYMBOL_PREFIX").unwrap_or(defaults.wrapper.symbol_prefix);

        let fee_on_transfer_aware: bool = lookup("FEW_FEE_ON_TRANSFER_AWARE")
            .unwrap_or_else(|| defaults.router.fee_on_transfer_aware.to_string())
            .parse()?;

        let restrict_accounts: bool = lookup("FEW_RESTRICT_ACCOUNTS")
            .unwrap_or_else(|| defaults.router.restrict_accounts.to_string())
            .parse()?;

        let restrict_pair_callers: bool = lookup("FEW_RESTRICT_PAIR_CALLERS")
            .unwrap_or_else(|| defaults.access.restrict_pair_callers.to_string())
            .parse()?;

        let config = Self {
            chain_id,
            fees: FeeConfig {
                swap_fee_numerator,
                swap_fee_denominator,
            },
            wrapper: WrapperConfig {
                name_prefix,
                symbol_prefix,
            },
            router: RouterSettings {
                fee_on_transfer_aware,
                restrict_accounts,
            },
            access: AccessConfig {
                restrict_pair_callers,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chain_id == 0 {
            return Err("chain_id cannot be zero".to_string());
        }
        self.swap_fee().validate()?;
        if self.wrapper.symbol_prefix.is_empty() {
            return Err("wrapper symbol_prefix cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn swap_fee(&self) -> SwapFee {
        SwapFee {
            numerator: self.fees.swap_fee_numerator,
            denominator: self.fees.swap_fee_denominator,
        }
    }
}
