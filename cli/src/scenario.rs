//! Scenario replay: timestamped token operations read from TOML.
//!
//! ```toml
//! owner = "0x0000000000000000000000000000000000000001"
//!
//! [[step]]
//! at = 0
//! op = "grant"
//! caller = "0x0000000000000000000000000000000000000001"
//! account = "0x0000000000000000000000000000000000000009"
//!
//! [[step]]
//! at = 0
//! op = "mint"
//! caller = "0x0000000000000000000000000000000000000009"
//! to = "0x0000000000000000000000000000000000000005"
//! amount = "100_000000000000000000"
//! ```

use std::path::Path;

use accrue_accrual::{AccrualError, InterestToken};
use accrue_nullables::NullClock;
use accrue_types::{parse_amount, Clock, HolderAddress, ProtocolParams};
use anyhow::{bail, Context};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Token owner. Falls back to the configured owner.
    #[serde(default)]
    pub owner: Option<HolderAddress>,

    /// Overrides the configured protocol params.
    #[serde(default)]
    pub params: Option<ProtocolParams>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    /// Seconds since the epoch at which the step runs.
    pub at: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    Grant {
        caller: HolderAddress,
        account: HolderAddress,
    },
    TransferOwnership {
        caller: HolderAddress,
        new_owner: HolderAddress,
    },
    SetRate {
        caller: HolderAddress,
        #[serde(deserialize_with = "amount")]
        rate: u128,
    },
    Mint {
        caller: HolderAddress,
        to: HolderAddress,
        #[serde(deserialize_with = "amount")]
        amount: u128,
    },
    Burn {
        caller: HolderAddress,
        from: HolderAddress,
        #[serde(deserialize_with = "amount")]
        amount: u128,
    },
    Transfer {
        caller: HolderAddress,
        to: HolderAddress,
        #[serde(deserialize_with = "amount")]
        amount: u128,
    },
    TransferFrom {
        caller: HolderAddress,
        from: HolderAddress,
        to: HolderAddress,
        #[serde(deserialize_with = "amount")]
        amount: u128,
    },
    Approve {
        caller: HolderAddress,
        spender: HolderAddress,
        #[serde(deserialize_with = "amount")]
        amount: u128,
    },
    Balance {
        holder: HolderAddress,
    },
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Grant { .. } => "grant",
            Action::TransferOwnership { .. } => "transfer_ownership",
            Action::SetRate { .. } => "set_rate",
            Action::Mint { .. } => "mint",
            Action::Burn { .. } => "burn",
            Action::Transfer { .. } => "transfer",
            Action::TransferFrom { .. } => "transfer_from",
            Action::Approve { .. } => "approve",
            Action::Balance { .. } => "balance",
        }
    }
}

/// Amounts are strings so they can exceed the TOML integer range.
fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_amount(&raw).map_err(serde::de::Error::custom)
}

impl Scenario {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let scenario: Scenario = toml::from_str(s).context("invalid scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut last = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at < last {
                bail!(
                    "step {index} runs at {} which is before the previous step at {last}",
                    step.at
                );
            }
            last = step.at;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub at: u64,
    pub op: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct HolderSummary {
    pub address: HolderAddress,
    pub principal: String,
    pub balance: String,
    pub locked_rate: String,
    pub last_synced: u64,
}

/// Result of a replay. Amounts are decimal strings of raw units.
#[derive(Debug, Serialize)]
pub struct Report {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub final_time: u64,
    pub protocol_rate: String,
    pub total_supply: String,
    pub steps: Vec<StepOutcome>,
    pub holders: Vec<HolderSummary>,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}

/// Replay `scenario` against a fresh token. Failed steps are recorded in
/// the report and leave the token unchanged.
pub fn run(
    scenario: &Scenario,
    params: ProtocolParams,
    default_owner: Option<HolderAddress>,
) -> anyhow::Result<Report> {
    let owner = match scenario.owner.or(default_owner) {
        Some(owner) if !owner.is_zero() => owner,
        Some(_) => bail!("scenario owner must not be the zero address"),
        None => bail!("scenario has no owner and none is configured"),
    };
    let params = scenario.params.clone().unwrap_or(params);
    let start = scenario.steps.first().map_or(0, |s| s.at);
    let clock = NullClock::new(start);
    let mut token = InterestToken::new(params, owner, &clock);

    info!(owner = %owner, steps = scenario.steps.len(), "replaying scenario");

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        clock.set(step.at);
        let result = apply(&mut token, &step.action);
        let (ok, detail) = match result {
            Ok(detail) => (true, detail),
            Err(e) => {
                warn!(index, op = step.action.name(), error = %e, "step failed");
                (false, e.to_string())
            }
        };
        debug!(index, at = step.at, op = step.action.name(), ok, "step applied");
        outcomes.push(StepOutcome {
            index,
            at: step.at,
            op: step.action.name(),
            ok,
            detail,
        });
    }

    let now = clock.now();
    let mut holders = Vec::new();
    let mut addresses: Vec<HolderAddress> =
        token.engine().holders().map(|(address, _)| *address).collect();
    addresses.sort();
    for address in addresses {
        let record = token.engine().holder_record(&address);
        holders.push(HolderSummary {
            address,
            principal: token.principal_balance_of(&address).to_string(),
            // An overflowing balance is reported rather than aborting the replay.
            balance: match token.balance_of(&address) {
                Ok(balance) => balance.to_string(),
                Err(e) => e.to_string(),
            },
            locked_rate: record.locked_rate.to_string(),
            last_synced: record.last_synced.as_secs(),
        });
    }

    let metadata = token.metadata();
    Ok(Report {
        name: metadata.name.clone(),
        symbol: metadata.symbol.clone(),
        decimals: metadata.decimals,
        final_time: now.as_secs(),
        protocol_rate: token.protocol_rate().to_string(),
        total_supply: token.total_supply().to_string(),
        steps: outcomes,
        holders,
    })
}

fn apply<C: Clock>(token: &mut InterestToken<C>, action: &Action) -> Result<String, AccrualError> {
    match action {
        Action::Grant { caller, account } => {
            token.grant_mint_burn_capability(caller, account)?;
            Ok(format!("{account} may mint and burn"))
        }
        Action::TransferOwnership { caller, new_owner } => {
            token.transfer_ownership(caller, new_owner)?;
            Ok(format!("owner is now {new_owner}"))
        }
        Action::SetRate { caller, rate } => {
            token.set_protocol_rate(caller, *rate)?;
            Ok(format!("protocol rate {rate}"))
        }
        Action::Mint { caller, to, amount } => {
            token.mint(caller, to, *amount)?;
            Ok(format!("minted {amount} to {to}"))
        }
        Action::Burn {
            caller,
            from,
            amount,
        } => {
            let burned = token.burn(caller, from, *amount)?;
            Ok(format!("burned {burned} from {from}"))
        }
        Action::Transfer { caller, to, amount } => {
            token.transfer(caller, to, *amount)?;
            Ok(format!("{caller} -> {to}"))
        }
        Action::TransferFrom {
            caller,
            from,
            to,
            amount,
        } => {
            token.transfer_from(caller, from, to, *amount)?;
            Ok(format!("{from} -> {to} via {caller}"))
        }
        Action::Approve {
            caller,
            spender,
            amount,
        } => {
            token.approve(caller, spender, *amount)?;
            Ok(format!("{spender} may spend {amount} of {caller}"))
        }
        Action::Balance { holder } => {
            let balance = token.balance_of(holder)?;
            Ok(format!("{holder} holds {balance}"))
        }
    }
}
