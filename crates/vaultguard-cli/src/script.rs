//! Command scripts
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! open ACC1001 500
//! set-pin ACC1001 - 1234
//! deposit ACC1001 200 1234
//! withdraw ACC1001 100 1234
//! transfer ACC1001 ACC2002 50 1234
//! validate ACC1001 1234
//! unlock ACC1001 1234
//! balance ACC1001
//! show ACC1001
//! ```
//!
//! The whole script is parsed before anything runs. Rejected operations are
//! reported and execution continues.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use vaultguard_core::{
    AccountRegistry, AccountSummary, CredentialHasher, GuardedAccount, LockoutPolicy, Money,
    RegistryError, Secret,
};

/// Script parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// A parsed script command
#[derive(Debug, Clone)]
pub enum Command {
    Open { id: String, balance: Money },
    SetPin { id: String, old: Option<Secret>, new: Secret },
    Validate { id: String, pin: Secret },
    Unlock { id: String, pin: Secret },
    Deposit { id: String, amount: Money, pin: Secret },
    Withdraw { id: String, amount: Money, pin: Secret },
    Transfer { from: String, to: String, amount: Money, pin: Secret },
    Balance { id: String },
    Show { id: String },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Open { id, balance } => write!(f, "open {} {}", id, balance),
            Command::SetPin { id, old, .. } => {
                let old = if old.is_some() { "****" } else { "-" };
                write!(f, "set-pin {} {} ****", id, old)
            }
            Command::Validate { id, .. } => write!(f, "validate {} ****", id),
            Command::Unlock { id, .. } => write!(f, "unlock {} ****", id),
            Command::Deposit { id, amount, .. } => write!(f, "deposit {} {} ****", id, amount),
            Command::Withdraw { id, amount, .. } => write!(f, "withdraw {} {} ****", id, amount),
            Command::Transfer { from, to, amount, .. } => {
                write!(f, "transfer {} {} {} ****", from, to, amount)
            }
            Command::Balance { id } => write!(f, "balance {}", id),
            Command::Show { id } => write!(f, "show {}", id),
        }
    }
}

fn parse_amount(token: &str, line: usize) -> Result<Money, ScriptError> {
    token.parse().map_err(|e| ScriptError {
        line,
        message: format!("{}", e),
    })
}

/// Parse a single non-empty line
pub fn parse_line(text: &str, line: usize) -> Result<Command, ScriptError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let err = |message: String| ScriptError { line, message };

    let Some((&verb, args)) = tokens.split_first() else {
        return Err(err("empty command".into()));
    };

    let expect = |n: usize, usage: &str| -> Result<(), ScriptError> {
        if args.len() == n {
            Ok(())
        } else {
            Err(err(format!("usage: {}", usage)))
        }
    };

    let command = match verb {
        "open" => {
            expect(2, "open <id> <balance>")?;
            Command::Open {
                id: args[0].to_string(),
                balance: parse_amount(args[1], line)?,
            }
        }
        "set-pin" => {
            expect(3, "set-pin <id> <old|-> <new>")?;
            Command::SetPin {
                id: args[0].to_string(),
                old: (args[1] != "-").then(|| Secret::from(args[1])),
                new: Secret::from(args[2]),
            }
        }
        "validate" => {
            expect(2, "validate <id> <pin>")?;
            Command::Validate {
                id: args[0].to_string(),
                pin: Secret::from(args[1]),
            }
        }
        "unlock" => {
            expect(2, "unlock <id> <pin>")?;
            Command::Unlock {
                id: args[0].to_string(),
                pin: Secret::from(args[1]),
            }
        }
        "deposit" => {
            expect(3, "deposit <id> <amount> <pin>")?;
            Command::Deposit {
                id: args[0].to_string(),
                amount: parse_amount(args[1], line)?,
                pin: Secret::from(args[2]),
            }
        }
        "withdraw" => {
            expect(3, "withdraw <id> <amount> <pin>")?;
            Command::Withdraw {
                id: args[0].to_string(),
                amount: parse_amount(args[1], line)?,
                pin: Secret::from(args[2]),
            }
        }
        "transfer" => {
            expect(4, "transfer <from> <to> <amount> <pin>")?;
            Command::Transfer {
                from: args[0].to_string(),
                to: args[1].to_string(),
                amount: parse_amount(args[2], line)?,
                pin: Secret::from(args[3]),
            }
        }
        "balance" => {
            expect(1, "balance <id>")?;
            Command::Balance {
                id: args[0].to_string(),
            }
        }
        "show" => {
            expect(1, "show <id>")?;
            Command::Show {
                id: args[0].to_string(),
            }
        }
        other => return Err(err(format!("unknown command {:?}", other))),
    };

    Ok(command)
}

/// Parse a whole script into numbered commands
pub fn parse_script(source: &str) -> Result<Vec<(usize, Command)>, ScriptError> {
    source
        .lines()
        .enumerate()
        .map(|(i, raw)| (i + 1, raw.split('#').next().unwrap_or("").trim()))
        .filter(|(_, text)| !text.is_empty())
        .map(|(line, text)| parse_line(text, line).map(|c| (line, c)))
        .collect()
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Done,
    Balance(Money),
    Summary(AccountSummary),
}

/// Result of one executed command
#[derive(Debug, Clone)]
pub struct Outcome {
    pub line: usize,
    pub command: Command,
    pub result: Result<Report, RegistryError>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}] {:<40} ", self.line, self.command.to_string())?;
        match &self.result {
            Ok(Report::Done) => write!(f, "ok"),
            Ok(Report::Balance(b)) => write!(f, "balance {}", b),
            Ok(Report::Summary(s)) => {
                let balance = s
                    .balance
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "<locked>".into());
                write!(
                    f,
                    "{} balance={} locked={} attempts_remaining={}",
                    s.identifier, balance, s.locked, s.attempts_remaining
                )
            }
            Err(e) => write!(f, "rejected: {}", e),
        }
    }
}

/// Executes commands against an in-memory registry
#[derive(Debug)]
pub struct ScriptRunner {
    registry: AccountRegistry,
    policy: LockoutPolicy,
    hasher: CredentialHasher,
}

impl ScriptRunner {
    pub fn new(policy: LockoutPolicy, hasher: CredentialHasher) -> Self {
        Self {
            registry: AccountRegistry::new(),
            policy,
            hasher,
        }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AccountRegistry {
        &mut self.registry
    }

    /// Open an account with this runner's policy and hasher
    pub fn open(&mut self, id: &str, balance: Money) -> Result<(), RegistryError> {
        self.registry.open(GuardedAccount::with_policy(
            id,
            balance,
            self.policy,
            self.hasher,
        ))
    }

    /// Execute one command
    pub fn execute(&mut self, command: &Command) -> Result<Report, RegistryError> {
        debug!(%command, "execute");
        match command {
            Command::Open { id, balance } => {
                self.open(id, *balance)?;
            }
            Command::SetPin { id, old, new } => {
                self.registry
                    .account_mut(id)?
                    .set_credential(old.as_ref(), new)?;
            }
            Command::Validate { id, pin } => {
                self.registry.account_mut(id)?.validate(pin)?;
            }
            Command::Unlock { id, pin } => {
                self.registry.account_mut(id)?.unlock(pin)?;
            }
            Command::Deposit { id, amount, pin } => {
                self.registry.account_mut(id)?.deposit(*amount, pin)?;
            }
            Command::Withdraw { id, amount, pin } => {
                self.registry.account_mut(id)?.withdraw(*amount, pin)?;
            }
            Command::Transfer {
                from,
                to,
                amount,
                pin,
            } => {
                self.registry.transfer(from, to, *amount, pin)?;
            }
            Command::Balance { id } => {
                let balance = self.registry.account_mut(id)?.balance()?;
                return Ok(Report::Balance(balance));
            }
            Command::Show { id } => {
                let summary = self.registry.account_mut(id)?.summary();
                return Ok(Report::Summary(summary));
            }
        }
        Ok(Report::Done)
    }

    /// Parse and run a script, one outcome per command
    pub fn run_script(&mut self, source: &str) -> Result<Vec<Outcome>, ScriptError> {
        let commands = parse_script(source)?;
        Ok(commands
            .into_iter()
            .map(|(line, command)| {
                let result = self.execute(&command);
                Outcome {
                    line,
                    command,
                    result,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultguard_core::{AuthError, TxError};

    fn runner() -> ScriptRunner {
        ScriptRunner::new(LockoutPolicy::default(), CredentialHasher::insecure_fast())
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let commands = parse_script("# header\n\nopen A 10 # trailing\n  show A\n").unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].0, 3);
        assert!(matches!(&commands[0].1, Command::Open { id, balance } if id == "A" && *balance == Money::from_major(10)));
        assert!(matches!(&commands[1].1, Command::Show { id } if id == "A"));
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse_script("open A 10\nwithdraw A ten 1234\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = parse_script("frobnicate A").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unknown command"));

        let err = parse_script("deposit A 10").unwrap_err();
        assert!(err.message.starts_with("usage: deposit"));
    }

    #[test]
    fn test_set_pin_dash_means_none() {
        let commands = parse_script("set-pin A - 1234\nset-pin A 1234 5678").unwrap();
        assert!(matches!(&commands[0].1, Command::SetPin { old: None, .. }));
        assert!(matches!(&commands[1].1, Command::SetPin { old: Some(_), .. }));
    }

    #[test]
    fn test_display_masks_pins() {
        let commands = parse_script("withdraw A 10 1234\nset-pin A 1234 5678").unwrap();
        let shown = commands[0].1.to_string();
        assert_eq!(shown, "withdraw A 10.00 ****");
        assert!(!commands[1].1.to_string().contains("1234"));
    }

    #[test]
    fn test_run_continues_after_rejection() {
        let mut runner = runner();
        let outcomes = runner
            .run_script(
                "open A 100\n\
                 set-pin A - 1234\n\
                 withdraw A 500 1234\n\
                 withdraw A 40 1234\n\
                 balance A\n",
            )
            .unwrap();

        assert_eq!(outcomes.len(), 5);
        assert_eq!(
            outcomes[2].result,
            Err(RegistryError::Tx(TxError::InsufficientFunds))
        );
        assert_eq!(outcomes[4].result, Ok(Report::Balance(Money::from_major(60))));
    }

    #[test]
    fn test_unknown_account() {
        let mut runner = runner();
        let outcomes = runner.run_script("validate ghost 1234").unwrap();
        assert_eq!(
            outcomes[0].result,
            Err(RegistryError::UnknownAccount("ghost".into()))
        );
    }

    #[test]
    fn test_balance_while_locked() {
        let mut runner = runner();
        let outcomes = runner
            .run_script(
                "open A 100\nset-pin A - 1234\n\
                 validate A 0000\nvalidate A 0000\nvalidate A 0000\n\
                 balance A\nshow A\n",
            )
            .unwrap();
        assert_eq!(
            outcomes[5].result,
            Err(RegistryError::Tx(TxError::Auth(AuthError::Locked)))
        );
        assert!(outcomes[6].to_string().contains("balance=<locked>"));
    }
}
