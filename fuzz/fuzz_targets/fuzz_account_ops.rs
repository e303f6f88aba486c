#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vaultguard_core::{
    AuthError, CredentialHasher, GuardedAccount, LockoutPolicy, Money, Secret, MIN_BALANCE,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Validate(bool),
    Unlock(bool),
    Deposit(i64, bool),
    Withdraw(i64, bool),
    Credit(i64),
    Rotate(bool),
}

#[derive(Debug, Arbitrary)]
struct Input {
    initial: i64,
    max_failed: u8,
    max_unlock: Option<u8>,
    ops: Vec<Op>,
}

fn pin(correct: bool, current: &str) -> Secret {
    Secret::from(if correct { current } else { "0000" })
}

fuzz_target!(|input: Input| {
    let policy = LockoutPolicy {
        max_failed_attempts: u32::from(input.max_failed % 8),
        max_unlock_attempts: input.max_unlock.map(|m| u32::from(m % 8)),
    };
    let mut account = GuardedAccount::with_policy(
        "FUZZ",
        Money::from_minor(input.initial),
        policy,
        CredentialHasher::insecure_fast(),
    );
    let mut current = "1234";
    account.set_credential(None, &Secret::from(current)).unwrap();

    for op in input.ops.iter().take(64) {
        match op {
            Op::Validate(c) => {
                let _ = account.validate(&pin(*c, current));
            }
            Op::Unlock(c) => {
                let _ = account.unlock(&pin(*c, current));
            }
            Op::Deposit(a, c) => {
                let _ = account.deposit(Money::from_minor(*a), &pin(*c, current));
            }
            Op::Withdraw(a, c) => {
                let _ = account.withdraw(Money::from_minor(*a), &pin(*c, current));
            }
            Op::Credit(a) => {
                let _ = account.credit(Money::from_minor(*a));
            }
            Op::Rotate(c) => {
                let next = if current == "1234" { "5678" } else { "1234" };
                let was_locked = account.is_locked();
                let result = account.set_credential(Some(&pin(*c, current)), &Secret::from(next));
                if was_locked {
                    assert_eq!(result, Err(AuthError::Locked));
                } else if result.is_ok() {
                    current = next;
                }
            }
        }

        // Lock state follows the failure counter
        assert_eq!(account.is_locked(), policy.is_locked(account.failed_attempts()));
        if let Ok(balance) = account.balance() {
            assert!(balance >= MIN_BALANCE);
        }
    }
});
