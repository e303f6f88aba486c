#![no_main]

use libfuzzer_sys::fuzz_target;
use vaultguard_core::Money;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing should never panic, and accepted values must round-trip
    if let Ok(money) = text.parse::<Money>() {
        let reparsed: Money = money.to_string().parse().unwrap();
        assert_eq!(money, reparsed);
    }
});
