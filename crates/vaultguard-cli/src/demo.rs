//! Canonical walkthrough
//!
//! Two accounts, a transfer, a lockout triggered by wrong PINs, an unlock,
//! and a withdrawal that would breach the floor.

use crate::script::{Outcome, ScriptError, ScriptRunner};

/// Demo script
pub const DEMO_SCRIPT: &str = "\
# Open two accounts and install their PINs
open ACC1001 500
open ACC2002 1000
set-pin ACC1001 - 1234
set-pin ACC2002 - 5678

deposit ACC1001 200 1234
withdraw ACC1001 100 1234
deposit ACC2002 500 5678
transfer ACC1001 ACC2002 200 1234

# Three wrong PINs lock the account
withdraw ACC1001 50 9999
withdraw ACC1001 50 8888
withdraw ACC1001 50 7777

# Locked: the correct PIN is refused too
withdraw ACC1001 50 1234

unlock ACC1001 1234
withdraw ACC1001 50 1234

# Would breach the floor
withdraw ACC1001 10000 1234

show ACC1001
show ACC2002
";

/// Run the demo script on a fresh runner
pub fn run_demo(runner: &mut ScriptRunner) -> Result<Vec<Outcome>, ScriptError> {
    runner.run_script(DEMO_SCRIPT)
}
