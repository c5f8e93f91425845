//! Scripts command handler.

use crate::bootstrap::CliContext;
use crate::presentation::script_table;

/// Print the scripts found in the scripts directory.
pub fn execute(ctx: &CliContext) {
    let scripts = ctx.runner.catalog().list();
    if scripts.is_empty() {
        println!("No scripts found.");
        return;
    }

    println!("Found {} script(s):\n", scripts.len());
    for line in script_table(&scripts) {
        println!("{line}");
    }
}
