//! rcash-report - Summarise a GnuCash book.

use std::process::ExitCode;

fn main() -> ExitCode {
    rustcash::cmd::report_cmd::main()
}
