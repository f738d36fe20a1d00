//! rcash-query - Select splits from a GnuCash book.

use std::process::ExitCode;

fn main() -> ExitCode {
    rustcash::cmd::query_cmd::main()
}
