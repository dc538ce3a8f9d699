// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! taglink binary entry point.

use anyhow::Context;

use taglink_bin::error::report_error_and_exit;
use taglink_bin::{commands, BinError, Cli};

fn main() {
    let cli = Cli::parse_args();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building async runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => report_error_and_exit(BinError::from(e)),
    };

    if let Err(e) = runtime.block_on(commands::execute(cli)) {
        report_error_and_exit(e);
    }
}
