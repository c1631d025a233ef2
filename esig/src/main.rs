// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod cli;
mod wrap;

fn main() {
    println!();
    println!("ESig - Configure Microsoft Outlook e-mail signatures");
    println!();

    std::process::exit(match cli::run_cli(std::env::args_os()) {
        Ok(cli::Invocation::Help) => 0,
        Ok(cli::Invocation::Provisioned) => {
            println!("The command completed successfully.");
            0
        }
        Err(err) => {
            println!("ERROR: {}", err);
            println!("The command completed with errors.");
            1
        }
    });
}
