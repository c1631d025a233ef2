// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Microsoft Word automation.

Word is driven through its COM automation interface from a long-lived
PowerShell process. Statements are written to the process's stdin one line at
a time. Each statement is wrapped so it reports success or the exception
message on a marker line, which is how errors make it back to us.
*/

use {
    crate::{
        document::{DocumentService, ExportFormat, SignatureSlot},
        util::{powershell_quote, POWERSHELL, POWERSHELL_ARGS},
    },
    anyhow::{anyhow, Context, Result},
    log::{debug, warn},
    std::{
        io::{BufRead, BufReader, Write},
        path::Path,
        process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    },
};

const STATUS_OK: &str = "<<esig:ok>>";
const STATUS_ERROR: &str = "<<esig:error>>";

/// `wdFindContinue`
const WD_FIND_CONTINUE: u32 = 1;
/// `wdReplaceAll`
const WD_REPLACE_ALL: u32 = 2;
/// `wdDoNotSaveChanges`
const WD_DO_NOT_SAVE_CHANGES: u32 = 0;

/// A PowerShell process accepting statements on stdin.
struct PowerShellHost {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl PowerShellHost {
    fn spawn() -> Result<Self> {
        debug!("starting {} automation host", POWERSHELL);
        let mut child = Command::new(POWERSHELL)
            .args(POWERSHELL_ARGS)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("starting {}", POWERSHELL))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("unable to obtain stdin of {}", POWERSHELL))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("unable to obtain stdout of {}", POWERSHELL))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Run a single-line statement and wait for its status marker.
    fn execute(&mut self, statement: &str) -> Result<()> {
        debug!("powershell> {}", statement);
        writeln!(self.stdin, "{}", wrap_statement(statement))?;
        self.stdin.flush()?;

        loop {
            let mut line = String::new();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(anyhow!("{} exited unexpectedly", POWERSHELL));
            }

            match parse_status(line.trim_end()) {
                Some(status) => return status,
                None => debug!("powershell< {}", line.trim_end()),
            }
        }
    }

    fn exit(mut self) -> Result<()> {
        writeln!(self.stdin, "exit")?;
        self.stdin.flush()?;
        let status = self.child.wait()?;
        debug!("{} exited with {}", POWERSHELL, status);

        Ok(())
    }
}

fn wrap_statement(statement: &str) -> String {
    format!(
        "try {{ {}; [Console]::Out.WriteLine('{}') }} catch {{ [Console]::Out.WriteLine('{}' + $_.Exception.Message) }}",
        statement, STATUS_OK, STATUS_ERROR
    )
}

fn parse_status(line: &str) -> Option<Result<()>> {
    if line == STATUS_OK {
        Some(Ok(()))
    } else {
        line.strip_prefix(STATUS_ERROR)
            .map(|message| Err(anyhow!("Word automation error: {}", message)))
    }
}

/// A [DocumentService] backed by Microsoft Word.
///
/// Word is started when the first document is opened and quit on close.
#[derive(Default)]
pub struct WordDocumentService {
    host: Option<PowerShellHost>,
}

impl WordDocumentService {
    fn host(&mut self) -> Result<&mut PowerShellHost> {
        self.host
            .as_mut()
            .ok_or_else(|| anyhow!("no active Word document"))
    }
}

impl DocumentService for WordDocumentService {
    fn open(&mut self, path: &Path) -> Result<()> {
        if self.host.is_none() {
            let mut host = PowerShellHost::spawn()?;
            host.execute(
                "$word = New-Object -ComObject Word.Application; $word.Visible = $false",
            )
            .context("starting Microsoft Word")?;
            self.host = Some(host);
        }

        let path = path.display().to_string();
        self.host()?.execute(&format!(
            "$document = $word.Documents.Open({})",
            powershell_quote(&path)
        ))
    }

    fn find_and_replace(&mut self, token: &str, replacement: &str) -> Result<()> {
        // FindText, MatchCase, MatchWholeWord, MatchWildcards, MatchSoundsLike,
        // MatchAllWordForms, Forward, Wrap, Format, ReplaceWith, Replace
        self.host()?.execute(&format!(
            "$word.Selection.Find.Execute({}, $true, $true, $false, $false, $false, $true, {}, $false, {}, {}) | Out-Null",
            powershell_quote(token),
            WD_FIND_CONTINUE,
            powershell_quote(replacement),
            WD_REPLACE_ALL
        ))
    }

    fn export_as(&mut self, path: &Path, format: ExportFormat) -> Result<()> {
        let path = path.display().to_string();
        self.host()?.execute(&format!(
            "$document.SaveAs([ref]{}, [ref]{})",
            powershell_quote(&path),
            format.word_save_format()
        ))
    }

    fn set_default_signature(&mut self, slot: SignatureSlot, name: &str) -> Result<()> {
        let property = match slot {
            SignatureSlot::NewMessage => "NewMessageSignature",
            SignatureSlot::Reply => "ReplyMessageSignature",
        };

        self.host()?.execute(&format!(
            "$word.EmailOptions.EmailSignature.{} = {}",
            property,
            powershell_quote(name)
        ))
    }

    fn close(&mut self) -> Result<()> {
        let mut host = match self.host.take() {
            Some(host) => host,
            None => return Ok(()),
        };

        let res = host.execute(&format!(
            "$document.Close([ref]{}); $word.Quit()",
            WD_DO_NOT_SAVE_CHANGES
        ));
        host.exit()?;

        res
    }
}

impl Drop for WordDocumentService {
    fn drop(&mut self) {
        if let Some(mut host) = self.host.take() {
            if let Err(e) = host.execute("$word.Quit()") {
                warn!("error quitting Microsoft Word: {:#}", e);
            }
            if let Err(e) = host.child.kill() {
                debug!("error stopping {}: {}", POWERSHELL, e);
            }
        }
    }
}
