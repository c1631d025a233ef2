// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::wrap::wrap_text,
    clap::{Arg, ArgMatches, Command},
    log::{debug, info, LevelFilter},
    outlook_signature::{
        current_user_name, DirectoryIdentityResolver, OfficeVersion, OverlayIdentityResolver,
        ProfileOverrides, Provisioner, ProvisioningConfig, ProvisioningRequest,
        RegistryConfigStore, Result, SignatureError, SignatureType, TemplateSource,
        WordDocumentService,
    },
    std::{ffi::OsString, path::Path},
};

const USAGE: &str = "USAGE: esig -Template <filePath> [-Variables <filePath>] \
[-Config <filePath>] [-NewEmails | -Replies] [-10 | -13 | -16 [-Persist]] [-Verbose]";

const USAGE_NOTE: &str = "Note: Square brackets denote optional arguments. A pipe \
denotes mutually exclusive arguments. Options may be prefixed with '-' or '/' \
and are not case sensitive.";

const OPTIONS: &[(&str, &str)] = &[
    (
        "-Template",
        "The path to the .DOCX template. It may contain the {DisplayName}, {Email} \
         and {Title} placeholders.",
    ),
    (
        "-Variables",
        "The path to a text file of key=value lines (DisplayName, Email, Title). \
         These values take precedence over those found in the directory.",
    ),
    (
        "-Config",
        "The path to a YAML file defining fallback values and the signatures directory.",
    ),
    (
        "-NewEmails",
        "The signature should be applied to new e-mails only.",
    ),
    ("-Replies", "The signature should be applied to replies only."),
    (
        "-<version>",
        "The version of Microsoft Office installed. -10 = 2010; -13 = 2013; -16 = 2016 and later.",
    ),
    (
        "-Persist",
        "Prevent the user from changing the signature in Outlook. Requires <version>.",
    ),
    ("-Verbose", "Print details of each step."),
];

/// What a successful invocation did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Invocation {
    /// Usage was printed. Nothing else happened.
    Help,
    /// A signature was provisioned.
    Provisioned,
}

fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width >= 40)
        .unwrap_or(80)
}

fn print_help() {
    let width = terminal_width();

    for line in wrap_text(0, width, USAGE, true) {
        println!("{}", line);
    }
    println!();
    for line in wrap_text(4, width, USAGE_NOTE, true) {
        println!("{}", line);
    }
    println!();

    for (name, description) in OPTIONS {
        let mut lines = wrap_text(15, width, description, false);
        println!("    {:<10} {}", name, lines.next().unwrap_or_default());
        for line in lines {
            println!("{}", line);
        }
        println!();
    }
}

/// Rewrite a single legacy `-Option` or `/Option` token into clap's long form.
///
/// Tokens that aren't options are returned untouched. A `/` prefix is only
/// honored for known option names so absolute paths survive.
fn normalize_argument(arg: OsString) -> OsString {
    let text = match arg.to_str() {
        Some(text) => text,
        None => return arg,
    };

    let (slash, name) = if let Some(name) = text.strip_prefix('/') {
        (true, name)
    } else if text.starts_with('-') {
        (false, text.trim_start_matches('-'))
    } else {
        return arg;
    };

    // `--template=value` style is not part of the surface.
    if name.is_empty() || name.contains('=') {
        return arg;
    }

    let name = name.to_ascii_lowercase();

    let normalized = match name.as_str() {
        "?" | "help" => "--help".to_string(),
        "template" | "variables" | "config" | "replies" | "persist" | "verbose" => {
            format!("--{}", name)
        }
        "newemails" => "--new-emails".to_string(),
        // Unsupported version numbers are accepted here and treated as no
        // version, which only matters once locking is attempted.
        _ if name.bytes().all(|b| b.is_ascii_digit()) => format!("--office-version={}", name),
        _ if slash => return arg,
        // Unknown options are forwarded so the parser rejects them.
        _ => format!("--{}", name),
    };

    normalized.into()
}

fn normalize_arguments<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);

    let mut normalized = vec![];
    normalized.extend(args.next());
    normalized.extend(args.map(normalize_argument));

    normalized
}

fn command() -> Command<'static> {
    Command::new("esig")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("template")
                .long("template")
                .takes_value(true)
                .allow_invalid_utf8(true),
        )
        .arg(
            Arg::new("variables")
                .long("variables")
                .takes_value(true)
                .allow_invalid_utf8(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .allow_invalid_utf8(true),
        )
        .arg(Arg::new("new-emails").long("new-emails"))
        .arg(Arg::new("replies").long("replies"))
        .arg(
            Arg::new("office-version")
                .long("office-version")
                .takes_value(true)
                .multiple_occurrences(true),
        )
        .arg(Arg::new("persist").long("persist"))
        .arg(Arg::new("verbose").long("verbose"))
}

/// Whether `--template` is given without a path following it.
fn template_value_missing(args: &[OsString]) -> bool {
    args.iter().enumerate().any(|(i, arg)| {
        arg.as_os_str() == "--template"
            && args
                .get(i + 1)
                .map(|next| next.to_string_lossy().starts_with("--"))
                .unwrap_or(true)
    })
}

fn parse_arguments(args: Vec<OsString>) -> Result<ArgMatches> {
    if template_value_missing(&args) {
        return Err(SignatureError::TemplateMissingPath);
    }

    command().try_get_matches_from(args).map_err(|err| {
        debug!("{}", err.to_string().trim_end());
        SignatureError::MalformedInvocation
    })
}

/// Pick one Office version when several were given. Older versions win.
///
/// Unsupported selectors are ignored.
fn select_office_version<'a>(selectors: impl IntoIterator<Item = &'a str>) -> Option<OfficeVersion> {
    let requested = selectors
        .into_iter()
        .filter_map(OfficeVersion::from_selector)
        .collect::<Vec<_>>();

    OfficeVersion::ALL
        .into_iter()
        .find(|version| requested.contains(version))
}

fn build_request(matches: &ArgMatches) -> Result<ProvisioningRequest> {
    let template = matches
        .value_of_os("template")
        .ok_or(SignatureError::TemplateMissingPath)?;
    let template = TemplateSource::new(Path::new(template))?;

    let office_version =
        select_office_version(matches.values_of("office-version").into_iter().flatten());

    Ok(ProvisioningRequest {
        template,
        signature_type: SignatureType::from_options(
            matches.is_present("new-emails"),
            matches.is_present("replies"),
        ),
        persist: matches.is_present("persist"),
        office_version,
    })
}

fn init_logging(verbose: bool) {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();
}

pub fn run_cli<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = normalize_arguments(args);

    if args.len() <= 1 || args.iter().any(|arg| arg.as_os_str() == "--help") {
        print_help();
        return Ok(Invocation::Help);
    }

    // Logging comes up before parsing so a rejected argument list can be explained.
    init_logging(args.iter().any(|arg| arg.as_os_str() == "--verbose"));

    let matches = parse_arguments(args)?;

    let request = build_request(&matches)?;

    let config = match matches.value_of_os("config") {
        Some(path) => ProvisioningConfig::from_yaml_path(Path::new(path))?,
        None => ProvisioningConfig::default(),
    };
    let overrides = match matches.value_of_os("variables") {
        Some(path) => ProfileOverrides::from_path(Path::new(path))?,
        None => ProfileOverrides::default(),
    };

    let user_name = current_user_name()?;

    let mut provisioner = Provisioner::new(
        config,
        OverlayIdentityResolver::new(DirectoryIdentityResolver::default(), overrides),
        WordDocumentService::default(),
        RegistryConfigStore::default(),
    );

    let outcome = provisioner.provision(&user_name, &request)?;

    for path in outcome.artifacts.paths() {
        info!("wrote {}", path.display());
    }
    for key in &outcome.persisted_keys {
        info!("locked {}", key);
    }

    Ok(Invocation::Provisioned)
}
