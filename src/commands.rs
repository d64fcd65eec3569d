// Command handlers: each subcommand maps onto a single API call plus
// some rendering. Handlers return `anyhow::Result`; main prints the
// error and sets the exit code.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::{Confirm, Input, Password};

use crate::api::{ApiClient, ApiError, NewPresentation};
use crate::cli::{Cli, Commands, ExportFormat, PresentationCommands};
use crate::{config, output};

pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, password } => login(email, password),
        Commands::Logout => logout(),
        Commands::Status => status(),
        Commands::Presentation { command } => match command {
            PresentationCommands::List => list(cli.token.as_deref()),
            PresentationCommands::Add {
                title,
                markdown,
                theme,
            } => add(cli.token.as_deref(), title, &markdown, theme),
            PresentationCommands::Delete { id, yes } => delete(cli.token.as_deref(), &id, yes),
            PresentationCommands::Export { id, format, output } => {
                export(cli.token.as_deref(), &id, format, output.as_deref())
            }
        },
    }
}

fn login(email: Option<String>, password: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .context("reading email")?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("reading password")?,
    };

    let api = ApiClient::from_env(None)?;
    let spinner = output::spinner("Logging in...");
    let result = api.login(&email, &password);
    spinner.finish_and_clear();

    let token = result.map_err(|err| fail("log in", err))?;
    config::save(&config::Config {
        access_token: Some(token),
        email: Some(email.clone()),
    })?;
    output::success(&format!("logged in as {email}"));
    Ok(())
}

fn logout() -> Result<()> {
    if config::clear()? {
        output::success("logged out");
    } else {
        output::warning("you were not logged in");
    }
    Ok(())
}

fn status() -> Result<()> {
    let cfg = config::load();
    output::header("MarkPre status");
    if cfg.token().is_some() {
        let email = cfg.email.as_deref().unwrap_or("unknown");
        output::success_detail(&format!("logged in as {email}"));
    } else {
        output::failure("not logged in, run `markpre login`");
    }

    let api = ApiClient::from_env(None)?;
    match api.health() {
        Ok(code) if (200..300).contains(&code) => {
            output::success_detail(&format!("server online: {}", api.base_url()));
        }
        Ok(code) => output::failure(&format!("server returned HTTP {code}")),
        Err(err) => output::failure(&format!("cannot reach server: {err}")),
    }
    Ok(())
}

fn list(token_flag: Option<&str>) -> Result<()> {
    let api = ApiClient::from_env(Some(require_token(token_flag)?))?;
    let spinner = output::spinner("Fetching presentations...");
    let result = api.list_presentations();
    spinner.finish_and_clear();

    let items = result.map_err(|err| fail("fetch presentations", err))?;
    if items.is_empty() {
        output::warning("no presentations yet");
        output::detail("create one: markpre presentation add --title 'My talk' --markdown slides.md");
        return Ok(());
    }
    output::print_presentations(&items);
    Ok(())
}

fn add(
    token_flag: Option<&str>,
    title: Option<String>,
    markdown: &Path,
    theme: Option<String>,
) -> Result<()> {
    let token = require_token(token_flag)?;
    let title = match title {
        Some(title) => title,
        None => Input::new()
            .with_prompt("Title")
            .interact_text()
            .context("reading title")?,
    };

    let content = fs::read_to_string(markdown)
        .with_context(|| format!("reading {}", markdown.display()))?;
    if content.trim().is_empty() {
        bail!("markdown file {} is empty", markdown.display());
    }

    let api = ApiClient::from_env(Some(token))?;
    let spinner = output::spinner("Creating presentation...");
    let result = api.create_presentation(&NewPresentation {
        title,
        content,
        theme,
    });
    spinner.finish_and_clear();

    let created = result.map_err(|err| fail("create presentation", err))?;
    output::success("created");
    output::detail(&format!("id:     {}", created.id));
    output::detail(&format!("title:  {}", created.title));
    if let Some(slides) = created.slide_count {
        output::detail(&format!("slides: {slides}"));
    }
    Ok(())
}

fn delete(token_flag: Option<&str>, id: &str, yes: bool) -> Result<()> {
    let token = require_token(token_flag)?;
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete presentation {id}?"))
            .default(false)
            .interact()
            .context("reading confirmation")?;
        if !confirmed {
            output::detail("aborted");
            return Ok(());
        }
    }

    let api = ApiClient::from_env(Some(token))?;
    api.delete_presentation(id)
        .map_err(|err| fail("delete presentation", err))?;
    output::success("deleted");
    Ok(())
}

fn export(
    token_flag: Option<&str>,
    id: &str,
    format: ExportFormat,
    out: Option<&Path>,
) -> Result<()> {
    let token = require_token(token_flag)?;
    let path = resolve_output_path(out, format);

    let api = ApiClient::from_env(Some(token))?;
    let spinner = output::spinner(&format!("Exporting as {}...", format.ext().to_uppercase()));
    let result = api.export_presentation(id, format.ext());
    spinner.finish_and_clear();

    let bytes = result.map_err(|err| fail(&format!("export as {format}"), err))?;
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    output::success(&format!("saved to {}", path.display()));
    Ok(())
}

/// Layered credential lookup: the `--token` flag (clap also feeds
/// `MARKPRE_TOKEN` into it), then the cached config. Blank values are
/// rejected at every layer.
fn resolve_token(flag: Option<&str>) -> Option<String> {
    if let Some(token) = flag.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    config::load().token().map(str::to_string)
}

fn require_token(flag: Option<&str>) -> Result<String> {
    match resolve_token(flag) {
        Some(token) => Ok(token),
        None => {
            output::warning("not logged in");
            output::detail("run: markpre login");
            bail!("authentication required")
        }
    }
}

/// Attach login guidance to a 401 and wrap the API error with the
/// action that failed.
fn fail(action: &str, err: ApiError) -> anyhow::Error {
    if err.is_auth_failure() {
        output::warning("authentication failed");
        output::detail("log in again: markpre login");
    }
    anyhow!("failed to {action}: {err}")
}

/// Resolve where an export lands:
/// - no `--output`: `presentation.<ext>` in the current directory
/// - an existing directory (or a path ending in a separator): the
///   default file name inside it
/// - a path without an extension: the format extension appended
/// - anything else is used verbatim
pub fn resolve_output_path(output: Option<&Path>, format: ExportFormat) -> PathBuf {
    let default_name = format!("presentation.{}", format.ext());
    let Some(path) = output else {
        return PathBuf::from(default_name);
    };
    let ends_with_separator = path
        .as_os_str()
        .to_string_lossy()
        .ends_with(['/', '\\']);
    if path.is_dir() || ends_with_separator {
        return path.join(default_name);
    }
    if path.extension().is_none() {
        return path.with_extension(format.ext());
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case(None, ExportFormat::Pdf, "presentation.pdf")]
    #[case(None, ExportFormat::Html, "presentation.html")]
    #[case(Some("talk"), ExportFormat::Pdf, "talk.pdf")]
    #[case(Some("talk.pdf"), ExportFormat::Pdf, "talk.pdf")]
    #[case(Some("deck.bak"), ExportFormat::Html, "deck.bak")]
    #[case(Some("out/"), ExportFormat::Html, "out/presentation.html")]
    fn output_path_resolution(
        #[case] output: Option<&str>,
        #[case] format: ExportFormat,
        #[case] expected: &str,
    ) {
        let resolved = resolve_output_path(output.map(Path::new), format);
        assert_eq!(resolved, PathBuf::from(expected));
    }

    #[test]
    fn output_path_into_existing_directory() {
        let dir = tempdir().unwrap();
        let resolved = resolve_output_path(Some(dir.path()), ExportFormat::Pdf);
        assert_eq!(resolved, dir.path().join("presentation.pdf"));
    }

    #[test]
    fn flag_token_wins_over_config() {
        assert_eq!(resolve_token(Some("flag-token")).as_deref(), Some("flag-token"));
        assert_eq!(resolve_token(Some("  padded  ")).as_deref(), Some("padded"));
    }
}
