// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper over these modules.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the MarkPre backend (login, list,
//   create, delete, export, health probe).
// - `cli`: clap argument definitions.
// - `commands`: one handler per subcommand, mapping arguments onto API
//   calls and rendering the result.
// - `config`: the cached credential in the user's home directory.
// - `output`: colored terminal output, spinners, the presentation table.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
