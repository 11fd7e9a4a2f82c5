use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use nidscope::commands::{
    analyze_command, crossref_command, dump_command, hash_command, import_command,
    import_tree_command, init_project_command, list_libraries_command, project_info_command,
    show_library_command, ImportOptions,
};
use nidscope::init_logging;
use nidscope_core::libdoc::SourceFormat;
use nidscope_core::services::ListingKind;

/// PSP NID resolution and randomization tracking CLI.
///
/// This CLI is a thin wrapper around `nidscope-core` (exposed in code as `nidscope_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "nidscope",
    version,
    about = "Resolve PSP NIDs across firmware releases and track randomization",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new nidscope project at the given root.
    ///
    /// This will:
    /// - Create a `.nidscope` metadata directory and a `reports` directory.
    /// - Write a `.nidscope/project.json` config file.
    /// - Create the project database.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show configuration, detector settings, and record counts.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Import source files for one firmware version.
    ///
    /// Formats: PSP-Libdoc XML (.xml), PSP export files (.exp), PPSSPP HLE
    /// tables (.cpp/.h), and bare `<FUNC>` lists (`--format functions`).
    Import {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Firmware version the files belong to (e.g. 6.60).
        #[arg(long)]
        firmware: String,

        /// Source format (libdoc, export, functions, hle). Inferred from the
        /// extension when omitted.
        #[arg(long)]
        format: Option<SourceFormat>,

        /// Module name for formats that do not carry one. Defaults to the file stem.
        #[arg(long)]
        module: Option<String>,

        /// Library name for function lists. Defaults to the file stem.
        #[arg(long)]
        library: Option<String>,

        /// Files to import.
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Import every `<dir>/<version>/Export/**/*.xml` libdoc file.
    ImportTree {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Directory containing one subdirectory per firmware version.
        #[arg(long)]
        dir: String,
    },

    /// List imported libraries.
    ListLibraries {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Classify every NID of every library across versions.
    ///
    /// A `*` after a version marks a detected (re-)randomization.
    Analyze {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Restrict the analysis to one library.
        #[arg(long)]
        library: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the JSON report to reports/nid-status.json.
        #[arg(long, default_value_t = false)]
        write_report: bool,
    },

    /// Show the per-version status of every NID of one library.
    ShowLibrary {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Library name (e.g. ThreadManForUser).
        #[arg(long)]
        name: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Suggest verified names for NIDs left unresolved elsewhere in the corpus.
    Crossref {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List NIDs or names of imported records, one per line.
    Dump {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// What to list: nids, unknown-nids, names, known-names.
        #[arg(long)]
        kind: ListingKind,

        /// Restrict to one library.
        #[arg(long)]
        library: Option<String>,

        /// Restrict to one firmware version.
        #[arg(long)]
        firmware: Option<String>,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },

    /// Print the NID of each function name.
    Hash {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::Import { root, firmware, format, module, library, files } => {
            let options = ImportOptions {
                format,
                module: module.as_deref(),
                library: library.as_deref(),
            };
            import_command(&root, &firmware, options, &files)?
        }
        Command::ImportTree { root, dir } => import_tree_command(&root, &dir)?,
        Command::ListLibraries { root, json } => list_libraries_command(&root, json)?,
        Command::Analyze { root, library, json, write_report } => {
            analyze_command(&root, library, json, write_report)?
        }
        Command::ShowLibrary { root, name, json } => show_library_command(&root, &name, json)?,
        Command::Crossref { root, json } => crossref_command(&root, json)?,
        Command::Dump { root, kind, library, firmware, out } => dump_command(
            &root,
            kind,
            library.as_deref(),
            firmware.as_deref(),
            out.as_deref(),
        )?,
        Command::Hash { names } => hash_command(&names)?,
    }

    Ok(())
}
