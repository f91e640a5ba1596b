//! `mygit`: a thin `clap`-derived adapter over the core library. Contains no
//! VCS logic itself — every command resolves the workspace root, opens (or
//! initialises) the repository, dispatches to one `Repository` method, and
//! formats the result.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mygit::error::ErrorKind;
use mygit::infra::fs::RealFs;
use mygit::repository::Repository;

#[derive(Parser)]
#[command(name = "mygit", about = "A minimal, local, single-user version control engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty repository in the current directory.
    Init,

    /// Show workspace status.
    Status {
        /// Show only the staged index.
        #[arg(long)]
        indexed: bool,
        /// Show only the ignore set.
        #[arg(long)]
        ignored: bool,
    },

    /// Stage files or directories.
    Index {
        /// Stage every non-ignored workspace path.
        #[arg(short = 'a', long, conflicts_with = "paths")]
        all: bool,
        /// Paths to stage.
        paths: Vec<String>,
    },

    /// Unstage paths, or restore the workspace to the last commit.
    Reset {
        /// Operate on the index: with no paths, clears it entirely.
        #[arg(short = 'i', long)]
        indexed: bool,
        /// Also restore the affected workspace paths.
        #[arg(long)]
        hard: bool,
        paths: Vec<String>,
    },

    /// Record a commit from the current staged changes.
    Commit {
        message: String,
    },

    /// Show commit history.
    Log {
        /// One line per commit.
        #[arg(short = 'o', long)]
        oneline: bool,
        /// Print the internal log file instead of commit history.
        #[arg(short = 'u', long)]
        internal: bool,
    },

    /// Decompress and print stored object bodies.
    Print {
        checksums: Vec<String>,
    },

    /// Manage branches.
    Branch {
        /// Remove the named branch.
        #[arg(short = 'r', long, value_name = "NAME")]
        remove: Option<String>,
        /// List all branches.
        #[arg(short = 'l', long)]
        list: bool,
        /// Create a branch: `-a <name> <HEAD|checksum>`.
        #[arg(short = 'a', long, value_names = ["NAME", "REF"], num_args = 2)]
        add: Option<Vec<String>>,
    },

    /// Switch branches.
    Checkout {
        branch: String,
        /// Create the branch at the current tip before switching.
        #[arg(short = 'n', long)]
        new: bool,
    },

    /// Fast-forward merge a branch into the current one.
    Merge {
        branch: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let workspace_root = match std::env::current_dir() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("cannot resolve current directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fs = RealFs::new(workspace_root.clone());
    let verbose = mygit::config::Config::load(&fs, mygit::repository::CONFIG_PATH)
        .map(|c| c.verbose)
        .unwrap_or(false);
    mygit::log::init(&workspace_root, verbose);

    run(&cli.command, &fs, &workspace_root)
}

fn run(command: &Commands, fs: &RealFs, workspace_root: &PathBuf) -> ExitCode {
    if let Commands::Init = command {
        return report(Repository::init(fs).map(|_| {
            println!("initialised empty repository");
        }));
    }

    if let Commands::Log { internal: true, .. } = command {
        let log_path = workspace_root.join(".mygit").join("mygit.log");
        return match mygit::log::dump(&log_path) {
            Ok(contents) => {
                print!("{}", contents);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to read log file: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let mut repo = match Repository::open(fs) {
        Ok(repo) => repo,
        Err(e) => return report(Err(e)),
    };

    match command {
        Commands::Init => unreachable!("handled above"),
        Commands::Log { internal: true, .. } => unreachable!("handled above"),

        Commands::Status { indexed, ignored } => report(run_status(&mut repo, *indexed, *ignored)),
        Commands::Index { all, paths } => report(run_index(&mut repo, *all, paths)),
        Commands::Reset { indexed, hard, paths } => report(run_reset(&mut repo, *indexed, *hard, paths)),
        Commands::Commit { message } => report(repo.commit(message).map(|digest| {
            println!("{}", digest);
        })),
        Commands::Log { oneline, .. } => report(run_log(&repo, *oneline)),
        Commands::Print { checksums } => report(run_print(&repo, checksums)),
        Commands::Branch { remove, list, add } => report(run_branch(&repo, remove, *list, add)),
        Commands::Checkout { branch, new } => report(run_checkout(&mut repo, branch, *new)),
        Commands::Merge { branch } => report(repo.merge(branch).map(|_| {
            println!("merged {}", branch);
        })),
    }
}

fn run_status(repo: &mut Repository, indexed: bool, ignored: bool) -> mygit::Result<()> {
    if ignored {
        for path in repo.ignored().iter() {
            println!("{}", path);
        }
        return Ok(());
    }

    let status = repo.status()?;
    for entry in &status.indexed_changes {
        println!("indexed {:?} {}", entry.change, entry.path);
    }
    if indexed {
        return Ok(());
    }
    for entry in &status.not_indexed_changes {
        println!("not indexed {:?} {}", entry.change, entry.path);
    }
    for path in &status.indexed_but_changed {
        println!("indexed but changed {}", path);
    }
    Ok(())
}

fn run_index(repo: &mut Repository, all: bool, paths: &[String]) -> mygit::Result<()> {
    if all {
        repo.stage_all()
    } else {
        for path in paths {
            repo.stage(path)?;
        }
        Ok(())
    }
}

fn run_reset(repo: &mut Repository, indexed: bool, hard: bool, paths: &[String]) -> mygit::Result<()> {
    if indexed {
        repo.reset_indexed(paths, hard)
    } else {
        repo.reset_hard_to_tip()
    }
}

fn run_log(repo: &Repository, oneline: bool) -> mygit::Result<()> {
    for entry in repo.log()? {
        if oneline {
            println!("{} {}", entry.digest.short(), entry.commit.message);
        } else {
            println!("commit {}", entry.digest);
            println!("date:    {}", entry.commit.date);
            println!("{}", entry.commit.message);
            println!();
        }
    }
    Ok(())
}

fn run_print(repo: &Repository, checksums: &[String]) -> mygit::Result<()> {
    for text in repo.print_objects(checksums)? {
        println!("{}", text);
    }
    Ok(())
}

fn run_branch(
    repo: &Repository,
    remove: &Option<String>,
    list: bool,
    add: &Option<Vec<String>>,
) -> mygit::Result<()> {
    if let Some(name) = remove {
        return repo.remove_branch(name);
    }
    if let Some(args) = add {
        let name = &args[0];
        let reference = &args[1];
        let tip = if reference.eq_ignore_ascii_case("HEAD") {
            repo.branch_tip(&repo.current_branch()?)?
        } else {
            Some(mygit::Digest::from_hex(reference)?)
        };
        return repo.create_branch(name, tip);
    }
    if list {
        for name in repo.list_branches()? {
            println!("{}", name);
        }
    }
    Ok(())
}

fn run_checkout(repo: &mut Repository, branch: &str, new: bool) -> mygit::Result<()> {
    if new {
        repo.new_branch_and_checkout(branch)
    } else {
        repo.checkout(branch)
    }
}

/// Maps a core result to the exit-code contract: success and user errors
/// both print a message (or nothing, on success) and exit 0; filesystem
/// faults and corruption print to stderr and exit non-zero.
fn report(result: mygit::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.kind() {
            ErrorKind::User => {
                println!("{}", e);
                ExitCode::SUCCESS
            }
            ErrorKind::FileSystem | ErrorKind::Corruption => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}
