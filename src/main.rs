//! Riddle CLI
//!
//! A command-line client for the riddle puzzle process on AO.
//!
//! # Commands
//!
//! - `puzzles` / `show` - Browse puzzles
//! - `post` - Post a puzzle (admins)
//! - `solve` - Submit answers to a puzzle
//! - `admins` / `add-admin` - Inspect and manage admins
//! - `commit` / `verify` - Compute and check answer commitments offline
//! - `profile` - Look up a Bazar profile
//! - `notes` - Per-puzzle scratch notes
//! - `new-wallet` / `import-mnemonic` / `export-mnemonic` / `address` - Wallet
//! - `benchmark` - Measure commitment throughput

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use riddle::commitment::{self, CodeUnits, Committer, Mixing};
use riddle::notes::NoteBook;
use riddle::profile::{JsonFileStore, ProfileCache, ProfileResolver};
use riddle::puzzle::{AnswerSheet, Puzzle, PuzzleClient, PuzzleDraft, Question};
use riddle::rpc::{AoClient, AoConfig};
use riddle::wallet::{default_wallet_path, ensure_wallet_dir, Signer, Wallet};

#[derive(Parser)]
#[command(name = "riddle")]
#[command(author = "Riddle Developers")]
#[command(version = "0.1.0")]
#[command(about = "Client for the riddle puzzle process on AO")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Messenger unit URL
    #[arg(long, global = true, env = "RIDDLE_MU_URL")]
    mu: Option<String>,

    /// Compute unit URL
    #[arg(long, global = true, env = "RIDDLE_CU_URL")]
    cu: Option<String>,

    /// Arweave gateway URL
    #[arg(long, global = true, env = "RIDDLE_GATEWAY_URL")]
    gateway: Option<String>,

    /// Puzzle process id
    #[arg(long, global = true, env = "RIDDLE_PROCESS")]
    process: Option<String>,

    /// Custom wallet file path
    #[arg(long, global = true, env = "RIDDLE_WALLET")]
    wallet: Option<PathBuf>,

    /// Log requests and responses
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List puzzles
    Puzzles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one puzzle with its questions
    Show {
        /// Puzzle id
        id: String,
    },

    /// Post a new puzzle (admin only)
    Post {
        /// Read the puzzle from a JSON file
        #[arg(long, conflicts_with_all = ["name", "questions"])]
        file: Option<PathBuf>,

        /// Puzzle name
        #[arg(long)]
        name: Option<String>,

        /// A text question (repeat for each question)
        #[arg(short = 'q', long = "question")]
        questions: Vec<String>,

        /// The answer to each question, in order
        #[arg(short = 'a', long = "answer")]
        answers: Vec<String>,

        /// Reward shown to players
        #[arg(long)]
        reward: Option<String>,

        /// Banner image path or URL
        #[arg(long)]
        banner: Option<String>,

        /// Lowercase answers before committing
        #[arg(long)]
        lowercase: bool,
    },

    /// Submit answers to a puzzle
    Solve {
        /// Puzzle id
        id: String,

        /// The answer to each question, in order
        #[arg(short = 'a', long = "answer", required = true)]
        answers: Vec<String>,

        /// Lowercase answers before submitting
        #[arg(long)]
        lowercase: bool,
    },

    /// List admin addresses
    Admins,

    /// Grant admin rights to an address (admin only)
    AddAdmin {
        /// Address to promote
        address: String,
    },

    /// Compute the commitment of a set of answers
    Commit {
        /// Answers, joined with commas before hashing
        #[arg(required = true)]
        answers: Vec<String>,

        /// How text is split into hash input units
        #[arg(long, value_enum, default_value_t = UnitsArg::Ascii)]
        units: UnitsArg,

        /// Use snapshot mixing instead of the deployed chained schedule
        #[arg(long)]
        snapshot: bool,

        /// Override the salt
        #[arg(long)]
        salt: Option<String>,

        /// Also print the 64-character rendering
        #[arg(long)]
        wide: bool,
    },

    /// Check answers against a stored commitment
    Verify {
        /// Expected commitment (32 lowercase hex characters)
        digest: String,

        /// Answers, joined with commas before hashing
        #[arg(required = true)]
        answers: Vec<String>,

        /// How text is split into hash input units
        #[arg(long, value_enum, default_value_t = UnitsArg::Ascii)]
        units: UnitsArg,

        /// The commitment was made with snapshot mixing
        #[arg(long)]
        snapshot: bool,

        /// Salt the commitment was made with
        #[arg(long)]
        salt: Option<String>,
    },

    /// Look up the Bazar profile of an address
    Profile {
        /// Address to look up (default: the wallet's)
        address: Option<String>,

        /// Empty the profile cache first
        #[arg(long)]
        clear_cache: bool,
    },

    /// Read or edit notes for a puzzle
    Notes {
        /// Puzzle id (lists puzzles with notes if omitted)
        id: Option<String>,

        /// Append a line
        #[arg(long, requires = "id")]
        add: Option<String>,

        /// Delete the puzzle's notes
        #[arg(long, requires = "id", conflicts_with = "add")]
        clear: bool,
    },

    /// Import a wallet from mnemonic phrase
    ImportMnemonic {
        /// The mnemonic phrase (will prompt if not provided)
        #[arg(long)]
        phrase: Option<String>,
    },

    /// Export the wallet mnemonic phrase
    ExportMnemonic,

    /// Generate a new wallet
    NewWallet,

    /// Show wallet address
    Address,

    /// Run commitment benchmark
    Benchmark {
        /// Number of commitments to compute
        #[arg(short, long, default_value = "100000")]
        count: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitsArg {
    Ascii,
    Utf16,
    Utf8,
}

impl From<UnitsArg> for CodeUnits {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Ascii => CodeUnits::Ascii,
            UnitsArg::Utf16 => CodeUnits::Utf16,
            UnitsArg::Utf8 => CodeUnits::Utf8,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_ao_config(
        cli.mu.as_deref(),
        cli.cu.as_deref(),
        cli.gateway.as_deref(),
        cli.process.as_deref(),
    );
    let wallet_path = cli.wallet;

    let result = match cli.command {
        Commands::Puzzles { json } => cmd_puzzles(json, &config),
        Commands::Show { id } => cmd_show(&id, &config),
        Commands::Post {
            file,
            name,
            questions,
            answers,
            reward,
            banner,
            lowercase,
        } => build_draft(file.as_deref(), name, questions, answers, reward, banner, lowercase)
            .and_then(|draft| cmd_post(&draft, &config, wallet_path)),
        Commands::Solve {
            id,
            answers,
            lowercase,
        } => cmd_solve(&id, answers, lowercase, &config, wallet_path),
        Commands::Admins => cmd_admins(&config),
        Commands::AddAdmin { address } => cmd_add_admin(&address, &config, wallet_path),
        Commands::Commit {
            answers,
            units,
            snapshot,
            salt,
            wide,
        } => cmd_commit(&answers, committer(units, snapshot, salt), wide),
        Commands::Verify {
            digest,
            answers,
            units,
            snapshot,
            salt,
        } => cmd_verify(&digest, &answers, committer(units, snapshot, salt)),
        Commands::Profile {
            address,
            clear_cache,
        } => cmd_profile(address, clear_cache, &config, wallet_path),
        Commands::Notes { id, add, clear } => cmd_notes(id.as_deref(), add.as_deref(), clear),
        Commands::ImportMnemonic { phrase } => cmd_import_mnemonic(phrase, wallet_path),
        Commands::ExportMnemonic => cmd_export_mnemonic(wallet_path),
        Commands::NewWallet => cmd_new_wallet(wallet_path),
        Commands::Address => cmd_address(wallet_path),
        Commands::Benchmark { count } => cmd_benchmark(count),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: bool) {
    let default = if verbose { "riddle=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build AO config from CLI args
fn build_ao_config(
    mu: Option<&str>,
    cu: Option<&str>,
    gateway: Option<&str>,
    process: Option<&str>,
) -> AoConfig {
    let mut config = AoConfig::default();
    if let Some(url) = mu {
        config.mu_url = url.to_string();
    }
    if let Some(url) = cu {
        config.cu_url = url.to_string();
    }
    if let Some(url) = gateway {
        config.gateway_url = url.to_string();
    }
    if let Some(id) = process {
        config.process_id = id.to_string();
    }
    config
}

/// Directory for local state next to the default wallet
fn riddle_dir() -> PathBuf {
    default_wallet_path()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".riddle"))
}

fn puzzle_client(config: &AoConfig) -> anyhow::Result<PuzzleClient<AoClient>> {
    let client = AoClient::with_config(config.clone())?;
    Ok(PuzzleClient::new(client, config.process_id.clone()))
}

fn load_wallet(wallet_path: Option<PathBuf>) -> anyhow::Result<Wallet> {
    let path = wallet_path.unwrap_or_else(default_wallet_path);

    if !path.exists() {
        anyhow::bail!("No wallet found. Create one with 'riddle new-wallet'");
    }

    Ok(Wallet::load_from_file(&path)?)
}

/// The wallet if one exists; writes without one are refused downstream
fn optional_wallet(wallet_path: Option<PathBuf>) -> anyhow::Result<Option<Wallet>> {
    let path = wallet_path.unwrap_or_else(default_wallet_path);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(Wallet::load_from_file(&path)?))
}

fn signer(wallet: &Option<Wallet>) -> Option<&dyn Signer> {
    wallet.as_ref().map(|w| w as &dyn Signer)
}

fn print_puzzle_line(puzzle: &Puzzle) {
    let reward = puzzle
        .reward
        .as_deref()
        .map(|r| format!(" (reward: {})", r))
        .unwrap_or_default();
    println!(
        "{:>6}  {}{}  [{} question{}]",
        puzzle.id,
        puzzle.name,
        reward,
        puzzle.questions.len(),
        if puzzle.questions.len() == 1 { "" } else { "s" }
    );
}

fn cmd_puzzles(json: bool, config: &AoConfig) -> anyhow::Result<()> {
    let client = puzzle_client(config)?;
    let rt = tokio::runtime::Runtime::new()?;
    let puzzles = rt.block_on(client.get_puzzles())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&puzzles)?);
        return Ok(());
    }

    if puzzles.is_empty() {
        println!("No puzzles yet.");
        return Ok(());
    }

    for puzzle in &puzzles {
        print_puzzle_line(puzzle);
    }

    Ok(())
}

fn cmd_show(id: &str, config: &AoConfig) -> anyhow::Result<()> {
    let client = puzzle_client(config)?;
    let rt = tokio::runtime::Runtime::new()?;

    let Some(puzzle) = rt.block_on(client.get_puzzle(id))? else {
        anyhow::bail!("Puzzle {} not found", id);
    };

    println!("=== {} ===", puzzle.name);
    if let Some(reward) = &puzzle.reward {
        println!("Reward: {}", reward);
    }
    println!("Banner: {}", config.gateway_link(puzzle.banner()));
    println!();

    for (i, question) in puzzle.questions.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, question.kind, question.content);
        if let Some(url) = &question.media_url {
            println!("   {}", url);
        }
    }

    let notes = NoteBook::new(riddle_dir().join("notes")).load(&puzzle.id)?;
    if !notes.is_empty() {
        println!("\nYour notes:\n{}", notes.trim_end());
    }

    println!(
        "\nAnswer with: riddle solve {} {}",
        puzzle.id,
        vec!["-a <answer>"; puzzle.questions.len().max(1)].join(" ")
    );

    Ok(())
}

fn build_draft(
    file: Option<&Path>,
    name: Option<String>,
    questions: Vec<String>,
    answers: Vec<String>,
    reward: Option<String>,
    banner: Option<String>,
    lowercase: bool,
) -> anyhow::Result<PuzzleDraft> {
    let mut draft = match file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let mut draft: PuzzleDraft = serde_json::from_str(&content)?;
            if !answers.is_empty() {
                draft.answers = answers;
            }
            draft
        }
        None => PuzzleDraft {
            name: name.unwrap_or_default(),
            questions: questions.into_iter().map(Question::text).collect(),
            answers,
            reward: String::new(),
            banner_image: None,
        },
    };

    if let Some(reward) = reward {
        draft.reward = reward;
    }
    if banner.is_some() {
        draft.banner_image = banner;
    }
    if lowercase {
        draft.answers = draft.answers.iter().map(|a| a.to_lowercase()).collect();
    }

    draft.validate()?;
    Ok(draft)
}

fn cmd_post(draft: &PuzzleDraft, config: &AoConfig, wallet_path: Option<PathBuf>) -> anyhow::Result<()> {
    let wallet = optional_wallet(wallet_path)?;
    let client = puzzle_client(config)?;

    println!("Posting puzzle...");
    println!("Process:   {}", config.process_id);
    println!("Name:      {}", draft.name);
    println!("Questions: {}", draft.questions.len());

    let rt = tokio::runtime::Runtime::new()?;
    let receipt = rt.block_on(client.post_puzzle(draft, signer(&wallet)))?;

    println!("\nPuzzle posted!");
    println!("Message:  {}", receipt.message_id);
    println!("Answers:  {}", receipt.hashed_answers);

    Ok(())
}

fn cmd_solve(
    id: &str,
    answers: Vec<String>,
    lowercase: bool,
    config: &AoConfig,
    wallet_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let wallet = optional_wallet(wallet_path)?;
    let client = puzzle_client(config)?;

    let mut sheet = AnswerSheet::new(answers);
    if lowercase {
        sheet = sheet.lowercased();
    }

    println!("Submitting {} answer(s) to puzzle {}...", sheet.len(), id);

    let rt = tokio::runtime::Runtime::new()?;
    let receipt = rt.block_on(client.solve_puzzle(id, &sheet, signer(&wallet)))?;

    println!("\nCorrect!");
    println!("Message: {}", receipt.message_id);
    if let Some(message) = receipt.response.get("message").and_then(|m| m.as_str()) {
        println!("{}", message);
    }

    Ok(())
}

fn cmd_admins(config: &AoConfig) -> anyhow::Result<()> {
    let client = puzzle_client(config)?;
    let rt = tokio::runtime::Runtime::new()?;
    let admins = rt.block_on(client.get_admins())?;

    if admins.is_empty() {
        println!("No admins listed.");
    }
    for admin in admins {
        println!("{}", admin);
    }

    Ok(())
}

fn cmd_add_admin(address: &str, config: &AoConfig, wallet_path: Option<PathBuf>) -> anyhow::Result<()> {
    let wallet = optional_wallet(wallet_path)?;
    let client = puzzle_client(config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let message_id = rt.block_on(client.add_admin(address, signer(&wallet)))?;

    println!("Admin added: {}", address);
    println!("Message: {}", message_id);

    Ok(())
}

/// Committer for the `commit` and `verify` flags
fn committer(units: UnitsArg, snapshot: bool, salt: Option<String>) -> Committer {
    let mut committer = Committer::new().with_code_units(units.into());
    if snapshot {
        committer = committer.with_mixing(Mixing::Snapshot);
    }
    if let Some(salt) = salt {
        committer = committer.with_salt(salt);
    }
    committer
}

fn cmd_commit(answers: &[String], committer: Committer, wide: bool) -> anyhow::Result<()> {
    let combined = AnswerSheet::new(answers.iter().cloned()).combined();
    let digest = committer.digest(&combined)?;

    println!("{}", digest.to_hex());
    if wide {
        println!("{}", digest.to_wide_hex());
    }

    Ok(())
}

fn cmd_verify(digest: &str, answers: &[String], committer: Committer) -> anyhow::Result<()> {
    let combined = AnswerSheet::new(answers.iter().cloned()).combined();

    if committer.verify(&combined, digest)? {
        println!("Match");
        Ok(())
    } else {
        anyhow::bail!("Answers do not match {}", digest)
    }
}

fn cmd_profile(
    address: Option<String>,
    clear_cache: bool,
    config: &AoConfig,
    wallet_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let address = match address {
        Some(a) => a,
        None => load_wallet(wallet_path)?.address().to_string(),
    };

    let mut cache = ProfileCache::open(JsonFileStore::new(riddle_dir().join("profiles.json")));
    if clear_cache {
        cache.clear()?;
    }

    let client = AoClient::with_config(config.clone())?;
    let mut resolver = ProfileResolver::new(&client, config.bazar_process_id.clone(), cache);

    let rt = tokio::runtime::Runtime::new()?;
    let Some(profile) = rt.block_on(resolver.resolve(&address)) else {
        println!("No Bazar profile for {}", address);
        return Ok(());
    };

    println!("Name:     {}", profile.display_name);
    if let Some(user_name) = &profile.user_name {
        println!("Username: {}", user_name);
    }
    if let Some(description) = profile.description.as_deref().filter(|d| !d.is_empty()) {
        println!("About:    {}", description);
    }
    if let Some(image) = profile.profile_image.as_deref().filter(|i| !i.is_empty()) {
        println!("Avatar:   {}", config.gateway_link(image));
    }
    if let Some(id) = &profile.profile_id {
        println!("Profile:  {}", id);
    }

    Ok(())
}

fn cmd_notes(id: Option<&str>, add: Option<&str>, clear: bool) -> anyhow::Result<()> {
    let notes = NoteBook::new(riddle_dir().join("notes"));

    let Some(id) = id else {
        let ids = notes.puzzles()?;
        if ids.is_empty() {
            println!("No notes yet.");
        }
        for id in ids {
            println!("{}", id);
        }
        return Ok(());
    };

    if clear {
        notes.clear(id)?;
        println!("Notes for puzzle {} deleted.", id);
    } else if let Some(line) = add {
        notes.append(id, line)?;
    } else {
        print!("{}", notes.load(id)?);
    }

    Ok(())
}

fn cmd_import_mnemonic(phrase: Option<String>, wallet_path: Option<PathBuf>) -> anyhow::Result<()> {
    let phrase = match phrase {
        Some(p) => p,
        None => {
            println!("Enter your mnemonic phrase:");
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };

    let wallet = Wallet::from_phrase(&phrase)?;
    let path = ensure_wallet_dir(&wallet_path.unwrap_or_else(default_wallet_path))?;

    wallet.save_to_file(&path)?;

    println!("Wallet imported successfully!");
    println!("Address: {}", wallet.address());
    println!("Saved to: {}", path.display());

    Ok(())
}

fn cmd_export_mnemonic(wallet_path: Option<PathBuf>) -> anyhow::Result<()> {
    let wallet = load_wallet(wallet_path)?;

    println!("WARNING: Keep this mnemonic phrase secret and secure!");
    println!("\n{}\n", wallet.mnemonic());

    Ok(())
}

fn cmd_new_wallet(wallet_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = ensure_wallet_dir(&wallet_path.unwrap_or_else(default_wallet_path))?;

    if path.exists() {
        anyhow::bail!(
            "Wallet already exists at {}. Use 'riddle export-mnemonic' to backup, then delete the file to create a new one.",
            path.display()
        );
    }

    let wallet = Wallet::new()?;
    wallet.save_to_file(&path)?;

    println!("New wallet created!");
    println!("Address: {}", wallet.address());
    println!("Saved to: {}", path.display());
    println!("\nIMPORTANT: Backup your mnemonic phrase with 'riddle export-mnemonic'");

    Ok(())
}

fn cmd_address(wallet_path: Option<PathBuf>) -> anyhow::Result<()> {
    let wallet = load_wallet(wallet_path)?;
    println!("{}", wallet.address());

    Ok(())
}

fn cmd_benchmark(count: u32) -> anyhow::Result<()> {
    println!("Running benchmark with {} commitments...", count);

    let answers: Vec<String> = (0..count).map(|i| format!("benchmark answer {}", i)).collect();

    let start = Instant::now();
    for answer in &answers {
        commitment::commit_answer(answer)?;
    }
    let sequential = start.elapsed();

    let start = Instant::now();
    let results = commitment::commit_batch(&answers);
    let batched = start.elapsed();
    if let Some(Err(e)) = results.into_iter().find(Result::is_err) {
        return Err(e.into());
    }

    let rate = |elapsed: std::time::Duration| count as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("\nResults:");
    println!("  Sequential: {:.2}s ({:.0} commits/s)", sequential.as_secs_f64(), rate(sequential));
    println!("  Batched:    {:.2}s ({:.0} commits/s)", batched.as_secs_f64(), rate(batched));

    println!("\nAlgorithm parameters:");
    println!("  Lanes: {}", commitment::LANES);
    println!("  Mixing rounds: {}", commitment::MIX_ROUNDS);
    println!("  Digest: {} hex characters", commitment::HEX_LEN);

    Ok(())
}
