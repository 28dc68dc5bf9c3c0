//! Argument surface: global options plus one subcommand per concern.

use clap::{Args, Parser, Subcommand, ValueEnum};

use potpal_core::PlantCategory;

#[derive(Debug, Parser)]
#[command(
    name = "potpal",
    about = "Plant-care companion for the PotPal smart pot: plants, tasks, journal, pairing, chat",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(short, long, global = true, env = "POTPAL_PROFILE")]
    pub profile: Option<String>,

    /// Cloud base URL override
    #[arg(long, global = true, env = "POTPAL_CLOUD_URL")]
    pub cloud_url: Option<String>,

    /// Account email override
    #[arg(long, global = true, env = "POTPAL_EMAIL")]
    pub email: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Plant category as a CLI value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Fruit,
    Vegetable,
    Herb,
    #[default]
    Flower,
    Other,
}

impl From<CategoryArg> for PlantCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Fruit => Self::Fruit,
            CategoryArg::Vegetable => Self::Vegetable,
            CategoryArg::Herb => Self::Herb,
            CategoryArg::Flower => Self::Flower,
            CategoryArg::Other => Self::Other,
        }
    }
}

// ── Commands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify credentials and remember them for this profile
    Login(LoginArgs),

    /// Create a new account
    Register(RegisterArgs),

    /// Account management
    #[command(subcommand)]
    Account(AccountCommand),

    /// Manage your plants
    #[command(subcommand)]
    Plants(PlantsCommand),

    /// Manage to-do tasks
    #[command(subcommand)]
    Tasks(TasksCommand),

    /// Manage journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Discover, pair, and drive a smart pot
    #[command(subcommand)]
    Pot(PotCommand),

    /// Ask the care helper a question
    Chat(ChatArgs),

    /// Local profile and text-size preference
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted-for password)
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account email (prompted-for password)
    pub email: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Permanently delete the account and its cloud data
    Delete {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum PlantsCommand {
    /// List your plants
    List {
        /// Keep following the live mirror
        #[arg(long)]
        watch: bool,
    },
    /// Add a plant (care fields prefilled from the care guide when available)
    Add {
        name: String,
        #[arg(long, value_enum, default_value_t)]
        category: CategoryArg,
        /// Skip the care-guide lookup
        #[arg(long)]
        no_lookup: bool,
    },
    /// Remove a plant by document id
    Remove { id: String },
    /// Show the reference care sheet for a plant
    Info { name: String },
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    /// List tasks
    List {
        /// Keep following the live mirror
        #[arg(long)]
        watch: bool,
    },
    /// Add a task
    Add { name: String },
    /// Mark a task completed (or uncompleted with --undo)
    Done {
        id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Remove a task by document id
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
pub enum JournalCommand {
    /// List journal entries, newest first
    List,
    /// Add an entry
    Add {
        content: String,
        /// Associate the entry with a plant by name
        #[arg(long)]
        plant: Option<String>,
    },
    /// Remove an entry by document id
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PotCommand {
    /// Scan for nearby pots over the radio
    Scan {
        /// How long to scan
        #[arg(long, default_value_t = 3)]
        seconds: u64,
    },
    /// Pair a pot discovered by `pot scan`
    Pair {
        /// Radio address of the pot
        id: String,
        /// Name for the paired pot record
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        category: CategoryArg,
    },
    /// List locally paired pots
    List,
    /// Forget a paired pot
    Unpair { id: uuid::Uuid },
    /// Connect to a pot over Wi-Fi and optionally drive it
    Wifi {
        /// Pot IP address or hostname
        address: String,
        /// Switch the watering mode after connecting
        #[arg(long, value_enum)]
        mode: Option<WateringMode>,
        /// Fetch a fresh sensor report after connecting
        #[arg(long)]
        fetch: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WateringMode {
    Automatic,
    Manual,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// The question to ask
    pub question: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the local profile
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Set the text-size preference (display scale factor)
    TextSize { scale: f64 },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file
    Init {
        /// Cloud base URL for the default profile
        #[arg(long)]
        cloud_url: Option<String>,
    },
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
