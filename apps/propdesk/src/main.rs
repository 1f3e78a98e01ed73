use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use maintenance::contract::client::MaintenanceApi;
use maintenance::contract::model::{
    ImageUpload, MaintenanceRequest, Priority, RequestDraft, Role, StatusFilter, User,
};
use maintenance::{Maintenance, MaintenanceConfig};
use runtime::{AppConfig, CliArgs};

/// PropDesk - property maintenance request desk
#[derive(Parser)]
#[command(name = "propdesk")]
#[command(about = "PropDesk - property maintenance request desk")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration and open the store
    Check,
    /// List all users
    Users,
    /// List requests visible to the current user
    Requests {
        /// `all` or one status (pending, assigned, in_progress, ...)
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Log in by email, registering the user if a role is given
    Login {
        #[arg(long)]
        email: String,
        /// tenant, admin or property_manager
        #[arg(long)]
        role: Option<Role>,
    },
    /// Clear the current session
    Logout,
    /// Show the current user
    Whoami,
    /// Walk one request through its whole lifecycle
    Demo {
        /// Photo attached to the completion report
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    let home_dir = PathBuf::from(&config.app.home_dir);
    runtime::logging::init_logging_from_config(&logging_config, &home_dir);
    tracing::info!("PropDesk starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let module_cfg: MaintenanceConfig = config.module_config("maintenance")?;
    let module = Maintenance::new();
    module.init(&module_cfg, &home_dir).await?;
    let api = module.client()?;

    match cli.command.unwrap_or(Commands::Whoami) {
        Commands::Check => check_config(&config),
        Commands::Users => list_users(api.as_ref()).await,
        Commands::Requests { status } => list_requests(api.as_ref(), status).await,
        Commands::Login { email, role } => login(api.as_ref(), &email, role).await,
        Commands::Logout => {
            api.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => whoami(api.as_ref()).await,
        Commands::Demo { photo } => run_demo(api, photo.as_deref()).await,
    }
}

/// The store was already opened and seeded by module init.
fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn print_user(user: &User) {
    println!("{}  {:<16} {:<24} {}", user.id, user.role, user.email, user.name);
}

fn print_request(request: &MaintenanceRequest) {
    println!(
        "{}  {:<11} {:<6} {:<10} {}",
        request.id, request.status, request.priority, request.category, request.title
    );
}

async fn list_users(api: &dyn MaintenanceApi) -> Result<()> {
    for user in api.list_users().await? {
        print_user(&user);
    }
    Ok(())
}

async fn current(api: &dyn MaintenanceApi) -> Result<User> {
    api.current_user()
        .await?
        .ok_or_else(|| anyhow!("Nobody is logged in; use `propdesk login --email <email>`"))
}

async fn list_requests(api: &dyn MaintenanceApi, status: StatusFilter) -> Result<()> {
    let user = current(api).await?;
    let requests = api.visible_requests(&user, status).await?;
    let stats = api.request_stats(&user).await?;
    for request in &requests {
        print_request(request);
    }
    println!(
        "total {}  pending {}  assigned {}  in_progress {}  completed {}  approved {}  rejected {}",
        stats.total,
        stats.pending,
        stats.assigned,
        stats.in_progress,
        stats.completed,
        stats.approved,
        stats.rejected
    );
    Ok(())
}

async fn login(api: &dyn MaintenanceApi, email: &str, role: Option<Role>) -> Result<()> {
    match api.login(email, role).await? {
        Some(user) => {
            println!("Logged in as");
            print_user(&user);
            Ok(())
        }
        None => bail!("Unknown user '{email}'; pass --role to register"),
    }
}

async fn whoami(api: &dyn MaintenanceApi) -> Result<()> {
    match api.current_user().await? {
        Some(user) => print_user(&user),
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn find_role(api: &dyn MaintenanceApi, role: Role) -> Result<User> {
    api.list_users()
        .await?
        .into_iter()
        .find(|u| u.role == role)
        .ok_or_else(|| anyhow!("No {role} user in the store"))
}

async fn run_demo(api: Arc<dyn MaintenanceApi>, photo: Option<&Path>) -> Result<()> {
    let tenant = find_role(api.as_ref(), Role::Tenant).await?;
    let admin = find_role(api.as_ref(), Role::Admin).await?;
    let manager = find_role(api.as_ref(), Role::PropertyManager).await?;

    let photos = match photo {
        Some(path) => vec![ImageUpload::read_from(path).await?],
        None => Vec::new(),
    };

    let draft = RequestDraft {
        title: "Leak".into(),
        description: "Sink leaking".into(),
        category: "Plumbing".into(),
        priority: Priority::High,
    };
    let submitted = api.submit_request(&tenant, draft, Vec::new()).await?;
    let id = submitted.value.id;
    print_request(&submitted.value);

    print_request(&api.assign_request(&admin, id, manager.id).await?);
    print_request(&api.start_work(&manager, id).await?);

    let completed = api
        .complete_work(&manager, id, "Fixed washer", photos.clone())
        .await?;
    for warning in &completed.warnings {
        println!("warning: {warning}");
    }
    print_request(&completed.value);

    print_request(&api.reject_request(&tenant, id, "Still leaking").await?);
    print_request(&api.reopen_request(&manager, id).await?);

    let redone = api
        .complete_work(&manager, id, "Replaced the cartridge", photos)
        .await?;
    print_request(&redone.value);
    print_request(&api.approve_request(&tenant, id).await?);
    Ok(())
}
