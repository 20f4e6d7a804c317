use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use peoplepulse::{
    build_context,
    config::AppConfig,
    shell::{PageOptions, Shell},
};
use platform_authn::LoginOutcome;
use platform_authz::Resolution;
use platform_obs::{ObsConfig, init_tracing};
use platform_ui::{LoadingState, render_stack};
use products_hr::{AppContext, Dashboard, NewMember, TeamDirectory};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "peoplepulse", version, about = "PeoplePulse employee management client")]
struct Cli {
    /// Base url of the API, e.g. https://hr.example.com/api
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    /// Directory holding the persisted session.
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session.
    Login(LoginCommand),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in identity.
    Whoami,
    /// Render a page, e.g. `/dashboard`, `/team` or `/hierarchy`.
    Open(OpenCommand),
    /// Record attendance for the signed-in employee.
    #[command(subcommand)]
    Clock(ClockCommand),
    /// Add or remove team members.
    #[command(subcommand)]
    Team(TeamCommand),
}

#[derive(Args, Debug)]
struct LoginCommand {
    #[arg(long)]
    username: String,
    #[arg(long, env = "PEOPLEPULSE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct OpenCommand {
    #[arg(default_value = "/")]
    path: String,
    /// Team page: filter by name, email or designation.
    #[arg(long)]
    search: Option<String>,
    /// Team page: only show one department.
    #[arg(long)]
    department: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ClockCommand {
    In,
    Out,
}

#[derive(Subcommand, Debug)]
enum TeamCommand {
    /// Create an employee record and print its id.
    Add(AddMemberCommand),
    /// Delete the employee record with this id.
    Remove { id: i64 },
}

#[derive(Args, Debug)]
struct AddMemberCommand {
    #[arg(long)]
    name: String,
    #[arg(long)]
    designation: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    joined: Option<NaiveDate>,
}

impl From<AddMemberCommand> for NewMember {
    fn from(cmd: AddMemberCommand) -> Self {
        NewMember {
            name: cmd.name,
            designation: cmd.designation,
            department: cmd.department,
            email: cmd.email,
            phone: cmd.phone,
            join_date: cmd.joined,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _tracing = init_tracing(ObsConfig::default().with_verbosity(cli.verbose))?;
    let config = AppConfig::load()?.with_overrides(cli.api_url, cli.state_dir);
    debug!(
        api_url = %config.api_url,
        state_dir = %config.state_dir.display(),
        "configuration loaded"
    );

    let ctx = build_context(&config)?;
    ctx.session.restore();

    let result = match cli.command {
        Command::Login(cmd) => login(&ctx, cmd).await,
        Command::Logout => {
            ctx.session.logout();
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => whoami(&ctx),
        Command::Open(cmd) => open(ctx.clone(), config.development, cmd).await,
        Command::Clock(action) => clock(&ctx, action).await,
        Command::Team(cmd) => team(&ctx, cmd).await,
    };

    let pending = ctx.notifications.active();
    if !pending.is_empty() {
        eprintln!("{}", render_stack(&pending));
    }
    result
}

async fn login(ctx: &AppContext, cmd: LoginCommand) -> Result<()> {
    match ctx.session.login(&cmd.username, &cmd.password).await {
        LoginOutcome::Success(identity) => {
            println!(
                "Signed in as {} ({}), {}",
                identity.username, identity.role, identity.employee.name
            );
            Ok(())
        }
        LoginOutcome::Failure { kind, error } => {
            debug!(?kind, "login failed");
            Err(anyhow!(error))
        }
    }
}

fn whoami(ctx: &AppContext) -> Result<()> {
    let Some(identity) = ctx.session.identity() else {
        bail!("not signed in");
    };
    let profile = &identity.employee;
    println!("{} ({})", identity.username, identity.role);
    println!("  name         {}", profile.name);
    if let Some(designation) = &profile.designation {
        println!("  designation  {designation}");
    }
    if let Some(department) = &profile.department {
        println!("  department   {department}");
    }
    if let Some(joined) = profile.join_date {
        println!("  joined       {joined}");
    }
    Ok(())
}

async fn open(ctx: AppContext, development: bool, cmd: OpenCommand) -> Result<()> {
    let mut shell = Shell::new(ctx, development);
    let options = PageOptions {
        search: cmd.search,
        department: cmd.department,
    };
    let rendered = LoadingState::wrap(
        format!("Loading {}", cmd.path),
        shell.open(&cmd.path, &options, Local::now().naive_local()),
    )
    .await;
    if let Resolution::Redirect(target) = rendered.resolution {
        eprintln!("{} → {}", cmd.path, target);
    }
    print!("{}", rendered.body);
    Ok(())
}

async fn clock(ctx: &AppContext, action: ClockCommand) -> Result<()> {
    let Some(identity) = ctx.session.identity() else {
        bail!("not signed in");
    };
    let mut page = Dashboard::new(Some(identity.employee));
    LoadingState::wrap("Loading attendance", page.load(ctx, Local::now().naive_local())).await;
    if page.is_offline() {
        bail!("attendance is unavailable while the API cannot be reached");
    }
    let now = Local::now().naive_local();
    match action {
        ClockCommand::In => page.clock_in(ctx, now).await?,
        ClockCommand::Out => page.clock_out(ctx, now).await?,
    }
    if let Some(since) = page.clocked_in_since() {
        println!("Clocked in since {}", since.format("%H:%M"));
    } else {
        println!("Clocked out at {}", now.format("%H:%M"));
    }
    Ok(())
}

async fn team(ctx: &AppContext, cmd: TeamCommand) -> Result<()> {
    if ctx.session.identity().is_none() {
        bail!("not signed in");
    }
    let mut directory = TeamDirectory::new();
    match cmd {
        TeamCommand::Add(member) => {
            let created = directory.add_member(ctx, member.into()).await?;
            if let Some(id) = created.id {
                println!("{id}");
            }
        }
        TeamCommand::Remove { id } => directory.remove_member(ctx, id).await?,
    }
    Ok(())
}
