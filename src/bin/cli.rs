use anyhow::Context;
use caseflow::cli::{
    check_access, create_app_admin, parse_method, parse_role, render_role_matrix,
    role_matrix_json,
};
use caseflow_rbac::RoleTable;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "caseflow-cli")]
#[command(about = "Caseflow CLI - Administrative tools for Caseflow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an App Admin account
    CreateAdmin {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Home center, if any
        #[arg(short = 'c', long)]
        center_id: Option<i32>,
    },
    /// Print the role matrix
    Roles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show whether a role may make a request
    Check {
        /// Role id or name, e.g. 4 or "org-executive"
        role: String,
        /// HTTP method
        method: String,
        /// Request path, e.g. /api/tasks/12
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let table = RoleTable::standard();

    match cli.command {
        Commands::CreateAdmin {
            username,
            password,
            center_id,
        } => handle_create_admin(username, password, center_id).await?,
        Commands::Roles { json } => {
            if json {
                println!("{}", role_matrix_json(&table)?);
            } else {
                print!("{}", render_role_matrix(&table));
            }
        }
        Commands::Check { role, method, path } => {
            let role = parse_role(&role)?;
            let method = parse_method(&method)?;

            match check_access(&table, role, &method, &path) {
                Ok(role) => println!("ALLOW  {} {} {}", role, method, path),
                Err(denial) => {
                    println!("DENY   {} ({})", denial, denial.reason());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn handle_create_admin(
    username: Option<String>,
    password: Option<String>,
    center_id: Option<i32>,
) -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let username = match username {
        Some(username) => username,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let id = create_app_admin(&pool, &username, &password, center_id).await?;

    println!("\n✅ App Admin created successfully!");
    println!("   Id: {}", id);
    println!("   Username: {}", username);

    Ok(())
}
